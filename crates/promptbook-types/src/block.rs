//! The block model: one node of a remote document's content tree.
//!
//! ## Design: closed `BlockKind` + `Unknown` fallback
//!
//! The original service speaks an open-ended set of block types. Instead of
//! dispatching on a raw string tag, `BlockKind` is a closed sum type the
//! codec matches exhaustively, with one `Unknown` variant carrying the raw
//! tag. A kind the service adds tomorrow degrades to the documented
//! fallback (children still rendered) instead of silently hitting the
//! wrong branch.
//!
//! Kind-specific payloads live on the variant (checked flag, code
//! language, table-row cells, media URL + caption) rather than in a
//! side-table, so a match arm has everything it needs.

use serde::{Deserialize, Serialize};

use crate::ids::BlockId;

/// Maximum text length (in characters) the service accepts per block.
pub const MAX_BLOCK_TEXT_LEN: usize = 2000;

/// Maximum records per query/children page.
pub const QUERY_PAGE_SIZE: u32 = 100;

/// One fragment of plain text extracted from a block's formatted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextRun {
    pub text: String,
}

impl RichTextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Concatenate runs in order, no separator.
pub fn plain_text(runs: &[RichTextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Embed-like media kinds that all render as a caption + URL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Embed,
    Video,
    Audio,
    File,
    Pdf,
}

impl MediaKind {
    /// Fallback label when the block carries no caption.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Embed => "embed",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::File => "file",
            MediaKind::Pdf => "pdf",
        }
    }
}

/// What a block *is*, plus its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Code { language: String },
    Quote,
    Divider,
    Toggle,
    ToDo { checked: bool },
    Callout { icon: Option<String> },
    Table,
    TableRow { cells: Vec<String> },
    Image { url: Option<String>, caption: String },
    Bookmark { url: Option<String>, caption: String },
    Media { media: MediaKind, url: Option<String>, caption: String },
    Equation { expression: String },
    SyncedBlock,
    Template,
    LinkToPage { target: Option<String> },
    ColumnList,
    Column,
    /// Anything the service sends that this model does not recognize.
    /// Carries the raw type tag for diagnostics; children still render.
    Unknown { kind: String },
}

impl BlockKind {
    /// True for the two list-item kinds that participate in numbering runs.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletedListItem | BlockKind::NumberedListItem
        )
    }
}

/// One node in a remote document's content tree.
///
/// Blocks are created and owned by the remote service; this side only
/// reads them, appends new ones, or deletes whole blocks. Payloads are
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Ordered plain-text runs, for kinds that carry text.
    pub rich_text: Vec<RichTextRun>,
    /// If true, the block owns children fetched separately.
    pub has_children: bool,
}

impl Block {
    /// The block's text as a single string (runs concatenated in order).
    pub fn text(&self) -> String {
        plain_text(&self.rich_text)
    }
}

/// Outbound block payload for create/append calls.
///
/// The encoder only ever produces paragraphs, so this stays minimal; the
/// JSON shape is the one the service's append/create endpoints expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    pub text: String,
}

impl BlockSpec {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Serialize to the remote service's block JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": self.text }
                }]
            }
        })
    }
}
