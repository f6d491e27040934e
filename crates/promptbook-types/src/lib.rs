//! Shared domain types for promptbook.
//!
//! The remote document service represents everything — databases, pages, and
//! content — as identified objects. This crate holds the typed identifiers,
//! the closed block model the codec operates on, the prompt-record projection,
//! and the error taxonomy shared by every other crate.

mod block;
mod error;
mod ids;
mod record;

pub use block::{
    Block, BlockKind, BlockSpec, MediaKind, RichTextRun, plain_text, MAX_BLOCK_TEXT_LEN,
    QUERY_PAGE_SIZE,
};
pub use error::NotionError;
pub use ids::{BlockId, DatabaseId, PageId};
pub use record::{PageRecord, PromptRecord};
