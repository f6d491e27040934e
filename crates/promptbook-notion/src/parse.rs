//! Translation from the service's JSON into the domain block model.
//!
//! The service's payloads are sprawling and mostly irrelevant here, so
//! parsing walks `serde_json::Value` and lifts out only what the codec
//! needs: type tag, plain-text runs, children flag, and the per-kind
//! payloads. Unrecognized type tags become `BlockKind::Unknown`.

use serde_json::Value;

use promptbook_types::{
    Block, BlockId, BlockKind, MediaKind, NotionError, PageId, PageRecord, RichTextRun,
};

use crate::client::Page;

/// Plain-text runs from a rich-text array, in order.
fn rich_text_runs(value: Option<&Value>) -> Vec<RichTextRun> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("plain_text").and_then(Value::as_str))
                .map(RichTextRun::new)
                .collect()
        })
        .unwrap_or_default()
}

/// Concatenated caption text for media blocks.
fn caption_text(payload: &Value) -> String {
    rich_text_runs(payload.get("caption"))
        .iter()
        .map(|r| r.text.as_str())
        .collect()
}

/// URL of a file-bearing block: hosted file or external link.
fn file_url(payload: &Value) -> Option<String> {
    payload
        .pointer("/external/url")
        .or_else(|| payload.pointer("/file/url"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parse one block object.
pub fn parse_block(value: &Value) -> Result<Block, NotionError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| NotionError::Malformed("block without id".into()))?;
    let type_tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| NotionError::Malformed(format!("block {id} without type")))?;
    let payload = value.get(type_tag).cloned().unwrap_or(Value::Null);
    let has_children = value
        .get("has_children")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let rich_text = rich_text_runs(payload.get("rich_text"));

    let kind = match type_tag {
        "paragraph" => BlockKind::Paragraph,
        "heading_1" => BlockKind::Heading1,
        "heading_2" => BlockKind::Heading2,
        "heading_3" => BlockKind::Heading3,
        "bulleted_list_item" => BlockKind::BulletedListItem,
        "numbered_list_item" => BlockKind::NumberedListItem,
        "code" => BlockKind::Code {
            language: payload
                .get("language")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "quote" => BlockKind::Quote,
        "divider" => BlockKind::Divider,
        "toggle" => BlockKind::Toggle,
        "to_do" => BlockKind::ToDo {
            checked: payload
                .get("checked")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        },
        "callout" => BlockKind::Callout {
            icon: payload
                .pointer("/icon/emoji")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        "table" => BlockKind::Table,
        "table_row" => {
            let cells = payload
                .get("cells")
                .and_then(Value::as_array)
                .map(|rows| {
                    rows.iter()
                        .map(|cell| {
                            rich_text_runs(Some(cell))
                                .iter()
                                .map(|r| r.text.as_str())
                                .collect::<String>()
                        })
                        .collect()
                })
                .unwrap_or_default();
            BlockKind::TableRow { cells }
        }
        "image" => BlockKind::Image {
            url: file_url(&payload),
            caption: caption_text(&payload),
        },
        "bookmark" => BlockKind::Bookmark {
            url: payload
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_string),
            caption: caption_text(&payload),
        },
        "embed" | "video" | "audio" | "file" | "pdf" => {
            let media = match type_tag {
                "embed" => MediaKind::Embed,
                "video" => MediaKind::Video,
                "audio" => MediaKind::Audio,
                "file" => MediaKind::File,
                _ => MediaKind::Pdf,
            };
            // Embeds carry a bare url; the rest are file objects.
            let url = payload
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| file_url(&payload));
            BlockKind::Media {
                media,
                url,
                caption: caption_text(&payload),
            }
        }
        "equation" => BlockKind::Equation {
            expression: payload
                .get("expression")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "synced_block" => BlockKind::SyncedBlock,
        "template" => BlockKind::Template,
        "link_to_page" => BlockKind::LinkToPage {
            target: payload
                .get("page_id")
                .or_else(|| payload.get("database_id"))
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        "column_list" => BlockKind::ColumnList,
        "column" => BlockKind::Column,
        other => BlockKind::Unknown {
            kind: other.to_string(),
        },
    };

    Ok(Block {
        id: BlockId::new(id),
        kind,
        rich_text,
        has_children,
    })
}

/// Parse a page object into its record.
pub fn parse_page(value: &Value) -> Result<PageRecord, NotionError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| NotionError::Malformed("page without id".into()))?;
    Ok(PageRecord {
        id: PageId::new(id),
        properties: value.get("properties").cloned().unwrap_or(Value::Null),
        url: value
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Parse a paginated list response with `parse_item` applied per result.
pub fn parse_list<T>(
    value: &Value,
    parse_item: impl Fn(&Value) -> Result<T, NotionError>,
) -> Result<Page<T>, NotionError> {
    let results = value
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| NotionError::Malformed("list response without results".into()))?
        .iter()
        .map(|item| parse_item(item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        results,
        has_more: value
            .get("has_more")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        next_cursor: value
            .get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
