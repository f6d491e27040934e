//! Page records and the prompt-record projection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::PageId;

/// A page as returned by the remote service: identity plus its raw
/// property bag. Property interpretation happens in [`PromptRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: PageId,
    pub properties: Value,
    pub url: Option<String>,
}

/// What the tool layer shows for one prompt: a projection of a page's
/// properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: PageId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub tags: Vec<String>,
    pub url: Option<String>,
}

impl PromptRecord {
    /// Project a page's properties into a prompt record.
    ///
    /// The title is the in-order concatenation of every rich-text run
    /// under the page's title property, no separator. `Type` (select) and
    /// `Tags` (multi-select) are optional; databases without those
    /// properties yield `None` / empty.
    pub fn from_page(page: &PageRecord) -> Self {
        let props = &page.properties;

        let title = props
            .as_object()
            .and_then(|map| {
                map.values()
                    .find(|v| v.get("type").and_then(Value::as_str) == Some("title"))
            })
            .and_then(|v| v.get("title"))
            .and_then(Value::as_array)
            .map(|runs| {
                runs.iter()
                    .filter_map(|r| r.get("plain_text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default();

        let kind = props
            .pointer("/Type/select/name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let tags = props
            .pointer("/Tags/multi_select")
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: page.id.clone(),
            title,
            kind,
            tags,
            url: page.url.clone(),
        }
    }
}
