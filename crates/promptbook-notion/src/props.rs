//! Property payload builders for prompt pages.
//!
//! The prompt database convention: `Name` (title), `Type` (select),
//! `Tags` (multi-select). Databases missing the optional properties
//! simply never receive them.

use serde_json::{json, Value};

/// Properties for a new prompt page.
pub fn prompt_properties(title: &str, kind: Option<&str>, tags: &[String]) -> Value {
    let mut props = json!({
        "Name": { "title": [{ "text": { "content": title } }] }
    });
    if let Some(kind) = kind {
        props["Type"] = json!({ "select": { "name": kind } });
    }
    if !tags.is_empty() {
        let options: Vec<Value> = tags.iter().map(|t| json!({ "name": t })).collect();
        props["Tags"] = json!({ "multi_select": options });
    }
    props
}

/// Title-only property update, for renames.
pub fn title_property(title: &str) -> Value {
    json!({ "Name": { "title": [{ "text": { "content": title } }] } })
}

/// Query filter matching prompts whose title contains `query`.
pub fn title_contains_filter(query: &str) -> Value {
    json!({ "property": "Name", "title": { "contains": query } })
}
