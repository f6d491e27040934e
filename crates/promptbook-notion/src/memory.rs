//! In-memory [`DocumentClient`] for tests and offline use.
//!
//! Behaves like the remote service where the core can tell the
//! difference: properties are normalized to the response shape (type
//! tags + `plain_text` runs), results are cursor-paginated, and missing
//! targets produce the typed `NotFound`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use promptbook_types::{
    Block, BlockId, BlockKind, BlockSpec, DatabaseId, NotionError, PageId, PageRecord,
    PromptRecord, RichTextRun,
};

use crate::client::{DocumentClient, Page};

#[derive(Default)]
struct Inner {
    databases: HashSet<String>,
    db_pages: HashMap<String, Vec<PageId>>,
    pages: HashMap<String, PageRecord>,
    children: HashMap<String, Vec<Block>>,
    known_blocks: HashSet<String>,
    next_id: u64,
}

/// In-memory document store, one instance per test.
#[derive(Default)]
pub struct MemoryClient {
    inner: Mutex<Inner>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh store containing one empty database.
    pub fn with_database(id: impl Into<String>) -> Self {
        let client = Self::new();
        client.add_database(id);
        client
    }

    pub fn add_database(&self, id: impl Into<String>) {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        inner.databases.insert(id.into());
    }

    /// Attach a child subtree under `parent`, marking the parent as
    /// having children wherever it appears.
    pub fn seed_children(&self, parent: &BlockId, blocks: Vec<Block>) {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        for block in &blocks {
            inner.known_blocks.insert(block.id.as_str().to_string());
        }
        for list in inner.children.values_mut() {
            for block in list.iter_mut() {
                if block.id == *parent {
                    block.has_children = true;
                }
            }
        }
        inner.known_blocks.insert(parent.as_str().to_string());
        inner.children.insert(parent.as_str().to_string(), blocks);
    }
}

impl Inner {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn block_known(&self, raw: &str) -> bool {
        self.pages.contains_key(raw)
            || self.known_blocks.contains(raw)
            || self.children.contains_key(raw)
    }

    fn spec_to_block(&mut self, spec: &BlockSpec) -> Block {
        let id = self.fresh_id("block");
        self.known_blocks.insert(id.clone());
        Block {
            id: BlockId::new(id),
            kind: BlockKind::Paragraph,
            rich_text: vec![RichTextRun::new(spec.text.clone())],
            has_children: false,
        }
    }
}

/// Rewrite request-shaped properties into the response shape the service
/// would echo back (type tags, `plain_text` on title runs).
fn normalize_properties(props: &Value) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(map) = props.as_object() {
        for (key, value) in map {
            if let Some(runs) = value.get("title").and_then(Value::as_array) {
                let normalized: Vec<Value> = runs
                    .iter()
                    .map(|run| {
                        let text = run
                            .pointer("/text/content")
                            .or_else(|| run.get("plain_text"))
                            .and_then(Value::as_str)
                            .unwrap_or("");
                        json!({
                            "type": "text",
                            "plain_text": text,
                            "text": { "content": text }
                        })
                    })
                    .collect();
                out.insert(key.clone(), json!({ "type": "title", "title": normalized }));
            } else if let Some(select) = value.get("select") {
                out.insert(key.clone(), json!({ "type": "select", "select": select }));
            } else if let Some(options) = value.get("multi_select") {
                out.insert(
                    key.clone(),
                    json!({ "type": "multi_select", "multi_select": options }),
                );
            } else {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

/// Cursor = index into the full result list, as a decimal string.
fn paginate_slice<T: Clone>(all: &[T], page_size: u32, cursor: Option<String>) -> Page<T> {
    let start = cursor
        .as_deref()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(0);
    let end = (start + page_size as usize).min(all.len());
    let has_more = end < all.len();
    Page {
        results: all[start.min(all.len())..end].to_vec(),
        has_more,
        next_cursor: has_more.then(|| end.to_string()),
    }
}

/// Supported filter shape: `{ "property": _, "title": { "contains": q } }`.
fn title_filter(filter: &Option<Value>) -> Option<String> {
    filter
        .as_ref()?
        .pointer("/title/contains")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl DocumentClient for MemoryClient {
    async fn query_database(
        &self,
        database_id: &DatabaseId,
        filter: Option<Value>,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PageRecord>, NotionError> {
        let inner = self.inner.lock().expect("memory client poisoned");
        if !inner.databases.contains(database_id.as_str()) {
            return Err(NotionError::not_found(format!(
                "database {database_id}"
            )));
        }
        let needle = title_filter(&filter);
        let records: Vec<PageRecord> = inner
            .db_pages
            .get(database_id.as_str())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.pages.get(id.as_str()).cloned())
                    .filter(|page| match &needle {
                        Some(q) => PromptRecord::from_page(page).title.contains(q.as_str()),
                        None => true,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(paginate_slice(&records, page_size, cursor))
    }

    async fn list_children(
        &self,
        block_id: &BlockId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Block>, NotionError> {
        let inner = self.inner.lock().expect("memory client poisoned");
        if !inner.block_known(block_id.as_str()) {
            return Err(NotionError::not_found(format!("block {block_id}")));
        }
        let blocks = inner
            .children
            .get(block_id.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(paginate_slice(&blocks, page_size, cursor))
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageRecord, NotionError> {
        let inner = self.inner.lock().expect("memory client poisoned");
        inner
            .pages
            .get(page_id.as_str())
            .cloned()
            .ok_or_else(|| NotionError::not_found(format!("page {page_id}")))
    }

    async fn create_page(
        &self,
        database_id: &DatabaseId,
        properties: Value,
        children: &[BlockSpec],
    ) -> Result<PageRecord, NotionError> {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        if !inner.databases.contains(database_id.as_str()) {
            return Err(NotionError::not_found(format!(
                "database {database_id}"
            )));
        }
        let raw = inner.fresh_id("page");
        let record = PageRecord {
            id: PageId::new(raw.clone()),
            properties: normalize_properties(&properties),
            url: Some(format!("https://notion.test/{raw}")),
        };
        let blocks: Vec<Block> = children
            .iter()
            .map(|spec| inner.spec_to_block(spec))
            .collect();
        inner.children.insert(raw.clone(), blocks);
        inner.pages.insert(raw.clone(), record.clone());
        inner
            .db_pages
            .entry(database_id.as_str().to_string())
            .or_default()
            .push(record.id.clone());
        Ok(record)
    }

    async fn append_children(
        &self,
        block_id: &BlockId,
        children: &[BlockSpec],
    ) -> Result<(), NotionError> {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        if !inner.block_known(block_id.as_str()) {
            return Err(NotionError::not_found(format!("block {block_id}")));
        }
        let blocks: Vec<Block> = children
            .iter()
            .map(|spec| inner.spec_to_block(spec))
            .collect();
        inner
            .children
            .entry(block_id.as_str().to_string())
            .or_default()
            .extend(blocks);
        Ok(())
    }

    async fn delete_block(&self, block_id: &BlockId) -> Result<(), NotionError> {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        let raw = block_id.as_str().to_string();

        if inner.pages.remove(&raw).is_some() {
            inner.children.remove(&raw);
            for ids in inner.db_pages.values_mut() {
                ids.retain(|id| id.as_str() != raw);
            }
            return Ok(());
        }

        let mut found = false;
        for list in inner.children.values_mut() {
            let before = list.len();
            list.retain(|b| b.id.as_str() != raw);
            found |= list.len() != before;
        }
        if found {
            inner.children.remove(&raw);
            inner.known_blocks.remove(&raw);
            return Ok(());
        }
        Err(NotionError::not_found(format!("block {block_id}")))
    }

    async fn update_page_properties(
        &self,
        page_id: &PageId,
        properties: Value,
    ) -> Result<(), NotionError> {
        let mut inner = self.inner.lock().expect("memory client poisoned");
        let page = inner
            .pages
            .get_mut(page_id.as_str())
            .ok_or_else(|| NotionError::not_found(format!("page {page_id}")))?;
        let normalized = normalize_properties(&properties);
        if !page.properties.is_object() {
            page.properties = json!({});
        }
        if let (Some(existing), Some(updates)) =
            (page.properties.as_object_mut(), normalized.as_object())
        {
            for (key, value) in updates {
                existing.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }
}
