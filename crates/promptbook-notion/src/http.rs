//! HTTP implementation of [`DocumentClient`] against the Notion REST API.
//!
//! Error classification lives here and nowhere else: HTTP 404 or the
//! service error code `object_not_found` become the typed
//! [`NotionError::NotFound`], so no caller ever inspects message text.
//! No retries — transient failures surface to the tool invocation.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use promptbook_types::{
    Block, BlockId, BlockSpec, DatabaseId, NotionError, PageId, PageRecord,
};

use crate::client::{DocumentClient, Page};
use crate::parse::{parse_block, parse_list, parse_page};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionHttpClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotionHttpClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Point the client somewhere else (proxy, test server).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, NotionError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %path, "document service request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotionError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NotionError::Http(e.to_string()))?;
        let value: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if (200..300).contains(&status) {
            if value.is_null() {
                return Err(NotionError::Malformed(format!(
                    "non-JSON response from {path}"
                )));
            }
            return Ok(value);
        }
        Err(classify_error(status, &value))
    }
}

/// Map a failed response onto the error taxonomy.
fn classify_error(status: u16, body: &Value) -> NotionError {
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    if status == 404 || code == "object_not_found" {
        let target = if message.is_empty() {
            format!("status {status}")
        } else {
            message
        };
        return NotionError::NotFound { target };
    }

    NotionError::Api {
        status,
        code,
        message,
    }
}

fn children_json(children: &[BlockSpec]) -> Vec<Value> {
    children.iter().map(BlockSpec::to_json).collect()
}

#[async_trait]
impl DocumentClient for NotionHttpClient {
    async fn query_database(
        &self,
        database_id: &DatabaseId,
        filter: Option<Value>,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PageRecord>, NotionError> {
        let mut body = json!({ "page_size": page_size });
        if let Some(filter) = filter {
            body["filter"] = filter;
        }
        if let Some(cursor) = cursor {
            body["start_cursor"] = Value::String(cursor);
        }
        let value = self
            .send(
                Method::POST,
                &format!("/databases/{database_id}/query"),
                Some(&body),
            )
            .await?;
        parse_list(&value, parse_page)
    }

    async fn list_children(
        &self,
        block_id: &BlockId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Block>, NotionError> {
        let mut path = format!("/blocks/{block_id}/children?page_size={page_size}");
        if let Some(cursor) = cursor {
            path.push_str(&format!("&start_cursor={cursor}"));
        }
        let value = self.send(Method::GET, &path, None).await?;
        parse_list(&value, parse_block)
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageRecord, NotionError> {
        let value = self
            .send(Method::GET, &format!("/pages/{page_id}"), None)
            .await?;
        parse_page(&value)
    }

    async fn create_page(
        &self,
        database_id: &DatabaseId,
        properties: Value,
        children: &[BlockSpec],
    ) -> Result<PageRecord, NotionError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
            "children": children_json(children),
        });
        let value = self.send(Method::POST, "/pages", Some(&body)).await?;
        parse_page(&value)
    }

    async fn append_children(
        &self,
        block_id: &BlockId,
        children: &[BlockSpec],
    ) -> Result<(), NotionError> {
        let body = json!({ "children": children_json(children) });
        self.send(
            Method::PATCH,
            &format!("/blocks/{block_id}/children"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_block(&self, block_id: &BlockId) -> Result<(), NotionError> {
        self.send(Method::DELETE, &format!("/blocks/{block_id}"), None)
            .await?;
        Ok(())
    }

    async fn update_page_properties(
        &self,
        page_id: &PageId,
        properties: Value,
    ) -> Result<(), NotionError> {
        let body = json!({ "properties": properties });
        self.send(Method::PATCH, &format!("/pages/{page_id}"), Some(&body))
            .await?;
        Ok(())
    }
}
