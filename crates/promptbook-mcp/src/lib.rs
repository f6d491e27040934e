//! MCP server exposing Notion-backed prompt books.
//!
//! Tools let an agent register books (remote prompt databases), switch
//! between them, and list/read/add/update/delete the prompts inside.
//! Remote access goes through the `DocumentClient` trait, so tests run
//! against the in-memory client.
//!
//! ## Module Structure
//!
//! - `models`: request types for MCP tools
//! - `config`: the book registry (load/save snapshots)

pub mod config;
mod models;

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde_json::json;

use promptbook_notion::{
    create_page_with_text, prompt_properties, query_all_pages, read_page_text, replace_page_text,
    title_contains_filter, title_property, DocumentClient, NotionHttpClient,
};
use promptbook_types::{DatabaseId, NotionError, PageId, PromptRecord};

use config::{Book, BookRegistry};
pub use models::*;

/// Produces a document client for a book's credentials.
///
/// One factory serves every book; tests swap in a factory returning the
/// in-memory client.
pub trait ClientFactory: Send + Sync {
    fn client(&self, token: &str) -> Arc<dyn DocumentClient>;
}

/// Default factory: real HTTP clients against the remote service.
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn client(&self, token: &str) -> Arc<dyn DocumentClient> {
        Arc::new(NotionHttpClient::new(token))
    }
}

/// A resolved book, ready for remote calls.
struct BookHandle {
    name: String,
    database_id: DatabaseId,
    client: Arc<dyn DocumentClient>,
}

/// MCP server for prompt books.
#[derive(Clone)]
pub struct PromptBookMcp {
    config_path: PathBuf,
    clients: Arc<dyn ClientFactory>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for PromptBookMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBookMcp")
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Render a remote failure as a tool reply, with a hint for the cases a
/// user can actually act on.
fn fail(err: &NotionError) -> String {
    match err {
        NotionError::NotFound { .. } => format!(
            "Error: {err}. Check the ID and that the integration has access to it."
        ),
        NotionError::PartialUpdate { .. } => format!(
            "Error: {err}. The page content may be incomplete; re-run the update to restore it."
        ),
        _ => format!("Error: {err}"),
    }
}

impl PromptBookMcp {
    /// Server backed by real HTTP clients.
    pub fn new(config_path: PathBuf) -> Self {
        Self::with_factory(config_path, Arc::new(HttpClientFactory))
    }

    pub fn with_factory(config_path: PathBuf, clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            config_path,
            clients,
            tool_router: Self::tool_router(),
        }
    }

    /// Snapshot the registry for one tool invocation.
    fn load_registry(&self) -> Result<BookRegistry, String> {
        BookRegistry::load(&self.config_path).map_err(|e| format!("Error: {e:#}"))
    }

    fn save_registry(&self, registry: &BookRegistry) -> Result<(), String> {
        registry
            .save(&self.config_path)
            .map_err(|e| format!("Error: {e:#}"))
    }

    /// Resolve a book name (or the active book) to a live handle.
    fn book_handle(
        &self,
        registry: &BookRegistry,
        book: Option<&str>,
    ) -> Result<BookHandle, String> {
        let (name, book) = registry.resolve(book).map_err(|e| format!("Error: {e}"))?;
        Ok(BookHandle {
            name: name.to_string(),
            database_id: DatabaseId::new(book.database_id.clone()),
            client: self.clients.client(&book.token),
        })
    }
}

#[tool_router]
impl PromptBookMcp {
    // ========================================================================
    // Book Tools
    // ========================================================================

    #[tool(description = "Register a prompt book: a remote database of prompts reachable with an integration token. The first book added becomes active.")]
    async fn book_add(&self, Parameters(req): Parameters<BookAddRequest>) -> String {
        let name = req.name.trim();
        if name.is_empty() {
            return "Error: book name must not be empty".to_string();
        }
        if req.token.trim().is_empty() {
            return "Error: token must not be empty".to_string();
        }
        if req.database_id.trim().is_empty() {
            return "Error: database_id must not be empty".to_string();
        }

        // Verify the database is reachable before saving anything.
        let client = self.clients.client(req.token.trim());
        let database_id = DatabaseId::new(req.database_id.trim());
        if let Err(e) = client.query_database(&database_id, None, 1, None).await {
            return fail(&e);
        }

        let mut registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        registry.books.insert(
            name.to_string(),
            Book {
                token: req.token.trim().to_string(),
                database_id: req.database_id.trim().to_string(),
            },
        );
        if registry.active.is_none() {
            registry.active = Some(name.to_string());
        }
        if let Err(e) = self.save_registry(&registry) {
            return e;
        }

        tracing::info!(book = %name, "book registered");
        json!({
            "success": true,
            "book": name,
            "active": registry.active,
        })
        .to_string()
    }

    #[tool(description = "List configured prompt books and which one is active.")]
    fn book_list(&self) -> String {
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let books: Vec<_> = registry
            .books
            .iter()
            .map(|(name, book)| {
                json!({
                    "name": name,
                    "database_id": book.database_id,
                    "active": registry.active.as_deref() == Some(name.as_str()),
                })
            })
            .collect();
        json!({ "books": books, "count": books.len() }).to_string()
    }

    #[tool(description = "Select the active prompt book.")]
    fn book_use(&self, Parameters(req): Parameters<BookUseRequest>) -> String {
        let mut registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        if !registry.books.contains_key(&req.name) {
            return format!("Error: book '{}' is not configured", req.name);
        }
        registry.active = Some(req.name.clone());
        if let Err(e) = self.save_registry(&registry) {
            return e;
        }
        json!({ "success": true, "active": req.name }).to_string()
    }

    #[tool(description = "Remove a prompt book from the registry. Does not touch the remote database.")]
    fn book_remove(&self, Parameters(req): Parameters<BookRemoveRequest>) -> String {
        let mut registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        if registry.books.remove(&req.name).is_none() {
            return format!("Error: book '{}' is not configured", req.name);
        }
        if registry.active.as_deref() == Some(req.name.as_str()) {
            registry.active = None;
        }
        if let Err(e) = self.save_registry(&registry) {
            return e;
        }
        json!({ "success": true, "removed": req.name, "active": registry.active }).to_string()
    }

    // ========================================================================
    // Prompt Tools
    // ========================================================================

    #[tool(description = "List all prompts in a book with their titles, types, and tags.")]
    async fn prompt_list(&self, Parameters(req): Parameters<PromptListRequest>) -> String {
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        match query_all_pages(handle.client.as_ref(), &handle.database_id, None).await {
            Ok(pages) => {
                let prompts: Vec<PromptRecord> =
                    pages.iter().map(PromptRecord::from_page).collect();
                json!({
                    "book": handle.name,
                    "prompts": prompts,
                    "count": prompts.len(),
                })
                .to_string()
            }
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Search prompts in a book by title substring.")]
    async fn prompt_search(&self, Parameters(req): Parameters<PromptSearchRequest>) -> String {
        if req.query.trim().is_empty() {
            return "Error: query must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let filter = title_contains_filter(req.query.trim());
        match query_all_pages(handle.client.as_ref(), &handle.database_id, Some(filter)).await {
            Ok(pages) => {
                let prompts: Vec<PromptRecord> =
                    pages.iter().map(PromptRecord::from_page).collect();
                json!({
                    "book": handle.name,
                    "query": req.query.trim(),
                    "prompts": prompts,
                    "count": prompts.len(),
                })
                .to_string()
            }
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Read a prompt's full content as text.")]
    async fn prompt_read(&self, Parameters(req): Parameters<PromptReadRequest>) -> String {
        if req.id.trim().is_empty() {
            return "Error: id must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let page_id = PageId::new(req.id.trim());
        let page = match handle.client.get_page(&page_id).await {
            Ok(p) => p,
            Err(e) => return fail(&e),
        };
        match read_page_text(handle.client.as_ref(), &page_id).await {
            Ok(content) => {
                let record = PromptRecord::from_page(&page);
                json!({
                    "id": page_id,
                    "title": record.title,
                    "type": record.kind,
                    "tags": record.tags,
                    "url": record.url,
                    "content": content.trim_end(),
                })
                .to_string()
            }
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Add a prompt to a book. Long content is split across blocks automatically.")]
    async fn prompt_add(&self, Parameters(req): Parameters<PromptAddRequest>) -> String {
        if req.title.trim().is_empty() {
            return "Error: title must not be empty".to_string();
        }
        if req.content.is_empty() {
            return "Error: content must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let properties =
            prompt_properties(req.title.trim(), req.kind.as_deref(), &req.tags);
        match create_page_with_text(
            handle.client.as_ref(),
            &handle.database_id,
            properties,
            &req.content,
        )
        .await
        {
            Ok(page) => {
                tracing::info!(book = %handle.name, page = %page.id, "prompt added");
                json!({
                    "success": true,
                    "id": page.id,
                    "title": req.title.trim(),
                    "url": page.url,
                })
                .to_string()
            }
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Replace a prompt's content with new text. Destructive: the existing content blocks are deleted and recreated.")]
    async fn prompt_update(&self, Parameters(req): Parameters<PromptUpdateRequest>) -> String {
        if req.id.trim().is_empty() {
            return "Error: id must not be empty".to_string();
        }
        if req.content.is_empty() {
            return "Error: content must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let page_id = PageId::new(req.id.trim());
        match replace_page_text(handle.client.as_ref(), &page_id, &req.content).await {
            Ok(stats) => json!({
                "success": true,
                "id": page_id,
                "deleted_blocks": stats.deleted,
                "appended_blocks": stats.appended,
            })
            .to_string(),
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Rename a prompt without touching its content.")]
    async fn prompt_rename(&self, Parameters(req): Parameters<PromptRenameRequest>) -> String {
        if req.id.trim().is_empty() {
            return "Error: id must not be empty".to_string();
        }
        if req.title.trim().is_empty() {
            return "Error: title must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let page_id = PageId::new(req.id.trim());
        match handle
            .client
            .update_page_properties(&page_id, title_property(req.title.trim()))
            .await
        {
            Ok(()) => json!({
                "success": true,
                "id": page_id,
                "title": req.title.trim(),
            })
            .to_string(),
            Err(e) => fail(&e),
        }
    }

    #[tool(description = "Delete a prompt from a book.")]
    async fn prompt_delete(&self, Parameters(req): Parameters<PromptDeleteRequest>) -> String {
        if req.id.trim().is_empty() {
            return "Error: id must not be empty".to_string();
        }
        let registry = match self.load_registry() {
            Ok(r) => r,
            Err(e) => return e,
        };
        let handle = match self.book_handle(&registry, req.book.as_deref()) {
            Ok(h) => h,
            Err(e) => return e,
        };

        let page_id = PageId::new(req.id.trim());
        match handle.client.delete_block(&page_id.as_block()).await {
            Ok(()) => json!({ "success": true, "deleted": page_id }).to_string(),
            Err(e) => fail(&e),
        }
    }
}

#[tool_handler]
impl ServerHandler for PromptBookMcp {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.instructions = Some(
            "Prompt book MCP server. Manages collections of text prompts stored as pages in remote databases: register books, then list, read, add, update, and delete prompts.".into()
        );
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_notion::MemoryClient;

    struct MemoryFactory {
        client: Arc<MemoryClient>,
    }

    impl ClientFactory for MemoryFactory {
        fn client(&self, _token: &str) -> Arc<dyn DocumentClient> {
            self.client.clone()
        }
    }

    fn server() -> (PromptBookMcp, tempfile::TempDir, Arc<MemoryClient>) {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(MemoryClient::with_database("db-1"));
        let mcp = PromptBookMcp::with_factory(
            dir.path().join("books.json"),
            Arc::new(MemoryFactory {
                client: client.clone(),
            }),
        );
        (mcp, dir, client)
    }

    async fn add_book(mcp: &PromptBookMcp, name: &str, database_id: &str) -> String {
        mcp.book_add(Parameters(BookAddRequest {
            name: name.to_string(),
            token: "test-token".to_string(),
            database_id: database_id.to_string(),
        }))
        .await
    }

    #[tokio::test]
    async fn first_book_added_becomes_active() {
        let (mcp, _dir, _client) = server();

        let result = add_book(&mcp, "main", "db-1").await;
        assert!(result.contains("success"));

        let listing = mcp.book_list();
        let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["books"][0]["name"], "main");
        assert_eq!(parsed["books"][0]["active"], true);
    }

    #[tokio::test]
    async fn unreachable_database_is_rejected_with_a_hint() {
        let (mcp, _dir, _client) = server();

        let result = add_book(&mcp, "ghost", "no-such-db").await;
        assert!(result.starts_with("Error:"));
        assert!(result.contains("access"));

        // Nothing was saved.
        let listing = mcp.book_list();
        let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed["count"], 0);
    }

    #[tokio::test]
    async fn prompt_operations_require_an_active_book() {
        let (mcp, _dir, _client) = server();

        let result = mcp
            .prompt_list(Parameters(PromptListRequest::default()))
            .await;
        assert!(result.contains("no active book"));
    }

    #[tokio::test]
    async fn add_read_update_delete_flow() {
        let (mcp, _dir, _client) = server();
        add_book(&mcp, "main", "db-1").await;

        // Add
        let result = mcp
            .prompt_add(Parameters(PromptAddRequest {
                title: "Code Review".to_string(),
                content: "Review this code carefully.".to_string(),
                kind: Some("system".to_string()),
                tags: vec!["review".to_string()],
                book: None,
            }))
            .await;
        assert!(result.contains("success"));
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        let id = parsed["id"].as_str().unwrap().to_string();

        // Read
        let result = mcp
            .prompt_read(Parameters(PromptReadRequest {
                id: id.clone(),
                book: None,
            }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["title"], "Code Review");
        assert_eq!(parsed["type"], "system");
        assert_eq!(parsed["content"], "Review this code carefully.");

        // Update
        let result = mcp
            .prompt_update(Parameters(PromptUpdateRequest {
                id: id.clone(),
                content: "Review this code very carefully.".to_string(),
                book: None,
            }))
            .await;
        assert!(result.contains("success"));

        let result = mcp
            .prompt_read(Parameters(PromptReadRequest {
                id: id.clone(),
                book: None,
            }))
            .await;
        assert!(result.contains("very carefully"));

        // Delete
        let result = mcp
            .prompt_delete(Parameters(PromptDeleteRequest {
                id: id.clone(),
                book: None,
            }))
            .await;
        assert!(result.contains("success"));

        let result = mcp
            .prompt_list(Parameters(PromptListRequest::default()))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["count"], 0);
    }

    #[tokio::test]
    async fn search_filters_by_title_substring() {
        let (mcp, _dir, _client) = server();
        add_book(&mcp, "main", "db-1").await;

        for title in ["daily review", "standup notes", "code review guide"] {
            mcp.prompt_add(Parameters(PromptAddRequest {
                title: title.to_string(),
                content: "text".to_string(),
                kind: None,
                tags: vec![],
                book: None,
            }))
            .await;
        }

        let result = mcp
            .prompt_search(Parameters(PromptSearchRequest {
                query: "review".to_string(),
                book: None,
            }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["count"], 2);
    }

    #[tokio::test]
    async fn long_content_round_trips_through_chunked_blocks() {
        let (mcp, _dir, client) = server();
        add_book(&mcp, "main", "db-1").await;

        let long = "A long instruction sentence for the model to follow. ".repeat(100);
        let result = mcp
            .prompt_add(Parameters(PromptAddRequest {
                title: "Long".to_string(),
                content: long.clone(),
                kind: None,
                tags: vec![],
                book: None,
            }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        let id = parsed["id"].as_str().unwrap().to_string();

        // More than one block landed remotely.
        let page_id = PageId::new(id.clone());
        let children = client
            .list_children(&page_id.as_block(), 100, None)
            .await
            .unwrap();
        assert!(children.results.len() > 1);

        let result = mcp
            .prompt_read(Parameters(PromptReadRequest { id, book: None }))
            .await;
        assert!(result.contains("instruction sentence"));
    }

    #[tokio::test]
    async fn validation_errors_fire_before_remote_calls() {
        let (mcp, _dir, _client) = server();
        add_book(&mcp, "main", "db-1").await;

        let result = mcp
            .prompt_add(Parameters(PromptAddRequest {
                title: "  ".to_string(),
                content: "x".to_string(),
                kind: None,
                tags: vec![],
                book: None,
            }))
            .await;
        assert_eq!(result, "Error: title must not be empty");

        let result = mcp
            .prompt_read(Parameters(PromptReadRequest {
                id: String::new(),
                book: None,
            }))
            .await;
        assert_eq!(result, "Error: id must not be empty");

        let result = mcp
            .prompt_search(Parameters(PromptSearchRequest {
                query: "".to_string(),
                book: None,
            }))
            .await;
        assert_eq!(result, "Error: query must not be empty");
    }

    #[tokio::test]
    async fn missing_page_surfaces_not_found_hint() {
        let (mcp, _dir, _client) = server();
        add_book(&mcp, "main", "db-1").await;

        let result = mcp
            .prompt_read(Parameters(PromptReadRequest {
                id: "page-404".to_string(),
                book: None,
            }))
            .await;
        assert!(result.starts_with("Error: not found"));
        assert!(result.contains("access"));
    }

    #[tokio::test]
    async fn book_use_and_remove_manage_the_active_selection() {
        let (mcp, _dir, client) = server();
        client.add_database("db-2");
        add_book(&mcp, "first", "db-1").await;
        add_book(&mcp, "second", "db-2").await;

        let result = mcp.book_use(Parameters(BookUseRequest {
            name: "second".to_string(),
        }));
        assert!(result.contains("success"));

        let result = mcp.book_remove(Parameters(BookRemoveRequest {
            name: "second".to_string(),
        }));
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["active"], serde_json::Value::Null);

        let result = mcp.book_use(Parameters(BookUseRequest {
            name: "ghost".to_string(),
        }));
        assert!(result.starts_with("Error:"));
    }

    #[tokio::test]
    async fn explicit_book_argument_overrides_active() {
        let (mcp, _dir, client) = server();
        client.add_database("db-2");
        add_book(&mcp, "first", "db-1").await;
        add_book(&mcp, "second", "db-2").await;
        mcp.book_use(Parameters(BookUseRequest {
            name: "first".to_string(),
        }));

        mcp.prompt_add(Parameters(PromptAddRequest {
            title: "only in second".to_string(),
            content: "x".to_string(),
            kind: None,
            tags: vec![],
            book: Some("second".to_string()),
        }))
        .await;

        let listing = mcp
            .prompt_list(Parameters(PromptListRequest {
                book: Some("second".to_string()),
            }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed["count"], 1);

        let listing = mcp
            .prompt_list(Parameters(PromptListRequest { book: None }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed["count"], 0);
    }

    #[tokio::test]
    async fn nested_remote_content_decodes_on_read() {
        use promptbook_types::{Block, BlockId, BlockKind, RichTextRun};

        let (mcp, _dir, client) = server();
        add_book(&mcp, "main", "db-1").await;

        let result = mcp
            .prompt_add(Parameters(PromptAddRequest {
                title: "Nested".to_string(),
                content: "intro".to_string(),
                kind: None,
                tags: vec![],
                book: None,
            }))
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        let id = parsed["id"].as_str().unwrap().to_string();

        // Simulate remote-side structure: a bulleted item nested under
        // the existing paragraph block.
        let page_id = PageId::new(id.clone());
        let children = client
            .list_children(&page_id.as_block(), 100, None)
            .await
            .unwrap();
        let first = children.results[0].id.clone();
        client.seed_children(
            &first,
            vec![Block {
                id: BlockId::new("nested-1"),
                kind: BlockKind::BulletedListItem,
                rich_text: vec![RichTextRun::new("nested point")],
                has_children: false,
            }],
        );

        let result = mcp
            .prompt_read(Parameters(PromptReadRequest { id, book: None }))
            .await;
        // Paragraphs do not recurse; the nested item stays hidden, but
        // the read still succeeds on the parent content.
        assert!(result.contains("intro"));
    }
}
