//! The collaborator surface the core depends on.

use async_trait::async_trait;
use serde_json::Value;

use promptbook_types::{Block, BlockId, BlockSpec, DatabaseId, NotionError, PageId, PageRecord};

/// One page of a cursor-paginated result.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Remote document service operations.
///
/// Errors are classified at this boundary: a missing or inaccessible
/// target surfaces as [`NotionError::NotFound`], everything else keeps
/// the service's own status/code/message. Implementations do not retry.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Query one page of a database's records. `filter` is passed through
    /// opaquely; only `page_size` and `cursor` are injected.
    async fn query_database(
        &self,
        database_id: &DatabaseId,
        filter: Option<Value>,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PageRecord>, NotionError>;

    /// List one page of a block's direct children, in order.
    async fn list_children(
        &self,
        block_id: &BlockId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Block>, NotionError>;

    /// Fetch a page's metadata and properties.
    async fn get_page(&self, page_id: &PageId) -> Result<PageRecord, NotionError>;

    /// Create a page in a database with properties and initial children.
    async fn create_page(
        &self,
        database_id: &DatabaseId,
        properties: Value,
        children: &[BlockSpec],
    ) -> Result<PageRecord, NotionError>;

    /// Append child blocks to a block (or page), preserving order.
    async fn append_children(
        &self,
        block_id: &BlockId,
        children: &[BlockSpec],
    ) -> Result<(), NotionError>;

    /// Delete (archive) a whole block. Page IDs are valid here too.
    async fn delete_block(&self, block_id: &BlockId) -> Result<(), NotionError>;

    /// Update a page's properties without touching its content blocks.
    async fn update_page_properties(
        &self,
        page_id: &PageId,
        properties: Value,
    ) -> Result<(), NotionError>;
}
