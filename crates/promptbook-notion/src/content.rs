//! Page content operations: read (decode) and destructive replace.

use serde_json::Value;

use promptbook_codec::{encode_text, render_blocks};
use promptbook_types::{DatabaseId, NotionError, PageId, PageRecord};

use crate::client::DocumentClient;
use crate::paginate::{list_all_children, ClientChildren};

/// The service caps children per append/create call.
const APPEND_BATCH: usize = 100;

/// What a replace actually did, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceStats {
    pub deleted: usize,
    pub appended: usize,
}

/// Decode a page's full block tree to text.
pub async fn read_page_text(
    client: &dyn DocumentClient,
    page_id: &PageId,
) -> Result<String, NotionError> {
    let blocks = list_all_children(client, &page_id.as_block()).await?;
    render_blocks(&blocks, &ClientChildren(client)).await
}

/// Replace a page's content with freshly encoded text.
///
/// Destructive and non-atomic: every existing child is deleted with an
/// individual call, then the encoded blocks are appended in order. A
/// failure after the first successful mutation surfaces as
/// [`NotionError::PartialUpdate`] carrying how far the replace got; the
/// page is left in that intermediate state (no rollback).
pub async fn replace_page_text(
    client: &dyn DocumentClient,
    page_id: &PageId,
    text: &str,
) -> Result<ReplaceStats, NotionError> {
    let target = page_id.as_block();
    let existing = list_all_children(client, &target).await?;

    let mut deleted = 0usize;
    for block in &existing {
        client
            .delete_block(&block.id)
            .await
            .map_err(|e| partialize(deleted, 0, e))?;
        deleted += 1;
    }

    let specs = encode_text(text);
    let mut appended = 0usize;
    for batch in specs.chunks(APPEND_BATCH) {
        client
            .append_children(&target, batch)
            .await
            .map_err(|e| partialize(deleted, appended, e))?;
        appended += batch.len();
    }

    tracing::debug!(page = %page_id, deleted, appended, "content replaced");
    Ok(ReplaceStats { deleted, appended })
}

/// Create a prompt page carrying `text` as its content, batching the
/// encoded blocks across the create call and follow-up appends.
pub async fn create_page_with_text(
    client: &dyn DocumentClient,
    database_id: &DatabaseId,
    properties: Value,
    text: &str,
) -> Result<PageRecord, NotionError> {
    let specs = encode_text(text);
    let (first, rest) = specs.split_at(specs.len().min(APPEND_BATCH));
    let page = client.create_page(database_id, properties, first).await?;

    let target = page.id.as_block();
    let mut appended = first.len();
    for batch in rest.chunks(APPEND_BATCH) {
        client
            .append_children(&target, batch)
            .await
            .map_err(|e| partialize(0, appended, e))?;
        appended += batch.len();
    }
    Ok(page)
}

/// Wrap `err` as a partial-update failure once any mutation succeeded.
fn partialize(deleted: usize, appended: usize, err: NotionError) -> NotionError {
    if deleted == 0 && appended == 0 {
        return err;
    }
    NotionError::PartialUpdate {
        deleted,
        appended,
        source: Box::new(err),
    }
}
