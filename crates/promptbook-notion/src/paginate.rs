//! Cursor-based pagination, flattened behind a single call.

use futures::future::BoxFuture;

use promptbook_types::{Block, BlockId, DatabaseId, NotionError, PageRecord, QUERY_PAGE_SIZE};

use crate::client::{DocumentClient, Page};

/// Drain a paginated source into one ordered `Vec`.
///
/// Calls `fetch_page` with the running cursor until the source reports
/// no more pages. A page that claims `has_more` without supplying a
/// cursor terminates the loop anyway — a malformed response must not
/// spin forever. Errors propagate unchanged and discard everything
/// fetched so far.
pub async fn paginate<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, NotionError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, NotionError>>,
{
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = fetch_page(cursor.take()).await?;
        all.extend(page.results);
        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                tracing::warn!("source reported more results but sent no cursor; stopping");
                break;
            }
        }
    }
    Ok(all)
}

/// All records of a database query, in the remote's order.
pub async fn query_all_pages(
    client: &dyn DocumentClient,
    database_id: &DatabaseId,
    filter: Option<serde_json::Value>,
) -> Result<Vec<PageRecord>, NotionError> {
    paginate(|cursor| client.query_database(database_id, filter.clone(), QUERY_PAGE_SIZE, cursor))
        .await
}

/// All direct children of a block, in order.
pub async fn list_all_children(
    client: &dyn DocumentClient,
    block_id: &BlockId,
) -> Result<Vec<Block>, NotionError> {
    paginate(|cursor| client.list_children(block_id, QUERY_PAGE_SIZE, cursor)).await
}

/// Adapter handing the codec its child-fetch capability, backed by the
/// pagination fetcher.
pub struct ClientChildren<'a>(pub &'a dyn DocumentClient);

impl promptbook_codec::FetchChildren for ClientChildren<'_> {
    fn fetch_children(&self, id: &BlockId) -> BoxFuture<'_, Result<Vec<Block>, NotionError>> {
        let id = id.clone();
        Box::pin(async move { list_all_children(self.0, &id).await })
    }
}
