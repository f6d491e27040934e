//! Remote document client for promptbook.
//!
//! The codec and tool layer only ever talk to the seven-operation
//! [`DocumentClient`] trait. Two implementations live here:
//!
//! - [`NotionHttpClient`]: the real thing, over the Notion REST API
//! - [`MemoryClient`]: in-memory store for tests and offline use
//!
//! Alongside the client sit the cursor-pagination helpers
//! ([`paginate`], [`query_all_pages`], [`list_all_children`]) and the
//! page-content operations ([`read_page_text`], [`replace_page_text`])
//! that glue the fetcher and codec together.

mod client;
mod content;
mod http;
mod memory;
mod paginate;
mod parse;
mod props;

pub use client::{DocumentClient, Page};
pub use content::{create_page_with_text, read_page_text, replace_page_text, ReplaceStats};
pub use http::NotionHttpClient;
pub use memory::MemoryClient;
pub use paginate::{list_all_children, paginate, query_all_pages, ClientChildren};
pub use props::{prompt_properties, title_contains_filter, title_property};
