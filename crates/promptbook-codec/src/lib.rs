//! Bidirectional conversion between the remote service's nested block
//! trees and flat prompt text.
//!
//! - **Decode** ([`render_blocks`]): an ordered block tree becomes one
//!   Markdown-like string. Child blocks are pulled through an injected
//!   [`FetchChildren`] capability, so the codec itself has no network
//!   dependency.
//! - **Encode** ([`encode_text`], [`chunk_text`]): arbitrary-length text
//!   becomes an ordered sequence of paragraph block specs, each within
//!   the service's per-block size limit.

mod chunk;
mod render;

pub use chunk::{chunk_text, encode_text};
pub use render::{render_blocks, FetchChildren, ListContext};
