//! Typed identifiers for databases, pages, and blocks.
//!
//! The remote service assigns every object an opaque string identifier
//! (a hyphenated UUID in practice, but nothing here depends on that).
//! Wrapping them in newtypes keeps a page ID from being handed to a
//! children-listing call by accident. All three are serde-transparent so
//! they round-trip through the service's JSON unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a database (a queryable collection of pages).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(String);

/// Identifier of a page (one prompt).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

/// Identifier of a content block within a page.
///
/// Pages double as blocks on the remote side: a page's ID is valid
/// wherever a block ID is expected (children listing, deletion).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

macro_rules! impl_opaque_id {
    ($T:ident) => {
        impl $T {
            /// Wrap a raw identifier string from the remote service.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier as the service knows it.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($T), "({})"), self.0)
            }
        }

        impl From<&str> for $T {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $T {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

impl_opaque_id!(DatabaseId);
impl_opaque_id!(PageId);
impl_opaque_id!(BlockId);

impl PageId {
    /// View this page as a block, for child listing and deletion.
    pub fn as_block(&self) -> BlockId {
        BlockId::new(self.0.clone())
    }
}
