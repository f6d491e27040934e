//! Error taxonomy for remote document operations.
//!
//! Classification happens at the collaborator boundary: the HTTP client
//! maps status codes and service error codes onto these variants, so the
//! rest of the system never inspects error message text.

use thiserror::Error;

/// Failure of a remote document operation.
#[derive(Debug, Error)]
pub enum NotionError {
    /// The target database, page, or block does not exist, or the token
    /// has no access to it. Distinguished so callers can show a useful
    /// hint instead of a generic failure.
    #[error("not found: {target}")]
    NotFound { target: String },

    /// The service rejected the request (rate limit, malformed payload,
    /// anything with a status and an error code that is not a 404).
    #[error("service error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport-level failure before a response was obtained.
    #[error("http transport: {0}")]
    Http(String),

    /// The service answered with a body this side could not interpret.
    #[error("unexpected response shape: {0}")]
    Malformed(String),

    /// A content replace failed partway: old blocks were deleted (fully
    /// or partially) or some new blocks appended before the failure. No
    /// rollback is attempted; the page is left in the intermediate state.
    #[error(
        "partial content update ({deleted} deleted, {appended} appended before failure): {source}"
    )]
    PartialUpdate {
        deleted: usize,
        appended: usize,
        #[source]
        source: Box<NotionError>,
    },
}

impl NotionError {
    pub fn not_found(target: impl Into<String>) -> Self {
        NotionError::NotFound {
            target: target.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NotionError::NotFound { .. })
    }
}
