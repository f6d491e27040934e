//! MCP request types.
//!
//! These define the tool API of the promptbook server. Every prompt
//! operation accepts an optional `book` to target a configured book
//! other than the active one.

use rmcp::schemars;
use serde::Deserialize;

/// Register a prompt book.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookAddRequest {
    /// Name to register the book under
    #[schemars(description = "Name to register the book under")]
    pub name: String,
    /// Integration token with access to the database
    #[schemars(description = "Integration token with access to the database")]
    pub token: String,
    /// ID of the database holding the prompts
    #[schemars(description = "ID of the database holding the prompts")]
    pub database_id: String,
}

/// Select the active book.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookUseRequest {
    /// Name of the configured book to activate
    #[schemars(description = "Name of the configured book to activate")]
    pub name: String,
}

/// Remove a book from the registry.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookRemoveRequest {
    /// Name of the configured book to remove
    #[schemars(description = "Name of the configured book to remove")]
    pub name: String,
}

/// List prompts in a book.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct PromptListRequest {
    /// Book to list (defaults to the active book)
    #[schemars(description = "Book to list (defaults to the active book)")]
    pub book: Option<String>,
}

/// Search prompts by title.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptSearchRequest {
    /// Substring to match against prompt titles
    #[schemars(description = "Substring to match against prompt titles")]
    pub query: String,
    /// Book to search (defaults to the active book)
    #[schemars(description = "Book to search (defaults to the active book)")]
    pub book: Option<String>,
}

/// Read a prompt's full content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptReadRequest {
    /// Page ID of the prompt to read
    #[schemars(description = "Page ID of the prompt to read")]
    pub id: String,
    /// Book the prompt lives in (defaults to the active book)
    #[schemars(description = "Book the prompt lives in (defaults to the active book)")]
    pub book: Option<String>,
}

/// Create a prompt.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptAddRequest {
    /// Prompt title
    #[schemars(description = "Prompt title")]
    pub title: String,
    /// Prompt content text
    #[schemars(description = "Prompt content text")]
    pub content: String,
    /// Optional prompt type (select property)
    #[schemars(description = "Optional prompt type, e.g. 'system' or 'user'")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Optional tags
    #[schemars(description = "Optional tags")]
    #[serde(default)]
    pub tags: Vec<String>,
    /// Book to add to (defaults to the active book)
    #[schemars(description = "Book to add to (defaults to the active book)")]
    pub book: Option<String>,
}

/// Replace a prompt's content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptUpdateRequest {
    /// Page ID of the prompt to update
    #[schemars(description = "Page ID of the prompt to update")]
    pub id: String,
    /// New content text (replaces the existing content entirely)
    #[schemars(description = "New content text (replaces the existing content entirely)")]
    pub content: String,
    /// Book the prompt lives in (defaults to the active book)
    #[schemars(description = "Book the prompt lives in (defaults to the active book)")]
    pub book: Option<String>,
}

/// Rename a prompt.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptRenameRequest {
    /// Page ID of the prompt to rename
    #[schemars(description = "Page ID of the prompt to rename")]
    pub id: String,
    /// New title
    #[schemars(description = "New title")]
    pub title: String,
    /// Book the prompt lives in (defaults to the active book)
    #[schemars(description = "Book the prompt lives in (defaults to the active book)")]
    pub book: Option<String>,
}

/// Delete a prompt.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PromptDeleteRequest {
    /// Page ID of the prompt to delete
    #[schemars(description = "Page ID of the prompt to delete")]
    pub id: String,
    /// Book the prompt lives in (defaults to the active book)
    #[schemars(description = "Book the prompt lives in (defaults to the active book)")]
    pub book: Option<String>,
}
