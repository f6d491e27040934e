//! Decode: render an ordered block tree into a single text document.
//!
//! Recursive and depth-first; depth is the indentation level (two spaces
//! per level). Output order is strictly input order, and child subtrees
//! are fetched one at a time, so the result is deterministic for a fixed
//! tree regardless of remote latency.

use std::collections::HashMap;

use futures::future::BoxFuture;

use promptbook_types::{Block, BlockId, BlockKind, NotionError};

/// Capability for pulling a block's ordered children.
///
/// Implementations must return the complete child sequence (pagination
/// already flattened). The returned future may not borrow `id`; clone it
/// before building the future.
pub trait FetchChildren: Send + Sync {
    fn fetch_children(&self, id: &BlockId) -> BoxFuture<'_, Result<Vec<Block>, NotionError>>;
}

/// Which list family a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ListKind {
    Bulleted,
    Numbered,
}

/// Numbering state for one decode pass.
///
/// Counters are keyed by `(depth, list kind)`. A run at a given depth is
/// interrupted only by a non-list block *at that depth* — a nested child
/// list does not disturb its parent's numbering. Allocated fresh per
/// top-level [`render_blocks`] call, never shared across calls.
#[derive(Debug, Default)]
pub struct ListContext {
    counters: HashMap<(usize, ListKind), u32>,
    active: HashMap<usize, ListKind>,
}

impl ListContext {
    /// Ordinal for the next numbered item at `depth`, restarting at 1
    /// when the run was interrupted.
    fn next_numbered(&mut self, depth: usize) -> u32 {
        let continuing = self.active.get(&depth) == Some(&ListKind::Numbered);
        let counter = self.counters.entry((depth, ListKind::Numbered)).or_insert(1);
        if !continuing {
            *counter = 1;
        }
        let n = *counter;
        *counter += 1;
        self.active.insert(depth, ListKind::Numbered);
        n
    }

    fn enter_bulleted(&mut self, depth: usize) {
        self.active.insert(depth, ListKind::Bulleted);
    }

    fn interrupt(&mut self, depth: usize) {
        self.active.remove(&depth);
    }
}

/// Render an ordered block tree to text.
///
/// Pure given a fixed tree: repeated calls yield byte-identical output.
/// The only effects are the child fetches issued through `fetcher`.
pub async fn render_blocks(
    blocks: &[Block],
    fetcher: &dyn FetchChildren,
) -> Result<String, NotionError> {
    let mut ctx = ListContext::default();
    render_level(blocks, 0, &mut ctx, fetcher).await
}

fn render_level<'a>(
    blocks: &'a [Block],
    depth: usize,
    ctx: &'a mut ListContext,
    fetcher: &'a dyn FetchChildren,
) -> BoxFuture<'a, Result<String, NotionError>> {
    Box::pin(async move {
        let mut out = String::new();
        let indent = "  ".repeat(depth);

        for block in blocks {
            if !block.kind.is_list_item() {
                ctx.interrupt(depth);
            }

            match &block.kind {
                BlockKind::Paragraph => {
                    out.push_str(&format!("{indent}{}\n\n", block.text()));
                }
                BlockKind::Heading1 => {
                    out.push_str(&format!("{indent}# {}\n\n", block.text()));
                }
                BlockKind::Heading2 => {
                    out.push_str(&format!("{indent}## {}\n\n", block.text()));
                }
                BlockKind::Heading3 => {
                    out.push_str(&format!("{indent}### {}\n\n", block.text()));
                }
                BlockKind::NumberedListItem => {
                    let n = ctx.next_numbered(depth);
                    out.push_str(&format!("{indent}{n}. {}\n", block.text()));
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered =
                            render_level(&children, depth + 1, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
                BlockKind::BulletedListItem => {
                    ctx.enter_bulleted(depth);
                    out.push_str(&format!("{indent}• {}\n", block.text()));
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered =
                            render_level(&children, depth + 1, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
                BlockKind::Code { language } => {
                    // Bracket markers instead of backtick fences: code
                    // containing ``` must not break out of the block.
                    let open = if language.is_empty() {
                        format!("{indent}[code]")
                    } else {
                        format!("{indent}[code lang=\"{language}\"]")
                    };
                    out.push_str(&format!("{open}\n{}\n{indent}[/code]\n\n", block.text()));
                }
                BlockKind::Quote => {
                    out.push_str(&format!("{indent}> {}\n\n", block.text()));
                }
                BlockKind::Divider => {
                    out.push_str(&format!("{indent}---\n\n"));
                }
                BlockKind::Toggle => {
                    out.push_str(&format!("{indent}**{}**\n", block.text()));
                    // Toggles hide their body behind the disclosure
                    // triangle; fetch unconditionally so collapsed
                    // content is never lost.
                    let children = fetcher.fetch_children(&block.id).await?;
                    if !children.is_empty() {
                        let rendered =
                            render_level(&children, depth + 1, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
                BlockKind::ToDo { checked } => {
                    let mark = if *checked { "x" } else { " " };
                    out.push_str(&format!("{indent}- [{mark}] {}\n", block.text()));
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered =
                            render_level(&children, depth + 1, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
                BlockKind::Callout { icon } => {
                    match icon {
                        Some(glyph) => {
                            out.push_str(&format!("{indent}> {glyph} {}\n", block.text()))
                        }
                        None => out.push_str(&format!("{indent}> {}\n", block.text())),
                    }
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered =
                            render_level(&children, depth + 1, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                    out.push('\n');
                }
                BlockKind::Table => {
                    let rows = fetcher.fetch_children(&block.id).await?;
                    out.push_str(&render_table(&rows, &indent));
                }
                BlockKind::TableRow { .. } => {
                    // Rows only make sense under a Table parent; a stray
                    // row renders nothing.
                }
                BlockKind::Image { url, caption } => {
                    let label = if caption.is_empty() { "image" } else { caption };
                    let url = url.as_deref().unwrap_or("");
                    out.push_str(&format!("{indent}![{label}]({url})\n\n"));
                }
                BlockKind::Bookmark { url, caption } => {
                    let url = url.as_deref().unwrap_or("");
                    let label = if !caption.is_empty() {
                        caption.as_str()
                    } else if !url.is_empty() {
                        url
                    } else {
                        "bookmark"
                    };
                    out.push_str(&format!("{indent}[{label}]({url})\n\n"));
                }
                BlockKind::Media { media, url, caption } => {
                    let label = if caption.is_empty() { media.label() } else { caption };
                    let url = url.as_deref().unwrap_or("");
                    out.push_str(&format!("{indent}[{label}]({url})\n\n"));
                }
                BlockKind::Equation { expression } => {
                    out.push_str(&format!("{indent}$$\n{expression}\n{indent}$$\n\n"));
                }
                BlockKind::SyncedBlock | BlockKind::ColumnList | BlockKind::Column => {
                    // Structural wrappers: inline children at the same
                    // depth, no visual marker.
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered = render_level(&children, depth, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
                BlockKind::LinkToPage { target } => {
                    let target = target.as_deref().unwrap_or("");
                    out.push_str(&format!("{indent}[Linked page](notion://page/{target})\n\n"));
                }
                BlockKind::Template => {
                    out.push_str(&format!("{indent}*Template: {}*\n\n", block.text()));
                }
                BlockKind::Unknown { kind } => {
                    // No direct text, but nested content must not be
                    // dropped: inline children at the same depth.
                    tracing::debug!(kind = %kind, block = %block.id, "skipping unknown block kind");
                    if block.has_children {
                        let children = fetcher.fetch_children(&block.id).await?;
                        let rendered = render_level(&children, depth, &mut *ctx, fetcher).await?;
                        out.push_str(&rendered);
                    }
                }
            }
        }

        Ok(out)
    })
}

/// First row is the header, the rest are data rows.
fn render_table(rows: &[Block], indent: &str) -> String {
    let mut cells_per_row: Vec<&[String]> = Vec::new();
    for row in rows {
        if let BlockKind::TableRow { cells } = &row.kind {
            cells_per_row.push(cells);
        }
    }

    let Some((header, data)) = cells_per_row.split_first() else {
        return String::new();
    };

    let mut out = String::new();
    out.push_str(&format!("{indent}| {} |\n", header.join(" | ")));
    out.push_str(&format!(
        "{indent}|{}\n",
        " --- |".repeat(header.len().max(1))
    ));
    for row in data {
        out.push_str(&format!("{indent}| {} |\n", row.join(" | ")));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_types::RichTextRun;
    use std::collections::HashMap;

    /// Map-backed child source for tests.
    struct StaticChildren {
        children: HashMap<BlockId, Vec<Block>>,
    }

    impl StaticChildren {
        fn empty() -> Self {
            Self {
                children: HashMap::new(),
            }
        }

        fn with(children: Vec<(BlockId, Vec<Block>)>) -> Self {
            Self {
                children: children.into_iter().collect(),
            }
        }
    }

    impl FetchChildren for StaticChildren {
        fn fetch_children(
            &self,
            id: &BlockId,
        ) -> BoxFuture<'_, Result<Vec<Block>, NotionError>> {
            let found = self.children.get(id).cloned().unwrap_or_default();
            Box::pin(async move { Ok(found) })
        }
    }

    fn block(id: &str, kind: BlockKind, text: &str) -> Block {
        Block {
            id: BlockId::new(id),
            kind,
            rich_text: if text.is_empty() {
                vec![]
            } else {
                vec![RichTextRun::new(text)]
            },
            has_children: false,
        }
    }

    fn parent(id: &str, kind: BlockKind, text: &str) -> Block {
        Block {
            has_children: true,
            ..block(id, kind, text)
        }
    }

    async fn render(blocks: &[Block], fetcher: &dyn FetchChildren) -> String {
        render_blocks(blocks, fetcher).await.unwrap()
    }

    #[tokio::test]
    async fn heading_paragraph_and_numbered_list() {
        let blocks = vec![
            block("b1", BlockKind::Heading1, "Title"),
            block("b2", BlockKind::Paragraph, "Body text."),
            block("b3", BlockKind::NumberedListItem, "First"),
            block("b4", BlockKind::NumberedListItem, "Second"),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert_eq!(
            text.trim_end(),
            "# Title\n\nBody text.\n\n1. First\n2. Second"
        );
    }

    #[tokio::test]
    async fn numbered_run_restarts_after_interruption() {
        let blocks = vec![
            block("b1", BlockKind::NumberedListItem, "one"),
            block("b2", BlockKind::NumberedListItem, "two"),
            block("b3", BlockKind::Paragraph, "break"),
            block("b4", BlockKind::NumberedListItem, "again"),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.contains("1. one\n2. two\n"));
        assert!(text.contains("1. again"));
        assert!(!text.contains("3. again"));
    }

    #[tokio::test]
    async fn bulleted_item_interrupts_numbered_run() {
        let blocks = vec![
            block("b1", BlockKind::NumberedListItem, "one"),
            block("b2", BlockKind::BulletedListItem, "dash"),
            block("b3", BlockKind::NumberedListItem, "restart"),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.contains("1. restart"));
    }

    #[tokio::test]
    async fn nested_bullets_indent_without_breaking_numbering() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("b2"),
            vec![block("c1", BlockKind::BulletedListItem, "child")],
        )]);
        let blocks = vec![
            block("b1", BlockKind::NumberedListItem, "first"),
            parent("b2", BlockKind::BulletedListItem, "bullet"),
            block("b3", BlockKind::BulletedListItem, "sibling"),
        ];
        let text = render(&blocks, &fetcher).await;
        assert!(text.contains("• bullet\n  • child\n• sibling"));
    }

    #[tokio::test]
    async fn numbered_children_do_not_disturb_parent_run() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("b1"),
            vec![
                block("c1", BlockKind::NumberedListItem, "inner one"),
                block("c2", BlockKind::NumberedListItem, "inner two"),
            ],
        )]);
        let blocks = vec![
            parent("b1", BlockKind::NumberedListItem, "outer one"),
            block("b2", BlockKind::NumberedListItem, "outer two"),
        ];
        let text = render(&blocks, &fetcher).await;
        assert!(text.contains("1. outer one\n  1. inner one\n  2. inner two\n2. outer two"));
    }

    #[tokio::test]
    async fn unknown_kind_inlines_children() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("b1"),
            vec![block("c1", BlockKind::Paragraph, "hidden content")],
        )]);
        let blocks = vec![parent(
            "b1",
            BlockKind::Unknown {
                kind: "ai_block".into(),
            },
            "",
        )];
        let text = render(&blocks, &fetcher).await;
        assert!(text.contains("hidden content"));
    }

    #[tokio::test]
    async fn decode_is_deterministic() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("b2"),
            vec![block("c1", BlockKind::ToDo { checked: true }, "done item")],
        )]);
        let blocks = vec![
            block("b1", BlockKind::Heading2, "Section"),
            parent("b2", BlockKind::Toggle, "Details"),
            block("b3", BlockKind::Divider, ""),
        ];
        let first = render(&blocks, &fetcher).await;
        let second = render(&blocks, &fetcher).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn code_block_uses_bracket_markers() {
        let blocks = vec![block(
            "b1",
            BlockKind::Code {
                language: "rust".into(),
            },
            "let fence = \"```\";",
        )];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.starts_with("[code lang=\"rust\"]\n"));
        assert!(text.contains("let fence = \"```\";"));
        assert!(text.contains("\n[/code]\n"));
        // The embedded fence must stay inside the markers.
        assert!(!text.starts_with("```"));
    }

    #[tokio::test]
    async fn todo_renders_checkbox_state() {
        let blocks = vec![
            block("b1", BlockKind::ToDo { checked: true }, "shipped"),
            block("b2", BlockKind::ToDo { checked: false }, "pending"),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.contains("- [x] shipped"));
        assert!(text.contains("- [ ] pending"));
    }

    #[tokio::test]
    async fn toggle_fetches_children_even_without_flag() {
        // has_children false, but the fetcher knows better.
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("b1"),
            vec![block("c1", BlockKind::Paragraph, "collapsed body")],
        )]);
        let blocks = vec![block("b1", BlockKind::Toggle, "More")];
        let text = render(&blocks, &fetcher).await;
        assert!(text.contains("**More**"));
        assert!(text.contains("collapsed body"));
    }

    #[tokio::test]
    async fn table_renders_header_separator_and_rows() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("t1"),
            vec![
                block(
                    "r1",
                    BlockKind::TableRow {
                        cells: vec!["Name".into(), "Role".into()],
                    },
                    "",
                ),
                block(
                    "r2",
                    BlockKind::TableRow {
                        cells: vec!["Ada".into(), "Engineer".into()],
                    },
                    "",
                ),
            ],
        )]);
        let blocks = vec![parent("t1", BlockKind::Table, "")];
        let text = render(&blocks, &fetcher).await;
        assert!(text.contains("| Name | Role |\n| --- | --- |\n| Ada | Engineer |"));
    }

    #[tokio::test]
    async fn synced_block_inlines_children_at_same_depth() {
        let fetcher = StaticChildren::with(vec![(
            BlockId::new("s1"),
            vec![block("c1", BlockKind::Paragraph, "shared text")],
        )]);
        let blocks = vec![parent("s1", BlockKind::SyncedBlock, "")];
        let text = render(&blocks, &fetcher).await;
        // Same depth: no indentation added.
        assert!(text.starts_with("shared text"));
    }

    #[tokio::test]
    async fn media_and_links_render_single_lines() {
        let blocks = vec![
            block(
                "b1",
                BlockKind::Image {
                    url: Some("https://x/img.png".into()),
                    caption: "diagram".into(),
                },
                "",
            ),
            block(
                "b2",
                BlockKind::Bookmark {
                    url: Some("https://example.com".into()),
                    caption: String::new(),
                },
                "",
            ),
            block(
                "b3",
                BlockKind::Media {
                    media: promptbook_types::MediaKind::Pdf,
                    url: Some("https://x/doc.pdf".into()),
                    caption: String::new(),
                },
                "",
            ),
            block(
                "b4",
                BlockKind::LinkToPage {
                    target: Some("page-9".into()),
                },
                "",
            ),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.contains("![diagram](https://x/img.png)"));
        assert!(text.contains("[https://example.com](https://example.com)"));
        assert!(text.contains("[pdf](https://x/doc.pdf)"));
        assert!(text.contains("[Linked page](notion://page/page-9)"));
    }

    #[tokio::test]
    async fn equation_and_template_and_callout() {
        let blocks = vec![
            block(
                "b1",
                BlockKind::Equation {
                    expression: "e = mc^2".into(),
                },
                "",
            ),
            block("b2", BlockKind::Template, "New entry"),
            block(
                "b3",
                BlockKind::Callout {
                    icon: Some("💡".into()),
                },
                "remember this",
            ),
        ];
        let text = render(&blocks, &StaticChildren::empty()).await;
        assert!(text.contains("$$\ne = mc^2\n$$"));
        assert!(text.contains("*Template: New entry*"));
        assert!(text.contains("> 💡 remember this"));
    }
}
