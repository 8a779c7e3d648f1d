//! HTML to plain-text extraction.
//!
//! Produces a line-oriented, markdown-like rendition of an article page:
//! headings become `#`-prefixed lines, blockquotes get `> `, list items get
//! `* `, paragraphs stay plain, and every block is separated by a blank line.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Containers whose text never belongs to article content.
const STRIP_TAGS: [&str; 7] = [
    "script", "style", "meta", "noscript", "header", "footer", "nav",
];

/// Content-root candidates in priority order; first match wins.
static ROOT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["article", "main", "body"]
        .iter()
        .map(|css| Selector::parse(css).expect("static selector"))
        .collect()
});

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, ul, ol, blockquote").expect("static selector")
});

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("static selector"));

/// Extracts readable article text from an HTML document.
///
/// Returns `None` when the page yields no textual content at all, which the
/// caller treats as a non-fatal skip.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let root = content_root(&document)?;

    let mut blocks: Vec<String> = Vec::new();
    for element in root.select(&BLOCK_SELECTOR) {
        if has_stripped_ancestor(element) || has_block_ancestor(element) {
            continue;
        }

        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = element_text(element);
                if !text.is_empty() {
                    let level: usize = name[1..].parse().unwrap_or(1);
                    blocks.push(format!("{} {}", "#".repeat(level), text));
                }
            }
            "blockquote" => {
                let text = element_text(element);
                if !text.is_empty() {
                    blocks.push(format!("> {text}"));
                }
            }
            "ul" | "ol" => {
                let items: Vec<String> = element
                    .select(&LIST_ITEM_SELECTOR)
                    .map(element_text)
                    .filter(|text| !text.is_empty())
                    .map(|text| format!("* {text}"))
                    .collect();
                if !items.is_empty() {
                    blocks.push(items.join("\n"));
                }
            }
            _ => {
                let text = element_text(element);
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
        }
    }

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    ROOT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
}

fn has_stripped_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| STRIP_TAGS.contains(&ancestor.value().name()))
}

/// A block nested inside another emitted block (a `<p>` inside a
/// `<blockquote>`, a list inside a list item) is covered by its ancestor.
fn has_block_ancestor(element: ElementRef<'_>) -> bool {
    const BLOCK_TAGS: [&str; 10] = [
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "blockquote",
    ];
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| BLOCK_TAGS.contains(&ancestor.value().name()))
}

/// Whitespace-normalized text of an element, excluding stripped subtrees.
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !STRIP_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}
