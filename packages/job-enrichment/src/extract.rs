//! Readable-text extraction from detail pages.

use scraper::{ElementRef, Html, Node, Selector};

/// Main-content landmarks, most specific first.
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#main-content",
    "#content",
    ".job-description",
    ".field--name-body",
    ".content",
    ".main",
];

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the main readable text of an HTML page.
///
/// The first main-content selector whose region holds visible text wins;
/// otherwise the whole page's visible text is used. Whitespace is collapsed
/// to single spaces. The HTML5 parser is lenient, so malformed markup never
/// fails here.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in MAIN_CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(region) = document.select(&selector).next() {
            let text = visible_text(region);
            if !text.is_empty() {
                return text;
            }
        }
    }

    visible_text(document.root_element())
}

/// Collect the visible text under `element`, whitespace-normalized.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    normalize_whitespace(&parts.join(" "))
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
