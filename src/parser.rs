//! HTML → post text.
//!
//! Selects post elements from a page snapshot and flattens each one to its
//! text content, in document order.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::warn;

use crate::types::TextBlock;

/// Selector used when the configured one does not parse.
pub const DEFAULT_POST_SELECTOR: &str = "article";

static DEFAULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(DEFAULT_POST_SELECTOR).expect("static selector is valid"));

/// Compile `selector`, falling back to [`DEFAULT_POST_SELECTOR`].
pub fn post_selector(selector: &str) -> Selector {
    match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => {
            warn!(selector, error = %e, "Invalid post selector, using default");
            DEFAULT_SELECTOR.clone()
        }
    }
}

/// Text of every element matching `selector`. Malformed or empty HTML
/// yields no blocks rather than an error.
pub fn parse_posts(html: &str, selector: &Selector) -> Vec<TextBlock> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|el| TextBlock(el.text().collect::<String>()))
        .collect()
}
