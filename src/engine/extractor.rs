//! Cashtag extraction and counting.
//!
//! A cashtag is `$` followed by three or four ASCII word characters
//! (`[A-Za-z0-9_]`). Matching is case-sensitive and greedy, so `$ABCDE`
//! yields `$ABCD` and `$aapl` is a different symbol from `$AAPL`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{TextBlock, TickerCount};

static TICKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(?-u:\w){3,4}").expect("static ticker regex is valid"));

/// Every cashtag in `text`, left to right, non-overlapping.
pub fn extract_symbols(text: &str) -> impl Iterator<Item = &str> {
    TICKER_RE.find_iter(text).map(|m| m.as_str())
}

/// Count every cashtag occurrence across `blocks`.
pub fn extract_counts(blocks: &[TextBlock]) -> TickerCount {
    let mut counts = TickerCount::new();
    for block in blocks {
        for symbol in extract_symbols(block.as_str()) {
            counts.increment(symbol);
        }
    }
    counts
}
