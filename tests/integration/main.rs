//! Integration tests: full sweeps against an in-memory browser.

mod mock_browser;
mod sweep;
