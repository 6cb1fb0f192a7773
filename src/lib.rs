//! tickerwatch: periodic cashtag mention counter.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod browser;
pub mod parser;
pub mod engine;
