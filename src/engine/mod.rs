//! Core engine: page loading, extraction, fetching, aggregation and scheduling.

pub mod delay;
pub mod loader;
pub mod extractor;
pub mod fetcher;
pub mod aggregator;
pub mod scheduler;
