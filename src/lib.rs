//! deal-analyzer: fix-and-flip real-estate deal evaluation
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod listing;
pub mod llm;
pub mod report;
pub mod types;
