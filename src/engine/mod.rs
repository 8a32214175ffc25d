//! Orchestration: ties listings, analysis, reporting and commentary
//! together behind one request-level API.

pub mod pipeline;

pub use pipeline::{AnalyzeOptions, ComparableSettings, DealPipeline, MessageOutcome, PipelineReport};
