//! Conversion pipeline: orchestration, progress events and reporting.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{
    ConversionRequest, ConversionResult, ModelContext, Pipeline, PipelineConfig, PipelineState,
    ProgressEvent,
};
pub use report::{Rating, rate_deviation, render_report};
