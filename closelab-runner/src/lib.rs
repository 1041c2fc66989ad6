//! CloseLab Runner: file-level operations over the core transforms.
//!
//! This crate builds on `closelab-core` to provide:
//! - CSV codec for raw, extended-record and statistics files
//! - The four operations as path-to-path (or path-to-sink) functions
//! - Month subset extraction and the full pipeline sequence
//! - TOML configuration (header policy, top-K budget, month filter)
//! - The human-readable top-K report

pub mod codec;
pub mod config;
pub mod error;
pub mod month;
pub mod pipeline;
pub mod report;

pub use codec::HeaderPolicy;
pub use config::{ConfigError, PipelineConfig, TopKConfig};
pub use error::{CodecError, PipelineError};
pub use month::Month;
pub use pipeline::{
    compute_changes, compute_symbol_statistics, extract_month, run_pipeline,
    sort_by_date_and_change, top_k_by_absolute_change, ChangeOptions, ChangeSummary,
    PipelinePaths, PipelineSummary,
};
pub use report::write_top_k_report;
