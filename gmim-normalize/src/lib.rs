//! Windowed noise-floor normalization of genomic read counts.
//!
//! Every bin is scored against the median read count of the window around
//! it: `z = count / (multiplier * median)` and `score = 1 - exp(-z^2 / 2)`.
//! A sample is split into contiguous chromosome runs which are scored in
//! parallel and merged back in their original order.
//!
//! # Example
//!
//! ```no_run
//! use gmim_core::config::NormalizationConfig;
//! use gmim_core::layout::SampleLayout;
//! use gmim_normalize::SampleOrchestrator;
//! use std::path::Path;
//!
//! let orchestrator = SampleOrchestrator::new(NormalizationConfig::default(), 4).unwrap();
//! let layout = SampleLayout::new("sample_out", None);
//! let result = orchestrator.run(Path::new("sample.bed"), &layout).unwrap();
//! println!("{}", result.status());
//! ```

pub mod merge;
pub mod orchestrator;
pub mod processor;
pub mod splitter;
pub mod window;

// re-exports
pub use orchestrator::{
    ChromosomeHandle, ChromosomeOutcome, ChromosomeStatus, SampleOrchestrator, SampleResult,
};
pub use processor::ChromosomeProcessor;
pub use splitter::{ChromosomeSplitter, MalformedLine, SplitOutcome};
pub use window::{NoiseWindow, WindowState};
