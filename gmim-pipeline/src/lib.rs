//! Runs the full gmim workflow: normalize every sample concurrently, then
//! integrate the chromosomes they have in common.
//!
//! # Example
//!
//! ```no_run
//! use gmim_core::config::GmimConfig;
//! use gmim_pipeline::{PipelineDriver, SampleSpec};
//! use std::path::Path;
//!
//! let driver = PipelineDriver::new(GmimConfig::default()).unwrap();
//! let samples = vec![SampleSpec::new("a.bed"), SampleSpec::new("b.bed")];
//! let report = driver.run(&samples, Path::new("integrated")).unwrap();
//! println!("{report}");
//! ```

pub mod driver;
pub mod report;
pub mod sample;

// re-exports
pub use driver::PipelineDriver;
pub use report::{IntegrationReport, PipelineReport, SampleReport};
pub use sample::SampleSpec;
