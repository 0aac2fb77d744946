//! Core building blocks shared by every gmim crate.
//!
//! This crate provides:
//!
//! - The [`Interval`] and [`ChromosomeDataset`] models
//! - Parsing of raw `chrom start end count` read-count lines (plain or gzip'd)
//! - Reading and writing of normalized bedGraph files and their output layout
//! - The immutable run configuration, loadable from TOML
//! - A bounded worker pool with a submit/await-all contract
//!
//! # Example
//!
//! ```no_run
//! use gmim_core::config::GmimConfig;
//! use gmim_core::utils::{get_dynamic_reader, parse_interval_line, LineKind};
//! use std::io::BufRead;
//! use std::path::Path;
//!
//! let config = GmimConfig::from_toml(Path::new("gmim.toml")).unwrap();
//! let reader = get_dynamic_reader(Path::new("sample.txt.gz")).unwrap();
//! for line in reader.lines() {
//!     let line = line.unwrap();
//!     if let LineKind::Record(record) = parse_interval_line(&line) {
//!         println!("{} {}", record.chrom, record.read_count);
//!     }
//! }
//! ```

pub mod bedgraph;
pub mod config;
pub mod consts;
pub mod errors;
pub mod layout;
pub mod models;
pub mod outcome;
pub mod pool;
pub mod utils;

// re-exports
pub use errors::{ErrorKind, GmimError, Result};
pub use models::{ChromosomeDataset, Interval};
pub use outcome::{FailureRecord, RunStatus};
