use std::fs::{create_dir_all, remove_file};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;

use gmim_core::config::{GmimConfig, NormalizationConfig};
use gmim_core::errors::{GmimError, Result};
use gmim_core::layout::SampleLayout;
use gmim_core::outcome::{FailureRecord, RunStatus};
use gmim_core::pool::TaskPool;

use crate::merge::{MergeEntry, merge_chromosome_files};
use crate::processor::ChromosomeProcessor;
use crate::splitter::{ChromosomeSplitter, MalformedLine, SplitOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChromosomeStatus {
    Written { path: PathBuf, lines: usize },
    Failed(FailureRecord),
}

/// What happened to one chromosome run of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromosomeOutcome {
    pub chrom: String,
    pub occurrence: usize,
    pub intervals: usize,
    #[serde(flatten)]
    pub status: ChromosomeStatus,
}

impl ChromosomeOutcome {
    pub fn path(&self) -> Option<&Path> {
        match &self.status {
            ChromosomeStatus::Written { path, .. } => Some(path),
            ChromosomeStatus::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match &self.status {
            ChromosomeStatus::Written { .. } => None,
            ChromosomeStatus::Failed(failure) => Some(failure),
        }
    }
}

/// A normalized chromosome file, addressable by chromosome name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromosomeHandle<'a> {
    pub chrom: &'a str,
    pub path: &'a Path,
}

/// Everything one sample run produced, in chromosome-run order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleResult {
    pub input: PathBuf,
    pub chromosomes: Vec<ChromosomeOutcome>,
    pub merged: Option<PathBuf>,
    pub malformed: Vec<MalformedLine>,
    pub unrecognized: usize,
}

impl SampleResult {
    pub fn status(&self) -> RunStatus {
        let failed = self.failures().count();
        let succeeded = self.chromosomes.len() - failed;
        if self.chromosomes.is_empty() {
            return RunStatus::Failure;
        }
        RunStatus::from_counts(succeeded, failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChromosomeOutcome> {
        self.chromosomes.iter().filter(|c| c.failure().is_some())
    }

    ///
    /// Successfully written chromosomes, one per chromosome name. When a
    /// chromosome was split into several runs only the first run is exposed.
    ///
    pub fn handles(&self) -> Vec<ChromosomeHandle<'_>> {
        self.chromosomes
            .iter()
            .filter(|c| c.occurrence == 0)
            .filter_map(|c| {
                c.path().map(|path| ChromosomeHandle {
                    chrom: c.chrom.as_str(),
                    path,
                })
            })
            .collect()
    }

    pub fn handle(&self, chrom: &str) -> Option<&Path> {
        self.chromosomes
            .iter()
            .find(|c| c.chrom == chrom && c.occurrence == 0)
            .and_then(ChromosomeOutcome::path)
    }
}

///
/// Normalizes one sample: split into chromosome runs, score every run on a
/// bounded pool, then merge the per-chromosome files in run order.
///
/// A failing chromosome is recorded and left out of the merged file; it does
/// not stop its siblings.
///
pub struct SampleOrchestrator {
    processor: ChromosomeProcessor,
    pool: TaskPool,
    timeout: Option<Duration>,
    show_progress: bool,
}

impl SampleOrchestrator {
    pub fn new(config: NormalizationConfig, threads: usize) -> Result<Self> {
        config.validate()?;
        Ok(SampleOrchestrator {
            processor: ChromosomeProcessor::new(config),
            pool: TaskPool::new(threads)?,
            timeout: None,
            show_progress: false,
        })
    }

    pub fn from_config(config: &GmimConfig) -> Result<Self> {
        Ok(
            SampleOrchestrator::new(config.normalization.clone(), config.pool.resolved_threads())?
                .with_timeout(config.pool.timeout())
                .with_progress(config.pool.show_progress),
        )
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    ///
    /// Normalize the sample at `input` into the files named by `layout`.
    ///
    /// Errors are returned only for sample-level problems: an unreadable
    /// input, an output directory or merged file that cannot be written, or
    /// the chromosome phase running past its timeout.
    ///
    pub fn run(&self, input: &Path, layout: &SampleLayout) -> Result<SampleResult> {
        info!("Splitting {} into chromosome runs", input.display());
        let split = ChromosomeSplitter::new(self.processor.config()).split_file(input)?;

        create_dir_all(&layout.out_dir).map_err(|e| GmimError::resource(&layout.out_dir, e))?;

        let SplitOutcome {
            datasets,
            malformed,
            unrecognized,
        } = split;

        if !malformed.is_empty() {
            warn!(
                "{}: skipped {} malformed line(s)",
                input.display(),
                malformed.len()
            );
        }

        let bar = match self.show_progress {
            true => ProgressBar::new(datasets.len() as u64),
            false => ProgressBar::hidden(),
        };
        if let Ok(style) = ProgressStyle::with_template("{prefix} [{bar:40}] {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar.set_prefix(layout.base_name.clone());

        let mut pending = Vec::with_capacity(datasets.len());
        let tasks: Vec<_> = datasets
            .into_iter()
            .map(|dataset| {
                let processor = self.processor.clone();
                let path = layout.chromosome_path(dataset.chrom(), dataset.occurrence());
                let header = layout.chromosome_header(dataset.chrom(), dataset.occurrence());
                let chrom = dataset.chrom().to_string();
                let occurrence = dataset.occurrence();
                let intervals = dataset.len();
                let bar = bar.clone();
                pending.push((chrom.clone(), occurrence, intervals, path.clone()));

                move || {
                    let status = match processor.process_to_file(dataset, &path, &header) {
                        Ok(lines) => {
                            debug!("Wrote {} lines to {}", lines, path.display());
                            ChromosomeStatus::Written { path, lines }
                        }
                        Err(e) => {
                            error!("Failed to process {}: {}", chrom, e);
                            ChromosomeStatus::Failed(FailureRecord::from(e))
                        }
                    };
                    bar.set_message(chrom.clone());
                    bar.inc(1);
                    ChromosomeOutcome {
                        chrom,
                        occurrence,
                        intervals,
                        status,
                    }
                }
            })
            .collect();

        info!(
            "Processing {} chromosome run(s) on {} thread(s)",
            tasks.len(),
            self.pool.threads()
        );
        let chromosomes: Vec<ChromosomeOutcome> = self
            .pool
            .run_all(tasks, self.timeout)?
            .into_iter()
            .zip(pending)
            .map(|(result, (chrom, occurrence, intervals, path))| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Lost chromosome task for {}: {}", chrom, e);
                    // the task may have died halfway through its file
                    let _ = remove_file(&path);
                    ChromosomeOutcome {
                        chrom,
                        occurrence,
                        intervals,
                        status: ChromosomeStatus::Failed(FailureRecord::from(e)),
                    }
                }
            })
            .collect();
        bar.finish_and_clear();

        let merged = match chromosomes.is_empty() {
            true => {
                warn!("{}: no intervals found, nothing to merge", input.display());
                None
            }
            false => {
                let entries: Vec<MergeEntry<'_>> = chromosomes
                    .iter()
                    .map(|c| match &c.status {
                        ChromosomeStatus::Written { path, .. } => {
                            MergeEntry::Chromosome(path.as_path())
                        }
                        ChromosomeStatus::Failed(failure) => MergeEntry::Omitted {
                            chrom: c.chrom.as_str(),
                            reason: failure.message.as_str(),
                        },
                    })
                    .collect();

                let merged_path = layout.merged_path();
                let lines =
                    merge_chromosome_files(&merged_path, &layout.merged_header(), &entries)?;
                info!("Merged {} lines into {}", lines, merged_path.display());
                Some(merged_path)
            }
        };

        Ok(SampleResult {
            input: input.to_path_buf(),
            chromosomes,
            merged,
            malformed,
            unrecognized,
        })
    }
}
