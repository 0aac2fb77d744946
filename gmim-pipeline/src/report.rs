use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use gmim_core::errors::{GmimError, Result};
use gmim_core::outcome::{FailureRecord, RunStatus};
use gmim_integrate::{GroupStatus, IntegrationResult};
use gmim_normalize::{ChromosomeStatus, SampleResult};

use crate::sample::SampleSpec;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleReport {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SampleResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
}

impl SampleReport {
    pub fn new(spec: &SampleSpec, outcome: Result<SampleResult>) -> Self {
        let (status, result, failure) = match outcome {
            Ok(result) => (result.status(), Some(result), None),
            Err(e) => (RunStatus::Failure, None, Some(FailureRecord::from(e))),
        };
        SampleReport {
            input: spec.input.clone(),
            out_dir: spec.out_dir.clone(),
            status,
            result,
            failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrationReport {
    Completed(IntegrationResult),
    Failed(FailureRecord),
    Skipped { reason: String },
}

impl IntegrationReport {
    /// `None` when integration did not run.
    pub fn status(&self) -> Option<RunStatus> {
        match self {
            IntegrationReport::Completed(result) => Some(result.status()),
            IntegrationReport::Failed(_) => Some(RunStatus::Failure),
            IntegrationReport::Skipped { .. } => None,
        }
    }
}

/// Everything a pipeline run produced or failed to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub status: RunStatus,
    pub samples: Vec<SampleReport>,
    pub integration: IntegrationReport,
}

impl PipelineReport {
    pub fn new(samples: Vec<SampleReport>, integration: IntegrationReport) -> Self {
        let mut statuses = samples
            .iter()
            .map(|s| s.status)
            .chain(integration.status());
        let status = match statuses.next() {
            Some(first) => statuses.fold(first, RunStatus::and),
            None => RunStatus::Failure,
        };
        PipelineReport {
            status,
            samples,
            integration,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| GmimError::resource(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(std::io::Error::from)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sample in &self.samples {
            writeln!(f, "Sample {}: {}", sample.input.display(), sample.status)?;
            if let Some(failure) = &sample.failure {
                writeln!(f, "  failed: {}", failure)?;
            }
            let Some(result) = &sample.result else {
                continue;
            };
            for chrom in &result.chromosomes {
                match &chrom.status {
                    ChromosomeStatus::Written { path, lines } => {
                        writeln!(f, "  wrote {} ({} lines)", path.display(), lines)?
                    }
                    ChromosomeStatus::Failed(failure) => {
                        writeln!(f, "  failed {}: {}", chrom.chrom, failure)?
                    }
                }
            }
            for line in &result.malformed {
                writeln!(
                    f,
                    "  skipped malformed line {} ({}): {:?}: {}",
                    line.line_number, line.chrom, line.line, line.reason
                )?;
            }
            if let Some(merged) = &result.merged {
                writeln!(f, "  merged into {}", merged.display())?;
            }
        }

        match &self.integration {
            IntegrationReport::Completed(result) => {
                writeln!(f, "Integration: {}", result.status())?;
                for group in &result.groups {
                    match &group.status {
                        GroupStatus::Written(file) if file.truncated => writeln!(
                            f,
                            "  wrote {} ({} lines, inputs had different lengths)",
                            file.path.display(),
                            file.lines
                        )?,
                        GroupStatus::Written(file) => {
                            writeln!(f, "  wrote {} ({} lines)", file.path.display(), file.lines)?
                        }
                        GroupStatus::Failed(failure) => {
                            writeln!(f, "  failed {}: {}", group.chrom, failure)?
                        }
                    }
                }
                for chrom in &result.skipped {
                    writeln!(f, "  skipped {} (not present in every sample)", chrom)?;
                }
            }
            IntegrationReport::Failed(failure) => writeln!(f, "Integration: failed: {}", failure)?,
            IntegrationReport::Skipped { reason } => {
                writeln!(f, "Integration: skipped ({})", reason)?
            }
        }

        write!(f, "Overall: {}", self.status)
    }
}
