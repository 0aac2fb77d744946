use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info};
use serde::Serialize;

use gmim_core::config::PoolConfig;
use gmim_core::errors::{ErrorKind, GmimError, Result};
use gmim_core::layout::integration_path;
use gmim_core::outcome::{FailureRecord, RunStatus};
use gmim_core::pool::TaskPool;

use crate::lockstep::{IntegratedFile, integrate_files};
use crate::matcher::{SampleChromosomes, match_chromosomes};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupStatus {
    Written(IntegratedFile),
    Failed(FailureRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOutcome {
    pub chrom: String,
    pub inputs: Vec<PathBuf>,
    #[serde(flatten)]
    pub status: GroupStatus,
}

impl GroupOutcome {
    pub fn failure(&self) -> Option<&FailureRecord> {
        match &self.status {
            GroupStatus::Written(_) => None,
            GroupStatus::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationResult {
    pub out_dir: PathBuf,
    pub groups: Vec<GroupOutcome>,
    pub skipped: Vec<String>,
}

impl IntegrationResult {
    pub fn status(&self) -> RunStatus {
        let failed = self.groups.iter().filter(|g| g.failure().is_some()).count();
        RunStatus::from_counts(self.groups.len() - failed, failed)
    }
}

///
/// Integrates chromosome-matched normalized files of several samples, one
/// pool task per chromosome present in all of them.
///
pub struct MultiSampleIntegrator {
    pool: TaskPool,
    timeout: Option<Duration>,
}

impl MultiSampleIntegrator {
    pub fn new(threads: usize) -> Result<Self> {
        Ok(MultiSampleIntegrator {
            pool: TaskPool::new(threads)?,
            timeout: None,
        })
    }

    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        Ok(MultiSampleIntegrator::new(config.resolved_integration_threads())?
            .with_timeout(config.timeout()))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    ///
    /// Integrate every chromosome shared by all `samples` into
    /// `<out_dir>/integ_<chrom>.bedGraph`.
    ///
    /// A structural problem in one chromosome (mismatching regions, a bad
    /// line) is recorded against that chromosome only. A missing input or
    /// an unwritable output aborts the whole phase.
    ///
    pub fn integrate(&self, samples: &[SampleChromosomes], out_dir: &Path) -> Result<IntegrationResult> {
        if samples.len() < 2 {
            return Err(GmimError::InvalidConfig(format!(
                "Integration needs at least two samples, got {}",
                samples.len()
            )));
        }

        let matching = match_chromosomes(samples);
        info!(
            "Integrating {} chromosome(s) across {} samples, {} skipped",
            matching.groups.len(),
            samples.len(),
            matching.skipped.len()
        );

        create_dir_all(out_dir).map_err(|e| GmimError::resource(out_dir, e))?;

        let tasks: Vec<_> = matching
            .groups
            .iter()
            .map(|group| {
                let output = integration_path(out_dir, &group.chrom);
                let inputs = group.inputs.clone();
                move || integrate_files(&output, &inputs)
            })
            .collect();

        let results = self.pool.run_all(tasks, self.timeout)?;
        let mut groups = Vec::with_capacity(results.len());
        for (group, result) in matching.groups.into_iter().zip(results) {
            let status = match result.and_then(|written| written) {
                Ok(file) => GroupStatus::Written(file),
                Err(e) if e.kind() == ErrorKind::ResourceUnavailable => {
                    error!("Aborting integration at {}: {}", group.chrom, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to integrate {}: {}", group.chrom, e);
                    GroupStatus::Failed(FailureRecord::from(e))
                }
            };
            groups.push(GroupOutcome {
                chrom: group.chrom,
                inputs: group.inputs,
                status,
            });
        }

        Ok(IntegrationResult {
            out_dir: out_dir.to_path_buf(),
            groups,
            skipped: matching.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs::{read_to_string, write};
    use tempfile::{TempDir, tempdir};

    fn scores(chrom: &str, values: &[f64]) -> String {
        let mut out = format!("track type=bedGraph name=\"{chrom}\"\n");
        for (i, v) in values.iter().enumerate() {
            out.push_str(&format!("{chrom}\t{}\t{}\t{v:.5}\n", i * 100, (i + 1) * 100));
        }
        out
    }

    fn write_scores(dir: &Path, sample: &str, chrom: &str, values: &[f64]) -> PathBuf {
        let path = dir.join(format!("{sample}_{chrom}.bedGraph"));
        write(&path, scores(chrom, values)).unwrap();
        path
    }

    #[fixture]
    fn tmp() -> TempDir {
        tempdir().unwrap()
    }

    #[rstest]
    fn test_two_samples(tmp: TempDir) {
        let dir = tmp.path();
        let a = SampleChromosomes::new("a")
            .with_chromosome("chr1", write_scores(dir, "a", "chr1", &[0.2, 0.5, 0.8]));
        let b = SampleChromosomes::new("b")
            .with_chromosome("chr1", write_scores(dir, "b", "chr1", &[0.5, 0.5, 0.5]));

        let out_dir = tmp.path().join("integ");
        let result = MultiSampleIntegrator::new(2)
            .unwrap()
            .integrate(&[a, b], &out_dir)
            .unwrap();

        assert_eq!(result.status(), RunStatus::Success);
        assert_eq!(result.groups.len(), 1);
        let content = read_to_string(out_dir.join("integ_chr1.bedGraph")).unwrap();
        assert_eq!(
            content.lines().skip(1).collect::<Vec<_>>(),
            vec![
                "chr1\t0\t100\t0.10000",
                "chr1\t100\t200\t0.25000",
                "chr1\t200\t300\t0.40000"
            ]
        );
    }

    #[rstest]
    fn test_missing_chromosome_is_skipped(tmp: TempDir) {
        let dir = tmp.path();
        let a = SampleChromosomes::new("a")
            .with_chromosome("chr1", write_scores(dir, "a", "chr1", &[0.5, 0.5]))
            .with_chromosome("chr2", write_scores(dir, "a", "chr2", &[0.5, 0.5]));
        let b = SampleChromosomes::new("b")
            .with_chromosome("chr1", write_scores(dir, "b", "chr1", &[0.5, 0.5]));

        let out_dir = tmp.path().join("integ");
        let result = MultiSampleIntegrator::new(1)
            .unwrap()
            .integrate(&[a, b], &out_dir)
            .unwrap();

        assert_eq!(result.status(), RunStatus::Success);
        assert_eq!(result.skipped, vec!["chr2".to_string()]);
        assert!(out_dir.join("integ_chr1.bedGraph").exists());
        assert!(!out_dir.join("integ_chr2.bedGraph").exists());
    }

    #[rstest]
    fn test_mismatch_is_isolated(tmp: TempDir) {
        let dir = tmp.path();
        let a = SampleChromosomes::new("a")
            .with_chromosome("chr1", write_scores(dir, "a", "chr1", &[0.5, 0.5]))
            .with_chromosome("chr2", write_scores(dir, "a", "chr2", &[0.5, 0.5]));
        // binned differently in the second sample
        let bad = dir.join("b_chr2.bedGraph");
        write(&bad, "chr2\t0\t50\t0.5\nchr2\t50\t100\t0.5\n").unwrap();
        let b = SampleChromosomes::new("b")
            .with_chromosome("chr1", write_scores(dir, "b", "chr1", &[0.5, 0.5]))
            .with_chromosome("chr2", bad);

        let result = MultiSampleIntegrator::new(2)
            .unwrap()
            .integrate(&[a, b], &tmp.path().join("integ"))
            .unwrap();

        assert_eq!(result.status(), RunStatus::PartialFailure);
        let failed: Vec<&str> = result
            .groups
            .iter()
            .filter(|g| g.failure().is_some())
            .map(|g| g.chrom.as_str())
            .collect();
        assert_eq!(failed, vec!["chr2"]);
        assert_eq!(
            result.groups[1].failure().unwrap().kind,
            ErrorKind::RegionMismatch
        );
    }

    #[rstest]
    fn test_missing_file_aborts_phase(tmp: TempDir) {
        let a = SampleChromosomes::new("a")
            .with_chromosome("chr1", write_scores(tmp.path(), "a", "chr1", &[0.5]));
        let b = SampleChromosomes::new("b")
            .with_chromosome("chr1", tmp.path().join("b_chr1.bedGraph"));

        let res = MultiSampleIntegrator::new(1)
            .unwrap()
            .integrate(&[a, b], &tmp.path().join("integ"));
        assert!(matches!(res, Err(GmimError::ResourceUnavailable { .. })));
    }

    #[rstest]
    fn test_needs_two_samples(tmp: TempDir) {
        let a = SampleChromosomes::new("a")
            .with_chromosome("chr1", write_scores(tmp.path(), "a", "chr1", &[0.5]));
        let res = MultiSampleIntegrator::new(1)
            .unwrap()
            .integrate(&[a], tmp.path());
        assert!(matches!(res, Err(GmimError::InvalidConfig(_))));
    }
}
