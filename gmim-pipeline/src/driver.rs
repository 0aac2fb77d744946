use std::collections::HashSet;
use std::path::Path;

use log::{info, warn};

use gmim_core::config::GmimConfig;
use gmim_core::errors::{GmimError, Result};
use gmim_core::outcome::FailureRecord;
use gmim_core::pool::TaskPool;
use gmim_integrate::{MultiSampleIntegrator, SampleChromosomes};
use gmim_normalize::{SampleOrchestrator, SampleResult};

use crate::report::{IntegrationReport, PipelineReport, SampleReport};
use crate::sample::SampleSpec;

///
/// Normalizes several samples concurrently, then integrates every
/// chromosome they all produced.
///
/// The thread budget is split evenly between samples so that one large
/// sample cannot starve the others; integration gets its own pool once all
/// samples are done.
///
pub struct PipelineDriver {
    config: GmimConfig,
}

impl PipelineDriver {
    pub fn new(config: GmimConfig) -> Result<Self> {
        config.validate()?;
        Ok(PipelineDriver { config })
    }

    pub fn config(&self) -> &GmimConfig {
        &self.config
    }

    /// Threads given to each sample's chromosome pool.
    pub fn threads_per_sample(&self, n_samples: usize) -> usize {
        (self.config.pool.resolved_threads() / n_samples.max(1)).max(1)
    }

    ///
    /// Run every sample, then integrate into `integration_dir`.
    ///
    /// Per-sample and per-chromosome failures end up in the report. An error
    /// is returned only for an unusable setup or when waiting on the samples
    /// exceeds the configured timeout.
    ///
    pub fn run(&self, samples: &[SampleSpec], integration_dir: &Path) -> Result<PipelineReport> {
        if samples.is_empty() {
            return Err(GmimError::InvalidConfig(
                "No input samples given".to_string(),
            ));
        }
        let layouts = samples
            .iter()
            .map(SampleSpec::layout)
            .collect::<Result<Vec<_>>>()?;

        let mut claimed = HashSet::new();
        for (spec, layout) in samples.iter().zip(&layouts) {
            if !claimed.insert((layout.out_dir.as_path(), layout.base_name.as_str())) {
                return Err(GmimError::InvalidConfig(format!(
                    "{} would write to the same files as another sample ({} with base name {:?})",
                    spec.input.display(),
                    layout.out_dir.display(),
                    layout.base_name
                )));
            }
        }

        let per_sample = self.threads_per_sample(samples.len());
        let timeout = self.config.pool.timeout();
        info!(
            "Normalizing {} sample(s) with {} thread(s) each",
            samples.len(),
            per_sample
        );

        let tasks: Vec<_> = samples
            .iter()
            .cloned()
            .zip(layouts)
            .map(|(spec, layout)| {
                let normalization = self.config.normalization.clone();
                let show_progress = self.config.pool.show_progress;
                move || {
                    let outcome = SampleOrchestrator::new(normalization, per_sample).and_then(
                        |orchestrator| {
                            orchestrator
                                .with_timeout(timeout)
                                .with_progress(show_progress)
                                .run(&spec.input, &layout)
                        },
                    );
                    match &outcome {
                        Ok(result) => info!("{} completed: {}", spec.name(), result.status()),
                        Err(e) => warn!("{} failed: {}", spec.name(), e),
                    }
                    outcome
                }
            })
            .collect();

        let sample_pool = TaskPool::new(samples.len())?;
        let outcomes: Vec<(SampleSpec, Result<SampleResult>)> = samples
            .iter()
            .cloned()
            .zip(sample_pool.run_all(tasks, timeout)?)
            .map(|(spec, outcome)| (spec, outcome.and_then(|result| result)))
            .collect();

        let completed: Vec<SampleChromosomes> = outcomes
            .iter()
            .filter_map(|(spec, outcome)| outcome.as_ref().ok().map(|r| chromosomes_of(spec, r)))
            .filter(|sample| !sample.chromosomes.is_empty())
            .collect();

        let integration = if samples.len() < 2 {
            IntegrationReport::Skipped {
                reason: "fewer than two samples".to_string(),
            }
        } else if completed.len() < 2 {
            warn!(
                "Only {} of {} samples completed, skipping integration",
                completed.len(),
                samples.len()
            );
            IntegrationReport::Skipped {
                reason: format!("only {} sample(s) completed", completed.len()),
            }
        } else {
            info!("Integrating {} samples into {}", completed.len(), integration_dir.display());
            match MultiSampleIntegrator::from_config(&self.config.pool)
                .and_then(|integrator| integrator.integrate(&completed, integration_dir))
            {
                Ok(result) => IntegrationReport::Completed(result),
                Err(e) => {
                    warn!("Integration failed: {}", e);
                    IntegrationReport::Failed(FailureRecord::from(e))
                }
            }
        };

        let reports = outcomes
            .into_iter()
            .map(|(spec, outcome)| SampleReport::new(&spec, outcome))
            .collect();

        Ok(PipelineReport::new(reports, integration))
    }
}

fn chromosomes_of(spec: &SampleSpec, result: &SampleResult) -> SampleChromosomes {
    result
        .handles()
        .into_iter()
        .fold(SampleChromosomes::new(spec.name()), |sample, handle| {
            sample.with_chromosome(handle.chrom, handle.path)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmim_core::config::PoolConfig;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn driver(threads: usize) -> PipelineDriver {
        PipelineDriver::new(GmimConfig {
            pool: PoolConfig {
                threads: Some(threads),
                ..PoolConfig::default()
            },
            ..GmimConfig::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case(8, 2, 4)]
    #[case(8, 3, 2)]
    #[case(2, 5, 1)]
    #[case(1, 1, 1)]
    fn test_threads_per_sample(#[case] threads: usize, #[case] samples: usize, #[case] expected: usize) {
        assert_eq!(driver(threads).threads_per_sample(samples), expected);
    }

    #[rstest]
    fn test_no_samples() {
        let res = driver(1).run(&[], Path::new("integ"));
        assert!(matches!(res, Err(GmimError::InvalidConfig(_))));
    }

    #[rstest]
    #[case(SampleSpec::new("d/s.bed"), SampleSpec::new("d/s.bed.gz"))]
    #[case(SampleSpec::new("d/s.bed"), SampleSpec::new("d/s.bed"))]
    #[case(
        SampleSpec::new("a.bed").with_out_dir("shared"),
        SampleSpec::new("b.bed").with_out_dir("shared")
    )]
    fn test_colliding_outputs_rejected(#[case] first: SampleSpec, #[case] second: SampleSpec) {
        let res = driver(2).run(&[first, second], Path::new("integ"));
        assert!(matches!(res, Err(GmimError::InvalidConfig(_))));
    }

    #[rstest]
    fn test_distinct_base_names_share_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        let samples = [
            SampleSpec::new("../tests/data/sample1.bed")
                .with_out_dir(&shared)
                .with_base_name(Some("s1".to_string())),
            SampleSpec::new("../tests/data/sample2.bed")
                .with_out_dir(&shared)
                .with_base_name(Some("s2".to_string())),
        ];
        let report = driver(2).run(&samples, &dir.path().join("integ")).unwrap();
        assert_eq!(report.samples.len(), 2);
        assert!(shared.join("s1_allChr.bedGraph").exists());
        assert!(shared.join("s2_allChr.bedGraph").exists());
    }

    #[rstest]
    fn test_bad_base_name_rejected_up_front() {
        let spec = SampleSpec::new("a.bed").with_base_name(Some("x/y".to_string()));
        let res = driver(1).run(&[spec], Path::new("integ"));
        assert!(matches!(res, Err(GmimError::InvalidConfig(_))));
    }
}
