use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use gmim_core::outcome::RunStatus;
use gmim_pipeline::{PipelineDriver, SampleSpec};

use crate::common::{emit_report, load_config};

pub fn run_pipeline(matches: &ArgMatches) -> Result<RunStatus> {
    let mut config = load_config(matches)?;
    if let Some(threads) = matches.get_one::<usize>("integration-threads") {
        config.pool.integration_threads = Some(*threads);
    }

    let inputs: Vec<&String> = matches
        .get_many::<String>("input")
        .expect("At least one input file is required.")
        .collect();

    let base_names: Vec<Option<String>> = match matches.get_many::<String>("output") {
        Some(names) => {
            let names: Vec<Option<String>> = names.cloned().map(Some).collect();
            if names.len() != inputs.len() {
                bail!(
                    "Number of input files ({}) and output base names ({}) do not match",
                    inputs.len(),
                    names.len()
                );
            }
            names
        }
        None => vec![None; inputs.len()],
    };

    let samples: Vec<SampleSpec> = inputs
        .into_iter()
        .zip(base_names)
        .map(|(input, base)| SampleSpec::new(input).with_base_name(base))
        .collect();

    let integration_dir = matches
        .get_one::<String>("integrate")
        .expect("An integration directory is required.");

    let driver = PipelineDriver::new(config).context("Invalid configuration")?;
    let report = driver
        .run(&samples, Path::new(integration_dir))
        .context("Pipeline aborted")?;

    emit_report(matches, &report)?;

    Ok(report.status)
}
