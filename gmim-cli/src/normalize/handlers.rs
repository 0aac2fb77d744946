use anyhow::{Context, Result};
use clap::ArgMatches;

use gmim_core::outcome::RunStatus;
use gmim_normalize::SampleOrchestrator;
use gmim_pipeline::{IntegrationReport, PipelineReport, SampleReport, SampleSpec};

use crate::common::{emit_report, load_config};

pub fn run_normalize(matches: &ArgMatches) -> Result<RunStatus> {
    let config = load_config(matches)?;

    let input = matches
        .get_one::<String>("input")
        .expect("An input file is required.");

    let mut spec =
        SampleSpec::new(input).with_base_name(matches.get_one::<String>("output").cloned());
    if let Some(out_dir) = matches.get_one::<String>("out-dir") {
        spec = spec.with_out_dir(out_dir);
    }
    let layout = spec.layout()?;

    let orchestrator = SampleOrchestrator::from_config(&config)?;
    let outcome = orchestrator.run(&spec.input, &layout);
    if let Err(e) = &outcome {
        log::error!("{}: {}", spec.name(), e);
    }

    let report = PipelineReport::new(
        vec![SampleReport::new(&spec, outcome)],
        IntegrationReport::Skipped {
            reason: "single sample".to_string(),
        },
    );
    emit_report(matches, &report).context("Failed to report results")?;

    Ok(report.status)
}
