use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::warn;

use gmim_core::outcome::RunStatus;
use gmim_integrate::integrate_files;

pub fn run_integrate(matches: &ArgMatches) -> Result<RunStatus> {
    let output = matches
        .get_one::<String>("output")
        .expect("An output file is required.");

    let inputs: Vec<PathBuf> = matches
        .get_many::<String>("inputs")
        .expect("At least two input files are required.")
        .map(PathBuf::from)
        .collect();

    let integrated = integrate_files(Path::new(output), &inputs)
        .with_context(|| format!("Failed to integrate into {output}"))?;

    if integrated.truncated {
        warn!("Inputs have different lengths; output stops at the shortest");
    }
    println!(
        "Wrote {} ({} lines)",
        integrated.path.display(),
        integrated.lines
    );

    Ok(RunStatus::Success)
}
