use clap::{Arg, Command};

use crate::common::with_normalization_args;

pub const PIPELINE_CMD: &str = "pipeline";

/// Creates the pipeline CLI Command object
pub fn create_pipeline_cli() -> Command {
    let cmd = Command::new(PIPELINE_CMD)
        .about("Normalize several samples concurrently and integrate the chromosomes they share")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .num_args(1..)
                .required(true)
                .help("Read count files, one per sample"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1..)
                .help("Output file base names, one for each input file"),
        )
        .arg(
            Arg::new("integrate")
                .long("integrate")
                .required(true)
                .help("Directory for the integrated per-chromosome files"),
        )
        .arg(
            Arg::new("integration-threads")
                .long("integration-threads")
                .value_parser(clap::value_parser!(usize))
                .help("Worker threads for integration (default: all available)"),
        );
    with_normalization_args(cmd)
}
