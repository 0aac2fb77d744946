use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use gmim_core::config::GmimConfig;
use gmim_pipeline::PipelineReport;

/// Flags shared by every command that normalizes samples.
pub fn with_normalization_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .short('c')
            .help("TOML file with [normalization] and [pool] settings; flags override it"),
    )
    .arg(
        Arg::new("window-size")
            .long("window-size")
            .short('w')
            .value_parser(clap::value_parser!(u32))
            .help("Window size in bp for calculating cMBF, must be a multiple of the interval size (default 10000)"),
    )
    .arg(
        Arg::new("median-multiplier")
            .long("median-multiplier")
            .short('m')
            .value_parser(clap::value_parser!(f64))
            .allow_negative_numbers(true)
            .help("Median multiple, cannot be 0 (default 1)"),
    )
    .arg(
        Arg::new("min-read-count")
            .long("min-read-count")
            .short('z')
            .value_parser(clap::value_parser!(f64))
            .help("Number used in place of a read count of zero (default 0.5)"),
    )
    .arg(
        Arg::new("threads")
            .long("threads")
            .short('p')
            .value_parser(clap::value_parser!(usize))
            .help("Worker threads (default: all available)"),
    )
    .arg(
        Arg::new("timeout")
            .long("timeout")
            .value_parser(clap::value_parser!(u64))
            .help("Seconds to wait for each processing phase"),
    )
    .arg(
        Arg::new("progress")
            .long("progress")
            .action(ArgAction::SetTrue)
            .help("Show a progress bar per sample"),
    )
    .arg(
        Arg::new("report")
            .long("report")
            .help("Write the run report as JSON to this path"),
    )
}

///
/// Build the run configuration: the `--config` file if given, defaults
/// otherwise, with any explicit flag taking precedence.
///
pub fn load_config(matches: &ArgMatches) -> Result<GmimConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => GmimConfig::from_toml(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => GmimConfig::default(),
    };

    if let Some(window_size) = matches.get_one::<u32>("window-size") {
        config.normalization.window_size = *window_size;
    }
    if let Some(multiplier) = matches.get_one::<f64>("median-multiplier") {
        config.normalization.median_multiplier = *multiplier;
    }
    if let Some(floor) = matches.get_one::<f64>("min-read-count") {
        config.normalization.min_read_count = *floor;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.pool.threads = Some(*threads);
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.pool.timeout_secs = Some(*timeout);
    }
    if matches.get_flag("progress") {
        config.pool.show_progress = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Print the report and write it as JSON when `--report` was given.
pub fn emit_report(matches: &ArgMatches, report: &PipelineReport) -> Result<()> {
    println!("{report}");
    if let Some(path) = matches.get_one::<String>("report") {
        let path = PathBuf::from(path);
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn parse(args: &[&str]) -> ArgMatches {
        with_normalization_args(Command::new("test"))
            .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
    }

    #[rstest]
    fn test_defaults() {
        let config = load_config(&parse(&[])).unwrap();
        assert_eq!(config, GmimConfig::default());
    }

    #[rstest]
    fn test_flags_override_file() {
        let config = load_config(&parse(&[
            "--config",
            "../tests/data/gmim.toml",
            "-w",
            "500",
            "--progress",
        ]))
        .unwrap();

        assert_eq!(config.normalization.window_size, 500);
        assert_eq!(config.pool.threads, Some(4));
        assert_eq!(config.pool.integration_threads, Some(2));
        assert!(config.pool.show_progress);
    }

    #[rstest]
    #[case(&["-m", "0"])]
    #[case(&["-z", "0"])]
    #[case(&["-w", "0"])]
    #[case(&["-p", "0"])]
    fn test_invalid_values(#[case] args: &[&str]) {
        assert!(load_config(&parse(args)).is_err());
    }
}
