mod common;
mod integrate;
mod normalize;
mod pipeline;

use std::process::ExitCode;

use anyhow::Result;
use clap::Command;
use env_logger::Env;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "gmim";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Normalize NGS genome read count data into cMBF scores and integrate samples.")
        .subcommand_required(true)
        .subcommand(normalize::cli::create_normalize_cli())
        .subcommand(pipeline::cli::create_pipeline_cli())
        .subcommand(integrate::cli::create_integrate_cli())
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    let status = match matches.subcommand() {
        //
        // NORMALIZE ONE SAMPLE
        //
        Some((normalize::cli::NORMALIZE_CMD, matches)) => normalize::handlers::run_normalize(matches)?,

        //
        // NORMALIZE + INTEGRATE
        //
        Some((pipeline::cli::PIPELINE_CMD, matches)) => pipeline::handlers::run_pipeline(matches)?,

        //
        // INTEGRATE EXISTING FILES
        //
        Some((integrate::cli::INTEGRATE_CMD, matches)) => integrate::handlers::run_integrate(matches)?,

        _ => unreachable!("Subcommand not found"),
    };

    Ok(ExitCode::from(status.exit_code() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }
}
