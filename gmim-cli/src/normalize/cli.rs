use clap::{Arg, Command};

use crate::common::with_normalization_args;

pub const NORMALIZE_CMD: &str = "normalize";

/// Creates the normalize CLI Command object
pub fn create_normalize_cli() -> Command {
    let cmd = Command::new(NORMALIZE_CMD)
        .about("Normalize one sample of read counts into per-chromosome and whole-genome cMBF bedGraph files")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .help("Read count file (chrom, start, end, count), optionally gzipped")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file base name (default: out)"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .help("Output directory (default: <input>_out next to the input)"),
        );
    with_normalization_args(cmd)
}
