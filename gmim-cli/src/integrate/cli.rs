use clap::{Arg, Command};

pub const INTEGRATE_CMD: &str = "integrate";

/// Creates the integrate CLI Command object
pub fn create_integrate_cli() -> Command {
    Command::new(INTEGRATE_CMD)
        .about("Integrate normalized bedGraph files of matching regions by multiplying their scores")
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .required(true)
                .help("Integrated bedGraph file to write"),
        )
        .arg(
            Arg::new("inputs")
                .long("inputs")
                .short('i')
                .num_args(2..)
                .required(true)
                .help("Two or more normalized .bedGraph files with identical regions"),
        )
}
