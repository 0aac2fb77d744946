pub const DEFAULT_WINDOW_SIZE: u32 = 10_000;
pub const DEFAULT_MEDIAN_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_MIN_READ_COUNT: f64 = 0.5;

/// Lines whose first field starts with this are treated as chromosome-name carriers.
pub const CHROM_PREFIX: &str = "chr";

pub const SCORE_PRECISION: usize = 5;

pub const DEFAULT_OUT_BASE: &str = "out";
pub const BEDGRAPH_EXT: &str = "bedGraph";
pub const MERGED_SUFFIX: &str = "allChr";
pub const INTEGRATION_PREFIX: &str = "integ";
