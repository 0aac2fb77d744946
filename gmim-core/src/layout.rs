//! File naming for sample and integration outputs.

use std::path::{Path, PathBuf};

use crate::bedgraph::TrackHeader;
use crate::consts::{BEDGRAPH_EXT, DEFAULT_OUT_BASE, INTEGRATION_PREFIX, MERGED_SUFFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLayout {
    pub out_dir: PathBuf,
    pub base_name: String,
}

impl SampleLayout {
    pub fn new(out_dir: impl Into<PathBuf>, base_name: Option<&str>) -> Self {
        SampleLayout {
            out_dir: out_dir.into(),
            base_name: base_name.unwrap_or(DEFAULT_OUT_BASE).to_string(),
        }
    }

    fn chromosome_stem(&self, chrom: &str, occurrence: usize) -> PathBuf {
        let chrom = file_component(chrom);
        let file_name = match occurrence {
            0 => format!("{}_{}", self.base_name, chrom),
            n => format!("{}_{}.{}", self.base_name, chrom, n + 1),
        };
        self.out_dir.join(file_name)
    }

    /// `<out_dir>/<base>_<chrom>.bedGraph`, or `<base>_<chrom>.<n>.bedGraph` for the n-th repeated run.
    pub fn chromosome_path(&self, chrom: &str, occurrence: usize) -> PathBuf {
        with_bedgraph_ext(self.chromosome_stem(chrom, occurrence))
    }

    pub fn chromosome_header(&self, chrom: &str, occurrence: usize) -> TrackHeader {
        TrackHeader::Sample {
            name: self.chromosome_stem(chrom, occurrence).display().to_string(),
        }
    }

    pub fn merged_path(&self) -> PathBuf {
        with_bedgraph_ext(
            self.out_dir
                .join(format!("{}_{}", self.base_name, MERGED_SUFFIX)),
        )
    }

    pub fn merged_header(&self) -> TrackHeader {
        TrackHeader::Sample {
            name: self.merged_path().display().to_string(),
        }
    }
}

/// `<dir>/integ_<chrom>.bedGraph`
pub fn integration_path(dir: &Path, chrom: &str) -> PathBuf {
    with_bedgraph_ext(dir.join(format!("{}_{}", INTEGRATION_PREFIX, file_component(chrom))))
}

/// Integration track lines are named after the output path minus its extension.
pub fn integration_header(path: &Path) -> TrackHeader {
    TrackHeader::Integration {
        name: path.with_extension("").display().to_string(),
    }
}

/// Keep a chromosome name from reaching outside the output directory.
fn file_component(chrom: &str) -> String {
    chrom.replace(['/', '\\'], "_")
}

fn with_bedgraph_ext(stem: PathBuf) -> PathBuf {
    let mut raw = stem.into_os_string();
    raw.push(".");
    raw.push(BEDGRAPH_EXT);
    PathBuf::from(raw)
}
