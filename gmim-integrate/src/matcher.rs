use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// The normalized per-chromosome files of one sample, in chromosome-run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChromosomes {
    pub sample: String,
    pub chromosomes: Vec<(String, PathBuf)>,
}

impl SampleChromosomes {
    pub fn new(sample: impl Into<String>) -> Self {
        SampleChromosomes {
            sample: sample.into(),
            chromosomes: Vec::new(),
        }
    }

    pub fn with_chromosome(mut self, chrom: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.chromosomes.push((chrom.into(), path.into()));
        self
    }

    fn index(&self) -> HashMap<&str, &Path> {
        let mut index = HashMap::new();
        for (chrom, path) in &self.chromosomes {
            index.entry(chrom.as_str()).or_insert(path.as_path());
        }
        index
    }
}

/// One chromosome's file from every sample, in sample order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationGroup {
    pub chrom: String,
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    pub groups: Vec<IntegrationGroup>,
    /// Chromosomes of the first sample missing from at least one other sample.
    pub skipped: Vec<String>,
}

///
/// Group the chromosomes of the first sample with the same-named
/// chromosome of every other sample. A chromosome missing from any sample
/// is skipped; that is expected when samples cover different chromosomes.
///
pub fn match_chromosomes(samples: &[SampleChromosomes]) -> Matching {
    let mut matching = Matching::default();
    let Some((first, rest)) = samples.split_first() else {
        return matching;
    };
    let indexes: Vec<HashMap<&str, &Path>> = rest.iter().map(SampleChromosomes::index).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    for (chrom, path) in &first.chromosomes {
        if !seen.insert(chrom.as_str()) {
            warn!(
                "{}: {} has more than one run, integrating only the first",
                first.sample, chrom
            );
            continue;
        }

        let others: Option<Vec<PathBuf>> = indexes
            .iter()
            .map(|index| index.get(chrom.as_str()).map(|p| p.to_path_buf()))
            .collect();

        match others {
            Some(others) => {
                let mut inputs = Vec::with_capacity(samples.len());
                inputs.push(path.clone());
                inputs.extend(others);
                matching.groups.push(IntegrationGroup {
                    chrom: chrom.clone(),
                    inputs,
                });
            }
            None => {
                debug!("{} is not present in every sample, skipping", chrom);
                matching.skipped.push(chrom.clone());
            }
        }
    }

    matching
}
