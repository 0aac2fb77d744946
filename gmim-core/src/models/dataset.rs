use std::sync::Arc;

use crate::models::Interval;

///
/// An ordered, contiguous run of intervals belonging to one chromosome.
///
/// `occurrence` counts how many runs of the same chromosome name came before
/// this one in the source stream (0 for the first run). Non-contiguous runs of
/// a chromosome are never merged.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeDataset {
    chrom: Arc<str>,
    occurrence: usize,
    intervals: Vec<Interval>,
}

impl ChromosomeDataset {
    pub fn new(chrom: Arc<str>, occurrence: usize) -> Self {
        ChromosomeDataset {
            chrom,
            occurrence,
            intervals: Vec::new(),
        }
    }

    pub fn from_intervals(chrom: Arc<str>, occurrence: usize, intervals: Vec<Interval>) -> Self {
        ChromosomeDataset {
            chrom,
            occurrence,
            intervals,
        }
    }

    pub fn push(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn chrom_arc(&self) -> &Arc<str> {
        &self.chrom
    }

    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Bin width, discovered from the first interval of the run.
    pub fn interval_width(&self) -> Option<u32> {
        self.intervals.first().map(Interval::width)
    }

    pub fn into_intervals(self) -> Vec<Interval> {
        self.intervals
    }
}
