use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use gmim_core::config::NormalizationConfig;
use gmim_core::errors::Result;
use gmim_core::models::{ChromosomeDataset, Interval};
use gmim_core::utils::{LineKind, get_dynamic_reader, parse_interval_line, read_decoded_line};

/// A line that named a chromosome but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    pub line_number: usize,
    pub chrom: String,
    pub line: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct SplitOutcome {
    /// One dataset per contiguous run, in first-seen order.
    pub datasets: Vec<ChromosomeDataset>,
    pub malformed: Vec<MalformedLine>,
    /// Header, comment, blank and otherwise unparseable lines.
    pub unrecognized: usize,
}

impl SplitOutcome {
    pub fn total_intervals(&self) -> usize {
        self.datasets.iter().map(ChromosomeDataset::len).sum()
    }
}

///
/// Partitions one sample's read-count stream into contiguous per-chromosome
/// runs. A run ends whenever the chromosome of a valid line differs from the
/// previous valid line; a chromosome that shows up again later starts a new
/// run instead of extending the earlier one.
///
pub struct ChromosomeSplitter {
    min_read_count: f64,
}

impl ChromosomeSplitter {
    pub fn new(config: &NormalizationConfig) -> Self {
        ChromosomeSplitter {
            min_read_count: config.min_read_count,
        }
    }

    pub fn split_file(&self, path: &Path) -> Result<SplitOutcome> {
        let reader = get_dynamic_reader(path)?;
        self.split(reader)
    }

    pub fn split<R: BufRead>(&self, mut reader: R) -> Result<SplitOutcome> {
        let mut outcome = SplitOutcome::default();
        let mut current: Option<ChromosomeDataset> = None;
        let mut runs_seen: HashMap<Arc<str>, usize> = HashMap::new();
        let mut buf = Vec::new();
        let mut line_number = 0;

        while let Some(decoded) = read_decoded_line(&mut reader, &mut buf)? {
            line_number += 1;

            let line = match decoded {
                Ok(line) => line,
                Err(lossy) => {
                    warn!("Skipping line {} with invalid UTF-8: {:?}", line_number, lossy);
                    outcome.malformed.push(MalformedLine {
                        line_number,
                        chrom: lossy.split_whitespace().next().unwrap_or_default().to_string(),
                        line: lossy,
                        reason: "invalid UTF-8".to_string(),
                    });
                    continue;
                }
            };

            let record = match parse_interval_line(&line) {
                LineKind::Record(record) => record,
                LineKind::Malformed { chrom, reason } => {
                    warn!("Skipping malformed line {}: {} ({})", line_number, line, reason);
                    outcome.malformed.push(MalformedLine {
                        line_number,
                        chrom: chrom.to_string(),
                        line: line.clone(),
                        reason,
                    });
                    continue;
                }
                LineKind::Unrecognized => {
                    debug!("Ignoring line {}: {:?}", line_number, line);
                    outcome.unrecognized += 1;
                    continue;
                }
            };

            let same_run = current
                .as_ref()
                .is_some_and(|dataset| dataset.chrom() == record.chrom);
            let chrom: Arc<str> = match current.as_ref() {
                Some(dataset) if same_run => dataset.chrom_arc().clone(),
                _ => Arc::from(record.chrom),
            };

            // an invalid interval must not open or close a run
            let interval = match Interval::new(
                chrom.clone(),
                record.start,
                record.end,
                record.read_count,
                self.min_read_count,
            ) {
                Ok(interval) => interval,
                Err(e) => {
                    warn!("Skipping malformed line {}: {} ({})", line_number, line, e);
                    outcome.malformed.push(MalformedLine {
                        line_number,
                        chrom: record.chrom.to_string(),
                        line: line.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !same_run {
                if let Some(done) = current.take() {
                    outcome.datasets.push(done);
                }
                let occurrence = runs_seen.entry(chrom.clone()).or_insert(0);
                if *occurrence > 0 {
                    warn!(
                        "{} appears again at line {} after other chromosomes; starting a separate run",
                        chrom, line_number
                    );
                }
                current = Some(ChromosomeDataset::new(chrom, *occurrence));
                *occurrence += 1;
            }

            if let Some(dataset) = current.as_mut() {
                dataset.push(interval);
            }
        }

        if let Some(done) = current {
            outcome.datasets.push(done);
        }

        debug!(
            "Split {} intervals into {} chromosome runs",
            outcome.total_intervals(),
            outcome.datasets.len()
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[fixture]
    fn splitter() -> ChromosomeSplitter {
        ChromosomeSplitter::new(&NormalizationConfig::default())
    }

    fn runs(outcome: &SplitOutcome) -> Vec<(String, usize, usize)> {
        outcome
            .datasets
            .iter()
            .map(|d| (d.chrom().to_string(), d.occurrence(), d.len()))
            .collect()
    }

    #[rstest]
    fn test_split_contiguous_runs(splitter: ChromosomeSplitter) {
        let input = "track name=raw\nchr1\t0\t100\t3\nchr1\t100\t200\t4\nchr2\t0\t100\t1\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(
            runs(&outcome),
            vec![("chr1".to_string(), 0, 2), ("chr2".to_string(), 0, 1)]
        );
        assert_eq!(outcome.unrecognized, 1);
        assert!(outcome.malformed.is_empty());
    }

    #[rstest]
    fn test_malformed_line_does_not_break_run(splitter: ChromosomeSplitter) {
        let input = "chr1 0 100 5\nchr1 100 abc 5\nchr1 200 300 5\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(runs(&outcome), vec![("chr1".to_string(), 0, 2)]);
        assert_eq!(outcome.malformed.len(), 1);
        assert_eq!(outcome.malformed[0].line_number, 2);
        assert_eq!(outcome.malformed[0].chrom, "chr1");
        let starts: Vec<u32> = outcome.datasets[0]
            .intervals()
            .iter()
            .map(Interval::start)
            .collect();
        assert_eq!(starts, vec![0, 200]);
    }

    #[rstest]
    fn test_malformed_line_of_other_chromosome_does_not_start_run(splitter: ChromosomeSplitter) {
        let input = "chr1 0 100 5\nchr2 x y z\nchr1 100 200 5\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(runs(&outcome), vec![("chr1".to_string(), 0, 2)]);
        assert_eq!(outcome.malformed[0].chrom, "chr2");
    }

    #[rstest]
    #[case("chr2 0 100 -3")]
    #[case("chr2 100 100 3")]
    fn test_invalid_interval_of_other_chromosome_does_not_break_run(
        splitter: ChromosomeSplitter,
        #[case] bad: &str,
    ) {
        let input = format!("chr1 0 100 5\n{bad}\nchr1 100 200 5\n");
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(runs(&outcome), vec![("chr1".to_string(), 0, 2)]);
        assert_eq!(outcome.malformed.len(), 1);
        assert_eq!(outcome.malformed[0].line_number, 2);
        assert_eq!(outcome.malformed[0].chrom, "chr2");
    }

    #[rstest]
    fn test_invalid_utf8_line_is_malformed(splitter: ChromosomeSplitter) {
        let input: &[u8] = b"chr1 0 100 5\nchr1 100 200 \xff\nchr1 200 300 5\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(runs(&outcome), vec![("chr1".to_string(), 0, 2)]);
        assert_eq!(outcome.malformed.len(), 1);
        assert_eq!(outcome.malformed[0].line_number, 2);
        assert_eq!(outcome.malformed[0].chrom, "chr1");
        assert_eq!(outcome.malformed[0].reason, "invalid UTF-8");
    }

    #[rstest]
    fn test_chromosome_with_path_separator_is_skipped(splitter: ChromosomeSplitter) {
        let input = "chr1 0 100 5\nchr1/../../escaped 0 100 5\nchr1 100 200 5\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(runs(&outcome), vec![("chr1".to_string(), 0, 2)]);
        assert_eq!(outcome.malformed.len(), 1);
    }

    #[rstest]
    fn test_noncontiguous_runs_are_not_merged(splitter: ChromosomeSplitter) {
        let input = "chr1 0 100 1\nchr2 0 100 1\nchr1 100 200 1\nchr1 200 300 1\n";
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(
            runs(&outcome),
            vec![
                ("chr1".to_string(), 0, 1),
                ("chr2".to_string(), 0, 1),
                ("chr1".to_string(), 1, 2)
            ]
        );
    }

    #[rstest]
    #[case("chr1 0 100 -3")]
    #[case("chr1 100 100 3")]
    fn test_invalid_values_are_malformed(splitter: ChromosomeSplitter, #[case] bad: &str) {
        let input = format!("chr1 0 100 1\n{bad}\n");
        let outcome = splitter.split(Cursor::new(input)).unwrap();

        assert_eq!(outcome.total_intervals(), 1);
        assert_eq!(outcome.malformed.len(), 1);
    }

    #[rstest]
    fn test_zero_count_gets_floor(splitter: ChromosomeSplitter) {
        let outcome = splitter.split(Cursor::new("chr1 0 100 0\n")).unwrap();
        assert_eq!(outcome.datasets[0].intervals()[0].read_count(), 0.5);
    }

    #[rstest]
    fn test_empty_input(splitter: ChromosomeSplitter) {
        let outcome = splitter.split(Cursor::new("")).unwrap();
        assert!(outcome.datasets.is_empty());
    }

    #[rstest]
    fn test_missing_file(splitter: ChromosomeSplitter) {
        let res = splitter.split_file(Path::new("../tests/data/does_not_exist.txt"));
        assert!(matches!(
            res,
            Err(gmim_core::GmimError::ResourceUnavailable { .. })
        ));
    }
}
