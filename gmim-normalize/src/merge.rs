use std::fs::remove_file;
use std::io::BufRead;
use std::path::Path;

use log::warn;

use gmim_core::bedgraph::{BedGraphWriter, TrackHeader};
use gmim_core::errors::Result;
use gmim_core::utils::get_dynamic_reader;

/// One slot of the whole-sample file, in chromosome-run order.
#[derive(Debug, Clone, Copy)]
pub enum MergeEntry<'a> {
    Chromosome(&'a Path),
    Omitted { chrom: &'a str, reason: &'a str },
}

///
/// Concatenate per-chromosome bedGraph files into one file under a single
/// track line. Omitted chromosomes are marked with a comment line at their
/// position. Returns the number of data lines written.
///
pub fn merge_chromosome_files(
    output: &Path,
    header: &TrackHeader,
    entries: &[MergeEntry<'_>],
) -> Result<usize> {
    let result = BedGraphWriter::create(output, header).and_then(|mut writer| {
        for entry in entries {
            match entry {
                MergeEntry::Chromosome(path) => {
                    let reader = get_dynamic_reader(path)?;
                    for line in reader.lines() {
                        let line = line?;
                        if line.starts_with("track") {
                            continue;
                        }
                        writer.write_raw_line(&line)?;
                    }
                }
                MergeEntry::Omitted { chrom, reason } => {
                    writer.write_comment(&format!("{chrom} omitted: {reason}"))?;
                }
            }
        }
        writer.finish()
    });

    if result.is_err() && output.exists() {
        if let Err(e) = remove_file(output) {
            warn!("Could not remove partial output {}: {}", output.display(), e);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs::{read_to_string, write};
    use tempfile::tempdir;

    #[rstest]
    fn test_merge_keeps_entry_order() {
        let tmp = tempdir().unwrap();
        let chr2 = tmp.path().join("out_chr2.bedGraph");
        let chr1 = tmp.path().join("out_chr1.bedGraph");
        write(&chr1, "track name=\"out_chr1\"\nchr1\t0\t100\t0.10000\n").unwrap();
        write(&chr2, "track name=\"out_chr2\"\nchr2\t0\t100\t0.20000\nchr2\t100\t200\t0.30000\n")
            .unwrap();

        let merged = tmp.path().join("out_allChr.bedGraph");
        let header = TrackHeader::Sample {
            name: merged.display().to_string(),
        };
        let written = merge_chromosome_files(
            &merged,
            &header,
            &[
                MergeEntry::Chromosome(&chr2),
                MergeEntry::Omitted {
                    chrom: "chr3",
                    reason: "noise level estimated to be 0",
                },
                MergeEntry::Chromosome(&chr1),
            ],
        )
        .unwrap();

        assert_eq!(written, 3);
        let content = read_to_string(&merged).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], header.to_string());
        assert_eq!(
            lines[1..].to_vec(),
            vec![
                "chr2\t0\t100\t0.20000",
                "chr2\t100\t200\t0.30000",
                "# chr3 omitted: noise level estimated to be 0",
                "chr1\t0\t100\t0.10000",
            ]
        );
    }

    #[rstest]
    fn test_missing_part_removes_merged_file() {
        let tmp = tempdir().unwrap();
        let merged = tmp.path().join("out_allChr.bedGraph");
        let missing = tmp.path().join("nope.bedGraph");
        let header = TrackHeader::Sample {
            name: "out_allChr".to_string(),
        };

        let res = merge_chromosome_files(&merged, &header, &[MergeEntry::Chromosome(&missing)]);
        assert!(res.is_err());
        assert!(!merged.exists());
    }
}
