use std::fs::remove_file;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use gmim_core::bedgraph::{BedGraphWriter, ScoredRecord, ScoredRecords};
use gmim_core::consts::BEDGRAPH_EXT;
use gmim_core::errors::{GmimError, Result};
use gmim_core::layout::integration_header;
use gmim_core::utils::get_dynamic_reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockstepSummary {
    pub lines: usize,
    /// Inputs ran out at different points; output stopped at the shortest one.
    pub truncated: bool,
}

///
/// Walk all inputs one record at a time and write, per step, the product
/// of their scores. Every input must carry the same chromosome, start and
/// end at each step. Stops as soon as any input is exhausted.
///
pub fn integrate_readers<R: BufRead, W: Write>(
    mut inputs: Vec<ScoredRecords<R>>,
    writer: &mut BedGraphWriter<W>,
) -> Result<LockstepSummary> {
    let mut lines = 0;

    loop {
        let mut step: Vec<ScoredRecord> = Vec::with_capacity(inputs.len());
        let mut exhausted = 0;
        for input in inputs.iter_mut() {
            match input.next() {
                Some(record) => step.push(record?),
                None => exhausted += 1,
            }
        }

        if exhausted > 0 {
            let truncated = exhausted < inputs.len();
            return Ok(LockstepSummary { lines, truncated });
        }

        let Some((first, rest)) = step.split_first() else {
            return Ok(LockstepSummary {
                lines,
                truncated: false,
            });
        };
        if let Some(other) = rest.iter().find(|r| !first.same_region(r)) {
            return Err(GmimError::RegionMismatch {
                expected: first.region(),
                found: other.region(),
            });
        }

        let product: f64 = step.iter().map(|r| r.score).product();
        writer.write_record(&ScoredRecord {
            chrom: first.chrom.clone(),
            start: first.start,
            end: first.end,
            score: product,
        })?;
        lines += 1;
    }
}

/// Result of integrating one set of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegratedFile {
    pub path: PathBuf,
    pub lines: usize,
    pub truncated: bool,
}

///
/// Integrate an explicit list of normalized bedGraph files into `output`.
///
/// At least two inputs are required and each must be a `.bedGraph` file.
/// A failed integration leaves no output file behind.
///
pub fn integrate_files(output: &Path, inputs: &[PathBuf]) -> Result<IntegratedFile> {
    if inputs.len() < 2 {
        return Err(GmimError::InvalidConfig(format!(
            "Must include at least two files to integrate, got {}",
            inputs.len()
        )));
    }
    if let Some(bad) = inputs
        .iter()
        .find(|p| p.extension().is_none_or(|ext| ext != BEDGRAPH_EXT))
    {
        return Err(GmimError::InvalidConfig(format!(
            "Incorrect filetype, must be a .{}: {}",
            BEDGRAPH_EXT,
            bad.display()
        )));
    }

    let readers = inputs
        .iter()
        .map(|path| get_dynamic_reader(path).map(ScoredRecords::new))
        .collect::<Result<Vec<_>>>()?;

    let result = BedGraphWriter::create(output, &integration_header(output)).and_then(|mut writer| {
        let summary = integrate_readers(readers, &mut writer)?;
        writer.finish()?;
        Ok(summary)
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if output.exists() {
                if let Err(rm) = remove_file(output) {
                    warn!("Could not remove partial output {}: {}", output.display(), rm);
                }
            }
            return Err(e);
        }
    };

    if summary.truncated {
        warn!(
            "{}: inputs have different lengths, stopped after {} lines",
            output.display(),
            summary.lines
        );
    }
    info!("Integrated {} lines into {}", summary.lines, output.display());

    Ok(IntegratedFile {
        path: output.to_path_buf(),
        lines: summary.lines,
        truncated: summary.truncated,
    })
}
