//! Reading and writing of normalized bedGraph files.

use std::fmt::{self, Display};
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::consts::SCORE_PRECISION;
use crate::errors::{GmimError, Result};
use crate::models::Interval;
use crate::utils::read_decoded_line;

const TRACK_ATTRIBUTES: &str =
    "visibility=full autoScale=Off alwaysZero=On maxHeightPixels=128:30:11 viewLimits=0:1";
const INTEGRATION_COLOR: &str = "255,30,30";

/// The `track` line opening every output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackHeader {
    Sample { name: String },
    Integration { name: String },
}

impl Display for TrackHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackHeader::Sample { name } => write!(
                f,
                "track type=bedGraph name=\"{name}\" description=\"{name}\" {TRACK_ATTRIBUTES}"
            ),
            TrackHeader::Integration { name } => write!(
                f,
                "track type=bedGraph name=\"{name}\" {TRACK_ATTRIBUTES} color={INTEGRATION_COLOR}"
            ),
        }
    }
}

/// One data line of a normalized (or integrated) bedGraph file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub score: f64,
}

impl ScoredRecord {
    ///
    /// Parse `chrom<ws>start<ws>end<ws>score`. Returns `None` if the line
    /// does not have that shape.
    ///
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let chrom = fields.next()?;
        let start = fields.next()?.parse::<u32>().ok()?;
        let end = fields.next()?.parse::<u32>().ok()?;
        let score = fields.next()?.parse::<f64>().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some(ScoredRecord {
            chrom: chrom.to_string(),
            start,
            end,
            score,
        })
    }

    pub fn same_region(&self, other: &ScoredRecord) -> bool {
        self.chrom == other.chrom && self.start == other.start && self.end == other.end
    }

    pub fn region(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl Display for ScoredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{:.*}",
            self.chrom, self.start, self.end, SCORE_PRECISION, self.score
        )
    }
}

fn is_header_line(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty()
        || line.starts_with("track")
        || line.starts_with("browser")
        || line.starts_with('#')
}

///
/// Iterator over the data lines of a bedGraph stream. Track, browser,
/// comment and blank lines are skipped; any other line that does not parse
/// is returned as a `MalformedInput` error.
///
pub struct ScoredRecords<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> ScoredRecords<R> {
    pub fn new(reader: R) -> Self {
        ScoredRecords {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ScoredRecords<R> {
    type Item = Result<ScoredRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let decoded = match read_decoded_line(&mut self.reader, &mut self.buf) {
                Ok(decoded) => decoded?,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            let line = match decoded {
                Ok(line) => line,
                Err(lossy) => {
                    return Some(Err(GmimError::MalformedInput {
                        line_number: self.line_number,
                        line: lossy,
                        reason: "invalid UTF-8".to_string(),
                    }));
                }
            };

            if is_header_line(&line) {
                continue;
            }

            return Some(ScoredRecord::parse(&line).ok_or(GmimError::MalformedInput {
                line_number: self.line_number,
                line,
                reason: "expected chrom, start, end and score".to_string(),
            }));
        }
    }
}

/// Buffered bedGraph writer that counts the data lines it emits.
pub struct BedGraphWriter<W: Write> {
    out: W,
    data_lines: usize,
}

impl BedGraphWriter<BufWriter<File>> {
    ///
    /// Create the file (and its parent directories) and write the track line.
    ///
    pub fn create(path: &Path, header: &TrackHeader) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent).map_err(|e| GmimError::resource(parent, e))?;
            }
        }
        let file = File::create(path).map_err(|e| GmimError::resource(path, e))?;
        BedGraphWriter::new(BufWriter::new(file), header)
    }
}

impl<W: Write> BedGraphWriter<W> {
    pub fn new(mut out: W, header: &TrackHeader) -> Result<Self> {
        writeln!(out, "{}", header)?;
        Ok(BedGraphWriter { out, data_lines: 0 })
    }

    pub fn write_interval(&mut self, interval: &Interval) -> Result<()> {
        writeln!(self.out, "{}", interval)?;
        self.data_lines += 1;
        Ok(())
    }

    pub fn write_record(&mut self, record: &ScoredRecord) -> Result<()> {
        writeln!(self.out, "{}", record)?;
        self.data_lines += 1;
        Ok(())
    }

    pub fn write_comment(&mut self, comment: &str) -> Result<()> {
        writeln!(self.out, "# {}", comment)?;
        Ok(())
    }

    /// Copy raw data lines verbatim.
    pub fn write_raw_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        self.data_lines += 1;
        Ok(())
    }

    pub fn data_lines(&self) -> usize {
        self.data_lines
    }

    /// Flush and hand back the number of data lines written.
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.data_lines)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
