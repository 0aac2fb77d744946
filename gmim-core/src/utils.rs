use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::consts::CHROM_PREFIX;
use crate::errors::{GmimError, Result};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|e| GmimError::resource(path, e))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// One input line: `Ok` when it was valid UTF-8, otherwise `Err` with a lossy rendering.
pub type DecodedLine = std::result::Result<String, String>;

///
/// Read the next line into `buf` and decode it, dropping the line terminator.
///
/// Returns `None` at end of input. Bytes that are not UTF-8 do not make this
/// fail; the caller decides what to do with such a line.
///
pub fn read_decoded_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<DecodedLine>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8(std::mem::take(buf)).map_err(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })))
}

/// The four numeric-bearing columns of a raw read-count line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub chrom: &'a str,
    pub start: u32,
    pub end: u32,
    pub read_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Record(RawRecord<'a>),
    /// Looks like a data line for `chrom` but does not parse.
    Malformed { chrom: &'a str, reason: String },
    /// Headers, comments, blank lines and anything else without a chromosome name.
    Unrecognized,
}

///
/// Classify one raw input line: `chrom<ws>start<ws>end<ws>count`.
///
/// Lines that do not have exactly four fields with integral start/end/count
/// are not records, and neither are lines whose chromosome name contains a
/// path separator. Those whose first field carries the chromosome prefix are
/// reported as malformed, everything else is unrecognized.
///
pub fn parse_interval_line(line: &str) -> LineKind<'_> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let Some(&chrom) = fields.first() else {
        return LineKind::Unrecognized;
    };

    let malformed = |reason: String| {
        if chrom.starts_with(CHROM_PREFIX) {
            LineKind::Malformed { chrom, reason }
        } else {
            LineKind::Unrecognized
        }
    };

    if fields.len() != 4 {
        return malformed(format!("expected 4 fields, found {}", fields.len()));
    }
    // chromosome names end up in output file names
    if chrom.contains(['/', '\\']) {
        return malformed(format!("chromosome name {:?} contains a path separator", chrom));
    }

    let start = match fields[1].parse::<u32>() {
        Ok(v) => v,
        Err(_) => return malformed(format!("invalid start {:?}", fields[1])),
    };
    let end = match fields[2].parse::<u32>() {
        Ok(v) => v,
        Err(_) => return malformed(format!("invalid end {:?}", fields[2])),
    };
    let read_count = match fields[3].parse::<i64>() {
        Ok(v) => v,
        Err(_) => return malformed(format!("invalid read count {:?}", fields[3])),
    };

    LineKind::Record(RawRecord {
        chrom,
        start,
        end,
        read_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("chr1\t100\t200\t5")]
    #[case("chr1 100   200 5")]
    #[case("  chr1\t100 200\t5  ")]
    fn test_parse_record(#[case] line: &str) {
        assert_eq!(
            parse_interval_line(line),
            LineKind::Record(RawRecord {
                chrom: "chr1",
                start: 100,
                end: 200,
                read_count: 5
            })
        );
    }

    #[rstest]
    fn test_contig_without_prefix_is_still_a_record() {
        let kind = parse_interval_line("scaffold_7 0 100 3");
        assert!(matches!(kind, LineKind::Record(r) if r.chrom == "scaffold_7"));
    }

    #[rstest]
    #[case("chr1 100 abc 5")]
    #[case("chr1 100 200")]
    #[case("chr1 100 200 5 extra")]
    #[case("chr1 -5 200 5")]
    #[case("chr1 100 200 1.5")]
    fn test_parse_malformed(#[case] line: &str) {
        assert!(matches!(
            parse_interval_line(line),
            LineKind::Malformed { chrom: "chr1", .. }
        ));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("track type=bedGraph name=\"x\"")]
    #[case("#chrom start end count")]
    #[case("scaffold_7 100 abc 5")]
    fn test_parse_unrecognized(#[case] line: &str) {
        assert_eq!(parse_interval_line(line), LineKind::Unrecognized);
    }

    #[rstest]
    #[case("chr1/../../escaped 0 100 5")]
    #[case("chrUn\\x 0 100 5")]
    fn test_chromosome_with_separator_is_malformed(#[case] line: &str) {
        assert!(matches!(
            parse_interval_line(line),
            LineKind::Malformed { reason, .. } if reason.contains("path separator")
        ));
    }

    #[rstest]
    fn test_separator_without_prefix_is_unrecognized() {
        assert_eq!(
            parse_interval_line("x/../../escaped 0 100 5"),
            LineKind::Unrecognized
        );
    }

    #[rstest]
    fn test_read_decoded_line() {
        let mut reader = std::io::Cursor::new(b"chr1 0 100 5\r\nchr1 100 200 \xff\nlast".to_vec());
        let mut buf = Vec::new();

        let first = read_decoded_line(&mut reader, &mut buf).unwrap();
        assert_eq!(first, Some(Ok("chr1 0 100 5".to_string())));

        let second = read_decoded_line(&mut reader, &mut buf).unwrap();
        assert_eq!(second, Some(Err("chr1 100 200 \u{FFFD}".to_string())));

        let third = read_decoded_line(&mut reader, &mut buf).unwrap();
        assert_eq!(third, Some(Ok("last".to_string())));

        assert_eq!(read_decoded_line(&mut reader, &mut buf).unwrap(), None);
    }

    #[rstest]
    fn test_negative_count_parses_as_record() {
        // rejected later, when the interval is constructed
        let kind = parse_interval_line("chr2 0 100 -3");
        assert!(matches!(kind, LineKind::Record(r) if r.read_count == -3));
    }

    #[rstest]
    fn test_dynamic_reader_missing_file() {
        let res = get_dynamic_reader(Path::new("no/such/file.bed"));
        assert!(matches!(res, Err(GmimError::ResourceUnavailable { .. })));
    }

    #[rstest]
    fn test_dynamic_reader_gz() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::{BufRead, Write};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bed.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"chr1\t0\t100\t4\n").unwrap();
        enc.finish().unwrap();

        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["chr1\t0\t100\t4".to_string()]);
    }
}
