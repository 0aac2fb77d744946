use std::fmt::{self, Display};
use std::sync::Arc;

use crate::consts::SCORE_PRECISION;
use crate::errors::{GmimError, Result};

///
/// One genomic bin with its raw read count and, once computed, its score.
///
/// Coordinates are half-open, `[start, end)`. A raw count of exactly zero is
/// replaced by the configured floor at construction so that the noise
/// estimate of a window can never collapse because of empty bins alone.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    chrom: Arc<str>,
    start: u32,
    end: u32,
    read_count: f64,
    score: Option<f64>,
}

impl Interval {
    ///
    /// Create a new interval.
    ///
    /// # Arguments
    /// - chrom: chromosome name, shared between all intervals of a run
    /// - start: inclusive start
    /// - end: exclusive end, must be greater than `start`
    /// - read_count: raw count, must not be negative
    /// - min_read_count: floor substituted for a count of exactly zero
    ///
    pub fn new(
        chrom: Arc<str>,
        start: u32,
        end: u32,
        read_count: i64,
        min_read_count: f64,
    ) -> Result<Self> {
        if end <= start {
            return Err(GmimError::InvalidCoordinates {
                chrom: chrom.to_string(),
                start,
                end,
            });
        }

        let read_count = match read_count {
            rc if rc > 0 => rc as f64,
            0 => min_read_count,
            rc => return Err(GmimError::NegativeReadCount(rc)),
        };

        Ok(Interval {
            chrom,
            start,
            end,
            read_count,
            score: None,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn chrom_arc(&self) -> &Arc<str> {
        &self.chrom
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    pub fn read_count(&self) -> f64 {
        self.read_count
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    ///
    /// Assign the score. Scores are write-once and must lie in `[0, 1]`.
    ///
    pub fn set_score(&mut self, score: f64) -> Result<()> {
        if self.score.is_some() {
            return Err(GmimError::ScoreAlreadySet {
                chrom: self.chrom.to_string(),
                start: self.start,
                end: self.end,
            });
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(GmimError::ScoreOutOfRange {
                chrom: self.chrom.to_string(),
                start: self.start,
                end: self.end,
                score,
            });
        }
        self.score = Some(score);
        Ok(())
    }
}

impl Display for Interval {
    /// bedGraph data line; the score column is omitted until a score is set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(
                f,
                "{}\t{}\t{}\t{:.*}",
                self.chrom, self.start, self.end, SCORE_PRECISION, score
            ),
            None => write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn chr1() -> Arc<str> {
        Arc::from("chr1")
    }

    #[rstest]
    fn test_zero_count_uses_floor() {
        let iv = Interval::new(chr1(), 0, 100, 0, 0.5).unwrap();
        assert_eq!(iv.read_count(), 0.5);
        assert_eq!(iv.width(), 100);
    }

    #[rstest]
    fn test_positive_count_is_kept() {
        let iv = Interval::new(chr1(), 0, 100, 7, 0.5).unwrap();
        assert_eq!(iv.read_count(), 7.0);
    }

    #[rstest]
    fn test_negative_count_is_rejected() {
        let res = Interval::new(chr1(), 0, 100, -1, 0.5);
        assert!(matches!(res, Err(GmimError::NegativeReadCount(-1))));
    }

    #[rstest]
    #[case(100, 100)]
    #[case(200, 100)]
    fn test_bad_coordinates_are_rejected(#[case] start: u32, #[case] end: u32) {
        let res = Interval::new(chr1(), start, end, 1, 0.5);
        assert!(matches!(res, Err(GmimError::InvalidCoordinates { .. })));
    }

    #[rstest]
    fn test_score_is_write_once() {
        let mut iv = Interval::new(chr1(), 0, 100, 3, 0.5).unwrap();
        iv.set_score(0.25).unwrap();
        assert_eq!(iv.score(), Some(0.25));
        assert!(matches!(
            iv.set_score(0.5),
            Err(GmimError::ScoreAlreadySet { .. })
        ));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_score_out_of_range(#[case] score: f64) {
        let mut iv = Interval::new(chr1(), 0, 100, 3, 0.5).unwrap();
        assert!(matches!(
            iv.set_score(score),
            Err(GmimError::ScoreOutOfRange { .. })
        ));
        assert_eq!(iv.score(), None);
    }

    #[rstest]
    fn test_display_uses_five_decimals() {
        let mut iv = Interval::new(chr1(), 100, 200, 3, 0.5).unwrap();
        iv.set_score(0.393469).unwrap();
        assert_eq!(iv.to_string(), "chr1\t100\t200\t0.39347");
    }
}
