use std::collections::VecDeque;
use std::sync::Arc;

use gmim_core::config::NormalizationConfig;
use gmim_core::errors::{GmimError, Result};
use gmim_core::models::Interval;

/// Where a window is in its life over one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Filling up at the chromosome start; nothing can be scored yet.
    Growing,
    /// Has been full at least once; the front is evicted as the center moves.
    SteadyState,
    /// The chromosome is exhausted; `remaining` buffered intervals still need a score.
    Draining { remaining: usize },
}

///
/// The bounded run of intervals around the position being scored.
///
/// The window's logical bounds follow the center coordinate but are clamped
/// to the first coordinate of the chromosome, so at the chromosome start the
/// center walks from the first interval up to the middle of the window before
/// anything is evicted. Once the chromosome is exhausted nothing is evicted
/// anymore and the center walks to the last buffered interval.
///
#[derive(Debug)]
pub struct NoiseWindow {
    chrom: Arc<str>,
    interval_width: u32,
    capacity: usize,
    /// bins between the window start and its center once the window is away from the chromosome start
    center_offset: usize,
    median_multiplier: f64,

    abs_start: i64,
    position: i64,
    start: i64,
    end: i64,

    intervals: VecDeque<Interval>,
    center: usize,
    state: WindowState,
}

impl NoiseWindow {
    ///
    /// Create an empty window for one chromosome.
    ///
    /// # Arguments
    /// - chrom: chromosome name
    /// - interval_width: bin width of this chromosome, taken from its first interval
    /// - abs_start: start coordinate of the first interval of the chromosome
    /// - config: normalization parameters
    ///
    pub fn new(
        chrom: Arc<str>,
        interval_width: u32,
        abs_start: u32,
        config: &NormalizationConfig,
    ) -> Result<Self> {
        let capacity = config.window_capacity(interval_width).ok_or_else(|| {
            GmimError::ConfigurationMismatch {
                chrom: chrom.to_string(),
                window_size: config.window_size,
                interval_width,
            }
        })?;

        let mut window = NoiseWindow {
            chrom,
            interval_width,
            capacity,
            center_offset: (capacity - 1) / 2,
            median_multiplier: config.median_multiplier,
            abs_start: abs_start as i64,
            position: abs_start as i64,
            start: abs_start as i64,
            end: abs_start as i64,
            intervals: VecDeque::with_capacity(capacity),
            center: 0,
            state: WindowState::Growing,
        };
        window.calc_bounds();
        Ok(window)
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_draining(&self) -> bool {
        matches!(self.state, WindowState::Draining { .. })
    }

    /// Logical `[start, end)` coordinates the window currently spans.
    pub fn bounds(&self) -> (i64, i64) {
        (self.start, self.end)
    }

    ///
    /// Append the next interval of the chromosome.
    ///
    /// Fails when the window is already at capacity or the chromosome was
    /// marked as exhausted; check [`NoiseWindow::to_fill`] first.
    ///
    pub fn insert(&mut self, interval: Interval) -> Result<()> {
        if self.intervals.len() >= self.capacity || self.is_draining() {
            return Err(GmimError::WindowFull(self.capacity));
        }
        self.intervals.push_back(interval);
        if self.is_full() && self.state == WindowState::Growing {
            self.state = WindowState::SteadyState;
        }
        Ok(())
    }

    /// Number of intervals still needed to reach capacity.
    pub fn to_fill(&self) -> usize {
        self.capacity.saturating_sub(self.intervals.len())
    }

    pub fn is_full(&self) -> bool {
        self.intervals.len() == self.capacity
    }

    /// Buffered intervals at or after the center, i.e. still waiting for a score.
    pub fn remaining(&self) -> usize {
        match self.state {
            WindowState::Draining { remaining } => remaining,
            _ => self.intervals.len().saturating_sub(self.center),
        }
    }

    ///
    /// Score the interval at the center and return it.
    ///
    /// The noise floor is the median read count of the whole window times the
    /// median multiplier; the score is `1 - exp(-z^2 / 2)` with `z` the center
    /// read count over the noise floor.
    ///
    pub fn score(&mut self) -> Result<&Interval> {
        if self.state == WindowState::Growing || self.center >= self.intervals.len() {
            return Err(GmimError::WindowNotReady {
                size: self.intervals.len(),
                capacity: self.capacity,
            });
        }

        let noise = self.median_multiplier * self.median();
        if noise == 0.0 {
            return Err(GmimError::DegenerateNoiseFloor {
                chrom: self.chrom.to_string(),
                start: self.start,
                end: self.end,
                position: self.position,
            });
        }

        let interval = &mut self.intervals[self.center];
        let z = interval.read_count() / noise;
        interval.set_score(cmbf(z))?;

        Ok(&self.intervals[self.center])
    }

    ///
    /// Move the center one bin forward.
    ///
    /// Outside of draining, scored intervals that now lie before the window
    /// start are evicted from the front.
    ///
    pub fn advance_center(&mut self) {
        self.center += 1;
        self.position = match self.intervals.get(self.center) {
            Some(interval) => interval.start() as i64,
            None => self.position + self.interval_width as i64,
        };
        self.calc_bounds();

        match self.state {
            WindowState::Draining { remaining } => {
                self.state = WindowState::Draining {
                    remaining: remaining.saturating_sub(1),
                };
            }
            _ => {
                while self.center > 0
                    && self
                        .intervals
                        .front()
                        .is_some_and(|front| (front.start() as i64) < self.start)
                {
                    self.intervals.pop_front();
                    self.center -= 1;
                }
            }
        }
    }

    /// Stop evicting and growing; from here on only the center moves.
    pub fn mark_end_of_chromosome(&mut self) {
        if !self.is_draining() {
            self.state = WindowState::Draining {
                remaining: self.intervals.len().saturating_sub(self.center),
            };
        }
    }

    ///
    /// Shrink the capacity to what is buffered so a chromosome shorter than
    /// one window can still be scored. Returns the new capacity.
    ///
    pub fn shrink_to_available(&mut self) -> usize {
        self.capacity = self.intervals.len();
        if let Some(last) = self.intervals.back() {
            self.end = last.end() as i64;
        }
        self.capacity
    }

    fn calc_bounds(&mut self) {
        let width = self.interval_width as i64;
        if !self.is_draining() {
            self.start = self.position - self.center_offset as i64 * width;
            self.end = self.start + self.capacity as i64 * width;
        }
        if self.start < self.abs_start {
            self.end = self.end - self.start + self.abs_start;
            self.start = self.abs_start;
        }
    }

    fn median(&self) -> f64 {
        let mut counts: Vec<f64> = self.intervals.iter().map(Interval::read_count).collect();
        counts.sort_by(f64::total_cmp);
        median_of_sorted(&counts)
    }
}

/// Median of an ascending slice; the mean of the two central values for even lengths.
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        n if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        n => sorted[n / 2],
    }
}

/// `1 - exp(-z^2 / 2)`
pub fn cmbf(z: f64) -> f64 {
    1.0 - (-(z * z) / 2.0).exp()
}
