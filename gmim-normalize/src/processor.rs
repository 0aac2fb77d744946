use std::fs::remove_file;
use std::path::Path;

use log::{debug, warn};

use gmim_core::bedgraph::{BedGraphWriter, TrackHeader};
use gmim_core::config::NormalizationConfig;
use gmim_core::errors::Result;
use gmim_core::models::{ChromosomeDataset, Interval};

use crate::window::NoiseWindow;

///
/// Drives a [`NoiseWindow`] across one chromosome and emits every interval,
/// in input order, exactly once with its score set.
///
#[derive(Debug, Clone)]
pub struct ChromosomeProcessor {
    config: NormalizationConfig,
}

impl ChromosomeProcessor {
    pub fn new(config: NormalizationConfig) -> Self {
        ChromosomeProcessor { config }
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    ///
    /// Score a chromosome, handing each scored interval to `emit` as soon as
    /// it is final. Returns the number of intervals emitted.
    ///
    /// The bin width is taken from the first interval. Nothing is emitted
    /// until the window has filled up once; when the input runs out the
    /// window stops evicting and the remaining buffered intervals are scored
    /// against it, shrinking it first if it never filled.
    ///
    pub fn process<F>(&self, dataset: ChromosomeDataset, mut emit: F) -> Result<usize>
    where
        F: FnMut(&Interval) -> Result<()>,
    {
        let (Some(width), Some(first)) = (dataset.interval_width(), dataset.intervals().first())
        else {
            return Ok(0);
        };
        let abs_start = first.start();
        let chrom = dataset.chrom_arc().clone();

        let mut window = NoiseWindow::new(chrom, width, abs_start, &self.config)?;
        let mut emitted = 0;

        let mut intervals = dataset.into_intervals().into_iter().peekable();
        while let Some(interval) = intervals.next() {
            if interval.width() != width {
                debug!(
                    "{}:{}-{} is {}bp wide, expected {}bp",
                    interval.chrom(),
                    interval.start(),
                    interval.end(),
                    interval.width(),
                    width
                );
            }
            window.insert(interval)?;

            while window.is_full() && !window.is_draining() {
                emit(window.score()?)?;
                emitted += 1;

                if intervals.peek().is_none() {
                    window.mark_end_of_chromosome();
                }
                window.advance_center();
            }
        }

        window.mark_end_of_chromosome();
        if !window.is_full() {
            let capacity = window.shrink_to_available();
            debug!(
                "{} is shorter than one window, scoring against {} intervals",
                window.chrom(),
                capacity
            );
        }

        while window.remaining() > 0 {
            emit(window.score()?)?;
            emitted += 1;
            window.advance_center();
        }

        Ok(emitted)
    }

    pub fn process_to_vec(&self, dataset: ChromosomeDataset) -> Result<Vec<Interval>> {
        let mut scored = Vec::with_capacity(dataset.len());
        self.process(dataset, |interval| {
            scored.push(interval.clone());
            Ok(())
        })?;
        Ok(scored)
    }

    ///
    /// Score a chromosome straight into a bedGraph file. On failure the
    /// partially written file is removed.
    ///
    pub fn process_to_file(
        &self,
        dataset: ChromosomeDataset,
        path: &Path,
        header: &TrackHeader,
    ) -> Result<usize> {
        let result = BedGraphWriter::create(path, header).and_then(|mut writer| {
            self.process(dataset, |interval| writer.write_interval(interval))?;
            writer.finish()
        });

        if result.is_err() && path.exists() {
            if let Err(e) = remove_file(path) {
                warn!("Could not remove partial output {}: {}", path.display(), e);
            }
        }

        result
    }
}
