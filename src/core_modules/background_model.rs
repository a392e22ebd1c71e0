// THEORY:
// The `BackgroundModel` owns the grid of per-pixel histograms. It is the only place
// in the crate that mutates a `Pmf`; the subtractor feeds it quantized frames and
// masks and the model decides how each pixel's memory changes.
//
// Key architectural principles:
// 1.  **Contiguous arena**: all histograms live in one `Vec` allocated at
//     construction and indexed row-major, mirroring the sensor layout.
// 2.  **Two learning modes**: `train` accumulates raw counts with FIFO eviction,
//     `normalize` turns them into probabilities, and `adapt` applies the runtime
//     moving-average update to background pixels only.
// 3.  **Foreground is never learned**: `adapt` skips pixels whose smoothed decision
//     is foreground, so a person standing still is not absorbed immediately.

use std::fmt;

use crate::core_modules::pmf::{Pmf, Weight};
use crate::core_modules::quantizer::quantizer::Bucket;

/// A width × height grid of histograms with `F` features per pixel.
#[derive(Debug, Clone)]
pub struct BackgroundModel<const F: usize> {
    width: usize,
    height: usize,
    histograms: Vec<Pmf<F>>,
}

impl<const F: usize> BackgroundModel<F> {
    /// Creates an empty model. Every histogram starts with zero features.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            histograms: vec![Pmf::new(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn histograms(&self) -> &[Pmf<F>] {
        &self.histograms
    }

    /// The histogram of the pixel at row-major `index`.
    pub fn histogram(&self, index: usize) -> &Pmf<F> {
        &self.histograms[index]
    }

    /// Empties every histogram.
    pub fn clear(&mut self) {
        self.histograms.iter_mut().for_each(Pmf::clear);
    }

    /// Adds one training observation per pixel.
    pub fn train(&mut self, buckets: &[Bucket]) {
        debug_assert_eq!(buckets.len(), self.histograms.len());
        for (pmf, &bucket) in self.histograms.iter_mut().zip(buckets) {
            pmf.accumulate(bucket);
        }
    }

    /// Normalizes every histogram into a PMF. Returns the number of pixels that had
    /// no observations and were left empty.
    pub fn normalize(&mut self) -> usize {
        self.histograms
            .iter_mut()
            .map(|pmf| pmf.normalize())
            .filter(|normalized| !normalized)
            .count()
    }

    /// Runtime update: every pixel whose `foreground` flag is clear adapts towards its
    /// current bucket.
    pub fn adapt(&mut self, buckets: &[Bucket], foreground: &[bool], learning_rate: Weight) {
        debug_assert_eq!(buckets.len(), self.histograms.len());
        debug_assert_eq!(foreground.len(), self.histograms.len());
        let cells = self.histograms.iter_mut().zip(buckets).zip(foreground);
        for ((pmf, &bucket), &is_foreground) in cells {
            if !is_foreground {
                pmf.adapt(bucket, learning_rate);
            }
        }
    }

    /// Total number of occupied features across the grid.
    pub fn feature_count(&self) -> usize {
        self.histograms.iter().map(Pmf::len).sum()
    }
}

/// Dumps the model one grid row at a time: a header with the pixel coordinates, then
/// one line per feature slot with `value, weight` columns.
impl<const F: usize> fmt::Display for BackgroundModel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row = &self.histograms[y * self.width..(y + 1) * self.width];
            for x in 0..self.width {
                write!(f, "{:<12}", format!("({x}, {y})"))?;
            }
            writeln!(f)?;

            let deepest = row.iter().map(Pmf::len).max().unwrap_or(0);
            for slot in 0..deepest {
                for pmf in row {
                    match pmf.features().get(slot) {
                        Some(feature) => {
                            let cell = format!("{:02}, {:.2}", feature.value, feature.weight);
                            write!(f, "{cell:<12}")?
                        }
                        None => write!(f, "{:<12}", "")?,
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
