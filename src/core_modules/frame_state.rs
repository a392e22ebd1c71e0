// THEORY:
// `FrameState` holds the per-update scratch grids: quantized buckets, foreground
// posteriors, the raw decision mask and the smoothed mask. They are allocated once
// with the subtractor and overwritten on every update, so the hot path never
// allocates. Only the smoothed mask and the posteriors are visible to callers.

use crate::core_modules::classifier::Probability;
use crate::core_modules::quantizer::quantizer::Bucket;

#[derive(Debug, Clone)]
pub struct FrameState {
    pub buckets: Vec<Bucket>,
    pub posteriors: Vec<Probability>,
    /// Thresholded posteriors before smoothing.
    pub raw_mask: Vec<bool>,
    /// The final decision after isolated pixels were removed.
    pub mask: Vec<bool>,
}

impl FrameState {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            buckets: vec![0; pixel_count],
            posteriors: vec![0.0; pixel_count],
            raw_mask: vec![false; pixel_count],
            mask: vec![false; pixel_count],
        }
    }

    /// Marks every pixel as background with zero confidence. Buckets are kept.
    pub fn clear_decisions(&mut self) {
        self.posteriors.fill(0.0);
        self.raw_mask.fill(false);
        self.mask.fill(false);
    }

    pub fn clear(&mut self) {
        self.buckets.fill(0);
        self.clear_decisions();
    }
}
