// THEORY:
// The `subtractor` module is the public face of the crate. `GmgBackgroundSubtractor`
// wires the four stages together and owns all of their state:
//
//   raw readings -> quantizer -> training histograms            (Training)
//   raw readings -> quantizer -> classifier -> smoother -> adapt (Runtime)
//
// Key architectural principles:
// 1.  **Explicit phase**: the subtractor is either `Training` or `Runtime`. The
//     transition happens exactly once, right after the final training frame has been
//     accumulated and the histograms normalized. Only `reset` goes back.
// 2.  **Validated parameters**: the configuration is checked at construction and on
//     every setter. Changing a parameter never resets the model.
// 3.  **Allocation-free updates**: every buffer is sized at construction; `update`
//     only overwrites them.
// 4.  **Fail fast on misuse**: a frame of the wrong size is rejected with an error
//     before any state changes, and an out-of-range pixel query panics.

use log::{debug, trace, warn};

use crate::config::{self, GmgConfig};
use crate::core_modules::background_model::BackgroundModel;
use crate::core_modules::classifier::{self, Probability};
use crate::core_modules::frame_state::FrameState;
use crate::core_modules::pmf::Pmf;
use crate::core_modules::quantizer::quantizer::{self, Reading};
use crate::core_modules::smoother::{self, Connectivity};
use crate::error::{GmgError, Result};

/// Default histogram capacity, sized for an 8×8 Grid-EYE.
pub const DEFAULT_MAX_FEATURES: usize = 32;

/// The lifecycle stage of a subtractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accumulating raw counts into the background histograms.
    Training,
    /// Classifying readings and adapting the histograms of background pixels.
    Runtime,
}

/// The answer to "is this pixel foreground?" for the most recent update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FgResult {
    /// The smoothed binary decision.
    pub is_foreground: bool,
    /// The posterior probability of foreground, before smoothing.
    pub confidence: Probability,
}

/// GMG background subtractor over a fixed grid with `F` histogram features per pixel.
#[derive(Debug, Clone)]
pub struct GmgBackgroundSubtractor<const F: usize = DEFAULT_MAX_FEATURES> {
    config: GmgConfig,
    model: BackgroundModel<F>,
    frame: FrameState,
    phase: Phase,
    frame_count: u64,
}

impl Default for GmgBackgroundSubtractor {
    fn default() -> Self {
        let config = GmgConfig::default();
        Self::build(config)
    }
}

impl<const F: usize> GmgBackgroundSubtractor<F> {
    pub fn new(config: GmgConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GmgConfig) -> Self {
        let pixel_count = config.pixel_count();
        let mut subtractor = Self {
            model: BackgroundModel::new(config.width, config.height),
            frame: FrameState::new(pixel_count),
            phase: Phase::Training,
            frame_count: 0,
            config,
        };
        subtractor.reset();
        subtractor
    }

    /// Forgets everything learned and starts training again.
    pub fn reset(&mut self) {
        self.model.clear();
        self.frame.clear();
        self.frame_count = 0;
        self.phase = if self.config.training_frames == 0 {
            Phase::Runtime
        } else {
            Phase::Training
        };
        debug!(
            "GMG model reset: {}x{} grid, {} training frames",
            self.config.width, self.config.height, self.config.training_frames
        );
    }

    /// Runs one full cycle over a row-major frame of `width * height` readings.
    pub fn update(&mut self, readings: &[Reading]) -> Result<()> {
        let expected = self.config.pixel_count();
        if readings.len() != expected {
            warn!("Rejected frame with {} readings, expected {}", readings.len(), expected);
            return Err(GmgError::FrameSize {
                expected,
                actual: readings.len(),
            });
        }

        quantizer::quantize_frame(
            readings,
            self.config.min_value,
            self.config.max_value,
            self.config.quantization_levels,
            &mut self.frame.buckets,
        );

        match self.phase {
            Phase::Training => {
                self.model.train(&self.frame.buckets);
                self.frame.clear_decisions();
                self.frame_count += 1;
                self.finish_training_if_due();
            }
            Phase::Runtime => {
                self.classify();
                self.frame_count += 1;
            }
        }
        Ok(())
    }

    fn classify(&mut self) {
        let frame = &mut self.frame;
        classifier::classify_frame(
            self.model.histograms(),
            &frame.buckets,
            self.config.background_prior,
            self.config.decision_threshold,
            &mut frame.posteriors,
            &mut frame.raw_mask,
        );
        smoother::remove_isolated(
            &frame.raw_mask,
            &mut frame.mask,
            self.config.width,
            self.config.height,
            self.config.connectivity,
        );
        if self.config.update_background_model {
            self.model.adapt(&frame.buckets, &frame.mask, self.config.learning_rate);
        }
    }

    /// Normalizes and enters `Runtime` once enough training frames were seen.
    fn finish_training_if_due(&mut self) {
        if self.phase != Phase::Training || self.frame_count < self.config.training_frames {
            return;
        }

        let untrained = self.model.normalize();
        self.phase = Phase::Runtime;
        debug!(
            "GMG training finished after {} frames ({} features, {} empty pixels)",
            self.frame_count,
            self.model.feature_count(),
            untrained
        );
        trace!("Background model at end of training:\n{}", self.model);
    }

    /// The result for the pixel at row-major `index`.
    ///
    /// # Panics
    /// If `index >= width * height`.
    pub fn is_foreground(&self, index: usize) -> FgResult {
        let pixel_count = self.config.pixel_count();
        assert!(index < pixel_count, "pixel index {index} out of range for {pixel_count} pixels");
        FgResult {
            is_foreground: self.frame.mask[index],
            confidence: self.frame.posteriors[index],
        }
    }

    /// The result for the pixel at column `x`, row `y`.
    ///
    /// # Panics
    /// If the coordinate lies outside the grid.
    pub fn is_foreground_at(&self, x: usize, y: usize) -> FgResult {
        assert!(
            x < self.config.width && y < self.config.height,
            "pixel ({x}, {y}) out of range for a {}x{} grid",
            self.config.width,
            self.config.height
        );
        self.is_foreground(y * self.config.width + x)
    }

    pub fn is_training(&self) -> bool {
        self.phase == Phase::Training
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of frames processed since construction or the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &GmgConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn model(&self) -> &BackgroundModel<F> {
        &self.model
    }

    pub fn histogram(&self, index: usize) -> &Pmf<F> {
        self.model.histogram(index)
    }

    /// The smoothed mask of the last update, row-major.
    pub fn foreground_mask(&self) -> &[bool] {
        &self.frame.mask
    }

    /// The foreground posteriors of the last update, row-major.
    pub fn confidences(&self) -> &[Probability] {
        &self.frame.posteriors
    }

    pub fn foreground_count(&self) -> usize {
        self.frame.mask.iter().filter(|&&fg| fg).count()
    }

    // --- Parameters ---

    pub fn training_frames(&self) -> u64 {
        self.config.training_frames
    }

    /// Changes the training length. Lowering it at or below the frames already seen
    /// ends training immediately; raising it during runtime does not restart training.
    pub fn set_training_frames(&mut self, frames: u64) {
        self.config.training_frames = frames;
        self.finish_training_if_due();
    }

    pub fn background_prior(&self) -> Probability {
        self.config.background_prior
    }

    pub fn set_background_prior(&mut self, prior: Probability) -> Result<()> {
        config::validate_probability("background_prior", prior)?;
        self.config.background_prior = prior;
        Ok(())
    }

    pub fn learning_rate(&self) -> Probability {
        self.config.learning_rate
    }

    pub fn set_learning_rate(&mut self, rate: Probability) -> Result<()> {
        config::validate_probability("learning_rate", rate)?;
        self.config.learning_rate = rate;
        Ok(())
    }

    pub fn decision_threshold(&self) -> Probability {
        self.config.decision_threshold
    }

    pub fn set_decision_threshold(&mut self, threshold: Probability) -> Result<()> {
        config::validate_probability("decision_threshold", threshold)?;
        self.config.decision_threshold = threshold;
        Ok(())
    }

    pub fn quantization_levels(&self) -> u16 {
        self.config.quantization_levels
    }

    pub fn set_quantization_levels(&mut self, levels: u16) -> Result<()> {
        config::validate_levels(levels)?;
        self.config.quantization_levels = levels;
        Ok(())
    }

    pub fn min_value(&self) -> Reading {
        self.config.min_value
    }

    pub fn set_min_value(&mut self, min: Reading) -> Result<()> {
        self.set_value_range(min, self.config.max_value)
    }

    pub fn max_value(&self) -> Reading {
        self.config.max_value
    }

    pub fn set_max_value(&mut self, max: Reading) -> Result<()> {
        self.set_value_range(self.config.min_value, max)
    }

    /// Sets both ends of the reading range at once, so a shift past the old bounds
    /// does not trip the `min <= max` check halfway.
    pub fn set_value_range(&mut self, min: Reading, max: Reading) -> Result<()> {
        config::validate_range(min, max)?;
        self.config.min_value = min;
        self.config.max_value = max;
        Ok(())
    }

    pub fn update_background_model(&self) -> bool {
        self.config.update_background_model
    }

    pub fn set_update_background_model(&mut self, enabled: bool) {
        self.config.update_background_model = enabled;
    }

    pub fn connectivity(&self) -> Connectivity {
        self.config.connectivity
    }

    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.config.connectivity = connectivity;
    }
}
