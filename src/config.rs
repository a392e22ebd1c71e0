// THEORY:
// `GmgConfig` is the full set of tunables for a subtractor. It is validated once
// when the subtractor is built and then copied into it; changing a parameter later
// goes through the subtractor's setters, which re-validate and never touch the
// learned model. Grid dimensions are fixed for the lifetime of a subtractor.
//
// The struct deserializes from JSON with every field optional, so a config file
// only needs to mention what it changes.

use serde::{Deserialize, Serialize};

use crate::core_modules::classifier::Probability;
use crate::core_modules::quantizer::quantizer::{MAX_LEVELS, Reading};
use crate::core_modules::smoother::Connectivity;
use crate::error::{GmgError, Result};

/// Configuration for a `GmgBackgroundSubtractor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmgConfig {
    /// Sensor grid width in pixels.
    pub width: usize,
    /// Sensor grid height in pixels.
    pub height: usize,
    /// Number of frames used to build the initial background histograms.
    pub training_frames: u64,
    /// Prior probability that any given pixel is background.
    pub background_prior: Probability,
    /// Blend factor of the runtime moving-average update, in [0, 1].
    pub learning_rate: Probability,
    /// Posterior foreground probability above which a pixel is foreground.
    pub decision_threshold: Probability,
    /// Number of quantization buckets, 1..=256.
    pub quantization_levels: u16,
    /// Lower end of the expected reading range.
    pub min_value: Reading,
    /// Upper end of the expected reading range.
    pub max_value: Reading,
    /// When false the histograms are frozen after training.
    pub update_background_model: bool,
    /// Neighborhood used by the mask smoother.
    pub connectivity: Connectivity,
}

impl Default for GmgConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            training_frames: 240,
            background_prior: 0.8,
            learning_rate: 0.025,
            decision_threshold: 0.9,
            quantization_levels: 32,
            min_value: 0.0,
            max_value: 1.0,
            update_background_model: true,
            connectivity: Connectivity::Four,
        }
    }
}

impl GmgConfig {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Loads a config from a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GmgError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(GmgError::InvalidConfig(format!(
                "grid {}x{} has too many pixels",
                self.width, self.height
            )));
        }
        validate_probability("background_prior", self.background_prior)?;
        validate_probability("learning_rate", self.learning_rate)?;
        validate_probability("decision_threshold", self.decision_threshold)?;
        validate_levels(self.quantization_levels)?;
        validate_range(self.min_value, self.max_value)
    }
}

pub(crate) fn validate_probability(name: &str, value: Probability) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GmgError::InvalidConfig(format!("{name} must be within [0, 1], got {value}")))
    }
}

pub(crate) fn validate_levels(levels: u16) -> Result<()> {
    if (1..=MAX_LEVELS).contains(&levels) {
        Ok(())
    } else {
        Err(GmgError::InvalidConfig(format!(
            "quantization_levels must be within [1, {MAX_LEVELS}], got {levels}"
        )))
    }
}

pub(crate) fn validate_range(min: Reading, max: Reading) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(GmgError::InvalidConfig(format!(
            "value range must be finite, got [{min}, {max}]"
        )));
    }
    if min > max {
        return Err(GmgError::InvalidConfig(format!(
            "min_value {min} is above max_value {max}"
        )));
    }
    if !(max - min).is_finite() {
        return Err(GmgError::InvalidConfig(format!(
            "value range [{min}, {max}] is too wide"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GmgConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pixel_count(), 64);
        assert_eq!(config.connectivity, Connectivity::Four);
    }

    #[test]
    fn rejects_out_of_range_probabilities() {
        let config = GmgConfig { background_prior: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(GmgError::InvalidConfig(_))));

        let config = GmgConfig { learning_rate: f32::NAN, ..Default::default() };
        assert!(config.validate().is_err());

        let config = GmgConfig { decision_threshold: -0.1, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_grids_and_bad_levels() {
        assert!(GmgConfig { width: 0, ..Default::default() }.validate().is_err());
        assert!(GmgConfig { quantization_levels: 0, ..Default::default() }.validate().is_err());
        assert!(GmgConfig { quantization_levels: 257, ..Default::default() }.validate().is_err());
        assert!(GmgConfig { quantization_levels: 256, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn zero_width_range_is_allowed_but_inverted_is_not() {
        let flat = GmgConfig { min_value: 21.0, max_value: 21.0, ..Default::default() };
        assert!(flat.validate().is_ok());
        let inverted = GmgConfig { min_value: 30.0, max_value: 20.0, ..Default::default() };
        assert!(inverted.validate().is_err());
        assert!(GmgConfig { max_value: f32::INFINITY, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn range_wider_than_f32_is_rejected() {
        let wide = GmgConfig { min_value: -3e38, max_value: 3e38, ..Default::default() };
        assert!(matches!(wide.validate(), Err(GmgError::InvalidConfig(_))));
        assert!(validate_range(-3e38, 0.0).is_ok());
    }

    #[test]
    fn grid_whose_pixel_count_overflows_is_rejected() {
        let json = format!(r#"{{ "width": {}, "height": 2 }}"#, usize::MAX);
        assert!(matches!(GmgConfig::from_json(&json), Err(GmgError::InvalidConfig(_))));
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config = GmgConfig::from_json(
            r#"{ "min_value": 18.0, "max_value": 34.0,
                 "training_frames": 60, "connectivity": "eight" }"#,
        )
        .expect("valid config");
        assert_eq!(config.training_frames, 60);
        assert_eq!(config.min_value, 18.0);
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.quantization_levels, 32);
        assert_eq!(config.width, 8);
    }

    #[test]
    fn json_with_invalid_values_is_rejected() {
        assert!(matches!(
            GmgConfig::from_json(r#"{ "background_prior": 2.0 }"#),
            Err(GmgError::InvalidConfig(_))
        ));
        assert!(matches!(GmgConfig::from_json("{ not json"), Err(GmgError::Json(_))));
    }
}
