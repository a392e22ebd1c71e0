// THEORY:
// This file is the entry point for the `thermal_gmg` library crate. It exposes a
// GMG (Godbehere–Matsukawa–Goldberg) background subtractor for low-resolution
// thermal sensors such as an 8x8 Grid-EYE: every pixel learns a small histogram
// of quantized temperatures, and each new reading is classified as background or
// foreground (a warm body) by Bayes' rule against that histogram.
//
// The public surface is `GmgBackgroundSubtractor` with its `GmgConfig`; the four
// processing stages (`quantizer`, `background_model`, `classifier`, `smoother`)
// live in `core_modules` and are usable on their own. Sensor polling and
// displays stay outside the crate: callers pass a flat row-major slice of readings
// per update and read back a foreground flag and confidence per pixel.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod subtractor;

pub use config::GmgConfig;
pub use core_modules::pmf::{Feature, Pmf};
pub use core_modules::smoother::Connectivity;
pub use error::{GmgError, Result};
pub use subtractor::{DEFAULT_MAX_FEATURES, FgResult, GmgBackgroundSubtractor, Phase};
