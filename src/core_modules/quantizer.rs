// THEORY:
// The `quantizer` is the first stage of every update. Thermal readings arrive as
// wide-range floating point temperatures, but the background model only stores a
// handful of histogram bins per pixel. Quantization maps each reading onto a small
// integer bucket so that "the same temperature" is recognised despite sensor noise
// and so that a histogram can be kept in a few bytes.
//
// Key principles:
// 1.  **Total function**: every input maps to a bucket in `[0, levels - 1]`. Values
//     outside the configured range are clamped, and degenerate ranges (min == max)
//     or level counts fall back to bucket 0 instead of dividing by zero.
// 2.  **Monotonic**: for a fixed range, a hotter reading never maps to a lower bucket.
// 3.  **Stateless**: no memory of previous frames; it is a pure function.

pub mod quantizer {
    /// A raw sensor reading (degrees Celsius for a Grid-EYE, but any scalar works).
    pub type Reading = f32;
    /// The quantized representation of a reading.
    pub type Bucket = u8;

    /// The largest number of levels a `Bucket` can address.
    pub const MAX_LEVELS: u16 = Bucket::MAX as u16 + 1;

    /// Maps `value` onto one of `levels` buckets spanning `[min, max]`.
    pub fn quantize(value: Reading, min: Reading, max: Reading, levels: u16) -> Bucket {
        if levels <= 1 || value.is_nan() || min.is_nan() || max.is_nan() || max <= min {
            return 0;
        }

        let clamped = value.clamp(min, max);
        let normalized = (clamped - min) / (max - min);
        let top = (levels.min(MAX_LEVELS) - 1) as f32;

        // `as` saturates, so the final min only guards float rounding at the top edge.
        ((normalized * top).floor() as u16).min(levels - 1) as Bucket
    }

    /// Quantizes a whole frame into `out`. Both slices must have the same length.
    pub fn quantize_frame(
        frame: &[Reading],
        min: Reading,
        max: Reading,
        levels: u16,
        out: &mut [Bucket],
    ) {
        debug_assert_eq!(frame.len(), out.len());
        for (bucket, &value) in out.iter_mut().zip(frame) {
            *bucket = quantize(value, min, max, levels);
        }
    }
}
