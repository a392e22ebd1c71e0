pub mod image_helper {
    use std::path::Path;

    use image::ImageEncoder;

    use crate::error::Result;

    const CHANNELS: usize = 4;
    /// Background cells are drawn at this fraction of their thermal brightness.
    const BACKGROUND_DIM: f32 = 0.4;

    /// One frame's worth of data to draw: readings plus the subtractor's decisions.
    pub struct HeatMap<'a> {
        pub width: usize,
        pub height: usize,
        pub readings: &'a [f32],
        pub mask: &'a [bool],
        pub confidences: &'a [f32],
        pub min_value: f32,
        pub max_value: f32,
    }

    /// Rasterizes a heat map into an RGBA buffer, `scale` output pixels per cell.
    ///
    /// Background cells are dimmed grayscale thermal intensity. Foreground cells are
    /// colored by confidence on a blue → yellow → red ramp.
    pub fn render_rgba(map: &HeatMap<'_>, scale: usize) -> Vec<u8> {
        let scale = scale.max(1);
        let out_width = map.width * scale;
        let mut buffer = vec![255u8; out_width * map.height * scale * CHANNELS];

        for cell in 0..map.width * map.height {
            let color = if map.mask[cell] {
                confidence_color(map.confidences[cell])
            } else {
                let level = intensity(map.readings[cell], map.min_value, map.max_value)
                    * BACKGROUND_DIM;
                let gray = (level * 255.0).round() as u8;
                [gray, gray, gray]
            };

            let (cell_x, cell_y) = (cell % map.width, cell / map.width);
            for dy in 0..scale {
                let row = cell_y * scale + dy;
                for dx in 0..scale {
                    let column = cell_x * scale + dx;
                    let start = (row * out_width + column) * CHANNELS;
                    buffer[start..start + 3].copy_from_slice(&color);
                }
            }
        }
        buffer
    }

    /// Renders and writes a PNG heat map.
    pub fn save(path: &Path, map: &HeatMap<'_>, scale: usize) -> Result<()> {
        let scale = scale.max(1);
        let buffer = render_rgba(map, scale);
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            &buffer,
            (map.width * scale) as u32,
            (map.height * scale) as u32,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    fn intensity(value: f32, min: f32, max: f32) -> f32 {
        if value.is_nan() || min.is_nan() || max.is_nan() || max <= min {
            return 0.0;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    fn confidence_color(confidence: f32) -> [u8; 3] {
        let score = confidence.clamp(0.0, 1.0);
        let (r, g, b) = if score <= 0.5 {
            // Blue to Yellow
            let ratio = score / 0.5;
            (255.0 * ratio, 255.0 * ratio, 255.0 * (1.0 - ratio))
        } else {
            // Yellow to Red
            let ratio = (score - 0.5) / 0.5;
            (255.0, 255.0 * (1.0 - ratio), 0.0)
        };
        [r as u8, g as u8, b as u8]
    }
}
