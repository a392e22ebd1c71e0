// Replays recorded thermal frames through the GMG subtractor and prints the
// foreground mask of every runtime frame, optionally saving PNG heat maps.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle};
use log::{info, warn};
use tokio::io::BufReader;
use tokio::time::{self, MissedTickBehavior};

use thermal_gmg::core_modules::utils::frame_reader::FrameReader;
use thermal_gmg::core_modules::utils::image_helper::image_helper::{self, HeatMap};
use thermal_gmg::core_modules::utils::text_mask;
use thermal_gmg::{GmgBackgroundSubtractor, GmgConfig, GmgError};

const DEFAULT_REFRESH_MS: u64 = 100;
/// Half-width of the reading window centred on the first frame when no config is given.
const CALIBRATION_WINDOW: f32 = 8.0;
const PNG_SCALE: usize = 16;

fn setup_logging(base_level: &str) -> anyhow::Result<LoggerHandle> {
    let handle = Logger::try_with_str(base_level)?
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            flexi_logger::Criterion::Size(1024 * 1024), //1MB
            flexi_logger::Naming::Timestamps,
            flexi_logger::Cleanup::KeepLogFiles(5),
        )
        .start()?;
    Ok(handle)
}

async fn load_config() -> anyhow::Result<Option<GmgConfig>> {
    let Ok(path) = env::var("GMG_CONFIG") else {
        return Ok(None);
    };
    let json = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading config file {path}"))?;
    let config =
        GmgConfig::from_json(&json).with_context(|| format!("loading config file {path}"))?;
    Ok(Some(config))
}

/// Centres the reading range on the first frame's mean temperature.
fn calibrate(mut config: GmgConfig, first_frame: &[f32]) -> GmgConfig {
    if first_frame.is_empty() {
        return config;
    }
    let mean = first_frame.iter().sum::<f32>() / first_frame.len() as f32;
    config.min_value = mean - CALIBRATION_WINDOW;
    config.max_value = mean + CALIBRATION_WINDOW;
    config
}

fn refresh_interval() -> anyhow::Result<Option<Duration>> {
    let millis = match env::var("GMG_REFRESH_MS") {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| {
                format!("GMG_REFRESH_MS must be a number of milliseconds, got {value:?}")
            })?,
        Err(_) => DEFAULT_REFRESH_MS,
    };
    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}

fn save_heat_map(
    dir: &Path,
    index: u64,
    gmg: &GmgBackgroundSubtractor,
    readings: &[f32],
) -> anyhow::Result<()> {
    let map = HeatMap {
        width: gmg.width(),
        height: gmg.height(),
        readings,
        mask: gmg.foreground_mask(),
        confidences: gmg.confidences(),
        min_value: gmg.min_value(),
        max_value: gmg.max_value(),
    };
    let path = dir.join(format!("frame_{index:05}.png"));
    image_helper::save(&path, &map, PNG_SCALE)
        .with_context(|| format!("writing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_spec = env::var("GMG_LOG").unwrap_or_else(|_| "info".to_string());
    let _logger = setup_logging(&log_spec)?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: thermal_gmg <frames_file> [png_output_dir]");
        return Ok(());
    }
    let frames_path = &args[1];
    let png_dir = args.get(2).map(PathBuf::from);
    if let Some(dir) = &png_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let configured = load_config().await?;
    let file = tokio::fs::File::open(frames_path)
        .await
        .with_context(|| format!("opening {frames_path}"))?;
    let mut reader = FrameReader::new(BufReader::new(file));

    let mut ticker = refresh_interval()?.map(|period| {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let mut gmg: Option<GmgBackgroundSubtractor> = None;
    let mut runtime_frames = 0u64;
    let mut presence_frames = 0u64;

    while let Some(frame) = reader.next_frame().await? {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }

        if gmg.is_none() {
            let config = match &configured {
                Some(config) => config.clone(),
                None => calibrate(GmgConfig::default(), &frame),
            };
            info!(
                "Starting GMG on a {}x{} grid, range [{:.2}, {:.2}], {} training frames",
                config.width,
                config.height,
                config.min_value,
                config.max_value,
                config.training_frames
            );
            gmg = Some(GmgBackgroundSubtractor::new(config)?);
        }
        let Some(subtractor) = gmg.as_mut() else {
            continue;
        };

        let was_training = subtractor.is_training();
        match subtractor.update(&frame) {
            Ok(()) => {}
            Err(GmgError::FrameSize { expected, actual }) => {
                warn!(
                    "Skipping line {}: {actual} readings, expected {expected}",
                    reader.line_number()
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if was_training {
            if !subtractor.is_training() {
                info!("Training complete after {} frames", subtractor.frame_count());
            }
            continue;
        }

        runtime_frames += 1;
        if subtractor.foreground_count() > 0 {
            presence_frames += 1;
        }
        println!("{}", text_mask::render(subtractor.foreground_mask(), subtractor.width()));

        if let Some(dir) = &png_dir {
            save_heat_map(dir, subtractor.frame_count(), subtractor, &frame)?;
        }
    }

    match &gmg {
        Some(subtractor) => info!(
            "Processed {} frames: {} classified, {} with presence",
            subtractor.frame_count(),
            runtime_frames,
            presence_frames
        ),
        None => info!("No frames found in {frames_path}"),
    }
    Ok(())
}
