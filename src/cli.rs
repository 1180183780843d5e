//! Command-line arguments and their translation into an application configuration.

use crate::{
    app::{AppConfig, RunMode, VideoSource},
    config::Config,
    Result,
};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "hand-pointer", author, version, about, long_about = None)]
pub struct Args {
    /// Camera index to use (defaults to the configured camera)
    #[arg(long)]
    pub cam: Option<i32>,

    /// Video file to process instead of a camera
    #[arg(short, long, conflicts_with = "cam")]
    pub video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    pub config: Option<String>,

    /// Capture calibration corners and write them to the calibration file
    #[arg(long)]
    pub calibrate: bool,

    /// Log pointer commands instead of injecting them
    #[arg(long)]
    pub dry_run: bool,

    /// Run without the preview window
    #[arg(long)]
    pub no_gui: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Load the configuration file, if any, and apply command-line overrides
    ///
    /// # Errors
    ///
    /// Fails if the configuration file cannot be read, parsed or validated.
    pub fn into_app_config(self) -> Result<AppConfig> {
        let mut settings = if let Some(config_path) = &self.config {
            info!("Loading configuration from: {}", config_path);
            Config::load(config_path)?
        } else {
            Config::default()
        };

        if self.no_gui {
            settings.display.show_window = false;
        }

        let video_source = if let Some(video_path) = self.video {
            VideoSource::File(video_path)
        } else {
            VideoSource::Camera(self.cam.unwrap_or(settings.camera.index))
        };

        Ok(AppConfig {
            video_source,
            settings,
            run_mode: if self.calibrate {
                RunMode::Calibrate
            } else {
                RunMode::Control
            },
            dry_run: self.dry_run,
        })
    }
}
