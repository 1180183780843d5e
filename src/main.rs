//! Hand pointer application: control the mouse with hand gestures from a webcam.

use anyhow::{Context, Result};
use clap::Parser;
use hand_pointer::{
    app::{install_signal_handlers, HandPointerApp},
    cli::Args,
};
use log::info;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Pointer");

    let config = args.into_app_config().context("Invalid configuration")?;

    // SIGINT/SIGTERM end the frame loop so held buttons are released
    install_signal_handlers();

    let mut app = HandPointerApp::new(config)?;
    app.run()?;

    Ok(())
}
