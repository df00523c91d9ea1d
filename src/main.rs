//! camcycle appliance binary
//!
//! Usage: camcycle [FEEDS_JSON] [CALIBRATION_JSON]
//!
//! FEEDS_JSON defaults to `feeds.json`: an ordered array of
//! `{"name": ..., "url": ..., "comment": ...}` entries. The calibration
//! file is optional; without it the built-in ADS7846 profile is used.
//!
//! Build features select the hardware path:
//! - `backend-gst`: RTSP/H.264 decode via GStreamer
//! - `hw-fbdev`:    present to /dev/fb1
//! - `hw-touch`:    read the touchscreen via evdev
//!
//! Without them the viewer runs against simulated devices, which is
//! useful for exercising configuration and feed definitions off-target.

use std::fs::File;

#[cfg(not(feature = "hw-touch"))]
use camcycle::device::NullTouch;
#[cfg(not(feature = "hw-fbdev"))]
use camcycle::device::SimDisplay;
#[cfg(not(feature = "backend-gst"))]
use camcycle::session::SimBackendFactory;
use camcycle::{CalibrationProfile, FeedRegistry, Viewer, ViewerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let feeds_path = args.next().unwrap_or_else(|| "feeds.json".to_string());
    let calibration_path = args.next();

    let registry = FeedRegistry::from_json_reader(File::open(&feeds_path)?)?;
    for feed in registry.iter() {
        tracing::info!(feed = %feed, "configured feed");
    }

    let calibration = match calibration_path {
        Some(path) => CalibrationProfile::from_json_reader(File::open(&path)?)?,
        None => CalibrationProfile::default(),
    };

    let config = ViewerConfig::default();

    #[cfg(feature = "backend-gst")]
    let factory = camcycle::session::gst::GstBackendFactory::new(
        config.width,
        config.height,
        camcycle::session::gst::DecoderKind::Hardware,
    )?;
    #[cfg(not(feature = "backend-gst"))]
    let factory = {
        tracing::warn!("no decode backend compiled in, using simulated frames");
        SimBackendFactory::new(config.width, config.height, config.format)
    };

    #[cfg(feature = "hw-fbdev")]
    let display = camcycle::device::fbdev::FbDisplay::open(
        "/dev/fb1",
        config.width,
        config.height,
        config.format,
    )?;
    #[cfg(not(feature = "hw-fbdev"))]
    let display = SimDisplay::new(config.width, config.height, config.format);

    #[cfg(feature = "hw-touch")]
    let touch = camcycle::device::touch::EvdevTouch::discover()?;
    #[cfg(not(feature = "hw-touch"))]
    let touch = NullTouch;

    let mut viewer = Viewer::new(config, registry, calibration, factory, display, touch);

    let result = viewer
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    viewer.shutdown().await;
    result?;
    Ok(())
}
