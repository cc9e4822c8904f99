//! meshpull - headless driver for the vertex-pulling renderer
//!
//! Builds a demo scene, runs the meshlet, skinned and instanced vertex
//! passes for a fixed number of frames and picks from the resulting ID
//! buffer. Pass a settings file path as the first argument to override
//! `~/.config/meshpull/settings.toml`.

mod demo;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use crate::demo::Demo;
use crate::settings::DemoSettings;

fn main() -> Result<()> {
    // Start at info so settings loading is visible, then switch to the
    // configured level unless RUST_LOG already chose one.
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_set = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("Failed to set subscriber")?;

    info!("Starting meshpull...");

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = DemoSettings::load(settings_path.as_deref());
    // First run without an explicit file: leave a template to edit.
    if settings_path.is_none() && DemoSettings::settings_path().is_some_and(|p| !p.exists()) {
        if let Err(e) = settings.save() {
            warn!("Could not write default settings: {}", e);
        }
    }
    if !env_set {
        let level = EnvFilter::try_new(&settings.logging.level)
            .with_context(|| format!("Invalid log filter '{}'", settings.logging.level))?;
        filter_handle
            .reload(level)
            .context("Failed to apply log level")?;
    }

    let frames = settings.scene.frames;
    let frame_delta = settings.scene.frame_delta;
    let mut demo = Demo::new(settings).context("Failed to build demo scene")?;

    for _ in 0..frames {
        let stats = demo.run_frame(frame_delta)?;
        info!(
            "Frame {}: {} live / {} culled vertices, {} magenta, {} pixels covered, picked {:?}",
            demo.frame_count(),
            stats.live_vertices,
            stats.culled_vertices,
            stats.magenta_vertices,
            stats.covered_pixels,
            stats.picked.unwrap_or_default()
        );
    }

    info!("meshpull finished after {} frames", demo.frame_count());
    Ok(())
}
