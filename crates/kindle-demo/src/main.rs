//! `kindle`: interactive GPU particle fire.

mod app;
mod cli;
mod config;
mod toggle;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use kindle_engine::device::GpuInit;
use kindle_engine::logging::{LoggingConfig, init_logging};
use kindle_engine::window::{Runtime, RuntimeConfig};
use kindle_fire::{AtlasImage, ParticleTable};

use crate::app::FireApp;
use crate::cli::Cli;
use crate::config::DemoConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::default().with_filter(cli.log.clone()));

    let config = DemoConfig::resolve(&cli)?;
    log::info!(
        "stage {} with {} particles x {} flames",
        config.stage,
        config.particles.count,
        config.flames.len()
    );

    let table = ParticleTable::from_params(&config.particles)
        .context("failed to generate particle table")?;
    let atlas = AtlasImage::load_or_procedural(config.atlas.as_deref());

    let runtime_config = RuntimeConfig {
        title: "kindle".to_string(),
        initial_size: LogicalSize::new(config.window.width, config.window.height),
        resizable: config.window.resizable,
    };
    let gpu_init = GpuInit::default()
        .with_vsync(config.vsync)
        .with_srgb(config.srgb);

    let app = FireApp::new(config, table, atlas);
    Runtime::run(runtime_config, gpu_init, app)
}
