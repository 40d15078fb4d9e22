use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use kindle_fire::{Flame, SpawnParams, Stage};

use crate::cli::Cli;

/// Default upward acceleration for the accelerated stage, in units/s².
pub const DEFAULT_ACCELERATION: f32 = 0.01;

/// Demo settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub stage: Stage,
    pub particles: SpawnParams,
    pub flames: Vec<Flame>,
    /// Atlas image; the procedural atlas is used when absent.
    pub atlas: Option<PathBuf>,
    /// Straight-alpha RGBA.
    pub clear_color: [f32; 4],
    /// Simulation seconds skipped at startup.
    pub warmup: f32,
    pub acceleration: f32,
    pub vsync: bool,
    pub srgb: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: f64,
    pub height: f64,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            resizable: true,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            stage: Stage::default(),
            particles: SpawnParams::default(),
            flames: Flame::default_pair(),
            atlas: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            warmup: kindle_fire::clock::DEFAULT_WARMUP,
            acceleration: DEFAULT_ACCELERATION,
            vsync: true,
            srgb: false,
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse TOML")?;
        Ok(config)
    }

    /// Builds the effective configuration: file (if any), then CLI overrides, then validation.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match cli.config.as_deref() {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(stage) = cli.stage {
            self.stage = stage;
        }
        if let Some(count) = cli.particles {
            self.particles.count = count;
        }
        if let Some(seed) = cli.seed {
            self.particles.seed = Some(seed);
        }
        if let Some(atlas) = &cli.atlas {
            self.atlas = Some(atlas.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.particles.validate().context("invalid [particles] section")?;

        let w = &self.window;
        if !(w.width.is_finite() && w.height.is_finite() && w.width > 0.0 && w.height > 0.0) {
            bail!("window size must be positive, got {}x{}", w.width, w.height);
        }
        if self.flames.is_empty() {
            bail!("at least one flame is required");
        }
        if !self.warmup.is_finite() || self.warmup < 0.0 {
            bail!("warmup must be a non-negative number of seconds, got {}", self.warmup);
        }
        if !self.acceleration.is_finite() {
            bail!("acceleration must be finite");
        }
        Ok(())
    }
}
