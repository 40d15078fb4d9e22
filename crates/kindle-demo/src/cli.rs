use std::path::PathBuf;

use clap::Parser;

use kindle_fire::Stage;

#[derive(Debug, Parser)]
#[command(name = "kindle")]
#[command(about = "GPU particle fire demo", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Effect stage: basic, billboard, camera, atlas or accelerated
    #[arg(short, long)]
    pub stage: Option<Stage>,

    /// Particles per flame
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// RNG seed for a reproducible particle table
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fire atlas image (PNG or JPEG, 4x4 frames)
    #[arg(long, value_name = "FILE")]
    pub atlas: Option<PathBuf>,

    /// Log filter in env_logger syntax, e.g. "debug" or "kindle_fire=trace"
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "kindle", "--config", "fire.toml", "--stage", "camera", "-n", "500", "--seed", "7",
            "--atlas", "fire.png", "--log", "debug",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("fire.toml")));
        assert_eq!(cli.stage, Some(Stage::Camera));
        assert_eq!(cli.particles, Some(500));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.atlas, Some(PathBuf::from("fire.png")));
        assert_eq!(cli.log.as_deref(), Some("debug"));
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let cli = Cli::try_parse_from(["kindle"]).unwrap();
        assert!(cli.config.is_none() && cli.stage.is_none() && cli.particles.is_none());
    }

    #[test]
    fn unknown_stage_is_rejected() {
        assert!(Cli::try_parse_from(["kindle", "--stage", "smoke"]).is_err());
    }
}
