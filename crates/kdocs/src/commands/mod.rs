//! CLI command implementations.

pub(crate) mod consent;
pub(crate) mod render;

use std::path::PathBuf;

use clap::Args;
use kdocs_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use consent::ConsentCommand;
pub(crate) use render::RenderCommand;

/// Arguments shared by commands that operate on a site.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover kdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project directory holding consent state (overrides config).
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Analytics tracking ID (overrides config).
    #[arg(long, env = "KDOCS_TRACKING_ID")]
    tracking_id: Option<String>,

    /// Disable analytics bootstrap regardless of consent.
    #[arg(long)]
    no_analytics: bool,
}

impl SiteArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            tracking_id: self.tracking_id.clone(),
            project_dir: self.project_dir.clone(),
            analytics_enabled: self.no_analytics.then_some(false),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
