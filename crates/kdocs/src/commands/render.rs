//! `kdocs render` command implementation.

use std::sync::Arc;

use clap::Subcommand;

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::site::{Page, file_store};

/// Render subcommands.
#[derive(Subcommand)]
pub(crate) enum RenderCommand {
    /// Print the consent banner slot for the current state.
    Banner(SiteArgs),
    /// Print the analytics head markup (empty unless consent is granted).
    Head(SiteArgs),
}

impl RenderCommand {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        match self {
            Self::Banner(site) => {
                let config = site.load_config()?;
                let page = Page::mount(&config, Arc::new(file_store(&config)));
                output.markup(&page.render_banner());
            }
            Self::Head(site) => {
                let config = site.load_config()?;
                let page = Page::mount(&config, Arc::new(file_store(&config)));
                let head = page.head.render_html();
                if head.is_empty() {
                    output.info(&format!(
                        "No analytics markup (consent: {})",
                        page.mounted_with
                    ));
                } else {
                    output.markup(&head);
                }
            }
        }
        Ok(())
    }
}
