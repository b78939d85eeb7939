//! `kdocs consent` command implementation.

use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use kdocs_config::Config;
use kdocs_consent::{ConsentValue, Decision};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::site::{Page, apply, ensure_project_dir, file_store, mount_cookie};

/// Consent subcommands.
#[derive(Subcommand)]
pub(crate) enum ConsentCommand {
    /// Show the recorded consent and whether the prompt would be shown.
    Status(SiteArgs),
    /// Record that the user accepted analytics.
    Accept(SiteArgs),
    /// Record that the user declined analytics.
    Decline(SiteArgs),
    /// Clear the recorded decision so the prompt shows again.
    Reset(SiteArgs),
    /// Evaluate consent from a request `Cookie` header.
    Cookie(CookieArgs),
}

/// Action to apply to a cookie-backed session.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum CookieAction {
    Accept,
    Decline,
    Reset,
}

impl CookieAction {
    /// Decision to record; `None` means reset.
    fn decision(self) -> Option<Decision> {
        match self {
            Self::Accept => Some(Decision::Granted),
            Self::Decline => Some(Decision::Denied),
            Self::Reset => None,
        }
    }
}

/// Arguments for the cookie command.
#[derive(Args)]
pub(crate) struct CookieArgs {
    /// Value of the `Cookie` request header (e.g. "CookieConsent=true").
    header: String,

    /// Apply a user action and print the resulting `Set-Cookie` headers.
    #[arg(long, value_enum)]
    action: Option<CookieAction>,

    #[command(flatten)]
    site: SiteArgs,
}

impl ConsentCommand {
    /// Execute the consent command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the project directory
    /// cannot be created.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Status(site) => {
                let config = site.load_config()?;
                let page = Page::mount(&config, Arc::new(file_store(&config)));
                print_state(&Output::new(), &config, &page);
                Ok(())
            }
            Self::Accept(site) => record(&site, Some(Decision::Granted)),
            Self::Decline(site) => record(&site, Some(Decision::Denied)),
            Self::Reset(site) => record(&site, None),
            Self::Cookie(args) => args.execute(),
        }
    }
}

/// Apply a decision (or a reset when `None`) against the project's store.
fn record(site: &SiteArgs, decision: Option<Decision>) -> Result<(), CliError> {
    let output = Output::new();
    let config = site.load_config()?;
    ensure_project_dir(&config.project_dir)?;

    let page = Page::mount(&config, Arc::new(file_store(&config)));
    apply(&page, decision);

    let expected = decision.map_or(ConsentValue::Unset, ConsentValue::from);
    if page.controller.get_consent() == expected {
        output.success(&format!("Consent {expected}"));
    } else {
        output.warning("Consent could not be persisted; it will not survive a reload");
    }
    print_state(&output, &config, &page);

    let head = page.head.render_html();
    if !head.is_empty() {
        output.markup(&head);
    }
    Ok(())
}

impl CookieArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;

        let (page, jar) = mount_cookie(&config, &self.header);
        if let Some(action) = self.action {
            apply(&page, action.decision());
        }

        print_state(&output, &config, &page);
        for header in jar.take_set_cookie_headers() {
            output.markup(&format!("Set-Cookie: {header}\n"));
        }
        Ok(())
    }
}

fn print_state(output: &Output, config: &Config, page: &Page) {
    let consent = page.controller.get_consent();
    output.highlight(&format!("Consent: {consent}"));
    output.info(&format!("Storage key: {}", page.controller.storage_key()));
    if page.controller.should_show_prompt() {
        output.info("Prompt: shown");
    } else {
        output.info("Prompt: hidden");
    }
    match config.active_tracking_id() {
        Some(id) if page.controller.is_bootstrapped() => {
            output.info(&format!("Analytics: active ({id})"));
        }
        Some(id) => output.info(&format!("Analytics: inactive ({id})")),
        None => output.info("Analytics: not configured"),
    }
}
