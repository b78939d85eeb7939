//! Wiring between configuration and the consent controller.
//!
//! A [`Page`] is one simulated page load: the controller is mounted against
//! the configured store, and analytics (if granted) is injected into the
//! page's head.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kdocs_config::{BannerConfig, Config, ConsentConfig};
use kdocs_consent::store::{CookieAttributes, CookieJar, FileStore, SameSite};
use kdocs_consent::{
    AnalyticsBootstrap, Banner, BannerLocation, BootstrapError, ConsentController, ConsentStore,
    ConsentValue, Decision, GtagLoader, PageHead,
};

use crate::error::CliError;

/// A mounted page: controller, head injection target, and banner slot.
pub(crate) struct Page {
    pub(crate) controller: ConsentController,
    pub(crate) head: Arc<PageHead>,
    pub(crate) banner: Banner,
    /// Consent observed at mount.
    pub(crate) mounted_with: ConsentValue,
}

impl Page {
    /// Mount the consent controller for one page load.
    pub(crate) fn mount(config: &Config, store: Arc<dyn ConsentStore>) -> Self {
        let head = Arc::new(PageHead::new());
        let tracking_id = config.active_tracking_id();
        let bootstrap: Box<dyn AnalyticsBootstrap> = if tracking_id.is_some() {
            Box::new(
                GtagLoader::new(Arc::clone(&head))
                    .with_consent_event(config.analytics.send_consent_event),
            )
        } else {
            Box::new(analytics_disabled)
        };

        let controller = ConsentController::new(store, bootstrap, tracking_id.unwrap_or_default())
            .with_storage_key(config.consent.storage_key.clone());
        let mounted_with = controller.bootstrap_analytics_if_granted();

        Self {
            controller,
            head,
            banner: banner_from_config(&config.banner),
            mounted_with,
        }
    }

    /// Render the banner slot for the current state.
    pub(crate) fn render_banner(&self) -> String {
        self.banner.render(&self.controller)
    }
}

/// Record a decision, or reset when `decision` is `None`.
pub(crate) fn apply(page: &Page, decision: Option<Decision>) {
    match decision {
        Some(decision) => page.controller.set_consent(decision),
        None => page.controller.reset_consent(),
    }
}

/// Mount a page whose consent lives in the request's cookies.
///
/// The returned jar holds the `Set-Cookie` headers for the response.
pub(crate) fn mount_cookie(config: &Config, header: &str) -> (Page, Arc<CookieJar>) {
    let jar = Arc::new(CookieJar::from_header(
        header,
        cookie_attributes(&config.consent),
    ));
    let page = Page::mount(config, Arc::clone(&jar) as Arc<dyn ConsentStore>);
    (page, jar)
}

/// Bootstrap used when no tracking ID is configured.
fn analytics_disabled(_tracking_id: &str) -> Result<(), BootstrapError> {
    tracing::info!("Analytics not configured, skipping bootstrap");
    Ok(())
}

/// Build the durable store for a project.
pub(crate) fn file_store(config: &Config) -> FileStore {
    FileStore::new(config.consent_dir())
        .with_max_age(Duration::from_secs(config.consent.max_age_secs()))
}

/// Banner text and placement from configuration.
pub(crate) fn banner_from_config(banner: &BannerConfig) -> Banner {
    Banner {
        message: banner.message.clone(),
        accept_text: banner.accept_text.clone(),
        decline_text: banner.decline_text.clone(),
        reset_text: banner.reset_text.clone(),
        location: BannerLocation::parse(&banner.location).unwrap_or_default(),
    }
}

/// Cookie attributes from configuration.
pub(crate) fn cookie_attributes(consent: &ConsentConfig) -> CookieAttributes {
    CookieAttributes {
        path: consent.cookie_path.clone(),
        max_age: Some(Duration::from_secs(consent.max_age_secs())),
        same_site: SameSite::parse(&consent.same_site).unwrap_or_default(),
        secure: false,
    }
}

/// Ensure the `.kdocs/` project directory exists with a `.gitignore`.
pub(crate) fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by kdocs\n*\n");
    }

    Ok(())
}
