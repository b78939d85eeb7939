//! Google Analytics (gtag.js) loader.
//!
//! [`GtagLoader`] is the stock [`AnalyticsBootstrap`]: it appends an `async`
//! tag script to the page head and queues the `dataLayer` commands that
//! configure it. The browser fetches the script on its own schedule; nothing
//! here waits on the network.

use std::fmt::Write;
use std::sync::{Arc, RwLock};

use crate::bootstrap::{AnalyticsBootstrap, BootstrapError, validate_tracking_id};

/// Base URL of the gtag.js script.
const GTAG_SCRIPT_URL: &str = "https://www.googletagmanager.com/gtag/js";

/// Category of the event sent when the user accepts analytics.
pub const CONSENT_EVENT_CATEGORY: &str = "CookieConsent";
/// Action of the event sent when the user accepts analytics.
pub const CONSENT_EVENT_ACTION: &str = "User accepted analytics cookies";

/// A command pushed onto `window.dataLayer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtagCommand {
    /// `gtag('js', new Date())`
    Js,
    /// `gtag('config', id)`
    Config(String),
    /// `gtag('event', action, {event_category: category})`
    Event { action: String, category: String },
}

/// Head elements and analytics commands injected into a page.
#[derive(Debug, Default)]
pub struct PageHead {
    scripts: RwLock<Vec<String>>,
    commands: RwLock<Vec<GtagCommand>>,
}

impl PageHead {
    /// Create an empty head.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs of injected `async` scripts, in injection order.
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Queued `dataLayer` commands, in push order.
    #[must_use]
    pub fn commands(&self) -> Vec<GtagCommand> {
        self.commands.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Render the injected elements as HTML for the document head.
    ///
    /// Returns an empty string when nothing was injected.
    #[must_use]
    pub fn render_html(&self) -> String {
        let scripts = self.scripts();
        let commands = self.commands();
        if scripts.is_empty() && commands.is_empty() {
            return String::new();
        }

        let mut html = String::new();
        for src in &scripts {
            let _ = writeln!(html, "<script async src=\"{}\"></script>", escape_attr(src));
        }
        html.push_str("<script>\n");
        html.push_str("window.dataLayer = window.dataLayer || [];\n");
        html.push_str("function gtag(){dataLayer.push(arguments);}\n");
        for command in &commands {
            let _ = writeln!(html, "{}", render_command(command));
        }
        html.push_str("</script>\n");
        html
    }

    fn push(&self, src: String, commands: Vec<GtagCommand>) -> Result<(), BootstrapError> {
        let poisoned = || BootstrapError::Injection("page head is poisoned".to_owned());
        self.scripts.write().map_err(|_| poisoned())?.push(src);
        self.commands
            .write()
            .map_err(|_| poisoned())?
            .extend(commands);
        Ok(())
    }
}

/// Bootstraps gtag.js into a [`PageHead`].
pub struct GtagLoader {
    head: Arc<PageHead>,
    send_consent_event: bool,
}

impl GtagLoader {
    /// Create a loader that injects into `head`.
    #[must_use]
    pub fn new(head: Arc<PageHead>) -> Self {
        Self {
            head,
            send_consent_event: false,
        }
    }

    /// Also record a consent event after configuring the tag.
    #[must_use]
    pub fn with_consent_event(mut self, enabled: bool) -> Self {
        self.send_consent_event = enabled;
        self
    }
}

impl AnalyticsBootstrap for GtagLoader {
    fn enable_analytics(&self, tracking_id: &str) -> Result<(), BootstrapError> {
        validate_tracking_id(tracking_id)?;

        let src = format!("{GTAG_SCRIPT_URL}?id={tracking_id}");
        let mut commands = vec![GtagCommand::Js, GtagCommand::Config(tracking_id.to_owned())];
        if self.send_consent_event {
            commands.push(GtagCommand::Event {
                action: CONSENT_EVENT_ACTION.to_owned(),
                category: CONSENT_EVENT_CATEGORY.to_owned(),
            });
        }

        tracing::debug!(src = %src, "Injecting gtag.js");
        self.head.push(src, commands)
    }
}

fn render_command(command: &GtagCommand) -> String {
    match command {
        GtagCommand::Js => "gtag('js', new Date());".to_owned(),
        GtagCommand::Config(id) => format!("gtag('config', {});", js_string(id)),
        GtagCommand::Event { action, category } => format!(
            "gtag('event', {}, {{\"event_category\": {}}});",
            js_string(action),
            js_string(category)
        ),
    }
}

/// Encode a string as a JavaScript literal that is safe inside `<script>`.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
