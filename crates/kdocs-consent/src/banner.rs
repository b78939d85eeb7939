//! Consent prompt markup.
//!
//! The host template reserves a slot for the prompt; [`Banner::render`] fills
//! it. The banner itself appears only while consent is unset, but the footer
//! reset link is always present so a decided user can reopen the prompt.

use std::fmt::Write;

use crate::controller::ConsentController;

/// Where the banner is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerLocation {
    Top,
    #[default]
    Bottom,
}

impl BannerLocation {
    /// Parse `"top"` or `"bottom"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Banner text and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub accept_text: String,
    pub decline_text: String,
    pub reset_text: String,
    pub location: BannerLocation,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            message: "This website uses cookies for analytics to enhance your experience. \
                      Click \u{2018}Accept\u{2019} to consent to Google Analytics."
                .to_owned(),
            accept_text: "Accept".to_owned(),
            decline_text: "Decline".to_owned(),
            reset_text: "Analytics Consent".to_owned(),
            location: BannerLocation::Bottom,
        }
    }
}

impl Banner {
    /// Render the slot for the controller's current state.
    #[must_use]
    pub fn render(&self, controller: &ConsentController) -> String {
        self.render_html(controller.should_show_prompt())
    }

    /// Render the slot with the prompt shown or hidden.
    #[must_use]
    pub fn render_html(&self, show_prompt: bool) -> String {
        let mut html = String::with_capacity(512);
        if show_prompt {
            let _ = writeln!(
                html,
                "<div class=\"cookie-consent cookie-consent--{}\" role=\"dialog\" aria-live=\"polite\">",
                self.location.as_str()
            );
            let _ = writeln!(
                html,
                "<div class=\"cookie-consent__message\">{}</div>",
                escape(&self.message)
            );
            let _ = writeln!(
                html,
                "<button type=\"button\" class=\"cookie-consent__accept\" data-consent=\"accept\">{}</button>",
                escape(&self.accept_text)
            );
            let _ = writeln!(
                html,
                "<button type=\"button\" class=\"cookie-consent__decline\" data-consent=\"decline\">{}</button>",
                escape(&self.decline_text)
            );
            html.push_str("</div>\n");
        }
        let _ = writeln!(
            html,
            "<div class=\"footer-consent-link\"><button type=\"button\" data-consent=\"reset\">{}</button></div>",
            escape(&self.reset_text)
        );
        html
    }
}

/// Escape HTML special characters.
fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
