//! Consent state machine.
//!
//! ```text
//!           accept
//!   UNSET ----------> GRANTED   (bootstrap once)
//!     |   decline
//!     +-------------> DENIED
//!     ^                 |
//!     +----- reset -----+   (from either decided state)
//! ```
//!
//! The persisted record is the only source of truth for the consent value.
//! The controller itself holds one piece of session state: whether analytics
//! has already been bootstrapped during this page lifetime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::bootstrap::AnalyticsBootstrap;
use crate::store::ConsentStore;
use crate::value::{ConsentValue, Decision};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "CookieConsent";

/// Owns the analytics consent decision for one page lifetime.
///
/// Construct one per page mount with the site's store and the host's
/// analytics capability, then call
/// [`bootstrap_analytics_if_granted`](Self::bootstrap_analytics_if_granted)
/// once. No method returns an error: store and bootstrap failures are logged
/// and degrade to "no consent recorded".
pub struct ConsentController {
    store: Arc<dyn ConsentStore>,
    bootstrap: Box<dyn AnalyticsBootstrap>,
    storage_key: String,
    tracking_id: String,
    bootstrapped: AtomicBool,
}

impl ConsentController {
    /// Create a controller using [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn new(
        store: Arc<dyn ConsentStore>,
        bootstrap: Box<dyn AnalyticsBootstrap>,
        tracking_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bootstrap,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            tracking_id: tracking_id.into(),
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Storage key holding the consent record.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Current consent as persisted.
    ///
    /// Absent, malformed, or unreadable records all yield
    /// [`ConsentValue::Unset`].
    pub fn get_consent(&self) -> ConsentValue {
        match self.store.read(&self.storage_key) {
            Ok(raw) => {
                let value = ConsentValue::from_stored(raw.as_deref());
                if let Some(raw) = raw
                    && value == ConsentValue::Unset
                {
                    tracing::debug!(key = %self.storage_key, raw = %raw, "Ignoring malformed consent record");
                }
                value
            }
            Err(e) => {
                tracing::debug!(key = %self.storage_key, error = %e, "Consent store unreadable");
                ConsentValue::Unset
            }
        }
    }

    /// Record a decision and, when granted, bootstrap analytics.
    ///
    /// The write has completed when this returns. A failed write is logged
    /// and otherwise ignored; analytics is still bootstrapped on `Granted`
    /// because the user did consent for this page.
    pub fn set_consent(&self, decision: Decision) {
        if let Err(e) = self.store.write(&self.storage_key, decision.as_stored()) {
            tracing::warn!(key = %self.storage_key, error = %e, "Failed to persist consent");
        } else {
            tracing::info!(decision = %ConsentValue::from(decision), "Consent recorded");
        }

        if decision == Decision::Granted {
            self.bootstrap_once();
        }
    }

    /// Forget the recorded decision so the prompt shows again.
    ///
    /// Analytics already bootstrapped in this session stays active; the
    /// integration cannot be unloaded from a live page.
    pub fn reset_consent(&self) {
        if let Err(e) = self.store.remove(&self.storage_key) {
            tracing::warn!(key = %self.storage_key, error = %e, "Failed to clear consent");
        } else {
            tracing::info!("Consent cleared");
        }
    }

    /// Whether the consent prompt should be displayed.
    pub fn should_show_prompt(&self) -> bool {
        self.get_consent() == ConsentValue::Unset
    }

    /// Mount-time dispatch: bootstrap analytics if consent is already granted.
    ///
    /// Returns the consent value observed.
    pub fn bootstrap_analytics_if_granted(&self) -> ConsentValue {
        let consent = self.get_consent();
        tracing::debug!(consent = %consent, "Consent controller mounted");
        if consent == ConsentValue::Granted {
            self.bootstrap_once();
        }
        consent
    }

    /// Whether analytics has been bootstrapped during this session.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    /// Invoke the bootstrap capability unless it already ran.
    ///
    /// The flag flips before the call, so a failing bootstrap is not retried.
    fn bootstrap_once(&self) {
        if self.bootstrapped.swap(true, Ordering::AcqRel) {
            tracing::debug!("Analytics already bootstrapped");
            return;
        }
        match self.bootstrap.enable_analytics(&self.tracking_id) {
            Ok(()) => tracing::info!(tracking_id = %self.tracking_id, "Analytics bootstrapped"),
            Err(e) => tracing::warn!(tracking_id = %self.tracking_id, error = %e, "Analytics bootstrap failed"),
        }
    }
}
