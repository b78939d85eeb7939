//! Analytics bootstrap capability.
//!
//! The host page hands the controller something that can switch analytics on
//! for a tracking ID. Implementations are fire-and-forget: they may start an
//! asynchronous resource load but must return without waiting for it. They are
//! not idempotent; [`ConsentController`](crate::ConsentController) guards
//! against calling them twice.

/// Analytics bootstrap error.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Tracking ID is empty or contains characters a tag URL cannot carry.
    #[error("Invalid tracking ID: {0:?}")]
    InvalidTrackingId(String),
    /// The host could not attach the integration to the page.
    #[error("Failed to inject analytics: {0}")]
    Injection(String),
}

/// Capability that activates the analytics integration for this page.
pub trait AnalyticsBootstrap: Send + Sync {
    /// Enable analytics for `tracking_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if the integration cannot be started. The
    /// caller logs the error; it never affects consent state.
    fn enable_analytics(&self, tracking_id: &str) -> Result<(), BootstrapError>;
}

impl<F> AnalyticsBootstrap for F
where
    F: Fn(&str) -> Result<(), BootstrapError> + Send + Sync,
{
    fn enable_analytics(&self, tracking_id: &str) -> Result<(), BootstrapError> {
        self(tracking_id)
    }
}

/// Check that a tracking ID is safe to embed in a tag URL.
///
/// # Errors
///
/// Returns [`BootstrapError::InvalidTrackingId`] for empty IDs or IDs with
/// characters outside `[A-Za-z0-9-]`.
pub fn validate_tracking_id(tracking_id: &str) -> Result<(), BootstrapError> {
    let valid = !tracking_id.is_empty()
        && tracking_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(BootstrapError::InvalidTrackingId(tracking_id.to_owned()))
    }
}
