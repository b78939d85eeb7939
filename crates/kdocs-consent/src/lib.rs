//! Analytics consent for kdocs sites.
//!
//! This crate owns the one stateful piece of a documentation page: the
//! cookie-consent prompt and the analytics bootstrap it gates.
//!
//! - [`ConsentController`]: tri-state consent (unset, granted, denied) with
//!   persisted decisions, reset, and at-most-once analytics bootstrap
//! - [`store`]: where decisions live ([`ConsentStore`] and its backends)
//! - [`AnalyticsBootstrap`]: the host capability that turns analytics on;
//!   [`GtagLoader`] is the Google Analytics implementation
//! - [`Banner`]: markup for the prompt slot
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kdocs_consent::{ConsentController, ConsentValue, Decision, GtagLoader, PageHead};
//! use kdocs_consent::store::MemoryStore;
//!
//! let head = Arc::new(PageHead::new());
//! let controller = ConsentController::new(
//!     Arc::new(MemoryStore::new()),
//!     Box::new(GtagLoader::new(Arc::clone(&head))),
//!     "G-J507K728FR",
//! );
//!
//! assert_eq!(controller.bootstrap_analytics_if_granted(), ConsentValue::Unset);
//! assert!(controller.should_show_prompt());
//!
//! controller.set_consent(Decision::Granted);
//! assert!(!controller.should_show_prompt());
//! assert_eq!(head.scripts().len(), 1);
//! ```

mod banner;
mod bootstrap;
mod controller;
mod gtag;
pub mod store;
mod value;

pub use banner::{Banner, BannerLocation};
pub use bootstrap::{AnalyticsBootstrap, BootstrapError, validate_tracking_id};
pub use controller::{ConsentController, DEFAULT_STORAGE_KEY};
pub use gtag::{CONSENT_EVENT_ACTION, CONSENT_EVENT_CATEGORY, GtagCommand, GtagLoader, PageHead};
pub use store::{ConsentStore, StoreError, StoreErrorKind};
pub use value::{ConsentValue, Decision};
