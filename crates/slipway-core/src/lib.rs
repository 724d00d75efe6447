//! Core engine for slipway: remote manifest management, publish
//! orchestration, and self-update.
//!
//! Every public operation here is one awaited round-trip chain that
//! returns or fails before the caller continues; there is no background
//! scheduling and no internal retry.

pub mod decision;
pub mod distribution;
pub mod io;
pub mod manifest_manager;
pub mod reporter;
pub mod update;
pub mod uploader;

pub use decision::{DecisionPort, FixedDecision};
pub use manifest_manager::{ManifestFetchError, ManifestManager};
pub use reporter::{NullReporter, Reporter};
pub use uploader::{UploadError, Uploader};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("slipway/", env!("CARGO_PKG_VERSION"));

/// Default request timeout for HTTP clients talking to the release store.
/// Network calls must never hang indefinitely.
pub const DEFAULT_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
