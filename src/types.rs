//! Re-exported types from external crates for convenience.
//!
//! These types are commonly used in this SDK and are re-exported here
//! so users don't need to add these dependencies to their `Cargo.toml`.

/// Date type accepted by every `start`/`finish` request parameter.
pub use chrono::NaiveDate;
/// API keys are held as secrets and only exposed while building a request.
pub use secrecy::{ExposeSecret, SecretString};
/// Structured values produced by `decoded` output and accepted as writer options.
pub use serde_json::{Map, Value, json};
/// Request targets handed to transport adapters.
pub use url::Url;
