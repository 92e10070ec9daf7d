/*!
 * Configuration
 * Application manifest and environment settings
 */

pub mod manifest;
pub mod runtime;
pub mod types;

pub use manifest::AppManifest;
pub use runtime::{HandlerTimeouts, RuntimeConfig};
pub use types::{ConfigError, ConfigResult};
