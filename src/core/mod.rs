/*!
 * Core Module
 * Shared limits, JSON helpers, and the top-level error
 */

pub mod errors;
pub mod json;
pub mod limits;

pub use errors::{BridgeError, BridgeResult};
