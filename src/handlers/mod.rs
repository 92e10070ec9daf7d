/*!
 * Capability Handlers
 * Built-in methods exposed to the untrusted side
 *
 * Handlers never authorize anything themselves; every privileged target goes
 * through the `PermissionManager` first and the handler then operates on the
 * canonical form it returns.
 */

pub mod clipboard;
pub mod fs;
pub mod http;
mod params;
pub mod path;
pub mod process;

pub use clipboard::{ClipboardHandler, ClipboardStore, CLIPBOARD_CHANGED};
pub use fs::FsHandler;
pub use http::HttpHandler;
pub use path::PathHandler;
pub use process::ProcessHandler;

use crate::config::HandlerTimeouts;
use crate::core::{BridgeError, BridgeResult};
use crate::permissions::PermissionManager;
use crate::resolver::PathVariables;
use crate::router::RouterBuilder;
use std::sync::Arc;

/// Shared state the built-in handlers are constructed from
#[derive(Clone)]
pub struct HostServices {
    pub permissions: PermissionManager,
    pub variables: PathVariables,
    pub timeouts: HandlerTimeouts,
    pub clipboard: Arc<ClipboardStore>,
}

impl HostServices {
    pub fn new(permissions: PermissionManager, variables: PathVariables, timeouts: HandlerTimeouts) -> Self {
        Self {
            permissions,
            variables,
            timeouts,
            clipboard: Arc::new(ClipboardStore::new()),
        }
    }
}

/// Register every built-in handler
pub fn register_defaults(builder: RouterBuilder, services: &HostServices) -> BridgeResult<RouterBuilder> {
    let http = HttpHandler::new(services.permissions.clone(), services.timeouts.http)
        .map_err(|e| BridgeError::Runtime(format!("failed to build HTTP client: {}", e)))?;

    let builder = FsHandler::new(services.permissions.clone()).register(builder)?;
    let builder = ProcessHandler::new(services.permissions.clone(), services.timeouts.process).register(builder)?;
    let builder = http.register(builder)?;
    let builder = ClipboardHandler::new(services.clipboard.clone()).register(builder)?;
    let builder = PathHandler::new(services.variables.clone()).register(builder)?;
    Ok(builder)
}
