/*!
 * Host Bridge - Main Entry Point
 *
 * Serves newline-delimited call envelopes on stdin and writes results and
 * push events to stdout. Logs go to stderr.
 */

use host_bridge::{
    init_tracing, register_defaults, BridgeError, HostServices, PathVariable, PathVariables, PermissionManager,
    Router, RuntimeConfig,
};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    init_tracing();

    info!("Host bridge starting...");

    let config = RuntimeConfig::from_env().map_err(BridgeError::from)?;
    let manifest = &config.manifest;

    let variables = PathVariables::init_global(manifest.path_variables().map_err(BridgeError::from)?);

    // Pattern prefixes are canonicalized at compile time, so the data
    // directory has to exist first
    let app_data = variables.resolve(PathVariable::AppData);
    if let Err(e) = std::fs::create_dir_all(app_data) {
        warn!(path = %app_data.display(), error = %e, "Could not create application data directory");
    }

    let policy = manifest.compile_policy(variables).map_err(BridgeError::from)?;
    info!(
        identifier = %manifest.identifier,
        mode = ?policy.mode(),
        "Permission policy compiled"
    );

    let services = HostServices::new(PermissionManager::new(policy), variables.clone(), config.timeouts);
    let router = register_defaults(Router::builder(), &services)?.build();
    info!(methods = ?router.methods(), "Serving on stdio");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    router.serve(stdin, stdout).await.map_err(BridgeError::from)?;

    let stats = services.permissions.audit_stats();
    info!(
        decisions = stats.total_events,
        denials = stats.total_denials,
        "Input closed, shutting down"
    );
    Ok(())
}
