/*!
 * Process Handler
 * process.exec: run a declared command directly, never through a shell
 */

use super::params::{parse, to_value};
use crate::core::limits::MAX_PROCESS_OUTPUT;
use crate::permissions::PermissionManager;
use crate::router::{HandlerError, HandlerResult, RouterBuilder, RouterResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Deserialize)]
struct ExecParams {
    cmd: String,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExecOutput {
    /// None when the process was ended by a signal
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

#[derive(Clone)]
pub struct ProcessHandler {
    permissions: PermissionManager,
    timeout: Duration,
}

impl ProcessHandler {
    pub fn new(permissions: PermissionManager, timeout: Duration) -> Self {
        Self {
            permissions,
            timeout,
        }
    }

    pub fn register(self, builder: RouterBuilder) -> RouterResult<RouterBuilder> {
        builder.register_fn("process.exec", move |_ctx, params| {
            let h = self.clone();
            async move { h.exec(params).await }
        })
    }

    pub async fn exec(&self, params: Value) -> HandlerResult {
        let ExecParams { cmd, args } = parse(params)?;
        if cmd.is_empty() || cmd.contains('\0') || args.iter().any(|a| a.contains('\0')) {
            return Err(HandlerError::invalid_params("command and arguments must be non-empty text without NUL bytes"));
        }
        self.permissions.check_process(&cmd, &args)?;

        let mut child = Command::new(&cmd)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HandlerError::failed(format!("failed to start {}: {}", cmd, e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (stdout, stderr, status) =
                tokio::try_join!(read_capped(stdout), read_capped(stderr), child.wait())?;
            Ok::<_, std::io::Error>((stdout, stderr, status))
        };

        let (stdout, stderr, status) = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result.map_err(|e| HandlerError::failed(format!("{} failed: {}", cmd, e)))?,
            Err(_) => {
                // kill_on_drop reaps the child once `child` goes out of scope
                warn!(cmd = %cmd, timeout_ms = self.timeout.as_millis() as u64, "Process timed out");
                return Err(HandlerError::Timeout {
                    operation: format!("process.exec {}", cmd),
                    after_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        info!(cmd = %cmd, code = ?status.code(), "Process finished");
        to_value(&ExecOutput {
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Read up to `MAX_PROCESS_OUTPUT` bytes and discard the rest so the child never blocks on a full pipe
async fn read_capped<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };
    let mut buf = Vec::new();
    (&mut pipe).take(MAX_PROCESS_OUTPUT as u64).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(buf)
}
