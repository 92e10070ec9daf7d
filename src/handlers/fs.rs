/*!
 * Filesystem Handlers
 * fs.readTextFile, fs.writeTextFile, fs.readDir, fs.exists
 *
 * Every operation runs on the canonical path returned by the policy check,
 * never on the raw path from the caller.
 */

use super::params::{parse, to_value};
use crate::permissions::{FsAction, PermissionManager};
use crate::router::{HandlerError, HandlerResult, RouterBuilder, RouterResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Deserialize)]
struct PathParams {
    path: PathBuf,
}

#[derive(Deserialize)]
struct WriteParams {
    path: PathBuf,
    contents: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DirEntry {
    name: String,
    is_dir: bool,
}

#[derive(Clone)]
pub struct FsHandler {
    permissions: PermissionManager,
}

impl FsHandler {
    pub fn new(permissions: PermissionManager) -> Self {
        Self { permissions }
    }

    pub fn register(self, builder: RouterBuilder) -> RouterResult<RouterBuilder> {
        let read = self.clone();
        let write = self.clone();
        let list = self.clone();
        let exists = self;

        builder
            .register_fn("fs.readTextFile", move |_ctx, params| {
                let h = read.clone();
                async move { h.read_text_file(params).await }
            })?
            .register_fn("fs.writeTextFile", move |_ctx, params| {
                let h = write.clone();
                async move { h.write_text_file(params).await }
            })?
            .register_fn("fs.readDir", move |_ctx, params| {
                let h = list.clone();
                async move { h.read_dir(params).await }
            })?
            .register_fn("fs.exists", move |_ctx, params| {
                let h = exists.clone();
                async move { h.exists(params).await }
            })
    }

    pub async fn read_text_file(&self, params: Value) -> HandlerResult {
        let PathParams { path } = parse(params)?;
        let canonical = self.permissions.check_fs(FsAction::Read, &path)?;

        let contents = tokio::fs::read_to_string(canonical.as_path())
            .await
            .map_err(|e| HandlerError::failed(format!("failed to read {}: {}", canonical.as_path().display(), e)))?;
        debug!(path = %canonical.as_path().display(), bytes = contents.len(), "Read text file");
        Ok(Value::String(contents))
    }

    pub async fn write_text_file(&self, params: Value) -> HandlerResult {
        let WriteParams { path, contents } = parse(params)?;
        let canonical = self.permissions.check_fs(FsAction::Write, &path)?;

        tokio::fs::write(canonical.as_path(), contents.as_bytes())
            .await
            .map_err(|e| HandlerError::failed(format!("failed to write {}: {}", canonical.as_path().display(), e)))?;
        info!(path = %canonical.as_path().display(), bytes = contents.len(), "Wrote text file");
        Ok(Value::Null)
    }

    pub async fn read_dir(&self, params: Value) -> HandlerResult {
        let PathParams { path } = parse(params)?;
        let canonical = self.permissions.check_fs(FsAction::Read, &path)?;

        let mut reader = tokio::fs::read_dir(canonical.as_path())
            .await
            .map_err(|e| HandlerError::failed(format!("failed to list {}: {}", canonical.as_path().display(), e)))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        to_value(&entries)
    }

    pub async fn exists(&self, params: Value) -> HandlerResult {
        let PathParams { path } = parse(params)?;
        let found = self.permissions.check_fs_exists(&path)?;
        Ok(Value::Bool(found.is_some()))
    }
}
