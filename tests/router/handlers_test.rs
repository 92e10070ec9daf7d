/*!
 * Built-in Handler Tests
 * Every capability goes through the policy before touching anything
 */

use host_bridge::handlers::CLIPBOARD_CHANGED;
use host_bridge::permissions::PermissionsConfig;
use host_bridge::{
    register_defaults, HandlerTimeouts, HostServices, OutboundSink, PathVariables, PermissionManager,
    Policy, ResultEnvelope, Router,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Host {
    _dir: TempDir,
    base: PathBuf,
    router: Router,
    services: HostServices,
}

impl Host {
    fn new(permissions: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        for sub in ["appdata", "home", "tmp", "res", "outside"] {
            fs::create_dir_all(base.join(sub)).unwrap();
        }
        let variables = PathVariables::from_parts(
            base.join("appdata"),
            base.join("home"),
            base.join("tmp"),
            base.join("res"),
        );
        let config: Option<PermissionsConfig> = permissions.map(|p| serde_json::from_str(p).unwrap());
        let policy = Policy::from_config(config.as_ref(), &variables).unwrap();

        let services = HostServices::new(
            PermissionManager::new(policy),
            variables,
            HandlerTimeouts::default(),
        );
        let router = register_defaults(Router::builder(), &services).unwrap().build();
        Self {
            _dir: dir,
            base,
            router,
            services,
        }
    }

    fn path(&self, relative: &str) -> String {
        self.base.join(relative).display().to_string()
    }

    async fn call(&self, method: &str, params: Value) -> ResultEnvelope {
        let (sink, _rx) = OutboundSink::channel();
        self.call_with(&sink, method, params).await
    }

    async fn call_with(&self, sink: &OutboundSink, method: &str, params: Value) -> ResultEnvelope {
        let raw = json!({"id": "t", "method": method, "params": params}).to_string();
        self.router.dispatch(raw.as_bytes(), sink.emitter()).await
    }
}

#[tokio::test]
async fn test_all_capabilities_registered() {
    let host = Host::new(None);
    assert_eq!(
        host.router.methods(),
        vec![
            "clipboard.readText",
            "clipboard.writeText",
            "fs.exists",
            "fs.readDir",
            "fs.readTextFile",
            "fs.writeTextFile",
            "http.fetch",
            "path.resolve",
            "process.exec",
        ]
    );
}

#[tokio::test]
async fn test_write_then_read_text_file() {
    let host = Host::new(None);
    let path = host.path("tmp/note.txt");

    let written = host
        .call("fs.writeTextFile", json!({"path": path, "contents": "hello"}))
        .await;
    assert_eq!(written.result, Some(Value::Null));

    let read = host.call("fs.readTextFile", json!({"path": path})).await;
    assert_eq!(read.result, Some(json!("hello")));
}

#[tokio::test]
async fn test_read_outside_scope_denied() {
    let host = Host::new(None);
    fs::write(host.base.join("outside/secret.txt"), "s").unwrap();

    let reply = host
        .call("fs.readTextFile", json!({"path": host.path("outside/secret.txt")}))
        .await;
    let error = reply.error.unwrap();
    assert!(error.starts_with("permission denied (fs.read)"), "{}", error);
    assert_eq!(host.services.permissions.audit_stats().total_denials, 1);
}

#[tokio::test]
async fn test_read_dir_sorted_with_kinds() {
    let host = Host::new(None);
    fs::create_dir_all(host.base.join("home/b_dir")).unwrap();
    fs::write(host.base.join("home/a.txt"), "a").unwrap();
    fs::write(host.base.join("home/c.txt"), "c").unwrap();

    let reply = host.call("fs.readDir", json!({"path": host.path("home")})).await;
    assert_eq!(
        reply.result.unwrap(),
        json!([
            {"name": "a.txt", "isDir": false},
            {"name": "b_dir", "isDir": true},
            {"name": "c.txt", "isDir": false},
        ])
    );
}

#[tokio::test]
async fn test_exists() {
    let host = Host::new(None);
    fs::write(host.base.join("home/here.txt"), "x").unwrap();

    let here = host.call("fs.exists", json!({"path": host.path("home/here.txt")})).await;
    assert_eq!(here.result, Some(json!(true)));

    let missing = host.call("fs.exists", json!({"path": host.path("home/gone.txt")})).await;
    assert_eq!(missing.result, Some(json!(false)));

    let outside = host.call("fs.exists", json!({"path": host.path("outside/gone.txt")})).await;
    assert!(outside.error.is_some());
}

#[tokio::test]
async fn test_invalid_params_reported() {
    let host = Host::new(None);
    let reply = host.call("fs.readTextFile", json!({"file": "/x"})).await;
    assert!(reply.error.unwrap().contains("path"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_exec_permissive() {
    let host = Host::new(None);
    let reply = host
        .call("process.exec", json!({"cmd": "echo", "args": ["hi"]}))
        .await;
    assert_eq!(
        reply.result.unwrap(),
        json!({"code": 0, "stdout": "hi\n", "stderr": ""})
    );
}

#[tokio::test]
async fn test_process_exec_restricted_denied_before_spawn() {
    let host = Host::new(Some(r#"{"process": {"exec": [{"cmd": "git", "args": ["status"]}]}}"#));
    let reply = host
        .call("process.exec", json!({"cmd": "git", "args": ["push"]}))
        .await;
    assert!(reply.error.unwrap().starts_with("permission denied (process.exec)"));
}

#[tokio::test]
async fn test_http_fetch_denied_without_network() {
    let host = Host::new(Some(
        r#"{"http": {"allow": ["https://api.example.com/**"], "deny": ["https://api.example.com/admin/**"]}}"#,
    ));

    let denied = host
        .call("http.fetch", json!({"url": "https://api.example.com/admin/keys"}))
        .await;
    assert!(denied.error.unwrap().starts_with("permission denied (http.deny)"));

    let not_allowed = host
        .call("http.fetch", json!({"url": "https://other.example.com/"}))
        .await;
    assert!(not_allowed.error.unwrap().starts_with("permission denied (http.allow)"));
}

#[tokio::test]
async fn test_clipboard_write_emits_change_event() {
    let host = Host::new(None);
    let (sink, rx) = OutboundSink::channel();

    let empty = host.call_with(&sink, "clipboard.readText", json!({})).await;
    assert_eq!(empty.result, Some(Value::Null));

    let written = host
        .call_with(&sink, "clipboard.writeText", json!({"text": "copied"}))
        .await;
    assert!(written.is_success());

    let event: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(event, json!({"event": CLIPBOARD_CHANGED, "data": {"sequence": 1}}));

    let read = host.call_with(&sink, "clipboard.readText", json!({})).await;
    assert_eq!(read.result, Some(json!("copied")));
}

#[tokio::test]
async fn test_path_resolve() {
    let host = Host::new(None);
    let reply = host.call("path.resolve", json!({"variable": "$TEMP"})).await;
    assert_eq!(reply.result, Some(json!(host.path("tmp"))));
}
