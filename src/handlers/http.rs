/*!
 * HTTP Handler
 * http.fetch through reqwest, with every hop checked against the policy
 */

use super::params::{parse, to_value};
use crate::core::limits::{HTTP_USER_AGENT, MAX_HTTP_BODY};
use crate::permissions::PermissionManager;
use crate::router::{HandlerError, HandlerResult, RouterBuilder, RouterResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_REDIRECTS: usize = 10;

#[derive(Deserialize)]
struct FetchParams {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct FetchResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

#[derive(Clone)]
pub struct HttpHandler {
    permissions: PermissionManager,
    client: Client,
    timeout: Duration,
}

impl HttpHandler {
    /// Build the shared client
    ///
    /// Redirects are followed only while each target passes `check_net`;
    /// otherwise the redirect response itself is returned.
    pub fn new(permissions: PermissionManager, timeout: Duration) -> Result<Self, reqwest::Error> {
        let guard = permissions.clone();
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.stop();
            }
            match guard.check_net(attempt.url().as_str()) {
                Ok(_) => attempt.follow(),
                Err(denial) => {
                    warn!(url = %attempt.url(), reason = %denial.reason, "Redirect blocked by policy");
                    attempt.stop()
                }
            }
        });

        let client = Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .redirect(policy)
            .build()?;

        Ok(Self {
            permissions,
            client,
            timeout,
        })
    }

    pub fn register(self, builder: RouterBuilder) -> RouterResult<RouterBuilder> {
        builder.register_fn("http.fetch", move |_ctx, params| {
            let h = self.clone();
            async move { h.fetch(params).await }
        })
    }

    pub async fn fetch(&self, params: Value) -> HandlerResult {
        let FetchParams {
            url,
            method,
            headers,
            body,
        } = parse(params)?;

        let method = match method {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| HandlerError::invalid_params(format!("invalid method {:?}", m)))?,
            None => Method::GET,
        };
        let header_map = build_headers(&headers)?;
        let target = self.permissions.check_net(&url)?;

        let mut request = self
            .client
            .request(method.clone(), target.as_url().clone())
            .headers(header_map);
        if let Some(body) = body {
            request = request.body(body);
        }

        let run = async {
            let mut response = request.send().await?;
            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());

            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                if body.len() + chunk.len() > MAX_HTTP_BODY {
                    return Ok(Err(HandlerError::failed(format!(
                        "response body exceeds {} bytes",
                        MAX_HTTP_BODY
                    ))));
                }
                body.extend_from_slice(&chunk);
            }
            Ok::<_, reqwest::Error>(Ok((status, headers, body)))
        };

        let (status, headers, body) = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(outcome)) => outcome?,
            Ok(Err(e)) => {
                debug!(url = %target, error = %e, "Request failed");
                return Err(HandlerError::failed(format!("request to {} failed: {}", target, e)));
            }
            Err(_) => {
                return Err(HandlerError::Timeout {
                    operation: format!("http.fetch {}", target),
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        info!(method = %method, url = %target, status, bytes = body.len(), "Fetched");
        to_value(&FetchResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HandlerError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HandlerError::invalid_params(format!("invalid header name {:?}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HandlerError::invalid_params(format!("invalid value for header {}", name)))?;
        map.append(name, value);
    }
    Ok(map)
}

/// Repeated headers are joined with ", "
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    out
}
