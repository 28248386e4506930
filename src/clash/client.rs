//! Clash controller HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - Read a group's members and active selection
//! - Batch-probe latency of all members of a group
//! - Set a group's active member
//! - Map transport failures and timeouts to `ClashError::Unreachable`

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::timeout;

use crate::clash::parsing::{parse_delay_report, parse_group_info};
use crate::clash::types::{ClashError, ClashResult, GroupInfo, ProbeReport};
use crate::config::ClashApiConfig;

/// HTTP client for one Clash controller.
#[derive(Clone)]
pub struct ClashClient {
    http: reqwest::Client,
    base_url: String,
    secret: Option<String>,
    control_timeout: Duration,
}

impl ClashClient {
    /// Create a client from controller configuration.
    pub fn new(config: &ClashApiConfig) -> ClashResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClashError::Unreachable(format!("client construction failed: {}", e)))?;

        let secret = if config.secret.is_empty() {
            None
        } else {
            Some(config.secret.clone())
        };

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret,
            control_timeout: Duration::from_millis(config.control_timeout_ms),
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.secret {
            Some(secret) => req.bearer_auth(secret),
            None => req,
        }
    }

    /// Fetch the controller version. Used as a startup connectivity check.
    pub async fn version(&self) -> ClashResult<String> {
        let url = format!("{}/version", self.base_url);
        let body = self.get_json(url).await?;
        body.get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClashError::Malformed("version response has no 'version'".into()))
    }

    /// Fetch a group's active selection and member list.
    pub async fn group_info(&self, group: &str) -> ClashResult<GroupInfo> {
        let url = format!("{}/proxies/{}", self.base_url, encode_path(group));
        let fut = self.authed(self.http.get(url)).send();

        let response = match timeout(self.control_timeout, fut).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(map_transport_error(e)),
            Err(_) => {
                return Err(ClashError::Unreachable(format!(
                    "group info timed out after {:?}",
                    self.control_timeout
                )))
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClashError::NotFound(group.to_string()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClashError::Malformed(format!("group info body: {}", e)))?;
        parse_group_info(&body)
    }

    /// Probe the latency of every member of a group against `test_url`.
    ///
    /// The controller runs the probes itself and answers once all members
    /// have responded or timed out, so the HTTP call is allowed the probe
    /// timeout plus the usual control margin.
    pub async fn probe_group(
        &self,
        group: &str,
        test_url: &str,
        probe_timeout_ms: u64,
    ) -> ClashResult<ProbeReport> {
        let url = format!("{}/group/{}/delay", self.base_url, encode_path(group));
        let deadline = Duration::from_millis(probe_timeout_ms) + self.control_timeout;
        let timeout_param = probe_timeout_ms.to_string();
        let fut = self
            .authed(self.http.get(url))
            .query(&[("url", test_url), ("timeout", timeout_param.as_str())])
            .send();

        let response = match timeout(deadline, fut).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(map_transport_error(e)),
            Err(_) => {
                return Err(ClashError::Unreachable(format!(
                    "group probe timed out after {:?}",
                    deadline
                )))
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClashError::NotFound(group.to_string()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClashError::Malformed(format!("delay report body: {}", e)))?;
        parse_delay_report(&body)
    }

    /// Set the active member of a group.
    ///
    /// Idempotent from the caller's perspective: selecting the member that
    /// is already active is accepted by the controller and changes nothing.
    pub async fn select_proxy(&self, group: &str, proxy: &str) -> ClashResult<()> {
        let url = format!("{}/proxies/{}", self.base_url, encode_path(group));
        let req = self
            .authed(self.http.put(url))
            .json(&serde_json::json!({ "name": proxy }));

        let response = match timeout(self.control_timeout, req.send()).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(map_transport_error(e)),
            Err(_) => {
                return Err(ClashError::Unreachable(format!(
                    "select timed out after {:?}",
                    self.control_timeout
                )))
            }
        };

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ClashError::NotFound(group.to_string())),
            StatusCode::BAD_REQUEST => Err(ClashError::RejectedSelection {
                group: group.to_string(),
                proxy: proxy.to_string(),
            }),
            s => Err(ClashError::Unreachable(format!(
                "select returned unexpected status {}",
                s
            ))),
        }
    }

    async fn get_json(&self, url: String) -> ClashResult<Value> {
        let fut = self.authed(self.http.get(url)).send();
        let response = match timeout(self.control_timeout, fut).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(map_transport_error(e)),
            Err(_) => {
                return Err(ClashError::Unreachable(format!(
                    "request timed out after {:?}",
                    self.control_timeout
                )))
            }
        };
        response
            .json()
            .await
            .map_err(|e| ClashError::Malformed(format!("response body: {}", e)))
    }
}

impl std::fmt::Debug for ClashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClashClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.secret.is_some())
            .field("control_timeout", &self.control_timeout)
            .finish()
    }
}

fn map_transport_error(e: reqwest::Error) -> ClashError {
    if e.is_timeout() {
        ClashError::Unreachable(format!("request timed out: {}", e))
    } else {
        ClashError::Unreachable(format!("transport error: {}", e))
    }
}

/// Percent-encode a group name for use as a path segment.
///
/// Group names routinely contain spaces, slashes and CJK characters.
fn encode_path(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
