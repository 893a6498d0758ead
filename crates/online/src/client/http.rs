//! HTTP management endpoint client.
//!
//! Requests are JSON documents POSTed to `<base>/management`. The server
//! answers failed operations with an error status *and* a regular management
//! response body, so status codes alone are not treated as failures.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::operation::{ModelNodeResult, Operation};
use base64::prelude::*;
use serde_json::Value;
use std::time::Duration;

/// Path of the management endpoint below the base URL.
const MANAGEMENT_PATH: &str = "/management";

/// Default timeout for a single request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the HTTP management interface.
///
/// # Example
///
/// ```no_run
/// use online::{HttpClient, Operations};
/// use model::Address;
///
/// let client = HttpClient::new("http://localhost:9990").with_credentials("admin", "secret");
/// let ops = Operations::new(&client);
/// let exists = ops.exists(&Address::subsystem("datasources")).unwrap();
/// println!("datasources subsystem present: {exists}");
/// ```
pub struct HttpClient {
    agent: ureq::Agent,
    endpoint: String,
    authorization: Option<String>,
}

impl HttpClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:9990`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        let endpoint = if base.ends_with(MANAGEMENT_PATH) {
            base.to_string()
        } else {
            format!("{base}{MANAGEMENT_PATH}")
        };
        Self {
            agent: build_agent(DEFAULT_TIMEOUT),
            endpoint,
            authorization: None,
        }
    }

    /// Use a different per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    /// Authenticate with HTTP basic credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {token}"));
        self
    }

    /// The management endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Client for HttpClient {
    fn execute(&self, operation: &Operation) -> Result<ModelNodeResult> {
        let body = operation.to_model();
        log::debug!("POST {} {}", self.endpoint, body);

        let mut request = self
            .agent
            .post(&self.endpoint)
            .header("Accept", "application/json");
        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization.as_str());
        }

        let mut response = request
            .send_json(&body)
            .map_err(|err| Error::http(&self.endpoint, err, None))?;
        let status = response.status().as_u16();

        let payload: Value = match response.body_mut().read_json() {
            Ok(payload) => payload,
            Err(err) => return Err(Error::http(&self.endpoint, err, Some(status))),
        };
        log::debug!("HTTP {status} {payload}");

        ModelNodeResult::from_response(payload)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_management_path() {
        assert_eq!(
            HttpClient::new("http://localhost:9990").endpoint(),
            "http://localhost:9990/management"
        );
        assert_eq!(
            HttpClient::new("http://localhost:9990/").endpoint(),
            "http://localhost:9990/management"
        );
        assert_eq!(
            HttpClient::new("http://localhost:9990/management").endpoint(),
            "http://localhost:9990/management"
        );
    }

    #[test]
    fn test_basic_credentials() {
        let client = HttpClient::new("http://localhost:9990").with_credentials("admin", "secret");
        assert_eq!(
            client.authorization.as_deref(),
            Some("Basic YWRtaW46c2VjcmV0")
        );
    }

    #[test]
    fn test_unreachable_server_keeps_cause() {
        let client =
            HttpClient::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
        let err = client
            .execute(&Operation::new(
                crate::operation::names::READ_RESOURCE,
                model::Address::root(),
            ))
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: None, .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_describe() {
        let client = HttpClient::new("http://mgmt.example:9990");
        assert_eq!(client.describe(), "http://mgmt.example:9990/management");
    }
}
