//! Blocking HTTP client for the server API
//!
//! Thin wrapper over `reqwest::blocking` with basic auth and JSON bodies.
//! Test servers routinely run with self-signed certificates, so certificate
//! verification is disabled.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::Result;

/// An HTTP response reduced to what the harness needs.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct ApiClient {
    client: Client,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            username: config.server.api_user.clone(),
            password: config.server.api_password.clone(),
        })
    }

    pub fn get(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::GET, url, None)
    }

    pub fn post(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, url, Some(body))
    }

    pub fn put(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PUT, url, Some(body))
    }

    pub fn delete(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, url, None)
    }

    fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<ApiResponse> {
        debug!(%method, %url, "api request");
        let mut request = self
            .client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        // Error bodies still carry the server diagnostic; an unparseable
        // body becomes the raw text.
        let text = response.text()?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_range() {
        let ok = ApiResponse { status: 201, body: json!({}) };
        let err = ApiResponse { status: 422, body: json!({}) };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = HarnessConfig::default();
        assert!(ApiClient::new(&config).is_ok());
    }
}
