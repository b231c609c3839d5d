//! Low-level HTTP gateway.
//!
//! Wraps the reqwest client with credential handling and the status
//! classification every Azure DevOps call shares: exactly 200 is success,
//! 203 is the service's application-level "not authenticated" signal, and
//! everything else is a generic request failure.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{AdoError, Result};

const USER_AGENT: &str = concat!("adoapi/", env!("CARGO_PKG_VERSION"));

/// Authenticated HTTP dispatch for the Azure DevOps REST surface.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    username: String,
    secret: String,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Create a gateway for the given credentials.
    ///
    /// An empty `username` means `secret` is a personal access token sent
    /// as a Bearer token; otherwise Basic auth is computed from both.
    pub fn new(username: &str, secret: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(AdoError::transport)?;

        Ok(Self {
            http,
            username: username.to_string(),
            secret: secret.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        if self.username.is_empty() {
            format!("Bearer {}", self.secret)
        } else {
            let pair = format!("{}:{}", self.username, self.secret);
            format!("Basic {}", BASE64.encode(pair))
        }
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: Url) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(AdoError::transport)?;

        Self::check_response(response).await
    }

    /// Make a POST request with a JSON-serializable body.
    ///
    /// `content_type` is explicit because work-item mutations use
    /// `application/json-patch+json` while plain resources use
    /// `application/json`.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        content_type: &str,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body)?;

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(payload)
            .send()
            .await
            .map_err(AdoError::transport)?;

        Self::check_response(response).await
    }

    /// Make a POST request with a raw byte body (attachment upload).
    #[tracing::instrument(skip(self, body))]
    pub async fn post_bytes(
        &self,
        url: Url,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Response> {
        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(body)
            .send()
            .await
            .map_err(AdoError::transport)?;

        Self::check_response(response).await
    }

    /// Make a PATCH request with a JSON-serializable body.
    #[tracing::instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        content_type: &str,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body)?;

        let response = self
            .http
            .patch(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(payload)
            .send()
            .await
            .map_err(AdoError::transport)?;

        Self::check_response(response).await
    }

    /// Fetch a resource as raw bytes, returning the body and the value of
    /// the `Content-Type` header. Used for attachment downloads.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, url: Url) -> Result<(Vec<u8>, Option<String>)> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = response.bytes().await.map_err(AdoError::transport)?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Classify the response status.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status().as_u16();

        match status {
            200 => Ok(response),
            203 => Err(AdoError::AuthenticationFailed),
            code => {
                let message = Self::extract_error_message(response, code).await;
                Err(AdoError::RequestFailed {
                    message,
                    status_code: Some(code),
                })
            }
        }
    }

    /// Extract an error message from a failed response.
    async fn extract_error_message(response: Response, code: u16) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("status code {code}"),
        };

        // Azure DevOps error payloads carry a "message" field.
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return format!("status code {code}: {msg}");
            }
        }

        format!("status code {code}")
    }
}

/// Read a response body and deserialize it, mapping decode failures into
/// `AdoError::Mapping` instead of handing back a half-built entity.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await.map_err(AdoError::transport)?;
    serde_json::from_str(&body).map_err(AdoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_username_yields_bearer_header() {
        let gateway = HttpGateway::new("", "my-token").unwrap();
        assert_eq!(gateway.auth_header(), "Bearer my-token");
    }

    #[test]
    fn username_yields_basic_header() {
        let gateway = HttpGateway::new("user", "secret").unwrap();
        let expected = format!("Basic {}", BASE64.encode("user:secret"));
        assert_eq!(gateway.auth_header(), expected);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let gateway = HttpGateway::new("user", "hunter2").unwrap();
        let debug = format!("{gateway:?}");
        assert!(debug.contains("HttpGateway"));
        assert!(!debug.contains("hunter2"));
    }
}
