//! Backend gateway: the sole point of contact with the license service.
//!
//! Attaches the bearer credential and JSON conventions to every outbound
//! call. Status interpretation belongs to the caller (the session guard
//! for 401, the mutation commands for the rest); the gateway only
//! distinguishes transport failure and cancellation.

use std::sync::Arc;

use reqwest::{Method, Response};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::session::Session;

/// Body of a successful `POST /token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request.
    ///
    /// `Authorization: Bearer` is attached when a credential is held and
    /// `Content-Type: application/json` when a body is present. A
    /// triggered `cancel` aborts the in-flight request and yields
    /// [`ApiError::Cancelled`], which callers treat as silence, not
    /// failure.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let mut req = self.http.request(method, self.url(path));
        if let Some(token) = self.session.bearer() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            resp = req.send() => Ok(resp?),
        }
    }

    /// Authenticate against the backend.
    ///
    /// The token endpoint takes form-encoded credentials and no bearer.
    /// Returns the access token; installing it into the session is the
    /// caller's decision.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_detail(resp).await,
            });
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("token response: {e}")))?;
        Ok(body.access_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Extract the backend's human-readable `detail` from an error response,
/// falling back to the status text.
pub(crate) async fn error_detail(resp: Response) -> String {
    let status = resp.status();
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("detail")
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Err(_) => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    #[test]
    fn base_url_is_trimmed() {
        let session = Arc::new(Session::new(Arc::new(MemoryTokenStore::default())));
        let gw = Gateway::new("http://localhost:8080/", session);
        assert_eq!(gw.base_url(), "http://localhost:8080");
        assert_eq!(gw.url("/licenses"), "http://localhost:8080/licenses");
    }
}
