//! Stateless HTTP request builder and response parser for the pet service.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`; the
//! endpoint methods live next to their API module (`auth`, `users`, `pets`).
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base request for `path`, optionally authenticated.
    pub(crate) fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    pub(crate) fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.request(method, path, token);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

/// Decodes a 2xx JSON body, or turns any other status into a backend error.
pub(crate) fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Like [`parse_json`] but an empty 2xx body decodes as `T::default()`.
pub(crate) fn parse_json_or_default<T: DeserializeOwned + Default>(
    response: HttpResponse,
) -> Result<T, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to `ApiError::Backend`, lifting the
/// backend's `message` out of a JSON payload when there is one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let payload = serde_json::from_str::<serde_json::Value>(&response.body).ok();
    let message = payload
        .as_ref()
        .and_then(|p| p.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string);
    Err(ApiError::Backend {
        status: response.status,
        message,
        payload,
    })
}
