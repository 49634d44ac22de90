//! `ApiClient` plus a `Transport`: one method per endpoint that builds,
//! sends and parses in a single call.
//!
//! The endpoint methods are defined in the `auth`, `users` and `pets`
//! modules.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Api<T> {
    client: ApiClient,
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub(crate) fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, path = %request.path, "response received");
        Ok(response)
    }
}
