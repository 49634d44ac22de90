//! Admin user listing.

use tracing::error;

use crate::api::Api;
use crate::client::{parse_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::User;

impl ApiClient {
    pub fn build_list_users(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "/users/getAllUsers", Some(token))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        parse_json(response)
    }
}

impl<T: Transport> Api<T> {
    /// Every registered user. Errors are logged and returned as-is.
    pub fn list_all_users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        let req = self.client().build_list_users(token);
        self.send(&req)
            .and_then(|res| self.client().parse_list_users(res))
            .inspect_err(|e| error!("Error Fetching Users: {e}"))
    }
}
