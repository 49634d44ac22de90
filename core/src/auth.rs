//! Registration, login and logout.
//!
//! Failures are logged and normalised: a backend error without its own
//! message, or a transport failure, reads "Registration Failed" or "Login
//! Failed".

use tracing::{error, info};

use crate::api::Api;
use crate::client::{parse_json, parse_json_or_default, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::{SessionStore, Storage};
use crate::transport::Transport;
use crate::types::{Credentials, LoginResponse, MessageResponse, NewUser, RegisterResponse};

pub const REGISTRATION_FAILED: &str = "Registration Failed";
pub const LOGIN_FAILED: &str = "Login Failed";

impl ApiClient {
    pub fn build_register(&self, user: &NewUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/register", None, user)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<RegisterResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", None, credentials)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_logout(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Post, "/auth/logout", Some(token))
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<MessageResponse, ApiError> {
        parse_json_or_default(response)
    }
}

impl<T: Transport> Api<T> {
    pub fn register(&self, user: &NewUser) -> Result<RegisterResponse, ApiError> {
        let outcome = self
            .client()
            .build_register(user)
            .and_then(|req| self.send(&req))
            .and_then(|res| self.client().parse_register(res));
        outcome.map_err(|e| {
            error!(email = %user.email, "registration failed: {e}");
            e.with_fallback(REGISTRATION_FAILED)
        })
    }

    /// Logs in and, when the response carries a token, stores token, user
    /// and role in `sessions`. The full response body is returned either way.
    pub fn login<S: Storage>(
        &self,
        credentials: &Credentials,
        sessions: &SessionStore<S>,
    ) -> Result<LoginResponse, ApiError> {
        let response = self
            .client()
            .build_login(credentials)
            .and_then(|req| self.send(&req))
            .and_then(|res| self.client().parse_login(res))
            .map_err(|e| {
                error!(email = %credentials.email, "login failed: {e}");
                e.with_fallback(LOGIN_FAILED)
            })?;
        if sessions.persist_login(&response)? {
            info!(email = %credentials.email, "logged in");
        }
        Ok(response)
    }

    pub fn logout(&self, token: &str) -> Result<MessageResponse, ApiError> {
        let req = self.client().build_logout(token);
        self.client().parse_logout(self.send(&req)?)
    }
}
