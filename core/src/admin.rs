//! Read-only table of every registered user.

use tracing::error;

use crate::api::Api;
use crate::error::ApiError;
use crate::session::{SessionStore, Storage};
use crate::transport::Transport;
use crate::types::User;

pub struct AdminDashboard<T, S> {
    api: Api<T>,
    sessions: SessionStore<S>,
    users: Vec<User>,
    loading: bool,
    load_error: Option<String>,
}

impl<T: Transport, S: Storage> AdminDashboard<T, S> {
    pub fn new(api: Api<T>, sessions: SessionStore<S>) -> Self {
        Self {
            api,
            sessions,
            users: Vec::new(),
            loading: true,
            load_error: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Why the last load failed. The failure is also logged.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Fetches the users with the stored token. Loading ends whether or not
    /// the fetch succeeds.
    pub fn mount(&mut self) {
        self.loading = true;
        match self.fetch() {
            Ok(users) => {
                self.users = users;
                self.load_error = None;
            }
            Err(e) => {
                error!("Failed to load users: {e}");
                self.load_error = Some(e.message_or("Failed to load users"));
            }
        }
        self.loading = false;
    }

    fn fetch(&self) -> Result<Vec<User>, ApiError> {
        let token = self
            .sessions
            .token()?
            .ok_or_else(|| ApiError::InvalidInput("Please log in to continue".to_string()))?;
        self.api.list_all_users(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::http::HttpMethod;
    use crate::session::{MemoryStorage, TOKEN_KEY};
    use crate::testing::{FakeBackend, BASE_URL, TOKEN};
    use serde_json::json;

    fn users() -> Vec<User> {
        vec![
            User {
                id: "1".into(),
                name: "Ann".into(),
                email: "ann@example.com".into(),
                role: "admin".into(),
            },
            User {
                id: "2".into(),
                name: "Bob".into(),
                email: "bob@example.com".into(),
                role: "user".into(),
            },
        ]
    }

    fn admin<'a>(
        backend: &'a FakeBackend,
        storage: &'a MemoryStorage,
    ) -> AdminDashboard<&'a FakeBackend, &'a MemoryStorage> {
        AdminDashboard::new(
            Api::new(ApiClient::new(BASE_URL), backend),
            SessionStore::new(storage),
        )
    }

    #[test]
    fn loading_until_mounted() {
        let backend = FakeBackend::with_users(users());
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, TOKEN).unwrap();
        let mut view = admin(&backend, &storage);

        assert!(view.is_loading());
        view.mount();
        assert!(!view.is_loading());
        assert_eq!(view.users(), users().as_slice());
        assert_eq!(backend.calls(), vec!["GET /users/getAllUsers"]);
        assert!(view.load_error().is_none());
    }

    #[test]
    fn failure_is_recorded_not_fatal() {
        let backend = FakeBackend::with_users(users());
        backend.fail_next(HttpMethod::Get, 403, json!({ "message": "Admins only" }));
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, TOKEN).unwrap();
        let mut view = admin(&backend, &storage);

        view.mount();
        assert!(!view.is_loading());
        assert!(view.users().is_empty());
        assert_eq!(view.load_error(), Some("Admins only"));

        view.mount();
        assert_eq!(view.users().len(), 2);
        assert!(view.load_error().is_none());
    }

    #[test]
    fn missing_token_issues_no_request() {
        let backend = FakeBackend::with_users(users());
        let storage = MemoryStorage::new();
        let mut view = admin(&backend, &storage);

        view.mount();
        assert!(backend.calls().is_empty());
        assert!(!view.is_loading());
        assert!(view.load_error().is_some());
    }
}
