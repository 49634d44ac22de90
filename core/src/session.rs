//! Client-held session: bearer token, cached user and role.
//!
//! # Design
//! `Storage` is the `localStorage` contract: string keys to string values.
//! `SessionStore` owns the three session keys on top of it. API calls never
//! read storage themselves; callers load a [`Session`] and pass its token.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::types::{LoginResponse, User};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const ROLE_KEY: &str = "role";

/// Key-value persistent storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove_item(&self, key: &str) -> Result<(), ApiError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        (**self).remove_item(key)
    }
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk.
///
/// The file is read on every access and rewritten on every change, so two
/// processes sharing a file see each other's writes. A missing or corrupt
/// file reads as empty, and the next write replaces it.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ApiError> {
        self.read_checked().map(|(items, _)| items)
    }

    /// Items on disk plus whether the file was unreadable and needs rewriting.
    fn read_checked(&self) -> Result<(BTreeMap<String, String>, bool), ApiError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok((BTreeMap::new(), false)),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(items) => Ok((items, false)),
                Err(e) => {
                    warn!(path = %self.path.display(), "session file is corrupt, treating as empty: {e}");
                    Ok((BTreeMap::new(), true))
                }
            },
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok((BTreeMap::new(), false)),
            Err(e) => Err(ApiError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ApiError::Storage(format!("{}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, raw).map_err(|e| ApiError::Storage(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| ApiError::Storage(format!("{}: {e}", self.path.display())))
    }

    /// Sibling file written first and renamed over the real one.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        let (mut items, corrupt) = self.read_checked()?;
        if items.remove(key).is_some() || corrupt {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// An authenticated browser context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
    pub role: Option<String>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stores token, user and role from a login response. Responses without
    /// a token leave the stored session untouched; returns whether anything
    /// was written.
    pub fn persist_login(&self, response: &LoginResponse) -> Result<bool, ApiError> {
        let Some(token) = response.token.as_deref() else {
            return Ok(false);
        };
        self.storage.set_item(TOKEN_KEY, token)?;
        let user = serde_json::to_string(&response.data)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.storage.set_item(USER_KEY, &user)?;
        match response.role.as_deref() {
            Some(role) => self.storage.set_item(ROLE_KEY, role)?,
            None => self.storage.remove_item(ROLE_KEY)?,
        }
        debug!("session stored");
        Ok(true)
    }

    pub fn token(&self) -> Result<Option<String>, ApiError> {
        self.storage.get_item(TOKEN_KEY)
    }

    /// The stored session, or `None` when no token is present. A cached
    /// user that no longer parses is dropped rather than failing the load.
    pub fn load(&self) -> Result<Option<Session>, ApiError> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        let user = match self.storage.get_item(USER_KEY)? {
            Some(raw) => serde_json::from_str::<Option<User>>(&raw).unwrap_or_else(|e| {
                warn!("ignoring unreadable cached user: {e}");
                None
            }),
            None => None,
        };
        let role = self.storage.get_item(ROLE_KEY)?;
        Ok(Some(Session { token, user, role }))
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(ROLE_KEY)?;
        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(token: Option<&str>) -> LoginResponse {
        LoginResponse {
            message: Some("Login successful".into()),
            token: token.map(str::to_string),
            data: Some(User {
                id: "u1".into(),
                name: "Ann".into(),
                email: "ann@example.com".into(),
                role: "admin".into(),
            }),
            role: Some("admin".into()),
        }
    }

    #[test]
    fn login_with_token_is_retrievable() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(store.persist_login(&login(Some("abc"))).unwrap());

        let session = store.load().unwrap().unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.user.unwrap().email, "ann@example.com");
        assert!(store.load().unwrap().unwrap().is_admin());
        assert_eq!(store.storage().get_item(ROLE_KEY).unwrap().as_deref(), Some("admin"));
    }

    #[test]
    fn login_without_token_leaves_session_alone() {
        let store = SessionStore::new(MemoryStorage::new());
        store.persist_login(&login(Some("first"))).unwrap();

        assert!(!store.persist_login(&login(None)).unwrap());
        assert_eq!(store.token().unwrap().as_deref(), Some("first"));

        let empty = SessionStore::new(MemoryStorage::new());
        empty.persist_login(&login(None)).unwrap();
        assert!(empty.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_every_key() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(&storage);
        store.persist_login(&login(Some("abc"))).unwrap();
        store.clear().unwrap();

        for key in [TOKEN_KEY, USER_KEY, ROLE_KEY] {
            assert!(storage.get_item(key).unwrap().is_none(), "{key} survived");
        }
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn unreadable_user_is_dropped() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();

        let session = SessionStore::new(&storage).load().unwrap().unwrap();
        assert_eq!(session.token, "abc");
        assert!(session.user.is_none());
        assert!(session.role.is_none());
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = std::env::temp_dir().join(format!("pet-session-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("session.json");

        let first = FileStorage::new(&path);
        assert!(first.get_item(TOKEN_KEY).unwrap().is_none());
        SessionStore::new(first).persist_login(&login(Some("disk"))).unwrap();

        let second = SessionStore::new(FileStorage::new(&path));
        assert_eq!(second.token().unwrap().as_deref(), Some("disk"));
        second.clear().unwrap();
        assert!(second.load().unwrap().is_none());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_file_reads_empty_and_is_replaced() {
        let path = std::env::temp_dir().join(format!("pet-session-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"token": "abc"#).unwrap();

        let store = SessionStore::new(FileStorage::new(&path));
        assert!(store.load().unwrap().is_none());

        assert!(store.persist_login(&login(Some("fresh"))).unwrap());
        assert_eq!(store.token().unwrap().as_deref(), Some("fresh"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<BTreeMap<String, String>>(&raw).is_ok());

        std::fs::write(&path, "[1, 2").unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(serde_json::from_str::<BTreeMap<String, String>>(&raw).unwrap(), BTreeMap::new());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn writes_leave_no_temp_file_behind() {
        let dir = std::env::temp_dir().join(format!("pet-session-{}", uuid::Uuid::new_v4()));
        let path = dir.join("session.json");

        let storage = FileStorage::new(&path);
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
