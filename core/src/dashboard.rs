//! The signed-in user's pet dashboard.
//!
//! # Design
//! A view model: it owns the UI state (pet list, form, mode), turns user
//! actions into API calls and records what the page would show (toasts,
//! navigation). Every successful mutation re-fetches the whole list so the
//! view mirrors the backend rather than patching local state.

use tracing::{debug, warn};

use crate::api::Api;
use crate::error::ApiError;
use crate::form::{FormField, PetForm};
use crate::session::{Session, SessionStore, Storage};
use crate::transport::Transport;
use crate::types::Pet;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this pet?";

const LOAD_FAILED: &str = "Failed to load pets";
const ADD_FAILED: &str = "Failed to add pet";
const UPDATE_FAILED: &str = "Failed to update pet";
const DELETE_FAILED: &str = "Failed to delete pet";
const LOGIN_REQUIRED: &str = "Please log in to continue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListOnly,
    FormCreate,
    FormEdit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Profile,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Profile => "/profile",
            Route::Login => "/login",
        }
    }
}

pub struct Dashboard<T, S> {
    api: Api<T>,
    sessions: SessionStore<S>,
    session: Option<Session>,
    pets: Vec<Pet>,
    mode: Mode,
    form: PetForm,
    toasts: Vec<Toast>,
    route: Option<Route>,
}

impl<T: Transport, S: Storage> Dashboard<T, S> {
    pub fn new(api: Api<T>, sessions: SessionStore<S>) -> Self {
        Self {
            api,
            sessions,
            session: None,
            pets: Vec::new(),
            mode: Mode::ListOnly,
            form: PetForm::default(),
            toasts: Vec::new(),
            route: None,
        }
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn form(&self) -> &PetForm {
        &self.form
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Where the page asked to navigate, if anywhere.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Loads the stored session and the pet list. Without a session the
    /// page navigates to the login route.
    pub fn mount(&mut self) {
        match self.sessions.load() {
            Ok(Some(session)) => self.session = Some(session),
            Ok(None) => {
                self.error(LOGIN_REQUIRED.to_string());
                self.route = Some(Route::Login);
                return;
            }
            Err(e) => {
                warn!("could not read session: {e}");
                self.error(e.message_or(LOAD_FAILED));
                self.route = Some(Route::Login);
                return;
            }
        }
        if let Err(e) = self.refresh() {
            self.error(e.message_or(LOAD_FAILED));
        }
        self.mode = Mode::ListOnly;
    }

    /// "Add New Pet": opens an empty form.
    pub fn open_create(&mut self) {
        self.form = PetForm::default();
        self.mode = Mode::FormCreate;
    }

    /// "Edit": opens the form pre-filled from `pet`.
    pub fn edit(&mut self, pet: &Pet) {
        self.form = PetForm::from_pet(pet);
        self.mode = Mode::FormEdit { id: pet.id.clone() };
    }

    /// Opens the edit form for the listed pet with `id`.
    pub fn edit_by_id(&mut self, id: &str) -> Result<(), ApiError> {
        let pet = self
            .pets
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::InvalidInput(format!("no pet with id {id}")))?;
        self.edit(&pet);
        Ok(())
    }

    /// An input change event.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Submits the open form: create or update, then re-fetch the list and
    /// close the form. On failure the form stays open with its contents.
    pub fn submit(&mut self) {
        let (outcome, fallback) = match self.mode.clone() {
            Mode::ListOnly => return,
            Mode::FormCreate => (self.submit_create(), ADD_FAILED),
            Mode::FormEdit { id } => (self.submit_update(&id), UPDATE_FAILED),
        };
        match outcome {
            Ok(message) => {
                if let Some(message) = message {
                    self.success(message);
                }
                self.close_form();
            }
            Err(e) => self.error(e.message_or(fallback)),
        }
    }

    fn submit_create(&mut self) -> Result<Option<String>, ApiError> {
        self.form.validate()?;
        let token = self.token()?;
        let res = self.api.create_pet(&self.form, &token)?;
        debug!(name = %self.form.name, "pet created");
        self.refresh()?;
        Ok(res.message)
    }

    fn submit_update(&mut self, id: &str) -> Result<Option<String>, ApiError> {
        self.form.validate()?;
        let token = self.token()?;
        let res = self.api.update_pet(id, &self.form, &token)?;
        debug!(id, "pet updated");
        self.refresh()?;
        Ok(res.message)
    }

    /// "Cancel": discards the form.
    pub fn cancel(&mut self) {
        self.close_form();
    }

    /// "Delete": asks `confirm` first; a declined prompt issues no request.
    pub fn delete(&mut self, id: &str, confirm: impl FnOnce(&str) -> bool) {
        if !confirm(DELETE_PROMPT) {
            return;
        }
        let outcome = self.token().and_then(|token| {
            let res = self.api.delete_pet(id, &token)?;
            self.pets.retain(|p| p.id != id);
            self.refresh()?;
            Ok(res.message)
        });
        match outcome {
            Ok(Some(message)) => self.success(message),
            Ok(None) => {}
            Err(e) => self.error(e.message_or(DELETE_FAILED)),
        }
    }

    /// "Logout": tells the backend, then clears the stored session and goes
    /// to the login route whatever the backend said.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take().or_else(|| self.sessions.load().ok().flatten()) {
            match self.api.logout(&session.token) {
                Ok(res) => {
                    if let Some(message) = res.message {
                        self.success(message);
                    }
                }
                Err(e) => self.error(e.message()),
            }
        }
        if let Err(e) = self.sessions.clear() {
            warn!("could not clear session: {e}");
            self.error(e.message());
        }
        self.pets.clear();
        self.close_form();
        self.route = Some(Route::Login);
    }

    pub fn go_home(&mut self) {
        self.route = Some(Route::Home);
    }

    pub fn go_profile(&mut self) {
        self.route = Some(Route::Profile);
    }

    fn refresh(&mut self) -> Result<(), ApiError> {
        let token = self.token()?;
        self.pets = self.api.list_pets(&token)?.pets;
        debug!(count = self.pets.len(), "pets loaded");
        Ok(())
    }

    fn token(&self) -> Result<String, ApiError> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| ApiError::InvalidInput(LOGIN_REQUIRED.to_string()))
    }

    fn close_form(&mut self) {
        self.form = PetForm::default();
        self.mode = Mode::ListOnly;
    }

    fn success(&mut self, message: String) {
        self.toasts.push(Toast {
            level: ToastLevel::Success,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.toasts.push(Toast {
            level: ToastLevel::Error,
            message,
        });
    }
}
