//! Synchronous client core for the pettyworld pet service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern); a [`Transport`] performs
//! the round-trip. On top of the endpoint wrappers sit two view models: the
//! user's pet [`Dashboard`] and the read-only [`AdminDashboard`].
//!
//! # Design
//! - `ApiClient` is stateless and holds only `base_url`. Endpoints are split
//!   into `build_*` and `parse_*` so the I/O boundary is explicit.
//! - The session (token, user, role) lives in a [`Storage`] behind a
//!   [`SessionStore`]; every authenticated call takes the token explicitly.
//! - Views re-fetch the full pet list after every mutation; the backend is
//!   the source of truth.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod admin;
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod http;
pub mod pets;
pub mod render;
pub mod session;
pub mod transport;
pub mod types;
pub mod users;

#[cfg(test)]
mod testing;

pub use admin::AdminDashboard;
pub use api::Api;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use dashboard::{Dashboard, Mode, Route, Toast, ToastLevel};
pub use error::{ApiError, ErrorKind};
pub use form::{FormField, PetForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileStorage, MemoryStorage, Session, SessionStore, Storage};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::Transport;
pub use types::{
    Credentials, LoginResponse, MessageResponse, NewUser, Pet, PetList, PetResponse, PetType,
    RegisterResponse, Sex, User,
};
