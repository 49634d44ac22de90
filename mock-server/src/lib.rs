//! In-memory stand-in for the pet service backend.
//!
//! Serves `/auth/*`, `/users/*` and `/pets/*` with the same JSON shapes as
//! the real service: `_id` keys, `{ "message": ... }` on errors, and birth
//! dates stored as full UTC timestamps.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub sex: String,
    pub birth_date: String,
    pub weight: Option<f64>,
    pub notes: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Pet create/update body. Weight may be a number or the string a form
/// input produces.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default, deserialize_with = "weight_input")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

fn weight_input<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

const PET_TYPES: [&str; 5] = ["dog", "cat", "bird", "fish", "other"];
const SEXES: [&str; 2] = ["Male", "Female"];

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct Store {
    accounts: Vec<Account>,
    sessions: Vec<(String, String)>,
    pets: Vec<Pet>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error responses: a status plus `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, invalid token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Access denied: admins only")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users/getAllUsers", get(list_users))
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/{id}", get(get_pet).put(update_pet).delete(delete_pet))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingToken)
}

fn current_user(store: &Store, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer(headers)?;
    let user_id = store
        .sessions
        .iter()
        .find(|(t, _)| t == token)
        .map(|(_, id)| id)
        .ok_or(AppError::InvalidToken)?;
    store
        .accounts
        .iter()
        .find(|a| &a.user.id == user_id)
        .map(|a| a.user.clone())
        .ok_or(AppError::InvalidToken)
}

/// Stores a date-only birth date as a midnight UTC timestamp.
fn birth_timestamp(date: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| format!("{}T00:00:00.000Z", d.format("%Y-%m-%d")))
        .map_err(|_| AppError::BadRequest(format!("Invalid birth date: {date}")))
}

fn validate_pet(input: &PetInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Pet name is required".to_string()));
    }
    if !PET_TYPES.contains(&input.kind.as_str()) {
        return Err(AppError::BadRequest(format!("Invalid pet type: {}", input.kind)));
    }
    if !input.sex.is_empty() && !SEXES.contains(&input.sex.as_str()) {
        return Err(AppError::BadRequest(format!("Invalid sex: {}", input.sex)));
    }
    if input.weight.is_some_and(|w| w < 0.0) {
        return Err(AppError::BadRequest("Weight cannot be negative".to_string()));
    }
    Ok(())
}

fn pet_from_input(id: String, owner: String, input: PetInput) -> Result<Pet, AppError> {
    validate_pet(&input)?;
    let birth_date = if input.birth_date.is_empty() {
        String::new()
    } else {
        birth_timestamp(&input.birth_date)?
    };
    Ok(Pet {
        id,
        owner,
        name: input.name,
        kind: input.kind,
        breed: input.breed,
        sex: input.sex,
        birth_date,
        weight: input.weight,
        notes: input.notes,
    })
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if input.name.trim().is_empty() || input.email.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest("Name, email and password are required".to_string()));
    }
    let mut store = db.write().await;
    if store.accounts.iter().any(|a| a.user.email == input.email) {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }
    let role = match input.role.as_deref() {
        None | Some("user") => "user",
        Some("admin") => "admin",
        Some(other) => return Err(AppError::BadRequest(format!("Invalid role: {other}"))),
    };
    let user = User {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        email: input.email,
        role: role.to_string(),
    };
    store.accounts.push(Account {
        user: user.clone(),
        password: input.password,
    });
    info!(email = %user.email, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "data": user })),
    ))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, AppError> {
    let mut store = db.write().await;
    let user = store
        .accounts
        .iter()
        .find(|a| a.user.email == input.email && a.password == input.password)
        .map(|a| a.user.clone())
        .ok_or(AppError::InvalidCredentials)?;
    let token = Uuid::new_v4().to_string();
    store.sessions.push((token.clone(), user.id.clone()));
    info!(email = %user.email, "user logged in");
    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "data": user,
        "role": user.role,
    })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, AppError> {
    let token = bearer(&headers)?.to_string();
    let mut store = db.write().await;
    let before = store.sessions.len();
    store.sessions.retain(|(t, _)| *t != token);
    if store.sessions.len() == before {
        return Err(AppError::InvalidToken);
    }
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

async fn list_users(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<User>>, AppError> {
    let store = db.read().await;
    let user = current_user(&store, &headers)?;
    if user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(Json(store.accounts.iter().map(|a| a.user.clone()).collect()))
}

async fn list_pets(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, AppError> {
    let store = db.read().await;
    let user = current_user(&store, &headers)?;
    let pets: Vec<&Pet> = store.pets.iter().filter(|p| p.owner == user.id).collect();
    Ok(Json(json!({ "message": "Pets fetched successfully", "pets": pets })))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<PetInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    let pet = pet_from_input(Uuid::new_v4().simple().to_string(), user.id, input)?;
    store.pets.push(pet.clone());
    info!(id = %pet.id, name = %pet.name, "pet created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Pet added successfully", "pet": pet })),
    ))
}

async fn get_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = db.read().await;
    let user = current_user(&store, &headers)?;
    let pet = store
        .pets
        .iter()
        .find(|p| p.id == id && p.owner == user.id)
        .ok_or(AppError::NotFound("Pet"))?;
    Ok(Json(json!({ "pet": pet })))
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<PetInput>,
) -> Result<Json<Value>, AppError> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    let slot = store
        .pets
        .iter_mut()
        .find(|p| p.id == id && p.owner == user.id)
        .ok_or(AppError::NotFound("Pet"))?;
    *slot = pet_from_input(id, user.id, input)?;
    info!(id = %slot.id, "pet updated");
    Ok(Json(json!({ "message": "Pet updated successfully", "pet": slot })))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    let before = store.pets.len();
    store.pets.retain(|p| !(p.id == id && p.owner == user.id));
    if store.pets.len() == before {
        return Err(AppError::NotFound("Pet"));
    }
    info!(%id, "pet deleted");
    Ok(Json(json!({ "message": "Pet deleted successfully" })))
}
