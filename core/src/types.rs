//! Domain DTOs for the pet service API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Records use
//! the document-store `_id` key and also accept a plain `id`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// A registered account as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body returned by `POST /auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<User>,
}

/// Body returned by `POST /auth/login`. `token` is absent when the backend
/// accepts the request without opening a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<User>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
    Bird,
    Fish,
    #[serde(other)]
    Other,
}

impl PetType {
    pub const ALL: [PetType; 5] = [
        PetType::Dog,
        PetType::Cat,
        PetType::Bird,
        PetType::Fish,
        PetType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
            PetType::Bird => "bird",
            PetType::Fish => "fish",
            PetType::Other => "other",
        }
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PetType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown pet type: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            other => Err(ApiError::InvalidInput(format!("unknown sex: {other}"))),
        }
    }
}

/// A pet record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PetType,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Weights arrive as numbers, numeric strings or empty strings depending on
/// how the record was written.
fn lenient_weight<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
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

/// Body returned by `GET /pets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetList {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Body returned by create, get and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pet: Option<Pet>,
}
