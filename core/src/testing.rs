//! In-process transports for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use serde_json::json;

use crate::error::ApiError;
use crate::form::PetForm;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Pet, User};

pub const BASE_URL: &str = "http://fake";
pub const TOKEN: &str = "tok";

fn respond(status: u16, body: serde_json::Value) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    })
}

/// Replays canned `(status, body)` responses, or transport errors, in order.
pub struct Scripted {
    replies: RefCell<VecDeque<Result<(u16, &'static str), &'static str>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl Scripted {
    pub fn new(replies: Vec<Result<(u16, &'static str), &'static str>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for Scripted {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Ok((status, body))) => Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
            Some(Err(reason)) => Err(ApiError::Transport(reason.to_string())),
            None => panic!("unexpected request: {} {}", request.method.as_str(), request.path),
        }
    }
}

/// A small stateful backend: pets, users and logout, with one-shot failure
/// injection per method.
#[derive(Default)]
pub struct FakeBackend {
    pets: RefCell<Vec<Pet>>,
    users: RefCell<Vec<User>>,
    next_id: Cell<u32>,
    requests: RefCell<Vec<HttpRequest>>,
    failures: RefCell<Vec<(HttpMethod, u16, serde_json::Value)>>,
    offline: Cell<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pets(pets: Vec<Pet>) -> Self {
        let backend = Self::new();
        backend.next_id.set(pets.len() as u32);
        *backend.pets.borrow_mut() = pets;
        backend
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let backend = Self::new();
        *backend.users.borrow_mut() = users;
        backend
    }

    /// The next request with `method` answers `status` with `body`.
    pub fn fail_next(&self, method: HttpMethod, status: u16, body: serde_json::Value) {
        self.failures.borrow_mut().push((method, status, body));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// `METHOD /path` for every request seen, base URL stripped.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| {
                let path = r.path.strip_prefix(BASE_URL).unwrap_or(&r.path);
                format!("{} {path}", r.method.as_str())
            })
            .collect()
    }

    fn route(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let path = request.path.strip_prefix(BASE_URL).unwrap_or(&request.path);
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        if request.method == HttpMethod::Post && segments == ["auth", "logout"] {
            return respond(200, json!({ "message": "Logged out successfully" }));
        }
        if request.bearer_token() != Some(TOKEN) {
            return respond(401, json!({ "message": "Not authorized" }));
        }

        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["users", "getAllUsers"]) => {
                respond(200, serde_json::to_value(&*self.users.borrow()).unwrap())
            }
            (HttpMethod::Get, ["pets"]) => {
                respond(200, json!({ "pets": &*self.pets.borrow() }))
            }
            (HttpMethod::Post, ["pets"]) => {
                let form: PetForm = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                let id = self.next_id.get() + 1;
                self.next_id.set(id);
                let pet = pet_from_form(format!("pet-{id}"), &form);
                self.pets.borrow_mut().push(pet.clone());
                respond(201, json!({ "message": "Pet added successfully", "pet": pet }))
            }
            (HttpMethod::Get, ["pets", id]) => match self.pets.borrow().iter().find(|p| p.id == *id) {
                Some(pet) => respond(200, json!({ "pet": pet })),
                None => respond(404, json!({ "message": "Pet not found" })),
            },
            (HttpMethod::Put, ["pets", id]) => {
                let form: PetForm = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                let mut pets = self.pets.borrow_mut();
                match pets.iter_mut().find(|p| p.id == *id) {
                    Some(pet) => {
                        *pet = pet_from_form(pet.id.clone(), &form);
                        respond(200, json!({ "message": "Pet updated successfully", "pet": pet }))
                    }
                    None => respond(404, json!({ "message": "Pet not found" })),
                }
            }
            (HttpMethod::Delete, ["pets", id]) => {
                let mut pets = self.pets.borrow_mut();
                let before = pets.len();
                pets.retain(|p| p.id != *id);
                if pets.len() == before {
                    respond(404, json!({ "message": "Pet not found" }))
                } else {
                    respond(200, json!({ "message": "Pet deleted successfully" }))
                }
            }
            _ => respond(404, json!({ "message": "Route not found" })),
        }
    }
}

impl Transport for FakeBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        if self.offline.get() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        let failure = {
            let mut failures = self.failures.borrow_mut();
            failures
                .iter()
                .position(|(method, _, _)| *method == request.method)
                .map(|i| failures.remove(i))
        };
        if let Some((_, status, body)) = failure {
            return respond(status, body);
        }
        self.route(request)
    }
}

/// Stores the form the way a document database would: typed fields and a
/// midnight UTC timestamp for the birth date.
pub fn pet_from_form(id: String, form: &PetForm) -> Pet {
    Pet {
        id,
        name: form.name.clone(),
        kind: form.kind.parse().unwrap(),
        breed: Some(form.breed.clone()),
        sex: form.sex.parse().ok(),
        birth_date: Some(format!("{}T00:00:00.000Z", form.birth_date)),
        weight: form.weight.parse().ok(),
        notes: Some(form.notes.clone()),
        owner: Some("u1".to_string()),
    }
}
