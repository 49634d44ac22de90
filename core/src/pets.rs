//! Pet record endpoints. Every call is authenticated with the caller's
//! token and returns the backend body verbatim; nothing is caught here.

use crate::api::Api;
use crate::client::{parse_json, parse_json_or_default, ApiClient};
use crate::error::ApiError;
use crate::form::PetForm;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{MessageResponse, PetList, PetResponse};

impl ApiClient {
    pub fn build_create_pet(&self, pet: &PetForm, token: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/pets", Some(token), pet)
    }

    pub fn parse_create_pet(&self, response: HttpResponse) -> Result<PetResponse, ApiError> {
        parse_json_or_default(response)
    }

    pub fn build_list_pets(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "/pets", Some(token))
    }

    pub fn parse_list_pets(&self, response: HttpResponse) -> Result<PetList, ApiError> {
        parse_json(response)
    }

    pub fn build_get_pet(&self, id: &str, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/pets/{id}"), Some(token))
    }

    pub fn parse_get_pet(&self, response: HttpResponse) -> Result<PetResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_update_pet(
        &self,
        id: &str,
        pet: &PetForm,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/pets/{id}"), Some(token), pet)
    }

    pub fn parse_update_pet(&self, response: HttpResponse) -> Result<PetResponse, ApiError> {
        parse_json_or_default(response)
    }

    pub fn build_delete_pet(&self, id: &str, token: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/pets/{id}"), Some(token))
    }

    pub fn parse_delete_pet(&self, response: HttpResponse) -> Result<MessageResponse, ApiError> {
        parse_json_or_default(response)
    }
}

impl<T: Transport> Api<T> {
    pub fn create_pet(&self, pet: &PetForm, token: &str) -> Result<PetResponse, ApiError> {
        let req = self.client().build_create_pet(pet, token)?;
        self.client().parse_create_pet(self.send(&req)?)
    }

    pub fn list_pets(&self, token: &str) -> Result<PetList, ApiError> {
        let req = self.client().build_list_pets(token);
        self.client().parse_list_pets(self.send(&req)?)
    }

    pub fn get_pet(&self, id: &str, token: &str) -> Result<PetResponse, ApiError> {
        let req = self.client().build_get_pet(id, token);
        self.client().parse_get_pet(self.send(&req)?)
    }

    pub fn update_pet(&self, id: &str, pet: &PetForm, token: &str) -> Result<PetResponse, ApiError> {
        let req = self.client().build_update_pet(id, pet, token)?;
        self.client().parse_update_pet(self.send(&req)?)
    }

    pub fn delete_pet(&self, id: &str, token: &str) -> Result<MessageResponse, ApiError> {
        let req = self.client().build_delete_pet(id, token);
        self.client().parse_delete_pet(self.send(&req)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PetType;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_create_pet_produces_correct_request() {
        let form = PetForm {
            name: "Rex".into(),
            kind: "dog".into(),
            ..PetForm::default()
        };
        let req = client().build_create_pet(&form, "tok").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/pets");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.bearer_token(), Some("tok"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Rex");
        assert_eq!(body["type"], "dog");
        assert_eq!(body["birthDate"], "");
    }

    #[test]
    fn build_get_update_delete_target_the_record() {
        let c = client();
        let get = c.build_get_pet("abc", "tok");
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.path, "http://localhost:3000/pets/abc");

        let update = c.build_update_pet("abc", &PetForm::default(), "tok").unwrap();
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.path, "http://localhost:3000/pets/abc");
        assert!(update.body.is_some());

        let delete = c.build_delete_pet("abc", "tok");
        assert_eq!(delete.method, HttpMethod::Delete);
        assert!(delete.body.is_none());
        assert_eq!(delete.bearer_token(), Some("tok"));
    }

    #[test]
    fn parse_list_pets_success() {
        let list = client()
            .parse_list_pets(response(
                200,
                r#"{"pets":[{"_id":"1","name":"Rex","type":"dog"},{"_id":"2","name":"Tom","type":"cat"}]}"#,
            ))
            .unwrap();
        assert_eq!(list.pets.len(), 2);
        assert_eq!(list.pets[1].kind, PetType::Cat);
    }

    #[test]
    fn parse_get_pet_not_found() {
        let err = client()
            .parse_get_pet(response(404, r#"{"message":"Pet not found"}"#))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Pet not found");
    }

    #[test]
    fn parse_create_pet_returns_message() {
        let res = client()
            .parse_create_pet(response(
                201,
                r#"{"message":"Pet added successfully","pet":{"_id":"9","name":"Rex","type":"dog"}}"#,
            ))
            .unwrap();
        assert_eq!(res.message.as_deref(), Some("Pet added successfully"));
        assert_eq!(res.pet.unwrap().id, "9");
    }

    #[test]
    fn parse_delete_pet_accepts_empty_body() {
        let res = client().parse_delete_pet(response(204, "")).unwrap();
        assert!(res.message.is_none());
    }

    #[test]
    fn parse_update_pet_wrong_status() {
        let err = client()
            .parse_update_pet(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Backend { status: 500, .. }));
    }
}
