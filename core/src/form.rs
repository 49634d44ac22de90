//! The create/edit pet form.
//!
//! Field values are kept exactly as typed and sent to the backend as strings,
//! the way a browser form submits them.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{Pet, PetType, Sex};

/// Request body for `POST /pets` and `PUT /pets/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PetForm {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub sex: String,
    pub birth_date: String,
    pub weight: String,
    pub notes: String,
}

/// Names of the form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Type,
    Breed,
    Sex,
    BirthDate,
    Weight,
    Notes,
}

impl FromStr for FormField {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => FormField::Name,
            "type" => FormField::Type,
            "breed" => FormField::Breed,
            "sex" => FormField::Sex,
            "birthDate" => FormField::BirthDate,
            "weight" => FormField::Weight,
            "notes" => FormField::Notes,
            other => return Err(ApiError::InvalidInput(format!("unknown form field: {other}"))),
        })
    }
}

impl PetForm {
    /// Pre-fills the form from an existing record.
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            kind: pet.kind.as_str().to_string(),
            breed: pet.breed.clone().unwrap_or_default(),
            sex: pet.sex.map(|s| s.as_str().to_string()).unwrap_or_default(),
            birth_date: pet
                .birth_date
                .as_deref()
                .and_then(normalize_birth_date)
                .unwrap_or_default(),
            weight: pet.weight.map(format_weight).unwrap_or_default(),
            notes: pet.notes.clone().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Type => self.kind = value,
            FormField::Breed => self.breed = value,
            FormField::Sex => self.sex = value,
            FormField::BirthDate => self.birth_date = value,
            FormField::Weight => self.weight = value,
            FormField::Notes => self.notes = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Type => &self.kind,
            FormField::Breed => &self.breed,
            FormField::Sex => &self.sex,
            FormField::BirthDate => &self.birth_date,
            FormField::Weight => &self.weight,
            FormField::Notes => &self.notes,
        }
    }

    /// Checks the constraints the form inputs declare: required fields, the
    /// select options, a calendar date and a non-negative weight.
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("Pet Name", &self.name),
            ("Type", &self.kind),
            ("Breed", &self.breed),
            ("Sex", &self.sex),
            ("Birth Date", &self.birth_date),
        ];
        if let Some((label, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ApiError::InvalidInput(format!("{label} is required")));
        }
        self.kind.parse::<PetType>()?;
        self.sex.parse::<Sex>()?;
        NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d").map_err(|_| {
            ApiError::InvalidInput(format!("invalid birth date: {}", self.birth_date))
        })?;
        if !self.weight.trim().is_empty() {
            match self.weight.trim().parse::<f64>() {
                Ok(w) if w >= 0.0 && w.is_finite() => {}
                _ => {
                    return Err(ApiError::InvalidInput(
                        "Weight must be a non-negative number".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

/// Reduces a stored birth date to its `YYYY-MM-DD` calendar date. Full
/// timestamps with an offset are converted to UTC first; timestamps without
/// one keep their own date. Returns `None` for anything else.
pub fn normalize_birth_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date().format("%Y-%m-%d").to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Formats a weight the way a number input shows it: `12` not `12.0`.
pub fn format_weight(weight: f64) -> String {
    weight.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rex() -> PetForm {
        PetForm {
            name: "Rex".into(),
            kind: "dog".into(),
            breed: "Lab".into(),
            sex: "Male".into(),
            birth_date: "2020-01-01".into(),
            weight: "12.5".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn serializes_as_submitted_strings() {
        let body = serde_json::to_value(rex()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Rex",
                "type": "dog",
                "breed": "Lab",
                "sex": "Male",
                "birthDate": "2020-01-01",
                "weight": "12.5",
                "notes": ""
            })
        );
    }

    #[test]
    fn normalizes_timestamps_to_calendar_date() {
        assert_eq!(normalize_birth_date("2020-01-01T00:00:00.000Z").as_deref(), Some("2020-01-01"));
        assert_eq!(normalize_birth_date("2019-06-30T23:30:00-02:00").as_deref(), Some("2019-07-01"));
        assert_eq!(normalize_birth_date("2021-03-04").as_deref(), Some("2021-03-04"));
        assert_eq!(normalize_birth_date("yesterday"), None);
    }

    #[test]
    fn keeps_date_of_timestamp_without_offset() {
        assert_eq!(normalize_birth_date("2020-01-01T00:00:00").as_deref(), Some("2020-01-01"));
        assert_eq!(normalize_birth_date("2020-01-01T23:59:59.250").as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn prefill_from_pet() {
        let pet: Pet = serde_json::from_value(serde_json::json!({
            "_id": "1",
            "name": "Rex",
            "type": "dog",
            "breed": "Lab",
            "sex": "Male",
            "birthDate": "2020-01-01T00:00:00.000Z",
            "weight": 12
        }))
        .unwrap();
        let form = PetForm::from_pet(&pet);
        assert_eq!(form.birth_date, "2020-01-01");
        assert_eq!(form.weight, "12");
        assert_eq!(form.notes, "");
        assert_eq!(form.kind, "dog");
    }

    #[test]
    fn set_by_field_name() {
        let mut form = PetForm::default();
        form.set("birthDate".parse().unwrap(), "2022-02-02");
        form.set(FormField::Notes, "likes walks");
        assert_eq!(form.get(FormField::BirthDate), "2022-02-02");
        assert_eq!(form.notes, "likes walks");
        assert!("colour".parse::<FormField>().is_err());
    }

    #[test]
    fn validation_mirrors_form_constraints() {
        assert!(rex().validate().is_ok());

        let mut form = rex();
        form.weight.clear();
        assert!(form.validate().is_ok(), "weight is optional");

        let mut form = rex();
        form.breed = "  ".into();
        assert_eq!(form.validate().unwrap_err().message(), "Breed is required");

        let mut form = rex();
        form.weight = "-1".into();
        assert!(form.validate().is_err());

        let mut form = rex();
        form.kind = "dragon".into();
        assert!(form.validate().is_err());

        let mut form = rex();
        form.birth_date = "01/01/2020".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn weight_formatting() {
        assert_eq!(format_weight(12.0), "12");
        assert_eq!(format_weight(12.5), "12.5");
        assert_eq!(format_weight(0.1), "0.1");
    }

    #[test]
    fn large_whole_weights_round_trip() {
        let shown = format_weight(1e20);
        assert_eq!(shown, "100000000000000000000");
        assert_eq!(shown.parse::<f64>().unwrap(), 1e20);
    }
}
