//! Plain-text rendering of the two views.

use std::fmt::Write;

use crate::admin::AdminDashboard;
use crate::dashboard::{Dashboard, Mode};
use crate::form::{format_weight, normalize_birth_date, PetForm};
use crate::session::Storage;
use crate::transport::Transport;
use crate::types::{Pet, User};

const NOT_SPECIFIED: &str = "Not specified";
const NO_PETS: &str = "No pets added yet. Add your first pet!";

impl<T: Transport, S: Storage> Dashboard<T, S> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("pettyworld    [Home] [User Profile] [Logout]\n\n");
        out.push_str("Pet Dashboard\nManage your pet details\n\n[Add New Pet]\n");

        match self.mode() {
            Mode::ListOnly => {}
            Mode::FormCreate => render_form(&mut out, "Add New Pet", "Add Pet", self.form()),
            Mode::FormEdit { .. } => render_form(&mut out, "Edit Pet", "Update Pet", self.form()),
        }

        out.push_str("\nMy Pets\n");
        if self.pets().is_empty() {
            let _ = writeln!(out, "{NO_PETS}");
        } else {
            for pet in self.pets() {
                out.push('\n');
                render_pet(&mut out, pet);
            }
        }
        out
    }
}

impl<T: Transport, S: Storage> AdminDashboard<T, S> {
    pub fn render(&self) -> String {
        let mut out = String::from("Pet Dashboard\nUser List\n\n");
        if self.is_loading() {
            out.push_str("Loading...\n");
            return out;
        }
        if let Some(error) = self.load_error() {
            let _ = writeln!(out, "! {error}\n");
        }
        out.push_str(&render_user_table(self.users()));
        out
    }
}

fn render_form(out: &mut String, title: &str, submit: &str, form: &PetForm) {
    let _ = writeln!(out, "\n{title}");
    let rows = [
        ("Pet Name", form.name.as_str()),
        ("Type", form.kind.as_str()),
        ("Breed", form.breed.as_str()),
        ("Sex", form.sex.as_str()),
        ("Birth Date", form.birth_date.as_str()),
        ("Weight (kg)", form.weight.as_str()),
        ("Notes", form.notes.as_str()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<12} {value}");
    }
    let _ = writeln!(out, "  [Cancel] [{submit}]");
}

/// One pet card.
pub fn render_pet(out: &mut String, pet: &Pet) {
    let _ = writeln!(out, "{} ({})  id: {}", pet.name, pet.kind, pet.id);
    let breed = pet.breed.as_deref().filter(|b| !b.is_empty()).unwrap_or(NOT_SPECIFIED);
    let _ = writeln!(out, "  Breed: {breed}");
    let sex = pet.sex.map(|s| s.as_str()).unwrap_or(NOT_SPECIFIED);
    let _ = writeln!(out, "  Sex: {sex}");
    let birth = pet
        .birth_date
        .as_deref()
        .and_then(normalize_birth_date)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let _ = writeln!(out, "  Birth Date: {birth}");
    let weight = match pet.weight {
        Some(w) if w != 0.0 => format!("{} kg", format_weight(w)),
        _ => NOT_SPECIFIED.to_string(),
    };
    let _ = writeln!(out, "  Weight: {weight}");
    if let Some(notes) = pet.notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "  Notes: {notes}");
    }
}

/// Fixed-width ID / Name / Email / Role table.
pub fn render_user_table(users: &[User]) -> String {
    let headers = ["ID", "Name", "Email", "Role"];
    let rows: Vec<[&str; 4]> = users
        .iter()
        .map(|u| [u.id.as_str(), u.name.as_str(), u.email.as_str(), u.role.as_str()])
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: [&str; 4]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "| {} |", padded.join(" | "));
    };
    line(&mut out, headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "|-{}-|", rule.join("-|-"));
    for row in rows {
        line(&mut out, row);
    }
    out
}
