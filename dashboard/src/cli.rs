use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pet_core::{FormField, PetType, Sex};

#[derive(Debug, Parser)]
#[command(name = "pet-dashboard")]
#[command(about = "pettyworld pet dashboard for the terminal")]
pub struct Cli {
    /// Backend base URL; overrides PET_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Where the session is kept; overrides PET_SESSION_FILE.
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<String>,
    },
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session.
    Logout,
    /// Manage your pets.
    Pets {
        #[command(subcommand)]
        command: PetCommand,
    },
    /// List every user (admins only).
    Users,
    Home,
    Profile,
}

#[derive(Debug, Subcommand)]
pub enum PetCommand {
    List,
    Show {
        id: String,
    },
    Add(PetFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: PetFields,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Default, Args)]
pub struct PetFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type", value_parser = parse_pet_type)]
    pub kind: Option<String>,
    #[arg(long)]
    pub breed: Option<String>,
    #[arg(long, value_parser = parse_sex)]
    pub sex: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<String>,
    /// Kilograms.
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl PetFields {
    /// The fields given on the command line, as form input events.
    pub fn changes(&self) -> Vec<(FormField, String)> {
        [
            (FormField::Name, &self.name),
            (FormField::Type, &self.kind),
            (FormField::Breed, &self.breed),
            (FormField::Sex, &self.sex),
            (FormField::BirthDate, &self.birth_date),
            (FormField::Weight, &self.weight),
            (FormField::Notes, &self.notes),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }
}

fn parse_pet_type(s: &str) -> Result<String, String> {
    s.parse::<PetType>()
        .map(|kind| kind.as_str().to_string())
        .map_err(|e| e.to_string())
}

fn parse_sex(s: &str) -> Result<String, String> {
    s.parse::<Sex>()
        .map(|sex| sex.as_str().to_string())
        .map_err(|e| e.to_string())
}
