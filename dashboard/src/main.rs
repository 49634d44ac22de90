mod cli;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use pet_core::render::render_pet;
use pet_core::{
    AdminDashboard, Api, ApiClient, ApiError, ClientConfig, Credentials, Dashboard, FileStorage,
    NewUser, SessionStore, Toast, ToastLevel, UreqTransport,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, Command, PetCommand};

type PetDashboard = Dashboard<UreqTransport, FileStorage>;

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the page showed an error toast.
fn run(cli: Cli) -> Result<bool, ApiError> {
    let mut config = ClientConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    let api = Api::new(ApiClient::new(&config.api_url), UreqTransport::new());
    debug!(api_url = api.client().base_url(), session = %config.session_file.display(), "configured");
    let sessions = SessionStore::new(FileStorage::new(&config.session_file));

    match cli.command {
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let res = api.register(&NewUser {
                name,
                email,
                password,
                role,
            })?;
            println!("{}", res.message.as_deref().unwrap_or("Registered"));
            Ok(true)
        }
        Command::Login { email, password } => {
            let res = api.login(&Credentials { email, password }, &sessions)?;
            println!("{}", res.message.as_deref().unwrap_or("Logged in"));
            if let Some(role) = res.role.filter(|_| res.token.is_some()) {
                println!("role: {role}");
            }
            Ok(true)
        }
        Command::Logout => {
            let mut view = Dashboard::new(api, sessions);
            view.logout();
            Ok(finish(&mut view, false))
        }
        Command::Users => {
            let mut view = AdminDashboard::new(api, sessions);
            view.mount();
            print!("{}", view.render());
            Ok(view.load_error().is_none())
        }
        Command::Home => {
            let mut view = Dashboard::new(api, sessions);
            view.go_home();
            Ok(finish(&mut view, false))
        }
        Command::Profile => {
            let mut view = Dashboard::new(api, sessions);
            view.go_profile();
            Ok(finish(&mut view, false))
        }
        Command::Pets { command } => pets(api, sessions, command),
    }
}

fn pets(
    api: Api<UreqTransport>,
    sessions: SessionStore<FileStorage>,
    command: PetCommand,
) -> Result<bool, ApiError> {
    if let PetCommand::Show { id } = &command {
        let token = sessions
            .token()?
            .ok_or_else(|| ApiError::InvalidInput("Please log in to continue".to_string()))?;
        let res = api.get_pet(id, &token)?;
        let mut out = String::new();
        if let Some(pet) = res.pet {
            render_pet(&mut out, &pet);
        }
        print!("{out}");
        return Ok(true);
    }

    let mut view = Dashboard::new(api, sessions);
    view.mount();
    if view.route().is_some() {
        return Ok(finish(&mut view, false));
    }

    match command {
        PetCommand::List | PetCommand::Show { .. } => {}
        PetCommand::Add(fields) => {
            view.open_create();
            for (field, value) in fields.changes() {
                view.set_field(field, value);
            }
            view.submit();
        }
        PetCommand::Edit { id, fields } => {
            view.edit_by_id(&id)?;
            for (field, value) in fields.changes() {
                view.set_field(field, value);
            }
            view.submit();
        }
        PetCommand::Delete { id, yes } => view.delete(&id, |prompt| yes || confirm(prompt)),
    }
    Ok(finish(&mut view, true))
}

/// Prints toasts to stderr and either the page or the navigation target to
/// stdout. Returns whether no error toast was shown.
fn finish(view: &mut PetDashboard, show_page: bool) -> bool {
    let toasts = view.take_toasts();
    for Toast { level, message } in &toasts {
        match level {
            ToastLevel::Success => eprintln!("ok: {message}"),
            ToastLevel::Error => eprintln!("error: {message}"),
        }
    }
    match view.route() {
        Some(route) => println!("-> {}", route.path()),
        None if show_page => print!("{}", view.render()),
        None => {}
    }
    toasts.iter().all(|t| t.level != ToastLevel::Error)
}

fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
