use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;
use traintrack::pages::prediction::{DEFAULT_HOUR, minutes_ahead, parse_hour};
use traintrack::validate::{self, FieldError, MIN_PASSWORD_LEN};
use traintrack::{
    ApiError, AuthClient, ClientConfig, FileStorage, GuardDecision, PredictionClient, Route, RouteGuard,
    SessionStore, User,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid {field}: {source}")]
    InvalidField { field: &'static str, source: FieldError },
    #[error("invalid time `{0}`; expected HH:MM")]
    InvalidHour(String),
    #[error("not signed in; run `traintrack login` first")]
    NotSignedIn,
    #[error("signed-in user has no id; sign in again")]
    MissingUserId,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "traintrack", about = "TrainTrack account and prediction CLI")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:8080/api
    #[arg(long, env = "TRAINTRACK_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the persisted session.
    #[arg(long, env = "TRAINTRACK_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register(RegisterArgs),
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRAINTRACK_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    ResendVerification {
        #[arg(long)]
        email: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "TRAINTRACK_NEW_PASSWORD")]
        new_password: String,
    },
    UpdateProfile(UpdateProfileArgs),
    Stations,
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "TRAINTRACK_PASSWORD")]
    password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value_t = false)]
    no_notifications: bool,
}

#[derive(Args, Debug)]
struct UpdateProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    notifications: Option<bool>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[arg(long)]
    station: u64,
    /// Hour slot to predict for, local time.
    #[arg(long, conflicts_with = "minutes_ahead")]
    hour: Option<String>,
    #[arg(long)]
    minutes_ahead: Option<u32>,
}

struct Clients {
    auth: AuthClient,
    predictions: PredictionClient,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(dir) = cli.session_dir {
        config.session_dir = dir;
    }

    let clients = connect(&config)?;
    run(&clients, cli.command).await
}

fn connect(config: &ClientConfig) -> Result<Clients, CliError> {
    let http = traintrack::http::ApiHttp::new(config)?;
    let session = SessionStore::load(Arc::new(FileStorage::new(config.session_dir.clone())));
    tracing::debug!(base_url = http.base_url(), "client ready");
    Ok(Clients { auth: AuthClient::new(http.clone(), session), predictions: PredictionClient::new(http) })
}

async fn run(clients: &Clients, command: Command) -> Result<(), CliError> {
    let auth = &clients.auth;
    match command {
        Command::Register(args) => run_register(auth, args).await,
        Command::Login { email, password } => {
            let email = field("email", validate::email(&email))?;
            let user = auth.login(email, &password).await?;
            print_json(&user)
        }
        Command::Logout => {
            auth.logout();
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami => match auth.current_user() {
            Some(user) => print_json(&user),
            None => Err(CliError::NotSignedIn),
        },
        Command::Verify { email, code } => {
            let code = validate::sanitize_code_input(&code);
            field("code", validate::code(&code))?;
            print_json(&auth.verify_email(&email, &code).await?)
        }
        Command::ResendVerification { email } => print_json(&auth.resend_verification_code(&email).await?),
        Command::ForgotPassword { email } => {
            let email = field("email", validate::email(&email))?;
            print_json(&auth.forgot_password(email).await?)
        }
        Command::ResetPassword { email, code, new_password } => {
            let code = validate::sanitize_code_input(&code);
            field("code", validate::code(&code))?;
            field("new password", validate::password(&new_password, MIN_PASSWORD_LEN))?;
            print_json(&auth.reset_password(&email, &code, &new_password).await?)
        }
        Command::UpdateProfile(args) => run_update_profile(auth, args).await,
        Command::Stations => print_json(&clients.predictions.stations().await?),
        Command::Predict(args) => run_predict(clients, args).await,
    }
}

async fn run_register(auth: &AuthClient, args: RegisterArgs) -> Result<(), CliError> {
    let first_name = field("first name", validate::required(&args.first_name))?;
    let last_name = field("last name", validate::required(&args.last_name))?;
    let email = field("email", validate::email(&args.email))?;
    field("password", validate::password(&args.password, MIN_PASSWORD_LEN))?;

    let user = User::new_account(email, &args.password, first_name, last_name, !args.no_notifications);
    let ack = auth.register(&user).await?;
    print_json(&ack)?;
    eprintln!("next: traintrack verify --email {email} --code <6-digit code>");
    Ok(())
}

async fn run_update_profile(auth: &AuthClient, args: UpdateProfileArgs) -> Result<(), CliError> {
    let mut user = auth.current_user().ok_or(CliError::NotSignedIn)?;
    let user_id = user.user_id.ok_or(CliError::MissingUserId)?;
    if let Some(first_name) = args.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = args.last_name {
        user.last_name = last_name;
    }
    if let Some(enabled) = args.notifications {
        user.notification_preferences = Some(enabled);
    }
    let updated = auth.update_profile(user_id, &user).await?;
    print_json(&updated)
}

async fn run_predict(clients: &Clients, args: PredictArgs) -> Result<(), CliError> {
    let guard = RouteGuard::new(clients.auth.session().clone());
    if let GuardDecision::Redirect(_) = guard.check(&Route::Prediction) {
        return Err(CliError::NotSignedIn);
    }

    let minutes = match args.minutes_ahead {
        Some(minutes) => minutes,
        None => {
            let hour = args.hour.as_deref().unwrap_or(DEFAULT_HOUR);
            let target = parse_hour(hour).ok_or_else(|| CliError::InvalidHour(hour.to_owned()))?;
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            minutes_ahead(now.time(), target)
        }
    };
    tracing::info!(station_id = args.station, minutes_ahead = minutes, "requesting prediction");
    let prediction = clients.predictions.get_prediction(args.station, minutes).await?;
    print_json(&prediction)
}

fn field<T>(name: &'static str, result: Result<T, FieldError>) -> Result<T, CliError> {
    result.map_err(|source| CliError::InvalidField { field: name, source })
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
