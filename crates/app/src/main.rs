use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::tao::event::Event;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{ApiConfig, AppServices, DEFAULT_API_URL, RetryPolicy, StudyService};
use storage::repository::Storage;
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://flashcards.sqlite3";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    MissingToken,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingToken => write!(f, "token set requires a non-empty value"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    study: Arc<StudyService>,
    category: Option<String>,
}

impl UiApp for DesktopApp {
    fn study_service(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    fn category(&self) -> Option<String> {
        self.category.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui          [--db <sqlite_url>] [--api-url <url>] [--category <name>]");
    eprintln!("  cargo run -p app -- token set <value> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- token clear       [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --api-url {DEFAULT_API_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASHCARDS_DB_URL, FLASHCARDS_API_URL, FLASHCARDS_CATEGORY, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Ui(UiArgs),
    SetToken { db_url: String, token: String },
    ClearToken { db_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UiArgs {
    db_url: String,
    api_url: String,
    category: Option<String>,
}

fn default_db_url() -> String {
    std::env::var("FLASHCARDS_DB_URL")
        .ok()
        .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url)
}

fn parse_db_flag(args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    let value = require_value(args, "--db")?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: value });
    }
    Ok(normalize_sqlite_url(value))
}

impl UiArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = default_db_url();
        let mut api_url =
            std::env::var("FLASHCARDS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut category = std::env::var("FLASHCARDS_CATEGORY").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = parse_db_flag(args)?,
                "--api-url" => api_url = require_value(args, "--api-url")?,
                "--category" => category = Some(require_value(args, "--category")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            api_url,
            category,
        })
    }
}

fn parse_token_command(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let action = args.next().ok_or(ArgsError::MissingValue { flag: "token" })?;
    let token = match action.as_str() {
        "set" => {
            let value = args.next().ok_or(ArgsError::MissingToken)?;
            if value.trim().is_empty() {
                return Err(ArgsError::MissingToken);
            }
            Some(value)
        }
        "clear" => None,
        _ => return Err(ArgsError::UnknownArg(action)),
    };

    let mut db_url = default_db_url();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_url = parse_db_flag(args)?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(match token {
        Some(token) => Command::SetToken { db_url, token },
        None => Command::ClearToken { db_url },
    })
}

fn parse_command(argv: Vec<String>) -> Result<Option<Command>, ArgsError> {
    let mut iter = argv.into_iter().peekable();
    let first = iter.peek().cloned();
    match first.as_deref() {
        Some("--help" | "-h") => Ok(None),
        Some("token") => {
            iter.next();
            parse_token_command(&mut iter).map(Some)
        }
        Some("ui") => {
            iter.next();
            UiArgs::parse(&mut iter).map(|args| Some(Command::Ui(args)))
        }
        // Default behavior: launching UI when no subcommand is provided.
        None => UiArgs::parse(&mut iter).map(|args| Some(Command::Ui(args))),
        Some(flag) if flag.starts_with("--") => {
            UiArgs::parse(&mut iter).map(|args| Some(Command::Ui(args)))
        }
        Some(other) => Err(ArgsError::UnknownArg(other.to_string())),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn launch_ui(args: UiArgs) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let config = ApiConfig::new(&args.api_url)?.with_category(args.category);
    let category = config.category().map(str::to_owned);
    let services = AppServices::new_sqlite(&args.db_url, config, RetryPolicy::default()).await?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        study: services.study(),
        category,
    });
    let context = build_app_context(&app);
    drop(app);

    // The desktop event loop never returns, so queued reports are flushed
    // from its teardown event.
    let runtime = Handle::current();
    let mut pending = Some(services);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new()
        .with_window(
            WindowBuilder::new()
                .with_title("Flashcards")
                .with_always_on_top(false),
        )
        .with_custom_event_handler(move |event, _target| {
            if matches!(event, Event::LoopDestroyed) {
                if let Some(services) = pending.take() {
                    flush_reports(&runtime, services, SHUTDOWN_GRACE);
                }
            }
        });

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

/// Blocks the calling (non-async) thread until queued reports are delivered
/// or `grace` runs out. Returns whether the queue drained in time.
fn flush_reports(runtime: &Handle, services: AppServices, grace: Duration) -> bool {
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    runtime.spawn(async move {
        let flushed = tokio::time::timeout(grace, services.shutdown()).await.is_ok();
        let _ = done_tx.send(flushed);
    });
    let flushed = done_rx
        .recv_timeout(grace + Duration::from_millis(500))
        .unwrap_or(false);
    if !flushed {
        tracing::warn!("progress reports still pending at exit");
    }
    flushed
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(argv) {
        Ok(Some(command)) => command,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    match command {
        Command::Ui(args) => launch_ui(args).await,
        Command::SetToken { db_url, token } => {
            prepare_sqlite_file(&db_url)?;
            let storage = Storage::sqlite(&db_url).await?;
            storage.save_token(&token).await?;
            tracing::info!(%db_url, "bearer token stored");
            Ok(())
        }
        Command::ClearToken { db_url } => {
            prepare_sqlite_file(&db_url)?;
            let storage = Storage::sqlite(&db_url).await?;
            storage.clear_token().await?;
            tracing::info!(%db_url, "bearer token cleared");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "app=info,services=info,ui=info,storage=info,flashcards_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
