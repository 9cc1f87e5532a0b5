use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use funnel_core::QuizCatalog;
use funnel_core::model::{DEFAULT_WEBHOOK_TIMEOUT_SECS, WebhookSettings, WebhookSettingsDraft};
use funnel_core::routes::resolve_path;
use services::{NoopSink, QuizSession, RecordingSink, SubmissionSink, WebhookSink};
use storage::repository::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod terminal;

#[derive(Debug, Parser)]
#[command(name = "funnel")]
#[command(about = "Lead-capture quiz funnel in the terminal")]
struct Args {
    /// Path the visitor arrived on, e.g. `/quiz/aula-2`
    #[arg(long, env = "FUNNEL_PATH", default_value = "/quiz/aula-1")]
    path: String,

    /// SQLite URL or file path for the stored identity
    #[arg(long = "db", env = "FUNNEL_DB_URL", default_value = "sqlite://funnel.sqlite3")]
    db_url: String,

    /// JSON file replacing the built-in quiz catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Endpoint completed attempts are posted to
    #[arg(long, env = "FUNNEL_WEBHOOK_URL")]
    webhook_url: Option<String>,

    #[arg(long, default_value_t = DEFAULT_WEBHOOK_TIMEOUT_SECS)]
    webhook_timeout_secs: u32,

    /// Discard completed attempts instead of posting them
    #[arg(long, conflicts_with = "print_submissions")]
    no_submit: bool,

    /// Print completed attempts as JSON on exit instead of posting them
    #[arg(long)]
    print_submissions: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sqlx=warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<QuizCatalog, Box<dyn std::error::Error>> {
    let raw = path.map(std::fs::read_to_string).transpose()?;
    let catalog = parse_catalog(raw.as_deref())?;
    info!(quizzes = catalog.len(), custom = raw.is_some(), "catalog loaded");
    Ok(catalog)
}

fn parse_catalog(raw: Option<&str>) -> Result<QuizCatalog, funnel_core::Error> {
    Ok(match raw {
        Some(raw) => QuizCatalog::from_json(raw)?,
        None => QuizCatalog::builtin()?,
    })
}

fn webhook_settings(args: &Args) -> Result<WebhookSettings, funnel_core::Error> {
    let draft = WebhookSettingsDraft {
        endpoint: args.webhook_url.clone(),
        timeout_secs: Some(args.webhook_timeout_secs),
    };
    Ok(draft.validate()?)
}

/// Where completed attempts go for this run.
enum Delivery {
    Webhook(Arc<WebhookSink>),
    Print(RecordingSink),
    Discard,
}

impl Delivery {
    fn from_args(args: &Args) -> Result<Self, Box<dyn std::error::Error>> {
        if args.no_submit {
            return Ok(Self::Discard);
        }
        if args.print_submissions {
            return Ok(Self::Print(RecordingSink::new()));
        }
        let webhook = WebhookSink::new(&webhook_settings(args)?)?;
        info!(endpoint = %webhook.endpoint(), "submissions go to webhook");
        Ok(Self::Webhook(Arc::new(webhook)))
    }

    fn sink(&self) -> Arc<dyn SubmissionSink> {
        match self {
            Self::Webhook(webhook) => Arc::clone(webhook) as Arc<dyn SubmissionSink>,
            Self::Print(recorder) => Arc::new(recorder.clone()),
            Self::Discard => Arc::new(NoopSink),
        }
    }

    /// Wait for in-flight posts, or print what was recorded.
    async fn finish(self, grace: Duration) -> Result<(), serde_json::Error> {
        match self {
            Self::Webhook(webhook) => {
                webhook.drain(grace).await;
            }
            Self::Print(recorder) => {
                for submission in recorder.submissions() {
                    println!("{}", serde_json::to_string_pretty(&submission)?);
                }
            }
            Self::Discard => {}
        }
        Ok(())
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
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

    let path = Path::new(path);
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);

    // Open + migrate SQLite here so core/services never touch the filesystem.
    let db_url = normalize_sqlite_url(&args.db_url);
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;

    let route = resolve_path(&args.path);
    if route.fell_back {
        warn!(path = %args.path, quiz_id = %route.quiz_id, "unknown path; using the default quiz");
    }

    let delivery = Delivery::from_args(&args)?;
    let mut session =
        QuizSession::start(catalog, Arc::clone(&storage.identities), delivery.sink()).await;
    session.initialize(route.quiz_id);

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    terminal::drive(&mut session, input, &mut output).await?;

    delivery
        .finish(Duration::from_secs(u64::from(args.webhook_timeout_secs) + 1))
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
