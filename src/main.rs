use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use trivia_quiz::{Quiz, QuizError, TriviaConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file, applied over ./trivia.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Questions fetched per batch (1-50)
    #[arg(long)]
    batch_size: Option<u32>,

    /// Open Trivia DB category id
    #[arg(long)]
    category: Option<u32>,

    /// Network timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Do not request a session token (questions may repeat)
    #[arg(long)]
    no_token: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let mut config = TriviaConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let _guard = init_logging(&config.log.file_path(), args.verbose)?;
    info!(
        category = config.api.category,
        batch_size = config.api.batch_size,
        use_token = config.api.use_token,
        "starting trivia quiz"
    );

    Quiz::from_config(&config)?.run().await
}

fn apply_overrides(config: &mut TriviaConfig, args: &Args) {
    if let Some(batch_size) = args.batch_size {
        config.api.batch_size = batch_size;
    }
    if let Some(category) = args.category {
        config.api.category = category;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.api.timeout_secs = timeout_secs;
    }
    if args.no_token {
        config.api.use_token = false;
    }
    if let Some(path) = &args.log_file {
        config.log.file = Some(path.clone());
    }
}

/// Log to a file; the terminal belongs to the quiz screens.
fn init_logging(path: &Path, verbose: u8) -> io::Result<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?
        .to_string_lossy()
        .into_owned();

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(io::Error::other)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(guard)
}
