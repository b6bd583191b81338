use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use medchat_auth::CredentialStore;
use medchat_generation::{build_generator, GenerationMode, GeneratorConfig};
use medchat_records::RecordStore;
use medchat_resolver::{AnswerResolver, Resolution};
use serde::Serialize;
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod doctor;
mod http_api;
mod pages;
mod server_security;
mod session;

pub use doctor::{doctor, DoctorReport};
pub use http_api::{router, AppState};
pub use session::SessionStore;

use server_security::BindTarget;

const DATASET_ENV: &str = "MEDCHAT_DATASET";
const DEFAULT_DATASET: &str = "medquad.csv";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "medchat")]
#[command(about = "Medical Q&A chatbot with generative fallback", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Q&A dataset (CSV/JSON/JSONL with question and answer columns; env: MEDCHAT_DATASET)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Override generation backend (env: MEDCHAT_GENERATION_MODE)
    #[arg(long, global = true, value_enum)]
    generation_mode: Option<ModeFlag>,

    /// Override fallback model id (env: MEDCHAT_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum ModeFlag {
    Hosted,
    Stub,
}

impl ModeFlag {
    const fn as_domain(self) -> GenerationMode {
        match self {
            ModeFlag::Hosted => GenerationMode::Hosted,
            ModeFlag::Stub => GenerationMode::Stub,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat web app over HTTP
    Serve(ServeArgs),

    /// Answer a single question and exit
    Ask(AskArgs),

    /// Check the dataset and generator configuration
    Doctor(DoctorArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question text
    question: String,

    /// Print the resolution as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DoctorArgs {
    /// Send one request to the generator
    #[arg(long)]
    probe: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    question: &'a str,
    #[serde(flatten)]
    resolution: Resolution,
}

struct Settings {
    dataset: PathBuf,
    generator: GeneratorConfig,
}

impl Settings {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let dataset = cli
            .dataset
            .clone()
            .or_else(|| env::var_os(DATASET_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));

        let mut generator =
            GeneratorConfig::from_env().context("Invalid generation configuration")?;
        if let Some(mode) = cli.generation_mode {
            generator = generator.with_mode(mode.as_domain());
        }
        if let Some(model) = &cli.model {
            generator = generator.with_model(model.clone());
        }

        Ok(Self { dataset, generator })
    }

    /// Load the dataset and the generator. Either failure is fatal.
    fn build_resolver(&self) -> Result<AnswerResolver> {
        let store = RecordStore::load(&self.dataset)
            .with_context(|| format!("Failed to load dataset {}", self.dataset.display()))?;
        let generator =
            build_generator(&self.generator).context("Failed to initialise language model")?;
        Ok(AnswerResolver::new(Arc::new(store), generator))
    }
}

fn init_logging(cli: &Cli, force_quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || force_quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // HTTP stack is noisy at debug; keep it quiet unless asked
    if !cli.verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Ask(args) => args.json,
        Commands::Doctor(args) => args.json,
        Commands::Serve(_) => false,
    };
    init_logging(&cli, json_output);

    let settings = Settings::from_cli(&cli)?;
    match cli.command {
        Commands::Serve(args) => serve_http(args, &settings).await?,
        Commands::Ask(args) => run_ask(args, &settings).await?,
        Commands::Doctor(args) => run_doctor(args, &settings).await?,
    }

    Ok(())
}

async fn run_ask(args: AskArgs, settings: &Settings) -> Result<()> {
    let resolver = settings.build_resolver()?;
    let resolution = resolver.resolve(&args.question).await;

    if args.json {
        let output = AskOutput {
            question: &args.question,
            resolution,
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
    } else {
        print_stdout(&resolution.into_text())?;
    }
    Ok(())
}

async fn run_doctor(args: DoctorArgs, settings: &Settings) -> Result<()> {
    let report = doctor(&settings.dataset, &settings.generator, args.probe).await;

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&report)?)?;
    } else {
        print_stdout(doctor::render_text(&report).trim_end())?;
    }

    if !report.ok() {
        anyhow::bail!("doctor found problems");
    }
    Ok(())
}

async fn serve_http(args: ServeArgs, settings: &Settings) -> Result<()> {
    let target = BindTarget::resolve(&args.bind, args.public).await?;
    let addr = target.addr;

    let resolver = settings.build_resolver()?;
    let state = Arc::new(AppState::new(resolver, CredentialStore::in_memory()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving MedChat: {base_url}/"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    if args.public {
        let addrs = target
            .resolved
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/chat -d 'message=What is diabetes?'"
    ))?;

    axum::serve(listener, app).await?;
    Ok(())
}
