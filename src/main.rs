use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use frontegg_provider::config::{self, Config};
use frontegg_provider::frontegg::FronteggClient;
use frontegg_provider::resource::{get_resource, webhook};
use frontegg_provider::{CancellationToken, Provider, ResourceData};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Manage Frontegg webhooks declaratively
#[derive(Parser, Debug)]
#[command(name = "frontegg-provider", version, about, long_about = None)]
struct Args {
    /// Frontegg vendor client ID
    #[arg(long, global = true, env = config::ENV_CLIENT_ID)]
    client_id: Option<String>,

    /// Frontegg vendor secret key
    #[arg(long, global = true, env = config::ENV_SECRET_KEY, hide_env_values = true)]
    secret_key: Option<String>,

    /// Base URL of the authentication API
    #[arg(long, global = true, env = config::ENV_API_URL)]
    api_url: Option<String>,

    /// Base URL of the portal API
    #[arg(long, global = true, env = config::ENV_PORTAL_URL)]
    portal_url: Option<String>,

    /// Read provider configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provider schema as JSON
    Schema,
    /// Print reference documentation for a resource type
    Docs {
        #[arg(default_value = webhook::RESOURCE_TYPE)]
        resource_type: String,
    },
    /// Validate a resource configuration file without contacting the API
    Validate {
        file: PathBuf,
        #[arg(long, default_value = webhook::RESOURCE_TYPE)]
        resource_type: String,
    },
    /// Create a resource from a configuration file and print its state
    Create {
        file: PathBuf,
        #[arg(long, default_value = webhook::RESOURCE_TYPE)]
        resource_type: String,
        /// Also write the resulting state to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Refresh a state file from the API
    Read {
        state: PathBuf,
        /// Write the refreshed state back to the file
        #[arg(long)]
        write: bool,
    },
    /// Apply a configuration file to the resource in a state file
    Update {
        state: PathBuf,
        file: PathBuf,
        /// Write the updated state back to the file
        #[arg(long)]
        write: bool,
    },
    /// Delete the resource in a state file
    Delete { state: PathBuf },
    /// Adopt an existing remote resource and print its state
    Import {
        id: String,
        #[arg(long, default_value = webhook::RESOURCE_TYPE)]
        resource_type: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("frontegg-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("frontegg-provider").join("frontegg-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".frontegg-provider").join("frontegg-provider.log");
    }
    PathBuf::from("frontegg-provider.log")
}

/// CLI > environment > config file > defaults
fn effective_config(args: &Args) -> Result<Config> {
    let file = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let overrides = Config {
        client_id: args.client_id.clone(),
        secret_key: args.secret_key.clone(),
        api_url: args.api_url.clone(),
        portal_url: args.portal_url.clone(),
        ..Default::default()
    };
    Ok(overrides.merged_with(file))
}

fn connect(args: &Args) -> Result<Provider> {
    let config = effective_config(args)?;
    let client = FronteggClient::new(config.client_config()?)
        .context("Failed to create Frontegg client")?;
    Ok(Provider::new(client))
}

/// Cancel `ctx` on Ctrl-C so the in-flight request is aborted
fn cancel_on_interrupt(ctx: &CancellationToken) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling operation");
            ctx.cancel();
        }
    });
}

fn print_state(data: &ResourceData, output: Option<&Path>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    if let Some(path) = output {
        config::write_document(path, data)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let ctx = CancellationToken::new();
    cancel_on_interrupt(&ctx);

    match &args.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(Provider::schema())?);
        }
        Command::Docs { resource_type } => {
            let def = get_resource(resource_type)
                .with_context(|| format!("Unknown resource type: {}", resource_type))?;
            print!("{}", def.render_markdown(resource_type));
        }
        Command::Validate {
            file,
            resource_type,
        } => {
            let block: Value = config::read_document(file)?;
            Provider::validate(resource_type, &block)?;
            println!("{} is valid", file.display());
        }
        Command::Create {
            file,
            resource_type,
            output,
        } => {
            let block: Value = config::read_document(file)?;
            let mut data = Provider::validate(resource_type, &block)?;
            connect(&args)?.create(&ctx, &mut data).await?;
            print_state(&data, output.as_deref())?;
        }
        Command::Read { state, write } => {
            let mut data: ResourceData = config::read_document(state)?;
            connect(&args)?.read(&ctx, &mut data).await?;
            if !data.has_id() {
                eprintln!("Resource no longer exists remotely");
            }
            print_state(&data, write.then_some(state.as_path()))?;
        }
        Command::Update { state, file, write } => {
            let current: ResourceData = config::read_document(state)?;
            let block: Value = config::read_document(file)?;
            let mut data = Provider::validate(current.resource_type(), &block)?;
            data.set_id(current.id());
            connect(&args)?.update(&ctx, &mut data).await?;
            print_state(&data, write.then_some(state.as_path()))?;
        }
        Command::Delete { state } => {
            let mut data: ResourceData = config::read_document(state)?;
            connect(&args)?.delete(&ctx, &mut data).await?;
            println!("Deleted {} {}", data.resource_type(), data.id());
        }
        Command::Import {
            id,
            resource_type,
            output,
        } => {
            let data = connect(&args)?.import(&ctx, resource_type, id).await?;
            print_state(&data, output.as_deref())?;
        }
    }

    Ok(())
}
