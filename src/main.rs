use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tessera_assistants::HttpAssistantDirectory;
use tessera_config::Registry;
use tessera_server::AppState;

/// Tessera - schemas and execution for annotated Lua tasks and graphs
#[derive(Parser)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Serve task and graph schemas over HTTP
  Serve {
    /// Address to bind
    #[arg(long, env = "TESSERA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, env = "TESSERA_PORT", default_value_t = 2024)]
    port: u16,

    /// Base URL of the assistant API (default: this server's own address)
    #[arg(long, env = "TESSERA_ASSISTANTS_URL")]
    assistants_url: Option<String>,
  },

  /// Print the schema of one callable
  Inspect {
    /// `<module-path>:<symbol>`
    locator: String,
  },

  /// Run one callable with a JSON object of arguments read from stdin
  Run {
    /// `<module-path>:<symbol>`
    locator: String,
  },
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Serve {
      host,
      port,
      assistants_url,
    }) => serve(host, port, assistants_url)?,
    Some(Commands::Inspect { locator }) => inspect(&locator)?,
    Some(Commands::Run { locator }) => run(&locator)?,
    None => {
      println!("tessera - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn serve(host: String, port: u16, assistants_url: Option<String>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { serve_async(host, port, assistants_url).await })
}

async fn serve_async(host: String, port: u16, assistants_url: Option<String>) -> Result<()> {
  let registry = Registry::from_env().context("failed to load task and graph registries")?;
  info!(
    tasks = registry.tasks.len(),
    graphs = registry.graphs.len(),
    "registries loaded"
  );

  let assistants_url = assistants_url.unwrap_or_else(|| format!("http://{host}:{port}"));
  let assistants = HttpAssistantDirectory::new(&assistants_url).context("invalid assistant API url")?;

  let cwd = current_dir()?;
  let state = AppState::new(registry, Arc::new(assistants), cwd);

  let listener = TcpListener::bind((host.as_str(), port))
    .await
    .with_context(|| format!("failed to bind {host}:{port}"))?;

  let shutdown = CancellationToken::new();
  let trigger = shutdown.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("shutdown requested");
      trigger.cancel();
    }
  });

  tessera_server::serve(listener, state, shutdown)
    .await
    .context("server failed")
}

fn inspect(locator: &str) -> Result<()> {
  let report = tessera_inspect::inspect(locator, &current_dir()?);
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

fn run(locator: &str) -> Result<()> {
  let arguments = read_arguments()?;

  let result = tessera_invoke::invoke(locator, &arguments, &current_dir()?)
    .with_context(|| format!("failed to run {locator}"))?;

  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(())
}

fn current_dir() -> Result<PathBuf> {
  std::env::current_dir().context("could not determine working directory")
}

/// Arguments piped on stdin. A terminal or an empty pipe means none.
fn read_arguments() -> Result<Map<String, Value>> {
  let stdin = io::stdin();
  if stdin.is_terminal() {
    return Ok(Map::new());
  }

  let mut input = String::new();
  stdin
    .lock()
    .read_to_string(&mut input)
    .context("failed to read arguments from stdin")?;
  if input.trim().is_empty() {
    return Ok(Map::new());
  }

  match serde_json::from_str(&input).context("failed to parse arguments JSON from stdin")? {
    Value::Object(arguments) => Ok(arguments),
    other => anyhow::bail!("arguments must be a JSON object, got: {other}"),
  }
}
