mod config;
mod error;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use bridge::tools::LIST_TOOLS;
use bridge::{ArgKind, Dispatcher, Server, ToolRegistry, ToolSpec, sandbox_tools};
use clap::{Parser, Subcommand};
use protocol::{Request, RequestId};
use serde_json::{Map, Value};

use config::Config;
use error::{Error, Result};

#[derive(Parser)]
#[command(name = "daraja-bridge")]
#[command(about = "Line-delimited JSON bridge to the Safaricom Daraja sandbox", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ./daraja-bridge.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests on stdin/stdout until stdin closes
    Serve,
    /// Print the tool catalog
    Tools,
    /// Dispatch a single request and print its response line
    Call {
        /// Tool name
        tool: String,
        /// Correlation id to send
        #[arg(long, default_value = "cli")]
        id: String,
        /// Tool argument; amounts are sent as numbers
        #[arg(short, long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    let dispatcher = build_dispatcher(&config)?;

    match cli.command {
        Some(Commands::Serve) | None => cmd_serve(dispatcher).await,
        Some(Commands::Tools) => cmd_tools(&dispatcher).await,
        Some(Commands::Call { tool, id, args }) => cmd_call(&dispatcher, tool, id, &args).await,
    }
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let client = config.client()?;
    if !config.has_credentials() {
        tracing::warn!("no Daraja credentials configured; authenticated tools will fail");
    }
    tracing::info!(provider = %client, "provider configured");

    let registry = ToolRegistry::builder()
        .register_all(sandbox_tools(Arc::new(client)))
        .build()?;
    Ok(Dispatcher::new(Arc::new(registry)))
}

async fn cmd_serve(dispatcher: Dispatcher) -> Result<()> {
    let server = Server::new(dispatcher);
    let summary = server.serve_stdio().await?;
    tracing::info!(
        responses = summary.responses,
        dropped = summary.dropped,
        "server shutting down"
    );
    Ok(())
}

async fn cmd_tools(dispatcher: &Dispatcher) -> Result<()> {
    let catalog = dispatcher.invoke(LIST_TOOLS, &Map::new()).await?;
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

async fn cmd_call(
    dispatcher: &Dispatcher,
    tool: String,
    id: String,
    args: &[String],
) -> Result<()> {
    let spec = dispatcher.registry().lookup(&tool).map(|t| t.spec());
    let args = parse_args(spec, args)?;
    let request = Request::new(RequestId::String(id), tool).with_args(args);
    let response = dispatcher.dispatch(request).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

/// `key=value` pairs into an args map.
///
/// Values for arguments the tool declares as amounts are sent as numbers when
/// they parse; everything else stays a string.
fn parse_args(spec: Option<&ToolSpec>, raw: &[String]) -> Result<Map<String, Value>> {
    let is_amount = |key: &str| {
        spec.is_some_and(|s| {
            s.args
                .iter()
                .any(|a| a.name == key && a.kind == ArgKind::Amount)
        })
    };

    raw.iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| Error::InvalidArg(pair.clone()))?;
            let value = is_amount(key)
                .then(|| number(value))
                .flatten()
                .unwrap_or_else(|| Value::String(value.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}

fn number(s: &str) -> Option<Value> {
    s.parse::<u64>().map(Value::from).ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    })
}
