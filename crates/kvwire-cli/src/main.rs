//! kvwire CLI
//!
//! Command-line client for Redis-like key-value stores: one-shot
//! commands, a raw escape hatch, and a streaming subscriber.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kvwire_client::{Client, ClientConfig, Command, Subscriber};

mod output;

/// Command-line client for Redis-like key-value stores
#[derive(Parser, Debug)]
#[command(name = "kvwire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server hostname or IP address
    #[arg(long, env = "KVWIRE_HOST")]
    host: Option<String>,

    /// Server TCP port
    #[arg(long, env = "KVWIRE_PORT")]
    port: Option<u16>,

    /// Password for the AUTH handshake
    #[arg(long, env = "KVWIRE_PASSWORD")]
    password: Option<String>,

    /// Logical database index to SELECT after connecting
    #[arg(long, env = "KVWIRE_DB")]
    db: Option<i64>,

    /// Configuration file path (TOML)
    #[arg(short, long, env = "KVWIRE_CONFIG")]
    config: Option<String>,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Fetch the value of a key
    Get { key: String },
    /// Set a key to a value
    Set { key: String, value: String },
    /// Delete a key
    Del { key: String },
    /// Check whether a key exists
    Exists { key: String },
    /// Publish a message to a channel
    Publish { channel: String, message: String },
    /// Subscribe to channels and print messages as they arrive
    Subscribe {
        #[arg(required = true)]
        channels: Vec<String>,
    },
    /// Send a raw command and print the reply
    Cmd {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Probe the server
    Ping,
}

impl Args {
    /// Resolves the effective configuration: file first, flags override.
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("loading config from {path}"))?,
            None => ClientConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(db) = self.db {
            config.database = Some(db);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "debug,kvwire=trace"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = args.client_config()?;

    if let Cmd::Subscribe { channels } = &args.command {
        return run_subscribe(config, channels, args.json).await;
    }

    let mut client = Client::connect(config.clone())
        .await
        .with_context(|| format!("connecting to {}", config.addr()))?;

    let reply = match &args.command {
        Cmd::Get { key } => client.raw(Command::new("GET").arg(key)).await?,
        Cmd::Set { key, value } => {
            client.raw(Command::new("SET").arg(key).arg(value)).await?
        }
        Cmd::Del { key } => client.raw(Command::new("DEL").arg(key)).await?,
        Cmd::Exists { key } => client.raw(Command::new("EXISTS").arg(key)).await?,
        Cmd::Publish { channel, message } => {
            client
                .raw(Command::new("PUBLISH").arg(channel).arg(message))
                .await?
        }
        Cmd::Ping => client.raw(Command::new("PING")).await?,
        Cmd::Cmd { words } => {
            let (name, rest) = words
                .split_first()
                .context("empty command")?;
            client.raw(Command::new(name).args(rest.to_vec())).await?
        }
        Cmd::Subscribe { .. } => unreachable!("handled above"),
    };

    println!("{}", output::render(&reply, args.json));
    client.quit().await?;
    Ok(())
}

async fn run_subscribe(config: ClientConfig, channels: &[String], json: bool) -> Result<()> {
    let addr = config.addr();
    let mut subscriber = Subscriber::connect(config)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    subscriber.subscribe(channels.to_vec()).await?;
    tracing::info!(channels = channels.len(), "subscribed");

    let mut rx = subscriber.listen();
    while let Some(message) = rx.recv().await {
        println!("{}", output::render_message(&message, json));
    }
    Ok(())
}
