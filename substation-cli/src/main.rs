use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use substation_core::{classify, Assistant, Dataset};
use substation_server::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod chat;
mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "substation", version, about = "Substation operations assistant")]
struct Cli {
    /// Config file (default: ~/.substation/config.toml)
    #[arg(long, global = true, env = "SUBSTATION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// `.sql` seed script or `.json` dump to load instead of the built-in rows
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Serve this directory at `/` instead of the built-in chat page
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Answer one question and exit
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Print the full reply as JSON
        #[arg(long)]
        json: bool,

        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Print the intent and entity the classifier finds
    Classify {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Interactive terminal chat
    Chat {
        /// Talk to a running server (e.g. http://localhost:4477) instead of a local assistant
        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config (file + environment)
    Show,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // the TUI owns the terminal; keep log lines off it
    let default_filter = match cli.command {
        Command::Chat { .. } => "off",
        Command::Serve { .. } => "substation=info,tower_http=info",
        _ => "warn",
    };
    init_tracing(default_filter);

    let config_file = cli.config.as_deref();

    match cli.command {
        Command::Serve {
            host,
            port,
            dataset,
            static_dir,
        } => {
            let mut cfg = config::load_config(config_file)?;
            override_server(&mut cfg.server, host, port, static_dir);
            let state = app_state(&cfg, dataset.as_deref())?;
            substation_server::serve(cfg.server, state).await?;
        }

        Command::Ask {
            message,
            json,
            dataset,
        } => {
            let cfg = config::load_config(config_file)?;
            let state = app_state(&cfg, dataset.as_deref())?;
            let reply = substation_server::respond(&state, &message.join(" ")).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                println!("{}", reply.response);
            }
        }

        Command::Classify { message } => {
            let c = classify(&message.join(" "));
            println!("intent: {}", c.intent);
            match &c.entity {
                Some(e) => println!("entity: {}", serde_json::to_string(e)?),
                None => println!("entity: none"),
            }
            if let Some(kind) = c.inspection_type {
                println!("inspection type: {kind:?}");
            }
            if let Some(sensor) = c.sensor {
                println!("sensor: {sensor:?}");
            }
            if let Some(limit) = c.limit {
                println!("limit: {limit}");
            }
            if let Some(keywords) = &c.keywords {
                println!("keywords: {keywords}");
            }
        }

        Command::Chat { server, dataset } => {
            let backend = match server {
                Some(url) => chat::Backend::remote(&url),
                None => {
                    let cfg = config::load_config(config_file)?;
                    chat::Backend::Local(app_state(&cfg, dataset.as_deref())?)
                }
            };
            chat::run_chat(backend).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(config_file)?,
            ConfigCommand::Show => {
                let mut cfg = config::load_config(config_file)?;
                if cfg.chat.llm.api_key.is_some() {
                    cfg.chat.llm.api_key = Some("********".to_string());
                }
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn override_server(
    server: &mut ServerConfig,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) {
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    if static_dir.is_some() {
        server.static_dir = static_dir;
    }
}

/// `--dataset` beats the config file; the built-in rows are the last resort.
fn load_dataset(cfg: &Config, flag: Option<&Path>) -> Result<Dataset> {
    match flag.or(cfg.data.path.as_deref()) {
        Some(path) => substation_ingest::load_dataset(path),
        None => {
            info!("using built-in dataset");
            Ok(Dataset::builtin())
        }
    }
}

fn app_state(cfg: &Config, dataset: Option<&Path>) -> Result<AppState> {
    let dataset = load_dataset(cfg, dataset)?;
    let assistant = Assistant::new(dataset, cfg.assistant.clone());
    Ok(AppState::new(assistant, cfg.chat.clone()))
}
