//! `taskkeeper` — terminal client for taskkeeperd.
//!
//! With no subcommand it opens the full-screen dashboard; subcommands
//! cover the same operations for scripting.

mod api;
mod commands;
mod config;
mod tui;

use clap::{Parser, Subcommand};

use api::{ApiClient, TaskPatch};
use config::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "taskkeeper", version, about = "Task tracking client")]
struct Cli {
    /// Path to client config file (default: ~/.taskkeeper/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Server URL, overrides the configured one (not persisted).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive dashboard (the default).
    Dashboard,

    /// List all tasks.
    List,

    /// Create a task.
    Create {
        /// Task title.
        title: String,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
    },

    /// Fetch a single task.
    Get {
        /// Task ID.
        id: i64,
    },

    /// Update fields on a task. Unset fields keep their value.
    Update {
        /// Task ID.
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Check server status.
    Status,

    /// Point the client at a server (persisted to the config file).
    SetServer {
        /// Server URL (e.g. "http://127.0.0.1:5000").
        url: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let config = ClientConfig::load(&config_path)?;
    let server = cli.server.unwrap_or_else(|| config.server.clone());
    let json_output = cli.output == "json";

    let client = ApiClient::new(&server)?;

    match cli.command {
        None | Some(Commands::Dashboard) => {
            tui::run(client)?;
        }

        Some(Commands::List) => {
            commands::list(&client, json_output)?;
        }

        Some(Commands::Create { title, description }) => {
            commands::create(&client, &title, description.as_deref(), json_output)?;
        }

        Some(Commands::Get { id }) => {
            commands::get(&client, id, json_output)?;
        }

        Some(Commands::Update { id, title, description, completed }) => {
            let patch = TaskPatch { title, description, completed };
            if patch.is_empty() {
                anyhow::bail!("Provide --title, --description or --completed.");
            }
            commands::update(&client, id, &patch)?;
        }

        Some(Commands::Delete { id, yes }) => {
            if !yes {
                eprint!("Delete task {id}? [y/N]: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::delete(&client, id)?;
        }

        Some(Commands::Status) => {
            commands::status(&client, &server)?;
        }

        Some(Commands::SetServer { url }) => {
            let mut config = config;
            config.server = url;
            config.save(&config_path)?;
            println!("Server set to {}.", config.server);
        }
    }

    Ok(())
}
