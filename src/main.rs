use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use taskboard::config::TaskboardConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Collaborative kanban board with real-time sync")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to taskboard.toml (defaults to .taskboard/taskboard.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the board server (REST API + /ws sync channel)
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Permissive CORS for local front-end development
        #[arg(long)]
        dev: bool,

        /// Start from an empty board instead of the example tasks
        #[arg(long)]
        no_seed: bool,
    },
    /// Print the board of a running server
    Board {
        /// Server URL (defaults to the configured host and port)
        #[arg(long)]
        url: Option<String>,
    },
    /// Follow the live board over the sync channel
    Watch {
        #[arg(long)]
        url: Option<String>,
    },
    /// Create a task
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Column id, e.g. "todo", "in-progress", "done"
        #[arg(short, long)]
        column: Option<String>,

        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,

        /// Repeat for several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        url: Option<String>,
    },
    /// Update fields of an existing task
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        #[arg(short, long)]
        column: Option<String>,

        #[arg(short, long, conflicts_with = "clear_priority")]
        priority: Option<String>,

        /// Remove the priority
        #[arg(long)]
        clear_priority: bool,

        /// Replaces all tags when given
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        url: Option<String>,
    },
    /// Delete a task
    Delete {
        id: String,

        #[arg(long)]
        url: Option<String>,
    },
    /// Move a task between or within columns
    Move {
        id: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        from_index: usize,

        #[arg(long)]
        to: String,

        #[arg(long)]
        to_index: usize,

        #[arg(long)]
        url: Option<String>,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default taskboard.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(TaskboardConfig::default_path);

    let mut config = TaskboardConfig::load(&config_path)?;
    config
        .apply_env()
        .context("Failed to apply environment overrides")?;

    let _log_guard = taskboard::logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            dev,
            no_seed,
        } => {
            cmd::cmd_serve(config, host, port, dev, no_seed).await?;
        }
        Commands::Board { url } => {
            cmd::cmd_board(&cmd::server_url(&config, url)).await?;
        }
        Commands::Watch { url } => {
            cmd::cmd_watch(&cmd::server_url(&config, url)).await?;
        }
        Commands::Add {
            title,
            description,
            column,
            priority,
            tags,
            url,
        } => {
            let input = cmd::new_task(title, description, column, priority.as_deref(), tags)?;
            cmd::cmd_add(&cmd::server_url(&config, url), input).await?;
        }
        Commands::Update {
            id,
            title,
            description,
            clear_description,
            column,
            priority,
            clear_priority,
            tags,
            url,
        } => {
            let patch = cmd::task_patch(cmd::UpdateArgs {
                title,
                description,
                clear_description,
                column,
                priority,
                clear_priority,
                tags,
            })?;
            cmd::cmd_update(&cmd::server_url(&config, url), &id, patch).await?;
        }
        Commands::Delete { id, url } => {
            cmd::cmd_delete(&cmd::server_url(&config, url), &id).await?;
        }
        Commands::Move {
            id,
            from,
            from_index,
            to,
            to_index,
            url,
        } => {
            cmd::cmd_move(
                &cmd::server_url(&config, url),
                &id,
                from,
                from_index,
                to,
                to_index,
            )
            .await?;
        }
        Commands::Config { command } => {
            cmd::cmd_config(&config_path, &config, command)?;
        }
    }

    Ok(())
}
