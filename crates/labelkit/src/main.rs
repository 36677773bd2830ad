//! # Labelkit CLI (`lbl`)
//!
//! The `lbl` binary runs the annotation backend. It provides commands
//! for database initialization, project inspection, and starting the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! lbl --config ./config/lbl.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lbl init` | Create the SQLite database and run schema migrations |
//! | `lbl projects` | List annotation projects |
//! | `lbl serve` | Start the JSON HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use labelkit::{config, db, migrate, server, SqliteStore};
use labelkit_core::store::Store;

/// Labelkit CLI: a media and text annotation backend.
#[derive(Parser)]
#[command(
    name = "lbl",
    about = "Labelkit: a media and text annotation backend",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lbl.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (projects, images, text_annotations). Idempotent; running it
    /// multiple times is safe.
    Init,

    /// List annotation projects.
    Projects,

    /// Start the JSON HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("database initialized at {}", config.db.path.display());
        }
        Commands::Projects => {
            let pool = db::connect(&config).await?;
            migrate::run_migrations(&pool).await?;
            let store = SqliteStore::new(pool);
            let projects = store.list_projects().await?;
            if projects.is_empty() {
                println!("no projects");
            }
            for project in projects {
                println!(
                    "{}  {}  {}",
                    project.id,
                    project.name,
                    project.description.unwrap_or_default()
                );
            }
        }
        Commands::Serve => {
            tracing_subscriber::fmt::init();
            server::run_server(&config).await?;
        }
    }

    Ok(())
}
