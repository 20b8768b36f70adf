//! `whohas` — keep track of the things you lent out.
//!
//! # Usage
//!
//! ```
//! whohas add --description "Drill" --person "Alice" --category 2
//! whohas list --active
//! whohas return 1
//! whohas --config ~/.config/whohas/whohas.toml list --json
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use commands::Command;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use whohas_store_sqlite::{Preferences, StoreContext, StoreRegistry};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Keep track of the things you lent out")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "whohas.toml")]
  config: PathBuf,

  /// Directory holding the database; overrides the config file.
  #[arg(long, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `whohas.toml` and `WHOHAS_*`
/// environment variables.
#[derive(Deserialize, Debug, Clone)]
struct CliConfig {
  data_dir:      PathBuf,
  /// Insert a few example loans the first time a database is created.
  seed_examples: bool,
}

fn load_config(path: &Path) -> Result<CliConfig> {
  let settings = config::Config::builder()
    .set_default("data_dir", "~/.local/share/whohas")?
    .set_default("seed_examples", false)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("WHOHAS"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = load_config(&cli.config)?;

  let data_dir =
    expand_tilde(cli.data_dir.as_deref().unwrap_or(cfg.data_dir.as_path()));
  let ctx = StoreContext::new(data_dir);

  let registry = StoreRegistry::new();
  let store = registry
    .get_instance(&ctx)
    .await
    .with_context(|| format!("failed to open store in {:?}", ctx.data_dir()))?;

  if Preferences::take_first_start(&ctx.preferences_path()).await? {
    tracing::info!("created a new database in {:?}", ctx.data_dir());
    if cfg.seed_examples {
      commands::seed_examples(&store).await?;
    }
  }

  let result = commands::run(&store, cli.command).await;
  registry.close_all().await.context("failed to close store")?;
  result
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
