use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use timer_core::{PersistOptions, StorageKind, TimerOptions};

#[derive(Parser, Debug)]
#[command(name = "splitwatch", version, about = "Stopwatch with labeled sections and laps")]
pub struct Args {
    /// TOML file with timer options; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show milliseconds
    #[arg(long)]
    pub show_ms: bool,

    /// Milliseconds between live updates
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Persist state under this id
    #[arg(long)]
    pub persist_id: Option<String>,

    /// Directory for persisted state (default: the config file's storage)
    #[arg(long, requires = "persist_id")]
    pub storage_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn load_options(args: &Args) -> Result<TimerOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("can't read config {}", path.display()))?;
            parse_options(&text).with_context(|| format!("bad config {}", path.display()))?
        }
        None => TimerOptions::default(),
    };

    if args.show_ms {
        opts.show_ms = true;
    }
    if let Some(interval) = args.interval {
        opts.update_interval_ms = interval;
    }
    if let Some(id) = &args.persist_id {
        let storage = match &args.storage_dir {
            Some(dir) => StorageKind::File { dir: dir.clone() },
            None => opts
                .persist
                .as_ref()
                .map(|p| p.storage.clone())
                .unwrap_or_default(),
        };
        opts.persist = Some(PersistOptions { id: id.clone(), storage });
    }
    Ok(opts)
}

/// In-memory storage dies with the process, so a persist id backed by it
/// saves nothing across runs.
pub fn persistence_warning(opts: &TimerOptions) -> Option<String> {
    let persist = opts.persist.as_ref()?;
    match persist.storage {
        StorageKind::Memory => Some(format!(
            "timer '{}' is persisted in memory only and will not survive a restart; \
             pass --storage-dir or set a file storage in the config",
            persist.id
        )),
        StorageKind::File { .. } => None,
    }
}

pub fn parse_options(text: &str) -> Result<TimerOptions> {
    Ok(toml::from_str(text)?)
}
