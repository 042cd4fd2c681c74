use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use newsdeck::app::{App, AppEvent};
use newsdeck::config::Settings;
use newsdeck::feed::HttpFetcher;
use newsdeck::keybindings::KeybindingRegistry;
use newsdeck::storage::StateStore;
use newsdeck::theme::ThemeVariant;
use newsdeck::ui::{self, TaskContext};

const LOG_FILE_NAME: &str = "newsdeck.log";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the config directory path (~/.config/newsdeck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("newsdeck");
    Ok(config_dir)
}

/// Send tracing output to a log file; stdout belongs to the TUI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "newsdeck", about = "Terminal headline reader for RSS and Atom feeds")]
struct Args {
    /// Use this directory instead of ~/.config/newsdeck
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Open this saved list instead of the default one
    #[arg(long, value_name = "NAME")]
    list: Option<String>,

    /// Theme for this session (the saved theme is left unchanged)
    #[arg(long, value_enum)]
    theme: Option<ThemeVariant>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up config directory
    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    init_logging(&config_dir)?;

    // User-only access to lists and logs
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let settings = match Settings::load(&config_dir.join(CONFIG_FILE_NAME)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: {}. Using default settings.", e);
            tracing::warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        }
    };

    let store = StateStore::in_dir(&config_dir);
    let (mut state, repaired) = store.load_or_default();
    if repaired {
        if let Err(e) = store.save(&state) {
            tracing::warn!(error = %e, "Failed to write repaired state");
        }
    }

    if let Some(name) = &args.list {
        if let Err(e) = state.lists.open(name) {
            eprintln!("Warning: {}. Opening '{}' instead.", e, state.lists.active_name());
            tracing::warn!(list = %name, error = %e, "Requested list not opened");
        }
    }

    let mut keys = KeybindingRegistry::new();
    for warning in keys.apply_overrides(&settings.keybindings) {
        tracing::warn!(warning = %warning, "Ignoring keybinding override");
    }

    let fetcher = HttpFetcher::new(&settings.user_agent, settings.fetch_timeout())
        .context("Failed to create HTTP client")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let ctx = TaskContext {
        fetcher,
        tx: event_tx,
        max_entries: settings.max_entries_per_category,
        validation_timeout: settings.fetch_timeout(),
    };

    let mut app = App::new(state, settings, store, args.theme);

    // Run the TUI
    ui::run(&mut app, keys, ctx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
