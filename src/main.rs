//! Quillpost - A terminal markdown article editor.
//!
//! # Usage
//!
//! ```bash
//! quillpost
//! quillpost draft.md
//! quillpost --server https://api.example.com draft.md
//! quillpost --min-pane-width 30 --save
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use quillpost::api::HttpApi;
use quillpost::app::App;
use quillpost::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use quillpost::layout::DEFAULT_MIN_WIDTH;
use quillpost::ui::style::detect_light_background;

/// A terminal markdown article editor with live preview and publishing
#[derive(Parser, Debug)]
#[command(name = "quillpost", version, about, long_about = None)]
struct Cli {
    /// Markdown file to open right away
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Base URL of the article backend
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Minimum width of either pane, in columns
    #[arg(long, value_name = "COLS")]
    min_pane_width: Option<u16>,

    /// Directory exports are written into
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Write logs to this file instead of the default log file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Color palette for light or dark terminal backgrounds
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Send tracing output to a file so it never lands on the alternate screen.
///
/// A log file named on the command line or in the flags file must open. When
/// the default location is unusable, logs are discarded instead.
fn init_logging(flags: &ConfigFlags) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let path = flags.log_path();
    let writer = match open_log_file(&path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(err) if flags.log_file.is_some() => return Err(err),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(&effective)?;
    info!(server = effective.server(), "starting");

    let light_theme = match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => detect_light_background(),
        ThemeMode::Light => true,
        ThemeMode::Dark => false,
    };

    let api = HttpApi::new(effective.server(), effective.timeout())
        .context("Failed to create API client")?;

    App::new(Box::new(api))
        .with_initial_file(cli.file)
        .with_min_pane_width(effective.min_pane_width.unwrap_or(DEFAULT_MIN_WIDTH))
        .with_export_dir(effective.export_dir())
        .with_light_theme(light_theme)
        .run()
        .context("Application error")
}
