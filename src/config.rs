//! Persisted default flags.
//!
//! Defaults live in a flags file holding the same `--flag value` tokens the
//! command line accepts, one or more per line. A global file is merged with a
//! local `.quillpostrc`, then the command line wins over both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Backend used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Export directory used when nothing else is configured.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub server: Option<String>,
    pub min_pane_width: Option<u16>,
    pub export_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub theme: Option<ThemeMode>,
}

impl ConfigFlags {
    /// Merge two flag sets; values in `other` take precedence.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            server: other.server.clone().or_else(|| self.server.clone()),
            min_pane_width: other.min_pane_width.or(self.min_pane_width),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            theme: other.theme.or(self.theme),
        }
    }

    pub fn server(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR))
    }

    /// Where logs go. The terminal belongs to the UI, so there is always a file.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(default_log_path)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("quillpost").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("quillpost")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("quillpost").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("quillpost")
                .join("config");
        }
    }

    local_override_path()
}

/// Log file next to the global flags file.
pub fn default_log_path() -> PathBuf {
    global_config_path().with_file_name("quillpost.log")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".quillpostrc")
}

/// Load flags from `path`; a missing file yields defaults.
///
/// # Errors
///
/// Fails when the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path`, creating parent directories.
///
/// # Errors
///
/// Fails when the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# quillpost defaults (saved with --save)".to_string()];
    if let Some(server) = &flags.server {
        lines.push(format!("--server {server}"));
    }
    if let Some(width) = flags.min_pane_width {
        lines.push(format!("--min-pane-width {width}"));
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if let Some(secs) = flags.timeout_secs {
        lines.push(format!("--timeout {secs}"));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the flags file at `path` if present.
///
/// # Errors
///
/// Fails when the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of raw argument tokens, ignoring everything else.
///
/// Both `--flag value` and `--flag=value` forms are accepted; malformed
/// numbers are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--server" | "--min-pane-width" | "--export-dir" | "--timeout" | "--log-file" | "--theme"
        );
        if takes_value {
            let value = match inline {
                Some(value) => Some(value),
                None => {
                    let next = tokens.get(i + 1).map(String::as_str);
                    if next.is_some() {
                        i += 1;
                    }
                    next
                }
            };
            if let Some(value) = value {
                apply_flag(&mut flags, name, value);
            }
        }
        i += 1;
    }
    flags
}

fn apply_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--server" => flags.server = Some(value.to_string()),
        "--min-pane-width" => flags.min_pane_width = value.parse().ok().or(flags.min_pane_width),
        "--export-dir" => flags.export_dir = Some(PathBuf::from(value)),
        "--timeout" => flags.timeout_secs = value.parse().ok().or(flags.timeout_secs),
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        "--theme" => flags.theme = parse_theme(value).or(flags.theme),
        _ => {}
    }
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
