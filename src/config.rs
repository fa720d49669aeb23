//! Run settings: tape length, output mode, and execution limits.
//!
//! Values are resolved in layers, later ones winning:
//! defaults, then the `[run]` section of `<config home>/bftape.toml`, then
//! `BFTAPE_*` environment variables. Command-line flags are applied on top by
//! the binary.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;

use crate::executor::{OutputMode, Tape};

pub const CONFIG_FILE_NAME: &str = "bftape.toml";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tape_len: usize,
    pub mode: OutputMode,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tape_len: Tape::DEFAULT_LEN,
            mode: OutputMode::Char,
            max_steps: None,
            timeout_ms: None,
            color: true,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the user's config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(content) = config_path().and_then(|p| fs::read_to_string(p).ok()) {
            tracing::debug!("loading {CONFIG_FILE_NAME}");
            cfg.apply_toml(&content)?;
        }
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply the `[run]` section of a config file.
    ///
    /// Only the flat `key = value` subset is understood; values may be quoted.
    pub fn apply_toml(&mut self, content: &str) -> Result<(), ConfigError> {
        let mut in_run = false;
        let mut map: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') { continue; }
            if line.starts_with('[') && line.ends_with(']') {
                in_run = &line[1..line.len() - 1] == "run";
                continue;
            }
            if !in_run { continue; }
            if let Some((key, val_raw)) = line.split_once('=') {
                let val_raw = val_raw.trim();
                let val = val_raw
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(val_raw);
                map.insert(key.trim().to_string(), val.to_string());
            }
        }

        macro_rules! set {
            ($field:ident, $key:literal, $parse:expr) => {
                if let Some(v) = map.get($key) {
                    self.$field = $parse(v.as_str()).ok_or_else(|| ConfigError::InvalidValue {
                        key: $key.to_string(),
                        value: v.clone(),
                    })?;
                }
            };
        }

        set!(tape_len, "tape_len", parse_tape_len);
        set!(mode, "mode", |v: &str| v.parse::<OutputMode>().ok());
        set!(max_steps, "max_steps", |v: &str| v.parse::<usize>().ok().map(Some));
        set!(timeout_ms, "timeout_ms", |v: &str| v.parse::<u64>().ok().map(Some));
        set!(color, "color", |v: &str| v.parse::<bool>().ok());

        Ok(())
    }

    /// Apply `BFTAPE_*` variables (and `NO_COLOR`) read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |key: &str, value: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        };

        if let Some(v) = lookup("BFTAPE_TAPE_LEN") {
            self.tape_len = parse_tape_len(&v).ok_or_else(|| invalid("BFTAPE_TAPE_LEN", v))?;
        }
        if let Some(v) = lookup("BFTAPE_MODE") {
            self.mode = v.parse().map_err(|_| invalid("BFTAPE_MODE", v))?;
        }
        if let Some(v) = lookup("BFTAPE_MAX_STEPS") {
            self.max_steps = Some(v.trim().parse().map_err(|_| invalid("BFTAPE_MAX_STEPS", v))?);
        }
        if let Some(v) = lookup("BFTAPE_TIMEOUT_MS") {
            self.timeout_ms = Some(v.trim().parse().map_err(|_| invalid("BFTAPE_TIMEOUT_MS", v))?);
        }
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.color = false;
        }
        Ok(())
    }
}

fn parse_tape_len(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

/// `<config home>/bftape.toml`, if a config home can be resolved.
///
/// On Linux this is usually `~/.config`, on Windows `C:\Users\<user>\.config`.
pub fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}
