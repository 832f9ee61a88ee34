use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Typed key lookups with defaults. Implementors only provide raw string access;
/// parse failures fall back to the default rather than erroring.
pub trait ConfigSource {
    /// Raw value for `key`, or `None` when the key is absent.
    fn raw_value(&self, key: &str) -> Option<String>;

    fn get_string(&self, key: &str, default: &str) -> String {
        self.raw_value(key)
            .map(|raw| clean_value(&raw).to_string())
            .unwrap_or_else(|| default.to_string())
    }

    fn get_string_array(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.raw_value(key) {
            Some(raw) => raw.split(',').map(|item| clean_value(item).to_string()).collect(),
            None => default.iter().map(|item| (*item).to_string()).collect(),
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        parse_value(self.raw_value(key)).unwrap_or(default)
    }

    fn get_float(&self, key: &str, default: f64) -> f64 {
        parse_value(self.raw_value(key)).unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.raw_value(key)
            .and_then(|raw| parse_bool(clean_value(&raw)))
            .unwrap_or(default)
    }
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|raw| clean_value(&raw).parse().ok())
}

/// Trim and strip one pair of surrounding double quotes.
fn clean_value(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Line-oriented `key: value` config file. The first line whose prefix matches
/// `key:` (case-insensitive) wins.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl ConfigFile {
    /// Load `path`; a missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        let lines = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            crate::log_debug(&format!(
                "config {} not found, using defaults",
                path.display()
            ));
            Vec::new()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            lines,
        })
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            path: None,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw_value(key).is_some()
    }
}

impl ConfigSource for ConfigFile {
    fn raw_value(&self, key: &str) -> Option<String> {
        let prefix = format!("{}:", key.to_lowercase());
        self.lines.iter().find_map(|line| {
            let lowered = line.to_lowercase();
            if !lowered.starts_with(&prefix) {
                return None;
            }
            line.get(key.len() + 1..).map(str::to_string)
        })
    }
}
