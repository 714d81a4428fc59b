use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const HOME_ENV_VAR: &str = "SALESCAST_HOME";
const DEFAULT_DIR_NAME: &str = ".salescast";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Resolves the data directory: explicit path, then `SALESCAST_HOME`, then `~/.salescast`.
pub fn data_dir(base_dir: Option<PathBuf>) -> Result<PathBuf> {
    let path = match base_dir {
        Some(dir) => dir,
        None => match env::var_os(HOME_ENV_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(DEFAULT_DIR_NAME)
            }
        },
    };
    fs::create_dir_all(&path)
        .with_context(|| format!("Could not create data directory {}", path.display()))?;
    Ok(path)
}

/// Column aliases the spreadsheet loader matches against (case-insensitive).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub date_columns: Vec<String>,
    pub total_columns: Vec<String>,
    pub ignored_columns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_columns: vec!["date".into(), "day".into()],
            total_columns: vec![
                "total".into(),
                "sales".into(),
                "amount".into(),
                "total sales".into(),
            ],
            ignored_columns: vec!["weekday".into(), "day name".into()],
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Index of the date column; earlier aliases take precedence.
    pub fn date_column(&self, headers: &[String]) -> Option<usize> {
        find_column(&self.date_columns, headers, None)
    }

    pub fn total_column(&self, headers: &[String], exclude: usize) -> Option<usize> {
        find_column(&self.total_columns, headers, Some(exclude))
    }

    /// True for any header naming a date alias, not only the chosen date column.
    pub fn is_date_column(&self, header: &str) -> bool {
        matches_alias(&self.date_columns, header)
    }

    pub fn is_ignored_column(&self, header: &str) -> bool {
        matches_alias(&self.ignored_columns, header)
    }
}

fn matches_alias(aliases: &[String], header: &str) -> bool {
    let header = header.trim();
    aliases.iter().any(|a| a.eq_ignore_ascii_case(header))
}

fn find_column(aliases: &[String], headers: &[String], exclude: Option<usize>) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .enumerate()
            .find(|(idx, h)| Some(*idx) != exclude && h.trim().eq_ignore_ascii_case(alias))
            .map(|(idx, _)| idx)
    })
}
