use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use tracing::warn;

/// Themes the dashboard knows how to render, as (key, label).
pub const THEMES: &[(&str, &str)] =
    &[("flatly", "Light Mode (flatly)"), ("superhero", "Dark Mode (superhero)")];

pub const DEFAULT_THEME: &str = "superhero";

/// Presentation preferences, persisted as a small JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self { theme: DEFAULT_THEME.to_string() }
    }
}

impl Settings {
    /// Missing or unreadable settings fall back to the defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };

        match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) if is_known_theme(&settings.theme) => settings,
            Ok(settings) => {
                warn!(theme = %settings.theme, "unknown theme in settings; using default");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(self).context("Failed to serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        if !is_known_theme(theme) {
            let known: Vec<&str> = THEMES.iter().map(|(key, _)| *key).collect();
            bail!("Unknown theme '{theme}'. Available themes: {}.", known.join(", "));
        }
        self.theme = theme.to_string();
        Ok(())
    }
}

fn is_known_theme(theme: &str) -> bool {
    THEMES.iter().any(|(key, _)| *key == theme)
}
