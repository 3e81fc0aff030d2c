//! Robot settings and file locations
//!
//! Defaults are applied first, then an optional JSON settings file, then
//! environment overrides (`CSV_FILE_PATH`, `TEMPLATE_PATH`, `ROBOT_NAME`,
//! `SPEAK_COLOR`).

use std::path::{Path, PathBuf};

use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CSV_FILE_PATH, DEFAULT_ROBOT_NAME, SETTINGS_FILE};

/// Color the robot speaks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeakColor {
    /// No ANSI escapes
    Plain,
    Black,
    Red,
    #[default]
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl SpeakColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakColor::Plain => "plain",
            SpeakColor::Black => "black",
            SpeakColor::Red => "red",
            SpeakColor::Green => "green",
            SpeakColor::Yellow => "yellow",
            SpeakColor::Blue => "blue",
            SpeakColor::Magenta => "magenta",
            SpeakColor::Cyan => "cyan",
            SpeakColor::White => "white",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "none" => Some(SpeakColor::Plain),
            "black" => Some(SpeakColor::Black),
            "red" => Some(SpeakColor::Red),
            "green" => Some(SpeakColor::Green),
            "yellow" => Some(SpeakColor::Yellow),
            "blue" => Some(SpeakColor::Blue),
            "magenta" => Some(SpeakColor::Magenta),
            "cyan" => Some(SpeakColor::Cyan),
            "white" => Some(SpeakColor::White),
            _ => None,
        }
    }

    /// Terminal color, `None` for plain output
    pub fn ansi(&self) -> Option<AnsiColors> {
        match self {
            SpeakColor::Plain => None,
            SpeakColor::Black => Some(AnsiColors::Black),
            SpeakColor::Red => Some(AnsiColors::Red),
            SpeakColor::Green => Some(AnsiColors::Green),
            SpeakColor::Yellow => Some(AnsiColors::Yellow),
            SpeakColor::Blue => Some(AnsiColors::Blue),
            SpeakColor::Magenta => Some(AnsiColors::Magenta),
            SpeakColor::Cyan => Some(AnsiColors::Cyan),
            SpeakColor::White => Some(AnsiColors::White),
        }
    }
}

/// Robot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ranking CSV file
    pub csv_file_path: PathBuf,
    /// Directory holding the dialogue templates
    pub template_path: PathBuf,
    /// Name the robot introduces itself with
    pub robot_name: String,
    pub speak_color: SpeakColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_file_path: PathBuf::from(DEFAULT_CSV_FILE_PATH),
            template_path: default_template_dir(),
            robot_name: DEFAULT_ROBOT_NAME.to_string(),
            speak_color: SpeakColor::Green,
        }
    }
}

/// Templates shipped with the crate
pub fn default_template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

impl Settings {
    /// Environment variable naming an alternative settings file
    pub const SETTINGS_ENV: &'static str = "ROBOTER_SETTINGS";

    /// Load settings from the settings file and the process environment
    pub fn load() -> Self {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load settings using `lookup` in place of the process environment
    pub fn load_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(Self::SETTINGS_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));

        let mut settings = if path.exists() {
            Self::from_file(&path)
        } else {
            log::debug!("No settings file at {}, using defaults", path.display());
            Self::default()
        };
        settings.apply_overrides(lookup);
        settings
    }

    /// Read a JSON settings file, falling back to defaults when it is unusable
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply non-empty overrides returned by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("CSV_FILE_PATH") {
            self.csv_file_path = PathBuf::from(path);
        }
        if let Some(path) = get("TEMPLATE_PATH") {
            self.template_path = PathBuf::from(path);
        }
        if let Some(name) = get("ROBOT_NAME") {
            self.robot_name = name.trim().to_string();
        }
        if let Some(color) = get("SPEAK_COLOR") {
            match SpeakColor::from_str(&color) {
                Some(c) => self.speak_color = c,
                None => log::warn!("Unknown SPEAK_COLOR {:?}, keeping {}", color, self.speak_color.as_str()),
            }
        }
    }

    /// Write settings as pretty JSON, e.g. to seed an initial `roboter.json`
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.csv_file_path, PathBuf::from("ranking.csv"));
        assert_eq!(settings.robot_name, "Roboko");
        assert_eq!(settings.speak_color, SpeakColor::Green);
        assert!(settings.template_path.ends_with("templates"));
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        let settings = Settings::load_with(env(&[
            ("ROBOTER_SETTINGS", missing.to_str().unwrap()),
            ("CSV_FILE_PATH", "/tmp/other.csv"),
            ("TEMPLATE_PATH", "/tmp/tpl"),
            ("SPEAK_COLOR", "Cyan"),
            ("ROBOT_NAME", ""),
        ]));
        assert_eq!(settings.csv_file_path, PathBuf::from("/tmp/other.csv"));
        assert_eq!(settings.template_path, PathBuf::from("/tmp/tpl"));
        assert_eq!(settings.speak_color, SpeakColor::Cyan);
        // Empty values leave the default in place
        assert_eq!(settings.robot_name, "Roboko");
    }

    #[test]
    fn test_settings_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roboter.json");
        std::fs::write(&path, r#"{ "robot_name": "Robota", "speak_color": "plain" }"#).unwrap();

        let settings = Settings::load_with(env(&[
            ("ROBOTER_SETTINGS", path.to_str().unwrap()),
            ("ROBOT_NAME", "Override"),
        ]));
        assert_eq!(settings.robot_name, "Override");
        assert_eq!(settings.speak_color, SpeakColor::Plain);
        assert_eq!(settings.csv_file_path, PathBuf::from("ranking.csv"));
    }

    #[test]
    fn test_malformed_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roboter.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::from_file(&path), Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roboter.json");
        let settings = Settings {
            robot_name: "Robota".to_string(),
            speak_color: SpeakColor::Blue,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::from_file(&path), settings);
    }

    #[test]
    fn test_speak_color_parse() {
        assert_eq!(SpeakColor::from_str("RED"), Some(SpeakColor::Red));
        assert_eq!(SpeakColor::from_str("none"), Some(SpeakColor::Plain));
        assert_eq!(SpeakColor::from_str("teal"), None);
        assert!(SpeakColor::Plain.ansi().is_none());
        assert_eq!(SpeakColor::from_str(SpeakColor::Magenta.as_str()), Some(SpeakColor::Magenta));
    }
}
