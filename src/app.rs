use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;

use crate::api::models::{Receiver, User};
use crate::error::ConfigError;
use crate::store::{ChatState, Theme};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const CONFIG_ENV: &str = "CHATLINE_CONFIG";

/// Credentials left behind by whatever signed the user in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    pub fn user(&self) -> User {
        User { id: self.user_id.clone(), name: self.name.clone(), email: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub contacts: Vec<Receiver>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            theme: Theme::default(),
            session: None,
            contacts: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$CHATLINE_CONFIG`, else `<config dir>/chatline.toml`.
    pub fn path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(p));
        }
        let proj = ProjectDirs::from("io", "chatline", "chatline")?;
        Some(proj.config_dir().join("chatline.toml"))
    }

    /// Missing or unreadable config falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::new();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::new(),
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str::<Settings>(&text)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    /// Store contents a freshly started client begins with.
    pub fn initial_state(&self) -> ChatState {
        ChatState {
            user: self.session.as_ref().map(Session::user),
            token: self.session.as_ref().and_then(|s| s.token.clone()),
            theme: self.theme,
            ..ChatState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chatline.toml");
        let settings = Settings {
            base_url: "https://chat.example.com/api".into(),
            theme: Theme::Dark,
            session: Some(Session { user_id: "u1".into(), name: "Ada".into(), token: Some("tok".into()) }),
            contacts: vec![Receiver { id: "r1".into(), name: "Grace".into() }],
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn sparse_file_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatline.toml");
        fs::write(&path, "theme = \"dark\"\n\n[[contacts]]\n_id = \"r1\"\nname = \"Grace\"\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.contacts.len(), 1);
        assert!(settings.session.is_none());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatline.toml");
        fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn initial_state_carries_session() {
        let settings = Settings {
            session: Some(Session { user_id: "u1".into(), name: "Ada".into(), token: Some("tok".into()) }),
            ..Settings::default()
        };
        let state = settings.initial_state();
        assert_eq!(state.user_id(), Some("u1"));
        assert_eq!(state.token.as_deref(), Some("tok"));
        assert!(state.messages.is_empty());
    }
}
