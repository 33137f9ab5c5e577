use adw::Application;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Backend integration settings for the reply generator. Stored as TOML in
/// the user config dir and read fresh at send time; nothing here is ever
/// validated against a live endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub server_url: String,
    pub api_key: String,
    pub instance_name: String,
    pub auto_reply: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            api_key: String::new(),
            instance_name: "vendedor_01".into(),
            auto_reply: true,
        }
    }
}

impl BackendSettings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("techleads.toml"))
    }

    pub fn load() -> Self {
        if let Some(path) = Self::toml_path() {
            if let Ok(bytes) = fs::read(&path) {
                if let Ok(text) = String::from_utf8(bytes) {
                    if let Ok(settings) = toml::from_str::<BackendSettings>(&text) {
                        return settings;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        if let Some(path) = Self::toml_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let toml = toml::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            fs::write(path, toml)
        } else {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir"))
        }
    }
}

pub fn build_ui(app: &Application) {
    crate::ui::main_window::show_main_window(app);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_settings_panel_placeholders() {
        let s = BackendSettings::default();
        assert!(s.server_url.is_empty());
        assert_eq!(s.instance_name, "vendedor_01");
        assert!(s.auto_reply);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let s = BackendSettings {
            server_url: "https://bot.techview.com".into(),
            api_key: "k".into(),
            instance_name: "canal_01".into(),
            auto_reply: false,
        };
        let text = toml::to_string_pretty(&s).unwrap();
        let back: BackendSettings = toml::from_str(&text).unwrap();
        assert_eq!(back.server_url, s.server_url);
        assert!(!back.auto_reply);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let back: BackendSettings = toml::from_str(r#"server_url = "https://x""#).unwrap();
        assert_eq!(back.server_url, "https://x");
        assert_eq!(back.instance_name, "vendedor_01");
        assert!(back.auto_reply);
    }
}
