use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "F1_TELEMETRY_CONFIG";

/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "f1-telemetry.json";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// File locations and the plot command. Every key is optional in the JSON
/// file; missing keys fall back to [`AppConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the three dataset tables.
    pub data_dir: PathBuf,
    pub events_file: String,
    pub drivers_file: String,
    pub laps_file: String,
    /// Where generated plots are written.
    pub output_dir: PathBuf,
    /// Image shown before the first analysis completes.
    pub placeholder_image: PathBuf,
    /// Program and leading arguments of the plot generator,
    /// e.g. `["python", "script.py"]`.
    pub plot_command: Vec<String>,
    /// Extension of generated artifacts, without the dot.
    pub image_extension: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            events_file: "events.csv".to_string(),
            drivers_file: "drivers.csv".to_string(),
            laps_file: "race_laps.csv".to_string(),
            output_dir: PathBuf::from("plots"),
            placeholder_image: PathBuf::from("img/placeholder.png"),
            plot_command: vec!["python".to_string(), "script.py".to_string()],
            image_extension: "png".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve the config: `$F1_TELEMETRY_CONFIG`, then `./f1-telemetry.json`,
    /// then defaults. A file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using default configuration");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(&self.events_file)
    }

    pub fn drivers_path(&self) -> PathBuf {
        self.data_dir.join(&self.drivers_file)
    }

    pub fn laps_path(&self) -> PathBuf {
        self.data_dir.join(&self.laps_file)
    }
}

/// The user's Desktop, the starting folder of the export dialog. Honours
/// XDG user-dirs and localized folder names; falls back to the home
/// directory when no Desktop is known.
pub fn desktop_dir() -> Option<PathBuf> {
    dirs::desktop_dir()
        .filter(|d| d.is_dir())
        .or_else(dirs::home_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(
            &path,
            r#"{ "data_dir": "/srv/f1", "plot_command": ["python3", "plots.py", "--dpi", "120"] }"#,
        )
        .unwrap();

        let cfg = AppConfig::from_file(&path).unwrap();
        assert_eq!(cfg.events_path(), PathBuf::from("/srv/f1/events.csv"));
        assert_eq!(cfg.laps_path(), PathBuf::from("/srv/f1/race_laps.csv"));
        assert_eq!(cfg.plot_command.len(), 4);
        assert_eq!(cfg.image_extension, "png");
        assert_eq!(cfg.output_dir, AppConfig::default().output_dir);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn desktop_follows_xdg_user_dirs() {
        let home = tempfile::tempdir().unwrap();
        let desktop = home.path().join("Schreibtisch");
        std::fs::create_dir_all(home.path().join(".config")).unwrap();
        std::fs::create_dir(&desktop).unwrap();
        std::fs::write(
            home.path().join(".config/user-dirs.dirs"),
            "XDG_DESKTOP_DIR=\"$HOME/Schreibtisch\"\n",
        )
        .unwrap();

        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(desktop_dir(), Some(desktop));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ data_dir: ").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config file"));
    }
}
