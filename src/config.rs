use crate::cache::FileCacheStore;
use crate::errors::ExportError;
use crate::export::{DEFAULT_TIMESTAMP_PATTERN, RenderOptions, TimestampStyle};
use crate::source::{
    BuiltinCatalog, CatalogSupplier, JsonCatalog, JsonHistoryDir, SourceRegistry,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings for the CLI and for wiring a registry from disk.
///
/// Precedence: CLI > env > config files > defaults. Unset keys fall back to
/// defaults under the platform data directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    pub cache_dir: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub user: Option<String>,
    pub timestamp_pattern: Option<String>,
    pub utc_timestamps: Option<bool>,
}

impl AppConfig {
    /// Files, then environment, layered over defaults.
    #[must_use]
    pub fn load(cli_cfg: Option<&Path>) -> Self {
        let mut cfg = Self::default();
        for p in config_paths(cli_cfg) {
            if !p.exists() {
                continue;
            }
            match Self::from_file(&p) {
                Ok(file_cfg) => cfg.fill_from(file_cfg),
                Err(e) => log::warn!("config: skipping {}: {e}", p.display()),
            }
        }
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg
    }

    /// # Errors
    /// Returns `Config` if the file cannot be read or is not valid TOML for
    /// this shape.
    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let s = std::fs::read_to_string(path)?;
        toml::from_str(&s)
            .map_err(|e| ExportError::Config(format!("{}: {e}", path.display())))
    }

    /// Take every key from `other` that is still unset here.
    pub fn fill_from(&mut self, other: AppConfig) {
        self.cache_dir = self.cache_dir.take().or(other.cache_dir);
        self.history_dir = self.history_dir.take().or(other.history_dir);
        self.catalog_path = self.catalog_path.take().or(other.catalog_path);
        self.output_dir = self.output_dir.take().or(other.output_dir);
        self.log_dir = self.log_dir.take().or(other.log_dir);
        self.log_level = self.log_level.take().or(other.log_level);
        self.user = self.user.take().or(other.user);
        self.timestamp_pattern = self
            .timestamp_pattern
            .take()
            .or(other.timestamp_pattern);
        self.utc_timestamps = self.utc_timestamps.or(other.utc_timestamps);
    }

    /// Override keys from environment variables found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(s) = lookup("NUCLEO_EXPORT_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_HISTORY_DIR") {
            self.history_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_CATALOG") {
            self.catalog_path = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_LOG_LEVEL") {
            self.log_level = Some(s);
        }
        if let Some(s) = lookup("NUCLEO_EXPORT_USER") {
            self.user = Some(s);
        }
    }

    fn data_dir() -> PathBuf {
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nucleo-export")
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("cache"))
    }

    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("history"))
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// # Errors
    /// Returns `Config` for an invalid timestamp pattern.
    pub fn render_options(&self) -> Result<RenderOptions, ExportError> {
        let pattern = self
            .timestamp_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TIMESTAMP_PATTERN);
        let timestamps = TimestampStyle::new(pattern, self.utc_timestamps.unwrap_or(false))?;
        Ok(RenderOptions {
            timestamps,
            ..Default::default()
        })
    }

    /// Registry over a file cache, a JSON or built-in catalog and a history
    /// directory.
    ///
    /// # Errors
    /// Returns an error if the cache directory or catalog file cannot be opened.
    pub fn build_registry(&self) -> Result<SourceRegistry, ExportError> {
        let cache = Arc::new(FileCacheStore::open(self.cache_dir())?);
        let catalog: Arc<dyn CatalogSupplier> = match &self.catalog_path {
            Some(p) => Arc::new(JsonCatalog::open(p)?),
            None => Arc::new(BuiltinCatalog),
        };
        let history = Arc::new(JsonHistoryDir::new(self.history_dir()));
        Ok(SourceRegistry::new(catalog, cache, history))
    }
}

/// Candidate config files, highest precedence first.
#[must_use]
pub fn config_paths(cli_cfg: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_cfg {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("NUCLEO_EXPORT_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(home) = dirs_next::home_dir() {
        paths.push(home.join(".config").join("nucleo-export.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("nucleo-export.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_files_win_and_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.toml");
        let second = dir.path().join("b.toml");
        std::fs::write(&first, "user = \"alice\"\n").unwrap();
        std::fs::write(
            &second,
            "user = \"bob\"\ncache_dir = \"/tmp/c\"\nutc_timestamps = true\n",
        )
        .unwrap();
        let mut cfg = AppConfig::from_file(&first).unwrap();
        cfg.fill_from(AppConfig::from_file(&second).unwrap());
        assert_eq!(cfg.user.as_deref(), Some("alice"));
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/c")));
        assert_eq!(cfg.utc_timestamps, Some(true));
        cfg.apply_env(|k| (k == "NUCLEO_EXPORT_USER").then(|| "carol".to_string()));
        assert_eq!(cfg.user.as_deref(), Some("carol"));
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/c")));
    }

    #[test]
    fn log_dir_env_overrides_the_file_value() {
        let mut cfg = AppConfig {
            log_dir: Some(PathBuf::from("/var/log/from-file")),
            ..Default::default()
        };
        cfg.apply_env(|k| match k {
            "NUCLEO_EXPORT_LOG_DIR" => Some("/tmp/nucleo-logs".to_string()),
            "NUCLEO_EXPORT_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/nucleo-logs")));
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.toml");
        std::fs::write(&p, "user = [").unwrap();
        assert!(matches!(
            AppConfig::from_file(&p),
            Err(ExportError::Config(_))
        ));
    }

    #[test]
    fn invalid_timestamp_pattern_is_rejected() {
        let cfg = AppConfig {
            timestamp_pattern: Some("%Q".into()),
            ..Default::default()
        };
        assert!(cfg.render_options().is_err());
        assert!(AppConfig::default().render_options().is_ok());
    }

    #[test]
    fn registry_builds_under_configured_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig {
            cache_dir: Some(dir.path().join("cache")),
            ..Default::default()
        };
        assert!(cfg.build_registry().is_ok());
        assert!(dir.path().join("cache").is_dir());
    }
}
