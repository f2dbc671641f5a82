use super::{NeighbourerConfig, DEFAULT_CONFIG_FILE};
use crate::error::{common, ErrorExt, NeighbourerError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves the configuration for a run
pub struct ConfigLoader {
    working_dir: PathBuf,
    read_env: bool,
}

impl ConfigLoader {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            read_env: true,
        }
    }

    /// Skip the `NEIGHBOURER_*` environment layer
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Load defaults, then the config file, then the environment
    ///
    /// An explicit `path` must exist. Without one, `neighbourer.toml` in the
    /// working directory is used when present.
    pub fn load(&self, path: Option<&Path>) -> Result<NeighbourerConfig> {
        let mut config = match self.config_file(path)? {
            Some(file) => Self::load_file(&file)?,
            None => NeighbourerConfig::default(),
        };

        if self.read_env {
            config.merge_env_vars()?;
        }

        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<NeighbourerConfig> {
        let content = std::fs::read_to_string(path)
            .to_config_error(format!("Failed to read {}", path.display()))?;
        let config: NeighbourerConfig = toml::from_str(&content)
            .map_err(|e| NeighbourerError::from(e).with_context(path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn config_file(&self, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.working_dir.join(path)
            };
            if !resolved.is_file() {
                return Err(common::config_not_found(&resolved));
            }
            return Ok(Some(resolved));
        }

        let default = self.working_dir.join(DEFAULT_CONFIG_FILE);
        Ok(default.is_file().then_some(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::table::ErrorMode;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new(dir.path())
            .without_env()
            .load(None)
            .unwrap();
        assert_eq!(config, NeighbourerConfig::default());
    }

    #[test]
    fn test_default_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "mode = \"strict\"\nthreads = 2\ndelimiter = \";\"\nprecision = 3\n",
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path())
            .without_env()
            .load(None)
            .unwrap();
        assert_eq!(config.mode, ErrorMode::Strict);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.precision, Some(3));
        assert!(!config.progress);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::new(dir.path())
            .without_env()
            .load(Some(Path::new("missing.toml")))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "radius = 2\n").unwrap();

        let err = ConfigLoader::new(dir.path())
            .without_env()
            .load(Some(&path))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
        assert!(err.to_string().contains("custom.toml"));
    }
}
