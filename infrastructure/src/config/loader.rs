//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use permitflow_domain::ConfigIssue;
use std::path::{Path, PathBuf};
use tracing::warn;

const APP_DIR: &str = "permitflow";
const PROJECT_FILES: [&str; 2] = ["permitflow.toml", ".permitflow.toml"];
const ENV_PREFIX: &str = "PERMITFLOW_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `PERMITFLOW_<SECTION>__<KEY>` (e.g. `PERMITFLOW_LLM__API_KEY`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./permitflow.toml` or `./.permitflow.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/permitflow/config.toml`
    /// 5. Default values
    ///
    /// Validation warnings are logged; validation errors fail the load.
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut paths = Vec::new();

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            paths.push(global_path);
        }

        if let Some(project_path) = Self::project_config_path() {
            paths.push(project_path);
        }

        if let Some(path) = config_path {
            paths.push(path.to_path_buf());
        }

        Self::load_layers(&paths, true)
    }

    /// Defaults, then `paths` in order, then optionally the environment.
    fn load_layers(paths: &[PathBuf], with_env: bool) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in paths {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.clone()));
            }
            figment = figment.merge(Toml::file(path));
        }
        if with_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config: FileConfig = figment.extract().map_err(Box::new)?;
        Self::check(config)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Run validation, logging warnings and rejecting errors
    pub fn check(config: FileConfig) -> Result<FileConfig, ConfigError> {
        let (errors, warnings): (Vec<ConfigIssue>, Vec<ConfigIssue>) =
            config.validate().into_iter().partition(ConfigIssue::is_error);

        for issue in &warnings {
            warn!("config: {}", issue.message);
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/permitflow/config.toml if set,
    /// otherwise falls back to ~/.config/permitflow/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {ENV_PREFIX}<SECTION>__<KEY>");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./permitflow.toml or ./.permitflow.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permitflow_domain::ConfigIssueCode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.review.reviewers.len(), 3);
        assert_eq!(config.hub.history_capacity, 20);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("permitflow"));
    }

    #[test]
    fn test_layers_override_in_order() {
        let base = write_config(
            r#"
[server]
bind = "0.0.0.0:9000"

[hub]
history_capacity = 10
"#,
        );
        let overlay = write_config(
            r#"
[hub]
history_capacity = 5
"#,
        );

        let config = ConfigLoader::load_layers(
            &[base.path().to_path_buf(), overlay.path().to_path_buf()],
            false,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.hub.history_capacity, 5);
        assert_eq!(config.hub.sink_queue_capacity, 64);
    }

    #[test]
    fn test_permits_array_replaces_defaults() {
        let file = write_config(
            r#"
[[permits]]
name = "Permit to Operate"
required_fields = ["runbook"]
"#,
        );

        let config = ConfigLoader::load_layers(&[file.path().to_path_buf()], false).unwrap();
        assert_eq!(config.permits.len(), 1);
        assert_eq!(config.permits[0].name, "Permit to Operate");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let result = ConfigLoader::load_layers(&[missing.clone()], false);
        assert!(matches!(result, Err(ConfigError::NotFound(path)) if path == missing));
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("permitflow.toml");

        let result = ConfigLoader::load(Some(&missing));
        assert!(matches!(result, Err(ConfigError::NotFound(path)) if path == missing));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let file = write_config(
            r#"
[hub]
history_capacity = 0
"#,
        );

        match ConfigLoader::load_layers(&[file.path().to_path_buf()], false) {
            Err(ConfigError::Invalid(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, ConfigIssueCode::ZeroHistoryCapacity);
            }
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_warnings_do_not_fail_load() {
        let file = write_config(
            r#"
[[review.reviewers]]
id = "cyber"
weight = 0.5
"#,
        );

        let config = ConfigLoader::load_layers(&[file.path().to_path_buf()], false).unwrap();
        assert_eq!(config.review.reviewers.len(), 1);
    }

    #[test]
    fn test_malformed_toml_is_load_error() {
        let file = write_config("[hub\nhistory_capacity = ");
        let result = ConfigLoader::load_layers(&[file.path().to_path_buf()], false);
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
