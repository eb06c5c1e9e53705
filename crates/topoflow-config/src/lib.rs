pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::{Path, PathBuf};

/// Environment variable pointing at a settings file
pub const CONFIG_ENV: &str = "TOPOFLOW_CONFIG";

const CANDIDATES: [&str; 4] = [
    "topoflow.local.yaml",
    "topoflow.yaml",
    ".topoflow/config.yaml",
    ".topoflow.yaml",
];

/// Global settings directory (`~/.config/topoflow` on Linux)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("topoflow"))
}

/// Locate the settings file
///
/// Search order:
/// 1. explicit path (`--config`)
/// 2. environment variable `TOPOFLOW_CONFIG`
/// 3. current directory: topoflow.local.yaml, topoflow.yaml, .topoflow/config.yaml, .topoflow.yaml
/// 4. global settings: `<config dir>/topoflow/config.yaml`
///
/// Returns `Ok(None)` when nothing is found; an explicitly named file that
/// does not exist is an error.
pub fn find_settings_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::NotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for candidate in CANDIDATES {
        let path = current_dir.join(candidate);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    if let Some(dir) = get_config_dir() {
        let global = dir.join("config.yaml");
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Load and validate settings from a file
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = if content.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    settings.validate()?;
    Ok(settings)
}

/// Discover and load settings, falling back to defaults
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match find_settings_file(explicit)? {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            load_settings_from(&path)
        }
        None => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_settings_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("topoflow.yaml"), "{}").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_ENV, || find_settings_file(None));

        std::env::set_current_dir(original_dir).unwrap();

        let path = result.unwrap().unwrap();
        assert!(path.ends_with("topoflow.yaml"));
    }

    #[test]
    #[serial]
    fn test_local_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("topoflow.yaml"), "{}").unwrap();
        fs::write(temp_dir.path().join("topoflow.local.yaml"), "{}").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_ENV, || find_settings_file(None));

        std::env::set_current_dir(original_dir).unwrap();

        // topoflow.local.yaml wins
        assert!(result.unwrap().unwrap().ends_with("topoflow.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "deploy:\n  stack_name: EnvStack\n").unwrap();

        let settings = temp_env::with_var(CONFIG_ENV, Some(path.as_os_str()), || {
            load_settings(None)
        })
        .unwrap();

        assert_eq!(settings.deploy.stack_name, "EnvStack");
    }

    #[test]
    #[serial]
    fn test_env_var_missing_file() {
        let result = temp_env::with_var(CONFIG_ENV, Some("/nonexistent/topoflow.yaml"), || {
            find_settings_file(None)
        });
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_explicit_path_missing() {
        let result = find_settings_file(Some(Path::new("/nonexistent/settings.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "deploy: [not, a, mapping]\n").unwrap();

        assert!(matches!(
            load_settings_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.yaml");
        fs::write(&path, "").unwrap();

        assert_eq!(load_settings_from(&path).unwrap(), Settings::default());
    }
}
