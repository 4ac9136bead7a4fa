//! Configuration loader.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file if it exists, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.cadence`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.scheduler.timezone, "UTC");
        assert_eq!(config.publisher.retries, 3);
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.cadence");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_jobs() {
        let content = r#"
            [scheduler]
            timezone = "Europe/Berlin"
            run_on_start = true

            [[jobs]]
            name = "heartbeat"
            schedule = "*/5 * * * *"
            action = { type = "publish", topic = "system", event_type = "system.heartbeat" }

            [[jobs]]
            name = "nightly"
            schedule = "0 3 * * *"
            enabled = false
            action = { type = "log", message = "nightly tick" }
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.scheduler.timezone, "Europe/Berlin");
        assert!(config.scheduler.run_on_start);
        assert_eq!(config.jobs.len(), 2);
        assert!(config.jobs[0].enabled);
        assert!(!config.jobs[1].enabled);
        match &config.jobs[0].action {
            crate::JobAction::Publish { topic, event_type, payload } => {
                assert_eq!(topic, "system");
                assert_eq!(event_type, "system.heartbeat");
                assert!(payload.is_null());
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: test-local variable name, not read concurrently elsewhere.
        unsafe { std::env::set_var("CADENCE_TEST_SERVICE_NAME", "billing") };
        let content = r#"
            [publisher]
            service_name = "${CADENCE_TEST_SERVICE_NAME}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.publisher.service_name, "billing");
    }

    #[test]
    fn test_missing_env_var() {
        let content = r#"
            [publisher]
            service_name = "${CADENCE_TEST_DEFINITELY_UNSET}"
        "#;
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[publisher]").unwrap();
        writeln!(file, "retry_delay_ms = 250").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.publisher.retry_delay_ms, 250);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/cadence.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/cadence.toml")).unwrap();
        assert_eq!(config.publisher.history_max_len, 1000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
