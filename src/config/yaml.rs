//! YAML configuration loading and parsing

use crate::config::Config;
use crate::error::FetchError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Load and parse YAML configuration from file
pub fn load_config(system: &dyn System, path: &str) -> Result<Config> {
    let path_obj = Path::new(path);

    if !system.exists(path_obj) {
        return Err(FetchError::config(format!(
            "Configuration file not found: {path}\n\
            Create a fetch-sparse.yaml file or specify a different path with --config"
        ))
        .into());
    }

    let content = system.read_to_string(path_obj).map_err(|e| {
        FetchError::config(format!("Failed to read configuration file: {path}: {e}"))
    })?;

    let config: Config = serde_yaml::from_str(&content).map_err(|e| {
        FetchError::config(format!(
            "Failed to parse YAML configuration in file: {path}: {e}\n\
            Please check the syntax and structure of your configuration file"
        ))
    })?;

    // Validate against JSON schema
    let config_value = serde_json::to_value(&config)
        .context("Failed to convert configuration to JSON for validation")?;

    crate::config::schema::validate_against_schema(&config_value)?;

    // Validate configuration logic (URL formats, pattern syntax, mode conflicts)
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn loads_a_complete_configuration() {
        let yaml = r#"
excludes:
  - "**/*.tar"
fetches:
  - url: "https://github.com/openitools/openitools-ipcc.git"
    dest: "./openitools-ipcc"
  - url: "openitools/other"
    dest: "./other"
    excludes:
      - "**/*.zip"
    append: true
"#;
        let system = MockSystem::new().with_file("/cfg/fetch-sparse.yaml", yaml.as_bytes());

        let config = load_config(&system, "/cfg/fetch-sparse.yaml").unwrap();
        assert_eq!(config.excludes, vec!["**/*.tar"]);
        assert_eq!(config.fetches.len(), 2);
        assert_eq!(config.fetches[0].dest, "./openitools-ipcc");
        assert!(config.fetches[1].append);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let system = MockSystem::new();
        let err = load_config(&system, "/cfg/none.yaml").unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
        assert!(err.downcast_ref::<FetchError>().is_some());
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let system =
            MockSystem::new().with_file("/cfg/bad.yaml", b"fetches:\n  - url: [\nbroken");
        let err = load_config(&system, "/cfg/bad.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML"));
    }

    #[test]
    fn schema_rejects_empty_fetch_list() {
        let system = MockSystem::new().with_file("/cfg/empty.yaml", b"fetches: []");
        let err = load_config(&system, "/cfg/empty.yaml").unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn schema_rejects_empty_url() {
        let yaml = r#"
fetches:
  - url: ""
    dest: "./ipcc"
"#;
        let system = MockSystem::new().with_file("/cfg/blank.yaml", yaml.as_bytes());
        assert!(load_config(&system, "/cfg/blank.yaml").is_err());
    }
}
