use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use clap::ValueEnum;
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".realmgenrc.json";

/// Artifact format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Typescript,
    Json,
}

/// Doc tag names that drive schema generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tags {
    pub model: String,
    pub primary_key: String,
    pub index: String,
    pub date: String,
    pub float: String,
    pub double: String,
}

impl Default for Tags {
    fn default() -> Self {
        Self {
            model: "realm".to_string(),
            primary_key: "realm_primary_key".to_string(),
            index: "realm_index".to_string(),
            date: "realm_date".to_string(),
            float: "realm_float".to_string(),
            double: "realm_double".to_string(),
        }
    }
}

impl Tags {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("model", &self.model),
            ("primaryKey", &self.primary_key),
            ("index", &self.index),
            ("date", &self.date),
            ("float", &self.float),
            ("double", &self.double),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_model_files")]
    pub model_files: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default = "default_exported_only")]
    pub exported_only: bool,
    #[serde(default)]
    pub short_scalar_properties: bool,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsconfig: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_model_files() -> Vec<String> {
    vec!["**/*models.ts".to_string()]
}

fn default_exported_only() -> bool {
    true
}

fn default_output() -> String {
    "__generated__/schemas.ts".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_files: default_model_files(),
            ignores: Vec::new(),
            tags: Tags::default(),
            exported_only: default_exported_only(),
            short_scalar_properties: false,
            output: default_output(),
            tsconfig: None,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if a glob in `modelFiles` or `ignores` is invalid, or
    /// if a tag name is empty or shared by two tags.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.model_files {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'modelFiles': \"{}\"", pattern))?;
        }

        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        let mut seen = HashSet::new();
        for (key, tag) in self.tags.entries() {
            if tag.trim().is_empty() {
                anyhow::bail!("Tag name for 'tags.{}' must not be empty", key);
            }
            if !seen.insert(tag) {
                anyhow::bail!("Tag name \"{}\" is used for more than one tag", tag);
            }
        }

        Ok(())
    }

    pub fn model_file_patterns(&self) -> Vec<Pattern> {
        compile_patterns(&self.model_files)
    }

    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        compile_patterns(&self.ignores)
    }
}

/// Compile already validated glob patterns.
fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Path of the loaded file, `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    /// Directory that relative paths in the configuration resolve against.
    pub fn base_dir(&self, fallback: &Path) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model_files, vec!["**/*models.ts"]);
        assert!(config.ignores.is_empty());
        assert!(config.exported_only);
        assert!(!config.short_scalar_properties);
        assert_eq!(config.output, "__generated__/schemas.ts");
        assert_eq!(config.format, OutputFormat::Typescript);
        assert_eq!(config.tags.primary_key, "realm_primary_key");
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "modelFiles": ["src/**/*.model.ts"],
              "ignores": ["**/legacy/**"],
              "tags": { "model": "entity", "index": "indexed" },
              "shortScalarProperties": true,
              "format": "json"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.model_files, vec!["src/**/*.model.ts"]);
        assert_eq!(config.ignores, vec!["**/legacy/**"]);
        assert_eq!(config.tags.model, "entity");
        assert_eq!(config.tags.index, "indexed");
        assert_eq!(config.tags.date, "realm_date");
        assert!(config.short_scalar_properties);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{ "exportedOnly": false }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(!config.exported_only);
        assert_eq!(config.model_files, default_model_files());
        assert_eq!(config.tags, Tags::default());
        assert_eq!(config.tsconfig, None);
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("models");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, r#"{ "output": "gen/realm.ts" }"#).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert_eq!(result.path, Some(config_path));
        assert_eq!(result.config.output, "gen/realm.ts");
        assert_eq!(result.base_dir(Path::new("/elsewhere")), dir.path());
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.path.is_none());
        assert_eq!(result.base_dir(Path::new("/fallback")), Path::new("/fallback"));
    }

    #[test]
    fn test_validate_invalid_model_files_pattern() {
        let config = Config {
            model_files: vec!["src/[invalid".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("modelFiles"));
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_empty_tag() {
        let config = Config {
            tags: Tags {
                index: " ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tags.index"));
    }

    #[test]
    fn test_validate_duplicate_tag() {
        let config = Config {
            tags: Tags {
                date: "realm".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_json_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = load_config(dir.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"modelFiles\""));
        assert!(json.contains("\"shortScalarProperties\""));
        assert!(!json.contains("tsconfig"));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
