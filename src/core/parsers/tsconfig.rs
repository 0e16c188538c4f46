//! Build configuration loader.
//!
//! Reads the subset of a `tsconfig.json` that affects how the source graph is
//! assembled: extra root `files`, `compilerOptions.baseUrl` and
//! `compilerOptions.paths`. The file is JSON with comments and trailing commas,
//! so it is read with `jsonc-parser` into a serde_json value first.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonc_parser::ParseOptions;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuildConfig {
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    #[serde(default)]
    files: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    #[serde(default)]
    paths: BTreeMap<String, Vec<String>>,
}

/// Module resolution settings, with every path made absolute against the
/// directory holding the configuration file.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Additional root files listed under `files`.
    pub files: Vec<PathBuf>,
    /// Base directory for non-relative module specifiers.
    pub base_url: Option<PathBuf>,
    /// `paths` aliases: pattern → substitutions.
    pub paths: Vec<(String, Vec<String>)>,
    /// Directory `paths` substitutions are relative to.
    pub paths_base: PathBuf,
}

impl BuildConfig {
    /// Candidate locations for a non-relative module specifier.
    ///
    /// `paths` entries are tried first (exact match, then single `*` wildcard),
    /// then `baseUrl`. The returned paths still lack an extension.
    pub fn candidates(&self, specifier: &str) -> Vec<PathBuf> {
        let mut result = Vec::new();

        for (pattern, substitutions) in &self.paths {
            let captured = match pattern.split_once('*') {
                None if pattern == specifier => Some(""),
                None => None,
                Some((prefix, suffix)) => specifier
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_suffix(suffix)),
            };
            if let Some(captured) = captured {
                let base = self.base_url.as_deref().unwrap_or(&self.paths_base);
                result.extend(
                    substitutions
                        .iter()
                        .map(|sub| base.join(sub.replacen('*', captured, 1))),
                );
            }
        }

        if let Some(base_url) = &self.base_url {
            result.push(base_url.join(specifier));
        }

        result
    }
}

/// Load the build configuration at `path`.
///
/// # Errors
///
/// Missing, unreadable and unparseable configuration files are all fatal.
pub fn load_build_config(path: &Path) -> Result<BuildConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read build configuration: {}", path.display()))?;
    let raw = parse_build_config(&content)
        .with_context(|| format!("Failed to parse build configuration: {}", path.display()))?;

    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(BuildConfig {
        files: raw.files.iter().map(|f| dir.join(f)).collect(),
        base_url: raw.compiler_options.base_url.map(|b| dir.join(b)),
        paths: raw.compiler_options.paths.into_iter().collect(),
        paths_base: dir,
    })
}

fn parse_build_config(content: &str) -> Result<RawBuildConfig> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|err| anyhow!("{err}"))?;
    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(RawBuildConfig::default()),
    }
}
