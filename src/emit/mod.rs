//! Artifact emission.
//!
//! - `typescript`: a TypeScript module exporting one `ObjectSchema` per schema
//! - `json`: the same schemas as a JSON document

pub mod json;
pub mod typescript;

use anyhow::{Context, Result};

use crate::{config::OutputFormat, core::schema::SchemaRegistry};

/// Render `registry` in `format`. The output only depends on the registry,
/// so equal registries render byte-identical artifacts.
pub fn render(registry: &SchemaRegistry, format: OutputFormat, short_scalars: bool) -> Result<String> {
    match format {
        OutputFormat::Typescript => {
            typescript::render(registry, short_scalars).context("Failed to render schemas")
        }
        OutputFormat::Json => json::render(registry).context("Failed to serialize schemas"),
    }
}
