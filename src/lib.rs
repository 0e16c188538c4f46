//! realmgen - Realm schema generator for TypeScript models
//!
//! realmgen reads TypeScript model interfaces tagged with `@realm` and
//! generates the matching Realm `ObjectSchema` definitions: property types,
//! primary keys, indexes, relations and compound schemas for interface unions.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `core`: Generation engine (source graph, selection, schema resolution)
//! - `diagnostics`: Skipped field and declaration reports
//! - `emit`: Artifact rendering (TypeScript, JSON)

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod emit;
