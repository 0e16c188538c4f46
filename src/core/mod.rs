//! Core generation engine.
//!
//! A run goes through three steps:
//!
//! 1. **Loading**: `program` parses the source graph reachable from the roots
//!    and binds its declarations for symbol lookup.
//! 2. **Selection**: `select` picks the tagged model interfaces of every
//!    model file.
//! 3. **Resolution**: `schema` resolves each model (and everything it
//!    references) into the schema registry.
//!
//! `context` ties the steps together for the CLI.

pub mod context;
pub mod parsers;
pub mod program;
pub mod schema;
pub mod select;

pub use context::{GenerateContext, Generation};
