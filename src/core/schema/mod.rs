//! Interface → persistence schema resolution.
//!
//! ## Module Structure
//!
//! - `types`: schema, property and classification types
//! - `registry`: the ordered, write-once schema registry
//! - `resolver`: interface resolution, heritage and primary key selection
//! - `mapper`: field type classification
//! - `union`: compound schemas for aliased interface unions

mod mapper;
mod registry;
mod resolver;
mod types;
mod union;

pub use registry::SchemaRegistry;
pub use resolver::{ResolveState, SchemaResolver};
pub use types::*;
