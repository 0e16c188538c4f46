//! Parsers for the inputs of a generation run.
//!
//! - `ts`: TypeScript / TSX source parser (uses swc for AST generation)
//! - `tsconfig`: build configuration (`tsconfig.json`) loader

pub mod ts;
pub mod tsconfig;
