//! Diagnostics recorded while resolving schemas.
//!
//! Nothing here is fatal: every diagnostic describes a field or declaration
//! that was left out of (or changed in) the generated schemas, so the
//! operator can see why.

use std::fmt;

use crate::core::{program::SourceLocation, schema::SkipReason};

/// Rule identifier for each diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    SkippedField,
    PrimaryKeyOnList,
    UnresolvedBase,
    HeritageCycle,
    DuplicateSchema,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::SkippedField => write!(f, "skipped-field"),
            Rule::PrimaryKeyOnList => write!(f, "primary-key-on-list"),
            Rule::UnresolvedBase => write!(f, "unresolved-base"),
            Rule::HeritageCycle => write!(f, "heritage-cycle"),
            Rule::DuplicateSchema => write!(f, "duplicate-schema"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A field was dropped from its schema.
    SkippedField {
        schema: String,
        field: String,
        reason: SkipReason,
    },
    /// The primary key tag sits on a list field and was ignored.
    PrimaryKeyOnList { schema: String, field: String },
    /// A heritage clause does not name an interface.
    UnresolvedBase { schema: String, base: String },
    /// An interface extends itself, directly or indirectly.
    HeritageCycle { schema: String, base: String },
    /// Two different declarations produce a schema of the same name; the
    /// first one reached wins.
    DuplicateSchema { name: String, first: SourceLocation },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(location: SourceLocation, kind: DiagnosticKind) -> Self {
        Self { location, kind }
    }

    pub fn rule(&self) -> Rule {
        match self.kind {
            DiagnosticKind::SkippedField { .. } => Rule::SkippedField,
            DiagnosticKind::PrimaryKeyOnList { .. } => Rule::PrimaryKeyOnList,
            DiagnosticKind::UnresolvedBase { .. } => Rule::UnresolvedBase,
            DiagnosticKind::HeritageCycle { .. } => Rule::HeritageCycle,
            DiagnosticKind::DuplicateSchema { .. } => Rule::DuplicateSchema,
        }
    }

    /// Name of the schema the diagnostic is about.
    pub fn schema(&self) -> &str {
        match &self.kind {
            DiagnosticKind::SkippedField { schema, .. }
            | DiagnosticKind::PrimaryKeyOnList { schema, .. }
            | DiagnosticKind::UnresolvedBase { schema, .. }
            | DiagnosticKind::HeritageCycle { schema, .. } => schema,
            DiagnosticKind::DuplicateSchema { name, .. } => name,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::SkippedField {
                schema,
                field,
                reason,
            } => write!(f, "skipping '{}.{}': {}", schema, field, reason),
            DiagnosticKind::PrimaryKeyOnList { schema, field } => write!(
                f,
                "ignoring primary key tag on list field '{}.{}'",
                schema, field
            ),
            DiagnosticKind::UnresolvedBase { schema, base } => write!(
                f,
                "'{}' extends '{}', which does not resolve to an interface",
                schema, base
            ),
            DiagnosticKind::HeritageCycle { schema, base } => write!(
                f,
                "'{}' extends '{}' in a cycle; inherited fields from it are ignored",
                schema, base
            ),
            DiagnosticKind::DuplicateSchema { name, first } => write!(
                f,
                "schema '{}' is already defined at {}; this declaration is ignored",
                name, first
            ),
        }
    }
}
