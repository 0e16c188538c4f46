//! Interface → schema resolution.
//!
//! `SchemaResolver` holds the read-only collaborators (the checker and the
//! configured tag names); `ResolveState` is the mutable accumulator of one
//! generation run and is passed explicitly to every resolution call.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use swc_common::BytePos;
use swc_ecma_ast::TsTypeElement;

use super::{PropertyDescriptor, SchemaDefinition, SchemaRegistry};
use crate::{
    config::Tags,
    core::program::{Checker, InterfaceRef, SourceLocation, UnitId},
    diagnostics::{Diagnostic, DiagnosticKind},
};

/// Identity of a declaration: its unit and start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct Origin {
    unit: UnitId,
    pos: BytePos,
}

impl Origin {
    pub(super) fn new(unit: UnitId, pos: BytePos) -> Self {
        Self { unit, pos }
    }
}

/// Mutable state of one generation run.
#[derive(Debug, Default)]
pub struct ResolveState {
    pub registry: SchemaRegistry,
    pub diagnostics: Vec<Diagnostic>,
    /// Declaration each schema name was claimed by. A name is claimed before
    /// its fields are resolved, so a model reached again while still in
    /// progress (a self-reference, a cycle) links by name instead of
    /// recursing.
    claims: HashMap<String, Origin>,
    reported_duplicates: HashSet<Origin>,
    pub(super) aliases_in_progress: HashSet<Origin>,
}

impl ResolveState {
    /// Claim `name` for the declaration at `origin`.
    ///
    /// Returns `false` when the name is already claimed, in which case the
    /// caller links to the existing schema. A claim by a different
    /// declaration is reported once.
    pub(super) fn claim(&mut self, name: &str, origin: Origin, checker: &Checker) -> bool {
        match self.claims.get(name) {
            None => {
                self.claims.insert(name.to_string(), origin);
                true
            }
            Some(first) if *first == origin => false,
            Some(first) => {
                let first = *first;
                if self.reported_duplicates.insert(origin) {
                    self.report(
                        checker.location(origin.unit, origin.pos),
                        DiagnosticKind::DuplicateSchema {
                            name: name.to_string(),
                            first: checker.location(first.unit, first.pos),
                        },
                    );
                }
                false
            }
        }
    }

    pub(super) fn is_claimed_by(&self, name: &str, origin: Origin) -> bool {
        self.claims.get(name) == Some(&origin)
    }

    pub(super) fn finish(&mut self, schema: SchemaDefinition) {
        self.registry.register(schema);
    }

    pub(super) fn report(&mut self, location: SourceLocation, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(location, kind));
    }
}

/// How a field qualifies as primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeyCandidacy {
    None,
    /// Required field whose name ends with `id` (any case).
    Convention,
    /// Field carrying the primary key tag.
    Tagged,
}

#[derive(Debug, Clone)]
pub(super) struct FieldEntry {
    pub descriptor: PropertyDescriptor,
    pub index_tagged: bool,
    pub key: KeyCandidacy,
}

/// Working field mapping of one schema.
///
/// Writing a name that already exists replaces its entry in place, so
/// inherited fields keep their position and a redeclaration wins. Key
/// candidacy lives on the entries, so an overridden field is never counted
/// twice.
#[derive(Debug, Default)]
pub(super) struct FieldSet {
    entries: IndexMap<String, FieldEntry>,
}

impl FieldSet {
    pub(super) fn insert(&mut self, name: String, entry: FieldEntry) {
        self.entries.insert(name, entry);
    }

    /// Tagged candidates take precedence over convention candidates; the
    /// schema has a primary key only when exactly one candidate remains.
    fn primary_key(&self) -> Option<String> {
        let of_kind = |kind: KeyCandidacy| -> Vec<&String> {
            self.entries
                .iter()
                .filter(|(_, entry)| entry.key == kind)
                .map(|(name, _)| name)
                .collect()
        };

        let tagged = of_kind(KeyCandidacy::Tagged);
        let candidates = if tagged.is_empty() {
            of_kind(KeyCandidacy::Convention)
        } else {
            tagged
        };

        match candidates.as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }

    pub(super) fn into_schema(self, name: String, source_path: String) -> SchemaDefinition {
        let primary_key = self.primary_key();
        let properties = self
            .entries
            .into_iter()
            .map(|(field, entry)| {
                let mut descriptor = entry.descriptor;
                // Only the elected primary key loses its index flag; candidates
                // that cancel each other out keep theirs.
                descriptor.indexed = entry.index_tagged && primary_key.as_ref() != Some(&field);
                (field, descriptor)
            })
            .collect();

        SchemaDefinition {
            name,
            properties,
            primary_key,
            source_path,
        }
    }
}

pub struct SchemaResolver<'r, 'a> {
    pub(super) checker: &'r Checker<'a>,
    pub(super) tags: &'r Tags,
}

impl<'r, 'a> SchemaResolver<'r, 'a> {
    pub fn new(checker: &'r Checker<'a>, tags: &'r Tags) -> Self {
        Self { checker, tags }
    }

    /// Resolve `iface` and every model it references into `state.registry`.
    ///
    /// Returns the schema name. Resolving a name that is already claimed is
    /// a no-op.
    pub fn resolve_interface(&self, iface: InterfaceRef<'a>, state: &mut ResolveState) -> String {
        let name = iface.name();
        if !state.claim(&name, Origin::new(iface.unit, iface.decl.span.lo), self.checker) {
            return name;
        }

        let mut fields = FieldSet::default();
        self.collect_fields(iface, &name, false, &mut fields, &mut Vec::new(), state);

        let source_path = self.checker.display_path(iface.unit).to_string();
        state.finish(fields.into_schema(name.clone(), source_path));
        name
    }

    /// Write the fields of `iface` into `fields`: inherited fields first (in
    /// heritage order), then its own property signatures.
    ///
    /// `lineage` holds the interfaces on the current heritage path.
    pub(super) fn collect_fields(
        &self,
        iface: InterfaceRef<'a>,
        schema: &str,
        force_optional: bool,
        fields: &mut FieldSet,
        lineage: &mut Vec<Origin>,
        state: &mut ResolveState,
    ) {
        lineage.push(Origin::new(iface.unit, iface.decl.span.lo));

        for base in &iface.decl.extends {
            let base_text = self.checker.type_text(iface.unit, base.span);
            let location = self.checker.location(iface.unit, base.span.lo);

            let Some(base_iface) = self
                .checker
                .resolve_expr(iface.scope, &base.expr)
                .and_then(|symbol| symbol.interface())
            else {
                state.report(
                    location,
                    DiagnosticKind::UnresolvedBase {
                        schema: schema.to_string(),
                        base: base_text,
                    },
                );
                continue;
            };

            if lineage.contains(&Origin::new(base_iface.unit, base_iface.decl.span.lo)) {
                state.report(
                    location,
                    DiagnosticKind::HeritageCycle {
                        schema: schema.to_string(),
                        base: base_text,
                    },
                );
                continue;
            }

            self.collect_fields(base_iface, schema, force_optional, fields, lineage, state);
        }

        for member in &iface.decl.body.body {
            // Methods, call/construct/index signatures and accessors are not fields.
            let TsTypeElement::TsPropertySignature(signature) = member else {
                continue;
            };
            if let Some((name, entry)) =
                self.map_field(iface, signature, schema, force_optional, state)
            {
                fields.insert(name, entry);
            }
        }

        lineage.pop();
    }
}
