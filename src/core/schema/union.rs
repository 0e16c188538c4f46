//! Compound schemas for aliased unions of interfaces.
//!
//! `type Shape = Circle | Square` produces one schema named `Shape` holding
//! the fields of every alternative. A value of the union is only ever one of
//! the alternatives, so every field of the compound schema is optional.

use super::resolver::{FieldSet, Origin, ResolveState, SchemaResolver};
use crate::core::program::{AliasRef, InterfaceRef};

impl<'r, 'a> SchemaResolver<'r, 'a> {
    /// Build the compound schema of `alias` from `members`, in union order.
    ///
    /// A field declared by more than one alternative keeps the position of its
    /// first occurrence and the type of its last. Returns the schema name.
    pub(super) fn flatten_union(
        &self,
        alias: AliasRef<'a>,
        members: &[InterfaceRef<'a>],
        state: &mut ResolveState,
    ) -> String {
        let name = alias.name();
        if !state.claim(&name, Origin::new(alias.unit, alias.decl.span.lo), self.checker) {
            return name;
        }

        let mut fields = FieldSet::default();
        for member in members {
            self.collect_fields(*member, &name, true, &mut fields, &mut Vec::new(), state);
        }

        let source_path = self.checker.display_path(alias.unit).to_string();
        state.finish(fields.into_schema(name.clone(), source_path));
        name
    }
}
