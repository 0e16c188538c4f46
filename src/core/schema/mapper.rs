//! Field type classification.
//!
//! Every declared field type is classified into a closed set of outcomes
//! (`TypeClass`); the field mapper turns the outcome into a property
//! descriptor or a skip diagnostic. Classification may resolve further models
//! (nested interfaces, compound unions) into the registry before returning a
//! reference to them.
//!
//! `null` and `undefined` are stripped from unions and make the field
//! optional. Type aliases are followed to what they name.

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Expr, Lit, TsEntityName, TsEnumDecl, TsKeywordTypeKind, TsLit, TsPropertySignature, TsType,
    TsTypeOperatorOp, TsTypeRef, TsUnionOrIntersectionType,
};

use super::{
    ElementType, PropertyDescriptor, PropertyKind, ScalarKind, SkipReason, TypeClass,
    resolver::{FieldEntry, KeyCandidacy, Origin, ResolveState, SchemaResolver},
};
use crate::{
    core::program::{AliasRef, ConstValue, DocTags, InterfaceRef, ScopeId, UnitId},
    diagnostics::DiagnosticKind,
};

/// Alias chains deeper than this are not followed by the lookahead helpers.
const MAX_ALIAS_DEPTH: usize = 32;

/// Where a type is written: the scope its names resolve in and the unit
/// holding its text.
#[derive(Debug, Clone, Copy)]
pub(super) struct TypeSite {
    pub scope: ScopeId,
    pub unit: UnitId,
}

impl From<AliasRef<'_>> for TypeSite {
    fn from(alias: AliasRef<'_>) -> Self {
        Self {
            scope: alias.scope,
            unit: alias.unit,
        }
    }
}

/// A classified type and whether `null`/`undefined` was stripped from it.
#[derive(Debug)]
struct Classified {
    class: TypeClass,
    nullable: bool,
}

impl From<TypeClass> for Classified {
    fn from(class: TypeClass) -> Self {
        Self {
            class,
            nullable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    String,
    Number,
    Bool,
}

impl LiteralKind {
    fn scalar(self) -> ScalarKind {
        match self {
            LiteralKind::String => ScalarKind::String,
            LiteralKind::Number => ScalarKind::Int,
            LiteralKind::Bool => ScalarKind::Bool,
        }
    }

    fn of_value(value: &ConstValue) -> Self {
        match value {
            ConstValue::String(_) => LiteralKind::String,
            ConstValue::Number(_) => LiteralKind::Number,
        }
    }

    fn of_lit(lit: &TsLit) -> Option<Self> {
        match lit {
            TsLit::Str(_) => Some(LiteralKind::String),
            TsLit::Tpl(tpl) if tpl.types.is_empty() => Some(LiteralKind::String),
            TsLit::Number(_) => Some(LiteralKind::Number),
            TsLit::Bool(_) => Some(LiteralKind::Bool),
            _ => None,
        }
    }
}

impl<'r, 'a> SchemaResolver<'r, 'a> {
    /// Map one property signature of `owner` to a field entry.
    ///
    /// Returns `None` for signatures that are not fields (computed or
    /// numeric keys, no type annotation) and for skipped fields, which are
    /// reported.
    pub(super) fn map_field(
        &self,
        owner: InterfaceRef<'a>,
        signature: &'a TsPropertySignature,
        schema: &str,
        force_optional: bool,
        state: &mut ResolveState,
    ) -> Option<(String, FieldEntry)> {
        let name = property_name(signature)?;
        let ty: &'a TsType = &signature.type_ann.as_ref()?.type_ann;
        let site = TypeSite {
            scope: owner.scope,
            unit: owner.unit,
        };
        let tags = self.checker.doc_tags(owner.unit, signature.span.lo);
        let location = self.checker.location(owner.unit, signature.span.lo);

        let classified = match self.scalar_override(&tags) {
            Some(kind) => self.override_shape(ty, site, kind),
            None => self.classify(ty, site, state),
        };
        let optional = force_optional || signature.optional || classified.nullable;

        let kind = match property_kind(classified.class, || self.type_text(ty, site)) {
            Ok(kind) => kind,
            Err(reason) => {
                state.report(
                    location,
                    DiagnosticKind::SkippedField {
                        schema: schema.to_string(),
                        field: name,
                        reason,
                    },
                );
                return None;
            }
        };
        let descriptor = PropertyDescriptor::new(kind, optional);

        let key_tagged = tags.has(&self.tags.primary_key);
        let key = if descriptor.is_list() {
            if key_tagged {
                state.report(
                    location,
                    DiagnosticKind::PrimaryKeyOnList {
                        schema: schema.to_string(),
                        field: name.clone(),
                    },
                );
            }
            KeyCandidacy::None
        } else if key_tagged {
            KeyCandidacy::Tagged
        } else if !optional && name.to_lowercase().ends_with("id") {
            KeyCandidacy::Convention
        } else {
            KeyCandidacy::None
        };

        Some((
            name,
            FieldEntry {
                descriptor,
                index_tagged: tags.has(&self.tags.index),
                key,
            },
        ))
    }

    /// Scalar kinds `number` cannot express are chosen by tag.
    fn scalar_override(&self, tags: &DocTags) -> Option<ScalarKind> {
        if tags.has(&self.tags.date) {
            Some(ScalarKind::Date)
        } else if tags.has(&self.tags.float) {
            Some(ScalarKind::Float)
        } else if tags.has(&self.tags.double) {
            Some(ScalarKind::Double)
        } else {
            None
        }
    }

    /// Apply a tag override, keeping the declared type's list shape and
    /// nullability.
    fn override_shape(&self, ty: &'a TsType, site: TypeSite, kind: ScalarKind) -> Classified {
        let mut members = Vec::new();
        let mut nullable = false;
        union_members(ty, &mut members, &mut nullable);

        let is_list = matches!(
            members.as_slice(),
            [single] if self.array_element(*single, site, 0).is_some()
        );
        let class = if is_list {
            TypeClass::ListOf(Box::new(TypeClass::Scalar(kind)))
        } else {
            TypeClass::Scalar(kind)
        };
        Classified { class, nullable }
    }

    fn classify(&self, ty: &'a TsType, site: TypeSite, state: &mut ResolveState) -> Classified {
        match ty {
            TsType::TsKeywordType(keyword) => match keyword.kind {
                TsKeywordTypeKind::TsStringKeyword => TypeClass::Scalar(ScalarKind::String).into(),
                TsKeywordTypeKind::TsNumberKeyword => TypeClass::Scalar(ScalarKind::Int).into(),
                TsKeywordTypeKind::TsBooleanKeyword => TypeClass::Scalar(ScalarKind::Bool).into(),
                TsKeywordTypeKind::TsNullKeyword | TsKeywordTypeKind::TsUndefinedKeyword => {
                    Classified {
                        class: self.unsupported(ty, site),
                        nullable: true,
                    }
                }
                _ => self.unsupported(ty, site).into(),
            },
            TsType::TsParenthesizedType(paren) => self.classify(&paren.type_ann, site, state),
            TsType::TsTypeOperator(op) if op.op == TsTypeOperatorOp::ReadOnly => {
                self.classify(&op.type_ann, site, state)
            }
            TsType::TsArrayType(array) => list_of(self.classify(&array.elem_type, site, state)),
            TsType::TsLitType(lit) => match LiteralKind::of_lit(&lit.lit) {
                Some(kind) => TypeClass::Scalar(kind.scalar()).into(),
                None => self.unsupported(ty, site).into(),
            },
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(_)) => {
                TypeClass::Unsupported(SkipReason::Intersection {
                    type_text: self.type_text(ty, site),
                })
                .into()
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(_)) => {
                self.classify_union(ty, None, site, state)
            }
            TsType::TsTypeRef(reference) => self.classify_reference(reference, site, state),
            _ => self.unsupported(ty, site).into(),
        }
    }

    fn classify_reference(
        &self,
        reference: &'a TsTypeRef,
        site: TypeSite,
        state: &mut ResolveState,
    ) -> Classified {
        if let TsEntityName::Ident(ident) = &reference.type_name
            && ident.sym.as_str() == "Date"
        {
            return TypeClass::Scalar(ScalarKind::Date).into();
        }
        if let Some(element) = builtin_array_element(reference) {
            return list_of(self.classify(element, site, state));
        }

        let type_text = self.checker.type_text(site.unit, reference.span);
        let Some(symbol) = self.checker.resolve_entity(site.scope, &reference.type_name) else {
            return TypeClass::Unsupported(SkipReason::UnresolvedType { type_text }).into();
        };

        if let Some(iface) = symbol.interface() {
            return TypeClass::Reference(self.resolve_interface(iface, state)).into();
        }
        if let Some(decl) = symbol.enum_decl() {
            return classify_enum(decl, self.checker.enum_values(decl)).into();
        }
        if let Some((decl, index)) = symbol.enum_member() {
            let class = match self.checker.enum_member_value(decl, index) {
                Some(value) => TypeClass::Scalar(LiteralKind::of_value(&value).scalar()),
                None => TypeClass::Unsupported(SkipReason::NonConstantEnumMember {
                    member: symbol.name.clone(),
                }),
            };
            return class.into();
        }
        if let Some(alias) = symbol.type_alias() {
            return self.classify_alias(alias, state);
        }

        TypeClass::Unsupported(SkipReason::UnsupportedType {
            type_text,
            kinds: symbol.describe_kinds(),
        })
        .into()
    }

    fn classify_alias(&self, alias: AliasRef<'a>, state: &mut ResolveState) -> Classified {
        let name = alias.name();
        let origin = Origin::new(alias.unit, alias.decl.span.lo);

        // The compound schema of this alias exists or is being built.
        if state.is_claimed_by(&name, origin) {
            return TypeClass::Reference(name).into();
        }
        if !state.aliases_in_progress.insert(origin) {
            return TypeClass::Unsupported(SkipReason::CircularAlias { name }).into();
        }

        let target: &'a TsType = &alias.decl.type_ann;
        let classified = match strip_parens(target) {
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(_)) => {
                self.classify_union(target, Some(alias), alias.into(), state)
            }
            _ => self.classify(target, alias.into(), state),
        };

        state.aliases_in_progress.remove(&origin);
        classified
    }

    /// Classify a union type. `alias` names the union when it is the whole
    /// right-hand side of a type alias.
    fn classify_union(
        &self,
        union: &'a TsType,
        alias: Option<AliasRef<'a>>,
        site: TypeSite,
        state: &mut ResolveState,
    ) -> Classified {
        let mut members = Vec::new();
        let mut nullable = false;
        union_members(union, &mut members, &mut nullable);

        let class = match members.as_slice() {
            [] => self.unsupported(union, site),
            [single] => {
                let classified = self.classify(*single, site, state);
                nullable |= classified.nullable;
                classified.class
            }
            _ => self.classify_alternatives(&members, union.span(), alias, site, state),
        };

        Classified { class, nullable }
    }

    /// A union of two or more alternatives: all literals of one kind, or all
    /// interfaces (a compound schema when the union is aliased).
    fn classify_alternatives(
        &self,
        members: &[&'a TsType],
        span: Span,
        alias: Option<AliasRef<'a>>,
        site: TypeSite,
        state: &mut ResolveState,
    ) -> TypeClass {
        let type_text = self.checker.type_text(site.unit, span);

        let mut kinds = Vec::new();
        if members
            .iter()
            .all(|member| self.literal_kinds(*member, site, &mut kinds, 0))
        {
            return match kinds.split_first() {
                Some((first, rest)) if rest.iter().all(|kind| kind == first) => {
                    TypeClass::Scalar(first.scalar())
                }
                Some(_) => TypeClass::Unsupported(SkipReason::MixedLiteralUnion { type_text }),
                None => TypeClass::Unsupported(SkipReason::UnsupportedType {
                    type_text,
                    kinds: String::new(),
                }),
            };
        }

        let mut interfaces = Vec::new();
        if members
            .iter()
            .all(|member| self.union_interfaces(*member, site, &mut interfaces, 0))
        {
            return match alias {
                Some(alias) => TypeClass::Reference(self.flatten_union(alias, &interfaces, state)),
                None => TypeClass::Unsupported(SkipReason::AnonymousInterfaceUnion { type_text }),
            };
        }

        TypeClass::Unsupported(SkipReason::HeterogeneousUnion { type_text })
    }

    /// Collect the literal kinds `ty` stands for. Returns `false` when `ty`
    /// is not made of literals only. Resolves nothing into the registry.
    fn literal_kinds(
        &self,
        ty: &'a TsType,
        site: TypeSite,
        kinds: &mut Vec<LiteralKind>,
        depth: usize,
    ) -> bool {
        match strip_parens(ty) {
            TsType::TsLitType(lit) => match LiteralKind::of_lit(&lit.lit) {
                Some(kind) => {
                    kinds.push(kind);
                    true
                }
                None => false,
            },
            TsType::TsKeywordType(keyword) => match keyword.kind {
                // `boolean` is `true | false`
                TsKeywordTypeKind::TsBooleanKeyword => {
                    kinds.push(LiteralKind::Bool);
                    true
                }
                TsKeywordTypeKind::TsNullKeyword | TsKeywordTypeKind::TsUndefinedKeyword => true,
                _ => false,
            },
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                union
                    .types
                    .iter()
                    .all(|member| self.literal_kinds(member, site, kinds, depth))
            }
            TsType::TsTypeRef(reference) if depth < MAX_ALIAS_DEPTH => {
                let Some(symbol) = self.checker.resolve_entity(site.scope, &reference.type_name)
                else {
                    return false;
                };
                if symbol.interface().is_some() {
                    return false;
                }
                if let Some(decl) = symbol.enum_decl() {
                    let values = self.checker.enum_values(decl);
                    return values.iter().all(|value| match value {
                        Some(value) => {
                            kinds.push(LiteralKind::of_value(value));
                            true
                        }
                        None => false,
                    });
                }
                if let Some((decl, index)) = symbol.enum_member() {
                    return match self.checker.enum_member_value(decl, index) {
                        Some(value) => {
                            kinds.push(LiteralKind::of_value(&value));
                            true
                        }
                        None => false,
                    };
                }
                match symbol.type_alias() {
                    Some(alias) => {
                        self.literal_kinds(&alias.decl.type_ann, alias.into(), kinds, depth + 1)
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Collect the interfaces `ty` stands for, expanding aliased unions.
    /// Returns `false` when some alternative is not an interface. Resolves
    /// nothing into the registry.
    fn union_interfaces(
        &self,
        ty: &'a TsType,
        site: TypeSite,
        interfaces: &mut Vec<InterfaceRef<'a>>,
        depth: usize,
    ) -> bool {
        match strip_parens(ty) {
            TsType::TsTypeRef(reference) if depth < MAX_ALIAS_DEPTH => {
                let Some(symbol) = self.checker.resolve_entity(site.scope, &reference.type_name)
                else {
                    return false;
                };
                if let Some(iface) = symbol.interface() {
                    interfaces.push(iface);
                    return true;
                }
                match symbol.type_alias() {
                    Some(alias) => self.union_interfaces(
                        &alias.decl.type_ann,
                        alias.into(),
                        interfaces,
                        depth + 1,
                    ),
                    None => false,
                }
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                union.types.iter().all(|member| {
                    is_nullish(member) || self.union_interfaces(member, site, interfaces, depth)
                })
            }
            _ => false,
        }
    }

    /// Element type of an array type, following aliases. Resolves nothing
    /// into the registry.
    fn array_element(&self, ty: &'a TsType, site: TypeSite, depth: usize) -> Option<&'a TsType> {
        match strip_parens(ty) {
            TsType::TsArrayType(array) => Some(&*array.elem_type),
            TsType::TsTypeOperator(op) if op.op == TsTypeOperatorOp::ReadOnly => {
                self.array_element(&op.type_ann, site, depth)
            }
            TsType::TsTypeRef(reference) => {
                if let Some(element) = builtin_array_element(reference) {
                    return Some(element);
                }
                if depth >= MAX_ALIAS_DEPTH {
                    return None;
                }
                let symbol = self.checker.resolve_entity(site.scope, &reference.type_name)?;
                if symbol.interface().is_some() {
                    return None;
                }
                let alias = symbol.type_alias()?;
                self.array_element(&alias.decl.type_ann, alias.into(), depth + 1)
            }
            _ => None,
        }
    }

    fn type_text(&self, ty: &TsType, site: TypeSite) -> String {
        self.checker.type_text(site.unit, ty.span())
    }

    fn unsupported(&self, ty: &TsType, site: TypeSite) -> TypeClass {
        TypeClass::Unsupported(SkipReason::UnsupportedType {
            type_text: self.type_text(ty, site),
            kinds: String::new(),
        })
    }
}

fn classify_enum(decl: &TsEnumDecl, values: Vec<Option<ConstValue>>) -> TypeClass {
    let enum_name = decl.id.sym.to_string();
    let kinds: Vec<Option<LiteralKind>> = values
        .iter()
        .map(|value| value.as_ref().map(LiteralKind::of_value))
        .collect();

    // The first member decides; every other member must agree.
    let Some(Some(first)) = kinds.first().copied() else {
        return TypeClass::Unsupported(SkipReason::NonConstantEnum { enum_name });
    };
    if kinds.iter().any(|kind| *kind != Some(first)) {
        return TypeClass::Unsupported(SkipReason::MixedEnumValues { enum_name });
    }
    TypeClass::Scalar(first.scalar())
}

fn property_kind(
    class: TypeClass,
    type_text: impl FnOnce() -> String,
) -> Result<PropertyKind, SkipReason> {
    match class {
        TypeClass::Scalar(kind) => Ok(PropertyKind::Scalar(kind)),
        TypeClass::Reference(name) => Ok(PropertyKind::Object(name)),
        TypeClass::ListOf(element) => match *element {
            TypeClass::Scalar(kind) => Ok(PropertyKind::List(ElementType::Scalar(kind))),
            TypeClass::Reference(name) => Ok(PropertyKind::List(ElementType::Object(name))),
            TypeClass::ListOf(_) => Err(SkipReason::NestedList {
                type_text: type_text(),
            }),
            TypeClass::Unsupported(reason) => Err(reason),
        },
        TypeClass::Unsupported(reason) => Err(reason),
    }
}

fn list_of(element: Classified) -> Classified {
    TypeClass::ListOf(Box::new(element.class)).into()
}

/// Field name of a property signature: identifiers and string literal keys.
fn property_name(signature: &TsPropertySignature) -> Option<String> {
    if signature.computed {
        return None;
    }
    match &*signature.key {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(str::to_string),
        _ => None,
    }
}

/// `Array<T>` / `ReadonlyArray<T>`
fn builtin_array_element(reference: &TsTypeRef) -> Option<&TsType> {
    let TsEntityName::Ident(ident) = &reference.type_name else {
        return None;
    };
    if !matches!(ident.sym.as_str(), "Array" | "ReadonlyArray") {
        return None;
    }
    match reference.type_params.as_deref()?.params.as_slice() {
        [element] => Some(&**element),
        _ => None,
    }
}

fn strip_parens(mut ty: &TsType) -> &TsType {
    while let TsType::TsParenthesizedType(paren) = ty {
        ty = &paren.type_ann;
    }
    ty
}

fn is_nullish(ty: &TsType) -> bool {
    matches!(
        strip_parens(ty),
        TsType::TsKeywordType(keyword) if matches!(
            keyword.kind,
            TsKeywordTypeKind::TsNullKeyword | TsKeywordTypeKind::TsUndefinedKeyword
        )
    )
}

/// Flatten (possibly nested) union alternatives into `members`, dropping
/// `null`/`undefined` and recording whether any was present.
fn union_members<'t>(ty: &'t TsType, members: &mut Vec<&'t TsType>, nullable: &mut bool) {
    let ty = strip_parens(ty);
    match ty {
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
            for member in &union.types {
                union_members(member, members, nullable);
            }
        }
        _ if is_nullish(ty) => *nullable = true,
        _ => members.push(ty),
    }
}
