//! Symbol resolution over a loaded `Program`.
//!
//! The checker binds every declaration of every unit into lexical scopes
//! (one per unit, one per namespace body) and answers "what does this name
//! refer to, seen from here?" the way the TypeScript checker would for the
//! declaration kinds the schema resolver cares about: interfaces, enums and
//! their members, type aliases and namespaces.
//!
//! Lookup order for the first segment of a name: the scope chain (innermost
//! namespace outwards, imports on the way), then the ambient global scope
//! (script units and `declare global` blocks). Further segments descend into
//! namespaces, `import * as` module namespaces and enum members.

use std::collections::{HashMap, HashSet};

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    Decl, DefaultDecl, ExportSpecifier, Expr, ImportSpecifier, MemberProp, ModuleDecl,
    ModuleExportName, ModuleItem, Stmt, TsEntityName, TsEnumDecl, TsInterfaceDecl, TsModuleDecl,
    TsModuleName, TsNamespaceBody, TsTypeAliasDecl,
};

use super::{
    DocTags, Program, SourceLocation, UnitId,
    enums::{ConstValue, evaluate_enum, member_name},
};

/// Index of a scope inside its `Checker`.
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy)]
pub enum DeclKind<'a> {
    Interface(&'a TsInterfaceDecl),
    Enum(&'a TsEnumDecl),
    /// A single member of an enum, by index (`Color.Red` used as a type).
    EnumMember(&'a TsEnumDecl, usize),
    TypeAlias(&'a TsTypeAliasDecl),
    /// A namespace body and the scope its members are bound in.
    Namespace(ScopeId),
    /// `import * as M from './m'`
    ModuleNamespace(UnitId),
}

impl DeclKind<'_> {
    /// Short kind name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Interface(_) => "interface",
            DeclKind::Enum(_) => "enum",
            DeclKind::EnumMember(..) => "enum member",
            DeclKind::TypeAlias(_) => "type alias",
            DeclKind::Namespace(_) => "namespace",
            DeclKind::ModuleNamespace(_) => "module namespace",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub kind: DeclKind<'a>,
    pub unit: UnitId,
    /// Scope that names used inside the declaration resolve in.
    pub scope: ScopeId,
    pub exported: bool,
    /// Position of the first token of the declaration, where its doc comment
    /// is attached (the `export` keyword when there is one).
    pub doc_pos: BytePos,
}

impl<'a> Declaration<'a> {
    pub fn as_interface(&self) -> Option<InterfaceRef<'a>> {
        match self.kind {
            DeclKind::Interface(decl) => Some(InterfaceRef {
                decl,
                unit: self.unit,
                scope: self.scope,
                doc_pos: self.doc_pos,
            }),
            _ => None,
        }
    }
}

/// An interface declaration and where it lives.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceRef<'a> {
    pub decl: &'a TsInterfaceDecl,
    pub unit: UnitId,
    pub scope: ScopeId,
    pub doc_pos: BytePos,
}

impl InterfaceRef<'_> {
    pub fn name(&self) -> String {
        self.decl.id.sym.to_string()
    }
}

/// A type alias declaration and where it lives.
#[derive(Debug, Clone, Copy)]
pub struct AliasRef<'a> {
    pub decl: &'a TsTypeAliasDecl,
    pub unit: UnitId,
    pub scope: ScopeId,
}

impl AliasRef<'_> {
    pub fn name(&self) -> String {
        self.decl.id.sym.to_string()
    }
}

/// Result of resolving a name: every declaration merged under it.
#[derive(Debug, Clone)]
pub struct Symbol<'a> {
    pub name: String,
    pub declarations: Vec<Declaration<'a>>,
}

impl<'a> Symbol<'a> {
    pub fn interface(&self) -> Option<InterfaceRef<'a>> {
        self.declarations.iter().find_map(Declaration::as_interface)
    }

    pub fn enum_decl(&self) -> Option<&'a TsEnumDecl> {
        self.declarations.iter().find_map(|d| match d.kind {
            DeclKind::Enum(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn enum_member(&self) -> Option<(&'a TsEnumDecl, usize)> {
        self.declarations.iter().find_map(|d| match d.kind {
            DeclKind::EnumMember(decl, index) => Some((decl, index)),
            _ => None,
        })
    }

    pub fn type_alias(&self) -> Option<AliasRef<'a>> {
        self.declarations.iter().find_map(|d| match d.kind {
            DeclKind::TypeAlias(decl) => Some(AliasRef {
                decl,
                unit: d.unit,
                scope: d.scope,
            }),
            _ => None,
        })
    }

    /// Comma-separated declaration kinds, e.g. `"namespace, enum"`.
    pub fn describe_kinds(&self) -> String {
        self.declarations
            .iter()
            .map(|d| d.kind.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone)]
enum ImportBinding {
    Named { unit: UnitId, name: String },
    Namespace(UnitId),
}

#[derive(Debug, Clone)]
enum ExportBinding {
    Local(String),
    From { unit: UnitId, name: String },
    Namespace(UnitId),
}

struct Scope<'a> {
    unit: UnitId,
    parent: Option<ScopeId>,
    entries: HashMap<String, Vec<Declaration<'a>>>,
    imports: HashMap<String, ImportBinding>,
    exports: HashMap<String, ExportBinding>,
    star_exports: Vec<UnitId>,
}

pub struct Checker<'a> {
    program: &'a Program,
    scopes: Vec<Scope<'a>>,
    unit_scopes: Vec<ScopeId>,
    globals: Vec<ScopeId>,
}

impl<'a> Checker<'a> {
    pub fn new(program: &'a Program) -> Self {
        let mut checker = Checker {
            program,
            scopes: Vec::new(),
            unit_scopes: Vec::new(),
            globals: Vec::new(),
        };

        for (unit_id, unit) in program.units().iter().enumerate() {
            let scope = checker.new_scope(unit_id, None);
            checker.unit_scopes.push(scope);
            let is_script = unit.is_script();
            if is_script {
                checker.globals.push(scope);
            }
            checker.bind_items(unit_id, scope, &unit.parsed.module.body, is_script);
        }

        checker
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn unit_scope(&self, unit: UnitId) -> ScopeId {
        self.unit_scopes[unit]
    }

    // ============================================================
    // Binding
    // ============================================================

    fn new_scope(&mut self, unit: UnitId, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            unit,
            parent,
            entries: HashMap::new(),
            imports: HashMap::new(),
            exports: HashMap::new(),
            star_exports: Vec::new(),
        });
        self.scopes.len() - 1
    }

    fn add(&mut self, scope: ScopeId, name: String, decl: Declaration<'a>) {
        self.scopes[scope].entries.entry(name).or_default().push(decl);
    }

    fn bind_items(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        items: &'a [ModuleItem],
        exported_by_default: bool,
    ) {
        for item in items {
            match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => {
                    self.bind_decl(unit, scope, decl, exported_by_default, decl.span().lo);
                }
                ModuleItem::Stmt(_) => {}
                ModuleItem::ModuleDecl(module_decl) => {
                    self.bind_module_decl(unit, scope, module_decl);
                }
            }
        }
    }

    fn bind_module_decl(&mut self, unit: UnitId, scope: ScopeId, module_decl: &'a ModuleDecl) {
        match module_decl {
            ModuleDecl::ExportDecl(export) => {
                self.bind_decl(unit, scope, &export.decl, true, export.span.lo);
            }
            ModuleDecl::ExportDefaultDecl(export) => {
                if let DefaultDecl::TsInterfaceDecl(iface) = &export.decl {
                    let name = iface.id.sym.to_string();
                    let decl = Declaration {
                        kind: DeclKind::Interface(iface),
                        unit,
                        scope,
                        exported: true,
                        doc_pos: export.span.lo,
                    };
                    self.add(scope, name.clone(), decl);
                    self.scopes[scope]
                        .exports
                        .insert("default".to_string(), ExportBinding::Local(name));
                }
            }
            ModuleDecl::ExportDefaultExpr(export) => {
                if let Expr::Ident(ident) = &*export.expr {
                    self.scopes[scope].exports.insert(
                        "default".to_string(),
                        ExportBinding::Local(ident.sym.to_string()),
                    );
                }
            }
            ModuleDecl::Import(import) => {
                let Some(target) = import
                    .src
                    .value
                    .as_str()
                    .and_then(|src| self.program.linked_unit(unit, src))
                else {
                    return;
                };
                for specifier in &import.specifiers {
                    let (local, binding) = match specifier {
                        ImportSpecifier::Named(named) => {
                            let imported = named
                                .imported
                                .as_ref()
                                .and_then(export_name)
                                .unwrap_or_else(|| named.local.sym.to_string());
                            (
                                named.local.sym.to_string(),
                                ImportBinding::Named {
                                    unit: target,
                                    name: imported,
                                },
                            )
                        }
                        ImportSpecifier::Default(default) => (
                            default.local.sym.to_string(),
                            ImportBinding::Named {
                                unit: target,
                                name: "default".to_string(),
                            },
                        ),
                        ImportSpecifier::Namespace(ns) => {
                            (ns.local.sym.to_string(), ImportBinding::Namespace(target))
                        }
                    };
                    self.scopes[scope].imports.insert(local, binding);
                }
            }
            ModuleDecl::ExportNamed(named) => {
                let source = named
                    .src
                    .as_ref()
                    .and_then(|src| src.value.as_str())
                    .map(|src| self.program.linked_unit(unit, src));
                // Re-export from a module that did not resolve.
                if matches!(source, Some(None)) {
                    return;
                }
                let source = source.flatten();

                for specifier in &named.specifiers {
                    let (exported, binding) = match (specifier, source) {
                        (ExportSpecifier::Named(spec), _) => {
                            let Some(orig) = export_name(&spec.orig) else {
                                continue;
                            };
                            let exported = spec
                                .exported
                                .as_ref()
                                .and_then(export_name)
                                .unwrap_or_else(|| orig.clone());
                            let binding = match source {
                                Some(unit) => ExportBinding::From { unit, name: orig },
                                None => ExportBinding::Local(orig),
                            };
                            (exported, binding)
                        }
                        (ExportSpecifier::Namespace(spec), Some(unit)) => {
                            let Some(name) = export_name(&spec.name) else {
                                continue;
                            };
                            (name, ExportBinding::Namespace(unit))
                        }
                        (ExportSpecifier::Default(spec), Some(unit)) => (
                            spec.exported.sym.to_string(),
                            ExportBinding::From {
                                unit,
                                name: "default".to_string(),
                            },
                        ),
                        _ => continue,
                    };
                    self.scopes[scope].exports.insert(exported, binding);
                }
            }
            ModuleDecl::ExportAll(all) => {
                if let Some(target) = all
                    .src
                    .value
                    .as_str()
                    .and_then(|src| self.program.linked_unit(unit, src))
                {
                    self.scopes[scope].star_exports.push(target);
                }
            }
            _ => {}
        }
    }

    fn bind_decl(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        decl: &'a Decl,
        exported: bool,
        doc_pos: BytePos,
    ) {
        let (name, kind) = match decl {
            Decl::TsInterface(iface) => (iface.id.sym.to_string(), DeclKind::Interface(iface)),
            Decl::TsEnum(enum_decl) => (enum_decl.id.sym.to_string(), DeclKind::Enum(enum_decl)),
            Decl::TsTypeAlias(alias) => (alias.id.sym.to_string(), DeclKind::TypeAlias(alias)),
            Decl::TsModule(module) => {
                self.bind_ts_module(unit, scope, module, exported, doc_pos);
                return;
            }
            _ => return,
        };
        self.add(
            scope,
            name,
            Declaration {
                kind,
                unit,
                scope,
                exported,
                doc_pos,
            },
        );
    }

    fn bind_ts_module(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        module: &'a TsModuleDecl,
        exported: bool,
        doc_pos: BytePos,
    ) {
        let Some(body) = &module.body else {
            return;
        };

        if module.global {
            let inner = self.new_scope(unit, Some(scope));
            self.globals.push(inner);
            if let TsNamespaceBody::TsModuleBlock(block) = body {
                self.bind_items(unit, inner, &block.body, true);
            }
            return;
        }

        // `declare module "pkg" {}` augments a package we never load.
        let TsModuleName::Ident(id) = &module.id else {
            return;
        };
        self.bind_namespace(
            unit,
            scope,
            id.sym.to_string(),
            body,
            exported,
            module.declare,
            doc_pos,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_namespace(
        &mut self,
        unit: UnitId,
        parent: ScopeId,
        name: String,
        body: &'a TsNamespaceBody,
        exported: bool,
        ambient: bool,
        doc_pos: BytePos,
    ) {
        let inner = self.new_scope(unit, Some(parent));
        self.add(
            parent,
            name,
            Declaration {
                kind: DeclKind::Namespace(inner),
                unit,
                scope: parent,
                exported,
                doc_pos,
            },
        );

        match body {
            TsNamespaceBody::TsModuleBlock(block) => {
                self.bind_items(unit, inner, &block.body, ambient);
            }
            // `namespace A.B {}`
            TsNamespaceBody::TsNamespaceDecl(nested) => {
                self.bind_namespace(
                    unit,
                    inner,
                    nested.id.sym.to_string(),
                    &nested.body,
                    true,
                    ambient,
                    nested.span.lo,
                );
            }
        }
    }

    // ============================================================
    // Lookup
    // ============================================================

    /// Resolve a type name (`Model`, `NS.Model`, `Enum.Member`) seen from `scope`.
    pub fn resolve_entity(&self, scope: ScopeId, name: &TsEntityName) -> Option<Symbol<'a>> {
        self.resolve_path(scope, &entity_path(name))
    }

    /// Resolve a heritage clause expression (`Base`, `NS.Base`) seen from `scope`.
    pub fn resolve_expr(&self, scope: ScopeId, expr: &Expr) -> Option<Symbol<'a>> {
        self.resolve_path(scope, &expr_path(expr)?)
    }

    pub fn resolve_path(&self, scope: ScopeId, path: &[String]) -> Option<Symbol<'a>> {
        let (first, rest) = path.split_first()?;
        let declarations = self.descend(self.lookup(scope, first)?, rest)?;
        Some(Symbol {
            name: path.join("."),
            declarations,
        })
    }

    fn lookup(&self, scope: ScopeId, name: &str) -> Option<Vec<Declaration<'a>>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(decls) = scope.entries.get(name) {
                return Some(decls.clone());
            }
            if let Some(binding) = scope.imports.get(name) {
                return self.follow_import(binding);
            }
            current = scope.parent;
        }

        self.globals
            .iter()
            .find_map(|global| self.scopes[*global].entries.get(name).cloned())
    }

    fn follow_import(&self, binding: &ImportBinding) -> Option<Vec<Declaration<'a>>> {
        match binding {
            ImportBinding::Named { unit, name } => self.export_of(*unit, name, &mut HashSet::new()),
            ImportBinding::Namespace(unit) => Some(vec![self.module_namespace(*unit)]),
        }
    }

    fn module_namespace(&self, unit: UnitId) -> Declaration<'a> {
        Declaration {
            kind: DeclKind::ModuleNamespace(unit),
            unit,
            scope: self.unit_scopes[unit],
            exported: true,
            doc_pos: BytePos::DUMMY,
        }
    }

    /// Declarations `unit` exports under `name`, following re-exports.
    fn export_of(
        &self,
        unit: UnitId,
        name: &str,
        visited: &mut HashSet<(UnitId, String)>,
    ) -> Option<Vec<Declaration<'a>>> {
        if !visited.insert((unit, name.to_string())) {
            return None;
        }

        let scope_id = self.unit_scopes[unit];
        let scope = &self.scopes[scope_id];

        if let Some(decls) = scope.entries.get(name) {
            let exported: Vec<_> = decls.iter().filter(|d| d.exported).copied().collect();
            if !exported.is_empty() {
                return Some(exported);
            }
        }

        if let Some(binding) = scope.exports.get(name) {
            return match binding {
                ExportBinding::Local(local) => self.lookup(scope_id, local),
                ExportBinding::From { unit, name } => self.export_of(*unit, name, visited),
                ExportBinding::Namespace(unit) => Some(vec![self.module_namespace(*unit)]),
            };
        }

        if name == "default" {
            return None;
        }
        scope
            .star_exports
            .iter()
            .find_map(|star| self.export_of(*star, name, visited))
    }

    fn descend(
        &self,
        decls: Vec<Declaration<'a>>,
        rest: &[String],
    ) -> Option<Vec<Declaration<'a>>> {
        let Some((next, remaining)) = rest.split_first() else {
            return Some(decls);
        };

        decls.iter().find_map(|decl| {
            let found = match decl.kind {
                DeclKind::Namespace(inner) => self.namespace_member(inner, next),
                DeclKind::ModuleNamespace(unit) => self.export_of(unit, next, &mut HashSet::new()),
                DeclKind::Enum(enum_decl) if remaining.is_empty() => enum_decl
                    .members
                    .iter()
                    .position(|m| member_name(&m.id).as_deref() == Some(next.as_str()))
                    .map(|index| {
                        vec![Declaration {
                            kind: DeclKind::EnumMember(enum_decl, index),
                            ..*decl
                        }]
                    }),
                _ => None,
            }?;
            self.descend(found, remaining)
        })
    }

    fn namespace_member(&self, scope: ScopeId, name: &str) -> Option<Vec<Declaration<'a>>> {
        let exported: Vec<_> = self.scopes[scope]
            .entries
            .get(name)?
            .iter()
            .filter(|d| d.exported)
            .copied()
            .collect();
        (!exported.is_empty()).then_some(exported)
    }

    /// Interfaces declared in `unit` (namespace members included), in source
    /// order, each with whether it is visible from outside the unit: exported
    /// itself and nested in exported namespaces only.
    ///
    /// Merged declarations count once, as the first of them.
    pub fn unit_interfaces(&self, unit: UnitId) -> Vec<(InterfaceRef<'a>, bool)> {
        let mut found = Vec::new();
        self.collect_interfaces(self.unit_scopes[unit], true, &mut found);
        found.sort_by_key(|(iface, _)| iface.decl.span.lo);
        found
    }

    fn collect_interfaces(
        &self,
        scope_id: ScopeId,
        visible: bool,
        found: &mut Vec<(InterfaceRef<'a>, bool)>,
    ) {
        let scope = &self.scopes[scope_id];
        for (name, decls) in &scope.entries {
            let listed = scope
                .exports
                .values()
                .any(|binding| matches!(binding, ExportBinding::Local(local) if local == name));

            if let Some(decl) = decls.iter().find(|d| matches!(d.kind, DeclKind::Interface(_)))
                && let Some(iface) = decl.as_interface()
            {
                found.push((iface, visible && (decl.exported || listed)));
            }

            for decl in decls {
                if let DeclKind::Namespace(inner) = decl.kind {
                    self.collect_interfaces(inner, visible && (decl.exported || listed), found);
                }
            }
        }
    }

    // ============================================================
    // Declaration facts
    // ============================================================

    /// Constant values of an enum's members, in declaration order.
    pub fn enum_values(&self, decl: &TsEnumDecl) -> Vec<Option<ConstValue>> {
        evaluate_enum(decl)
    }

    pub fn enum_member_value(&self, decl: &TsEnumDecl, index: usize) -> Option<ConstValue> {
        evaluate_enum(decl).into_iter().nth(index).flatten()
    }

    pub fn doc_tags(&self, unit: UnitId, pos: BytePos) -> DocTags {
        DocTags::from_comments(self.program.unit(unit).parsed.comments.leading_at(pos))
    }

    /// Human-readable type name: the source text of the type.
    pub fn type_text(&self, unit: UnitId, span: Span) -> String {
        self.program.unit(unit).snippet(span)
    }

    pub fn location(&self, unit: UnitId, pos: BytePos) -> SourceLocation {
        self.program.unit(unit).location(pos)
    }

    pub fn display_path(&self, unit: UnitId) -> &'a str {
        &self.program.unit(unit).display_path
    }

    /// Unit that the scope belongs to.
    pub fn scope_unit(&self, scope: ScopeId) -> UnitId {
        self.scopes[scope].unit
    }
}

fn export_name(name: &ModuleExportName) -> Option<String> {
    match name {
        ModuleExportName::Ident(ident) => Some(ident.sym.to_string()),
        ModuleExportName::Str(s) => s.value.as_str().map(str::to_string),
    }
}

pub fn entity_path(name: &TsEntityName) -> Vec<String> {
    match name {
        TsEntityName::Ident(ident) => vec![ident.sym.to_string()],
        TsEntityName::TsQualifiedName(qualified) => {
            let mut path = entity_path(&qualified.left);
            path.push(qualified.right.sym.to_string());
            path
        }
    }
}

fn expr_path(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::Ident(ident) => Some(vec![ident.sym.to_string()]),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            let mut path = expr_path(&member.obj)?;
            path.push(prop.sym.to_string());
            Some(path)
        }
        Expr::Paren(paren) => expr_path(&paren.expr),
        _ => None,
    }
}
