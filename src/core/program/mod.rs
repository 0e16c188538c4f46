//! The source graph a generation run works on.
//!
//! `Program` owns every parsed source unit reachable from the root paths and
//! the module links between them. `Checker` (built over a borrowed `Program`)
//! is the type-resolution service: it answers symbol lookups, enum constant
//! values, doc tags and type text for the schema resolver.
//!
//! ## Module Structure
//!
//! - `loader`: root expansion, module specifier collection and resolution
//! - `checker`: scopes, symbol lookup, import/export following
//! - `enums`: enum member constant evaluation
//! - `doc_tags`: JSDoc tag extraction

pub mod checker;
pub mod doc_tags;
pub mod enums;
pub mod loader;

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use swc_common::{BytePos, SourceMap, SourceMapper, Span};
use swc_ecma_ast::ModuleItem;

use crate::core::parsers::{
    ts::{ParsedSource, parse_ts_source},
    tsconfig::BuildConfig,
};

pub use checker::{AliasRef, Checker, DeclKind, Declaration, InterfaceRef, ScopeId, Symbol};
pub use doc_tags::DocTags;
pub use enums::ConstValue;

/// Index of a source unit inside its `Program`.
pub type UnitId = usize;

/// A 1-based line/column position in a source unit, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.col)
    }
}

pub struct SourceUnit {
    /// Canonical absolute path.
    pub path: PathBuf,
    /// Path relative to the working directory, used in output and diagnostics.
    pub display_path: String,
    pub parsed: ParsedSource,
    pub is_declaration_file: bool,
}

impl SourceUnit {
    /// A unit without imports or exports is a script: its top-level
    /// declarations are ambient globals.
    pub fn is_script(&self) -> bool {
        self.parsed
            .module
            .body
            .iter()
            .all(|item| matches!(item, ModuleItem::Stmt(_)))
    }

    pub fn location(&self, pos: BytePos) -> SourceLocation {
        let loc = self.parsed.source_map.lookup_char_pos(pos);
        SourceLocation {
            file_path: self.display_path.clone(),
            line: loc.line,
            col: loc.col.0 + 1,
        }
    }

    /// Source text covered by `span`, whitespace-collapsed.
    pub fn snippet(&self, span: Span) -> String {
        self.parsed
            .source_map
            .span_to_snippet(span)
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct Program {
    units: Vec<SourceUnit>,
    by_path: HashMap<PathBuf, UnitId>,
    /// Per unit: module specifier → resolved unit.
    links: Vec<HashMap<String, UnitId>>,
}

impl Program {
    /// Load the source graph reachable from `roots`.
    ///
    /// Directory roots are walked for TypeScript files; every relative (or
    /// `baseUrl`/`paths`-mapped) import and re-export is followed. Files are
    /// read and parsed in parallel, one wave of newly discovered files at a time.
    ///
    /// # Errors
    ///
    /// A missing root, an unreadable file or a syntax error aborts the load.
    pub fn load(
        roots: &[PathBuf],
        build: &BuildConfig,
        ignores: &[Pattern],
        base_dir: &Path,
    ) -> Result<Self> {
        let base_dir = base_dir
            .canonicalize()
            .unwrap_or_else(|_| base_dir.to_path_buf());

        let mut pending = Vec::new();
        for root in roots.iter().chain(build.files.iter()) {
            let root = if root.is_absolute() {
                root.clone()
            } else {
                base_dir.join(root)
            };
            if !root.exists() {
                anyhow::bail!("Root path does not exist: {}", root.display());
            }
            pending.extend(loader::expand_root(&root, ignores));
        }

        let mut program = Program::default();
        let mut raw_links: Vec<HashMap<String, PathBuf>> = Vec::new();
        let mut queued: HashSet<PathBuf> = HashSet::new();

        while !pending.is_empty() {
            let wave: Vec<PathBuf> = pending
                .drain(..)
                .filter_map(|p| p.canonicalize().ok())
                .filter(|p| !program.by_path.contains_key(p) && queued.insert(p.clone()))
                .collect();

            let parsed: Vec<(PathBuf, Result<ParsedSource>)> = wave
                .into_par_iter()
                .map(|path| {
                    let result = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read file: {}", path.display()))
                        .and_then(|code| {
                            let source_map = Arc::new(SourceMap::default());
                            parse_ts_source(code, &path.to_string_lossy(), source_map)
                        });
                    (path, result)
                })
                .collect();

            let mut discovered = Vec::new();
            for (path, result) in parsed {
                let parsed = result?;

                let mut unit_links = HashMap::new();
                for specifier in loader::collect_module_specifiers(&parsed.module) {
                    if let Some(target) = loader::resolve_module(&path, &specifier, build) {
                        if !program.by_path.contains_key(&target)
                            && !queued.contains(&target)
                            && !ignores.iter().any(|p| p.matches_path(&target))
                        {
                            discovered.push(target.clone());
                        }
                        unit_links.insert(specifier, target);
                    }
                }

                program.push_unit(path, parsed, &base_dir);
                raw_links.push(unit_links);
            }

            discovered.sort();
            discovered.dedup();
            pending = discovered;
        }

        program.links = raw_links
            .into_iter()
            .map(|links| {
                links
                    .into_iter()
                    .filter_map(|(spec, path)| program.by_path.get(&path).map(|id| (spec, *id)))
                    .collect()
            })
            .collect();

        Ok(program)
    }

    /// Build a program from in-memory sources. Relative imports between the
    /// given files are linked; nothing is read from disk.
    #[cfg(test)]
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self> {
        let base_dir = PathBuf::from("/project");
        let mut program = Program::default();
        let mut raw_links = Vec::new();

        for (name, code) in sources {
            let path = base_dir.join(name);
            let parsed = parse_ts_source(
                code.to_string(),
                &path.to_string_lossy(),
                Arc::new(SourceMap::default()),
            )?;
            let specifiers = loader::collect_module_specifiers(&parsed.module);
            program.push_unit(path.clone(), parsed, &base_dir);
            raw_links.push((path, specifiers));
        }

        let known: HashSet<PathBuf> = program.by_path.keys().cloned().collect();
        program.links = raw_links
            .into_iter()
            .map(|(path, specifiers)| {
                specifiers
                    .into_iter()
                    .filter_map(|spec| {
                        loader::resolve_in_memory(&path, &spec, &known)
                            .and_then(|target| program.by_path.get(&target).copied())
                            .map(|id| (spec, id))
                    })
                    .collect()
            })
            .collect();

        Ok(program)
    }

    fn push_unit(&mut self, path: PathBuf, parsed: ParsedSource, base_dir: &Path) -> UnitId {
        let id = self.units.len();
        let display_path = path
            .strip_prefix(base_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        let is_declaration_file = display_path.ends_with(".d.ts");
        self.by_path.insert(path.clone(), id);
        self.units.push(SourceUnit {
            path,
            display_path,
            parsed,
            is_declaration_file,
        });
        id
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id]
    }

    /// Unit that `specifier`, imported from `from`, resolved to.
    pub fn linked_unit(&self, from: UnitId, specifier: &str) -> Option<UnitId> {
        self.links.get(from)?.get(specifier).copied()
    }

    /// Non-declaration units whose path matches one of the model file patterns,
    /// in load order.
    pub fn model_units(&self, patterns: &[Pattern]) -> Vec<UnitId> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, unit)| !unit.is_declaration_file)
            .filter(|(_, unit)| {
                patterns
                    .iter()
                    .any(|p| p.matches(&unit.display_path) || p.matches_path(&unit.path))
            })
            .map(|(id, _)| id)
            .collect()
    }
}
