use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use glob::Pattern;
use swc_ecma_ast::{ExportAll, ImportDecl, Module, NamedExport};
use swc_ecma_visit::{Visit, VisitWith};
use walkdir::WalkDir;

use crate::core::parsers::tsconfig::BuildConfig;

const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts"];

/// Expand a root path into the source files it names.
///
/// Files are returned as-is; directories are walked (sorted, skipping
/// `node_modules` and ignored paths) for `.ts` / `.tsx` files.
pub fn expand_root(root: &Path, ignores: &[Pattern]) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_source_file(path))
        .filter(|path| !ignores.iter().any(|p| p.matches_path(path)))
        .collect()
}

fn is_source_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx")
    )
}

/// Collects the module specifiers of imports and re-exports.
#[derive(Default)]
struct ModuleSpecifierCollector {
    specifiers: Vec<String>,
}

impl ModuleSpecifierCollector {
    fn push(&mut self, specifier: Option<&str>) {
        if let Some(specifier) = specifier
            && !self.specifiers.iter().any(|s| s == specifier)
        {
            self.specifiers.push(specifier.to_string());
        }
    }
}

impl Visit for ModuleSpecifierCollector {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        self.push(node.src.value.as_str());
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if let Some(src) = &node.src {
            self.push(src.value.as_str());
        }
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        self.push(node.src.value.as_str());
    }
}

pub fn collect_module_specifiers(module: &Module) -> Vec<String> {
    let mut collector = ModuleSpecifierCollector::default();
    module.visit_with(&mut collector);
    collector.specifiers
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolve `specifier` imported from the file `from` to an existing source file.
///
/// Relative specifiers resolve against the importing file's directory;
/// everything else goes through the build configuration's `paths`/`baseUrl`.
/// Package imports resolve to nothing.
pub fn resolve_module(from: &Path, specifier: &str, build: &BuildConfig) -> Option<PathBuf> {
    let bases = if is_relative(specifier) {
        vec![from.parent()?.join(specifier)]
    } else {
        build.candidates(specifier)
    };

    bases
        .iter()
        .flat_map(|base| candidate_files(base))
        .find(|candidate| candidate.is_file())
        .and_then(|found| found.canonicalize().ok())
}

/// Resolve a relative specifier against a fixed set of known files.
#[cfg(test)]
pub fn resolve_in_memory(
    from: &Path,
    specifier: &str,
    known: &std::collections::HashSet<PathBuf>,
) -> Option<PathBuf> {
    if !is_relative(specifier) {
        return None;
    }
    let base = normalize(&from.parent()?.join(specifier));
    candidate_files(&base)
        .into_iter()
        .find(|candidate| known.contains(candidate))
}

/// Files a module specifier base may refer to, in lookup order.
fn candidate_files(base: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if is_source_file(base) {
        candidates.push(base.to_path_buf());
    }

    // ESM-style imports name the emitted `.js` file.
    if let Some(ext @ ("js" | "jsx" | "mjs")) = base.extension().and_then(|e| e.to_str()) {
        let stem = base.with_extension("");
        let mapped = if ext == "jsx" { ".tsx" } else { ".ts" };
        candidates.push(with_suffix(&stem, mapped));
    }

    candidates.extend(SOURCE_EXTENSIONS.iter().map(|ext| with_suffix(base, ext)));
    candidates.extend(INDEX_FILES.iter().map(|index| base.join(index)));
    candidates
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Lexically normalize `.` and `..` components.
#[cfg(test)]
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
