use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::{
    cli::args::GenerateArgs,
    config::{Config, OutputFormat, load_config},
    core::{
        parsers::tsconfig::{BuildConfig, load_build_config},
        program::{Checker, Program},
        schema::{ResolveState, SchemaRegistry, SchemaResolver},
        select::select_models,
    },
    diagnostics::Diagnostic,
};

/// Output of one generation run.
pub struct Generation {
    pub registry: SchemaRegistry,
    /// Skipped fields and declarations, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Display paths of the model files, in processing order.
    pub model_files: Vec<String>,
}

/// Settings of one generation run.
///
/// Configuration is merged with the following priority (highest to lowest):
/// 1. CLI arguments (e.g. `--out schemas.ts`)
/// 2. `.realmgenrc.json`
/// 3. Built-in defaults
///
/// Paths given on the command line are relative to the working directory;
/// paths from the configuration file are relative to the file.
pub struct GenerateContext {
    pub config: Config,
    /// Working directory. Provenance and diagnostic paths are relative to it.
    pub work_dir: PathBuf,
    pub roots: Vec<PathBuf>,
    pub output: PathBuf,
    pub tsconfig: Option<PathBuf>,
    pub verbose: bool,
}

impl GenerateContext {
    /// Create a `GenerateContext` from command line arguments.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration file cannot be read, parsed or
    /// validated, or if the working directory is inaccessible.
    pub fn new(args: &GenerateArgs) -> Result<Self> {
        let work_dir =
            std::env::current_dir().context("Failed to determine the working directory")?;
        let config_result = load_config(&work_dir)?;

        if args.verbose && config_result.path.is_none() {
            eprintln!("Note: No .realmgenrc.json found, using default configuration");
        }

        let config_dir = config_result.base_dir(&work_dir);
        let mut config = config_result.config;

        // CLI > config file > defaults
        if let Some(format) = args.format {
            config.format = format;
        }

        let roots = if args.roots.is_empty() {
            vec![config_dir.clone()]
        } else {
            args.roots.iter().map(|root| work_dir.join(root)).collect()
        };

        let output = match &args.out {
            Some(out) => work_dir.join(out),
            None => config_dir.join(&config.output),
        };

        let tsconfig = match (&args.tsconfig, &config.tsconfig) {
            (Some(path), _) => Some(work_dir.join(path)),
            (None, Some(path)) => Some(config_dir.join(path)),
            (None, None) => None,
        };

        Ok(Self {
            config,
            work_dir,
            roots,
            output,
            tsconfig,
            verbose: args.verbose,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.config.format
    }

    /// Output path relative to the working directory, for messages.
    pub fn display_output(&self) -> String {
        display_relative(&self.output, &self.work_dir)
    }

    /// Load the source graph and resolve every model into a registry.
    ///
    /// # Errors
    ///
    /// Returns error if the build configuration is unusable, a root does not
    /// exist, or a source file cannot be read or parsed. Problems with single
    /// fields or declarations are diagnostics, not errors.
    pub fn generate(&self) -> Result<Generation> {
        self.progress("start");

        let build = match &self.tsconfig {
            Some(path) => load_build_config(path)?,
            None => BuildConfig::default(),
        };

        self.progress("> compiling");
        let program = Program::load(
            &self.roots,
            &build,
            &self.config.ignore_patterns(),
            &self.work_dir,
        )?;
        let checker = Checker::new(&program);
        self.progress("> compiled");

        let resolver = SchemaResolver::new(&checker, &self.config.tags);
        let mut state = ResolveState::default();
        let mut model_files = Vec::new();

        for unit in program.model_units(&self.config.model_file_patterns()) {
            let path = checker.display_path(unit);
            self.progress(&format!("> processing '{}'", path));

            let models = select_models(
                &checker,
                unit,
                &self.config.tags.model,
                self.config.exported_only,
            );
            for model in models {
                resolver.resolve_interface(model, &mut state);
            }

            self.progress(&format!("> finished '{}'", path));
            model_files.push(path.to_string());
        }

        Ok(Generation {
            registry: state.registry,
            diagnostics: state.diagnostics,
            model_files,
        })
    }

    /// Print a progress line in verbose mode.
    pub fn progress(&self, message: &str) {
        if self.verbose {
            eprintln!("{}", message);
        }
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
