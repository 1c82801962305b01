use std::fs;
use std::path::{Path, PathBuf};

use tlgen_schema::TypeGraph;
use tracing::{info, warn};

use crate::{
    builder::{build_items, BuildStats, DeclarationKind},
    emitter::Emitter,
    error::TlError,
    gen_csharp::{render_unit, unit_path},
    model::Unit,
    options::CompileOptions,
    parser::parse_schema,
    verifier::{find_undeclared, verify_graph},
};

/// A rendered unit and where it goes, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path:     PathBuf,
    pub contents: String,
}

/// One compilation run: owns the type graph that every phase reads and
/// mutates.
///
/// Add the types file before the functions file: function results are only
/// treated as unions when no type declaration has claimed them.
#[derive(Debug)]
pub struct Compilation {
    graph:   TypeGraph,
    options: CompileOptions,
}

impl Compilation {
    pub fn new(options: CompileOptions) -> Self {
        Compilation {
            graph: TypeGraph::new(),
            options,
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn add(&mut self, file: &str, text: &str, kind: DeclarationKind) -> Result<BuildStats, TlError> {
        let items = parse_schema(file, text, self.options.strict)?;
        let stats = build_items(&mut self.graph, file, kind, &items, self.options.strict)?;
        info!(
            "{}: {} blocks parsed, {} declared, {} skipped",
            file,
            items.len(),
            stats.declared,
            stats.skipped
        );
        Ok(stats)
    }

    pub fn add_types(&mut self, file: &str, text: &str) -> Result<BuildStats, TlError> {
        self.add(file, text, DeclarationKind::Type)
    }

    pub fn add_functions(&mut self, file: &str, text: &str) -> Result<BuildStats, TlError> {
        self.add(file, text, DeclarationKind::Function)
    }

    /// Checks the finished graph. Strict runs fail on the first undeclared
    /// type; lenient runs only log them.
    pub fn verify(&self) -> Result<(), TlError> {
        if self.options.strict {
            return verify_graph(&self.graph);
        }
        for undeclared in find_undeclared(&self.graph) {
            warn!("{}", undeclared.message());
        }
        Ok(())
    }

    pub fn units(&self) -> Vec<Unit> {
        Emitter::new(&self.graph).emit_all()
    }

    /// Verifies the graph and renders every unit.
    pub fn generate(&self) -> Result<Vec<GeneratedFile>, TlError> {
        self.verify()?;
        let codegen = &self.options.codegen;
        let files: Vec<GeneratedFile> = self
            .units()
            .iter()
            .map(|unit| GeneratedFile {
                path:     unit_path(unit, codegen),
                contents: render_unit(unit, codegen),
            })
            .collect();
        info!("{} units generated", files.len());
        Ok(files)
    }
}

/// Compile a types schema and a functions schema into `(TypeGraph, files)`.
/// Returns `Err(TlError)` if parsing, building or verification fails.
pub fn compile_schema(
    types: &str,
    functions: &str,
    options: &CompileOptions,
) -> Result<(TypeGraph, Vec<GeneratedFile>), TlError> {
    let mut compilation = Compilation::new(options.clone());
    compilation.add_types("types", types)?;
    compilation.add_functions("functions", functions)?;
    let files = compilation.generate()?;
    Ok((compilation.graph, files))
}

/// Reads a schema file, naming the path in the error.
pub fn read_schema(path: &Path) -> Result<String, TlError> {
    fs::read_to_string(path).map_err(|source| TlError::File { path: path.to_path_buf(), source })
}

/// Writes every file under `out_dir`, replacing what is there.
pub fn write_files(out_dir: &Path, files: &[GeneratedFile]) -> Result<(), TlError> {
    for file in files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| TlError::File { path: parent.to_path_buf(), source })?;
        }
        fs::write(&path, &file.contents).map_err(|source| TlError::File { path, source })?;
    }
    info!("{} files written to {}", files.len(), out_dir.display());
    Ok(())
}

/// Reads both schema files, compiles them and writes the result.
pub fn compile_files(
    types_path: &Path,
    functions_path: &Path,
    out_dir: &Path,
    options: &CompileOptions,
) -> Result<Vec<GeneratedFile>, TlError> {
    let types = read_schema(types_path)?;
    let functions = read_schema(functions_path)?;

    let mut compilation = Compilation::new(options.clone());
    compilation.add_types(&types_path.display().to_string(), &types)?;
    compilation.add_functions(&functions_path.display().to_string(), &functions)?;
    let files = compilation.generate()?;

    write_files(out_dir, &files)?;
    Ok(files)
}
