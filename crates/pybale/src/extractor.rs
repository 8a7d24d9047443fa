//! Top-level import extraction.
//!
//! Walks only the direct children of the module AST: imports nested inside
//! function or class bodies are deliberately ignored, matching a static
//! whole-file analysis rather than full import reachability.

use std::path::Path;

use anyhow::{Context, Result};
use ruff_python_ast::Stmt;
use ruff_python_parser::parse_module;

use crate::error::ParseError;

/// Module names referenced by the top-level import statements of one file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedImports {
    /// Dotted names from `import a.b, c` forms, one entry per alias
    pub plain: Vec<String>,
    /// Module names from `from X import ...` forms; the imported symbols
    /// themselves are irrelevant to classification
    pub from: Vec<String>,
}

impl ExtractedImports {
    /// All extracted names in statement order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plain
            .iter()
            .chain(self.from.iter())
            .map(String::as_str)
    }
}

/// Parse a source file and extract its module-scope import targets.
///
/// Fails with [`ParseError`] when the file is not syntactically valid Python.
pub fn extract_imports(path: &Path) -> Result<ExtractedImports> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file {}", path.display()))?;

    let parsed = parse_module(&source).map_err(|source| ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut extracted = ExtractedImports::default();
    for stmt in &parsed.into_syntax().body {
        match stmt {
            Stmt::Import(import_stmt) => {
                for alias in &import_stmt.names {
                    extracted.plain.push(alias.name.to_string());
                }
            }
            Stmt::ImportFrom(import_from) => {
                // `from . import x` and friends are relative same-package
                // imports; they carry no module name to classify
                if import_from.level == 0
                    && let Some(module) = &import_from.module
                {
                    extracted.from.push(module.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(extracted)
}
