//! Error types callers need to tell apart.
//!
//! Most plumbing goes through `anyhow`; these two carry enough structure for
//! the orchestrator to report which unit and module broke without string
//! matching.

use std::path::PathBuf;

use thiserror::Error;

/// A source file that could not be parsed into a Python module AST.
#[derive(Debug, Error)]
#[error("failed to parse {}", path.display())]
pub struct ParseError {
    /// Path of the offending source file
    pub path: PathBuf,
    #[source]
    pub source: ruff_python_parser::ParseError,
}

/// A first-party module discovered during the closure walk whose derived
/// source file does not exist under the source root.
#[derive(Debug, Error)]
#[error("unit '{unit}' depends on first-party module '{module}' which has no source file")]
pub struct MissingDependencyError {
    /// Dotted module name that failed to resolve to a file
    pub module: String,
    /// Unit being bundled when the walk hit the missing file
    pub unit: String,
}
