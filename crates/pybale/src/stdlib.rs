//! Standard library detection.
//!
//! Single source of truth for deciding whether a module name belongs to the
//! Python standard library, backed by ruff's stdlib database.

use ruff_python_stdlib::sys;

/// Check if a module name represents a Python standard library module.
///
/// Handles both direct matches and submodules (e.g., both "os" and "os.path"
/// are recognized).
pub fn is_stdlib_module(module_name: &str, python_version: u8) -> bool {
    // __future__ is always stdlib but not part of ruff's database
    if module_name == "__future__" {
        return true;
    }

    if sys::is_known_standard_library(python_version, module_name) {
        return true;
    }

    // Submodule of a stdlib module
    if let Some(top_level) = module_name.split('.').next() {
        sys::is_known_standard_library(python_version, top_level)
    } else {
        false
    }
}
