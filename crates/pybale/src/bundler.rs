//! Bundle assembly.
//!
//! Thin I/O glue: copies the entry file and the resolved first-party modules
//! into the unit's dist directory and writes the requirements manifest. The
//! interesting decisions all happened in the closure walk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    closure::{UnitClosure, module_source_path},
    config::Config,
};

/// Copy a file, creating destination parent directories as needed.
fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::copy(src, dest).with_context(|| {
        format!(
            "failed to copy {} to {}",
            src.display(),
            dest.display()
        )
    })?;
    Ok(())
}

/// Assemble the bundle directory for one unit and return its path.
///
/// Layout: `dist/<unit>/<entry_filename>` plus every first-party module at
/// the path mirroring its dotted name, plus a `requirements.txt` with one
/// third-party package name per line.
pub fn assemble(
    unit: &str,
    entry_file: &Path,
    closure: &UnitClosure,
    config: &Config,
) -> Result<PathBuf> {
    let unit_dist = config.dist.join(unit);
    std::fs::create_dir_all(&unit_dist)
        .with_context(|| format!("failed to create bundle directory {}", unit_dist.display()))?;

    copy_file(entry_file, &unit_dist.join(&config.entry_filename))?;

    for module in &closure.imports {
        let src_path = module_source_path(&config.src, module);
        let dest_path = module_source_path(&unit_dist, module);
        if src_path.is_file() {
            copy_file(&src_path, &dest_path)?;
        } else {
            // Closure resolution already validated existence; a module
            // without a file here is a namespace package or archive that has
            // no single source to copy
            debug!("No source file to copy for '{module}'");
        }
    }

    let manifest = unit_dist.join("requirements.txt");
    let mut contents = String::new();
    for requirement in &closure.requirements {
        contents.push_str(requirement);
        contents.push('\n');
    }
    std::fs::write(&manifest, contents)
        .with_context(|| format!("failed to write manifest {}", manifest.display()))?;

    Ok(unit_dist)
}
