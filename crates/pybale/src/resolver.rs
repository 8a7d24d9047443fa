//! Import classification.
//!
//! Decides, for a dotted module name, whether it is standard library,
//! first-party (bundled inline), third-party (declared in the manifest), or
//! unknown (dropped from both sets).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::{
    config::Config,
    locator::{Located, ModuleLocator},
    stdlib::is_stdlib_module,
};

/// Classification of a module based on its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Python standard library modules (e.g., os, sys, json)
    StandardLibrary,

    /// Third-party packages installed via pip/conda (e.g., numpy, requests)
    ThirdParty,

    /// First-party modules that are part of the project being bundled
    FirstParty,

    /// Modules that could not be resolved to any category; silently dropped
    /// from both output sets
    Unknown,
}

impl ModuleKind {
    pub fn is_stdlib(self) -> bool {
        matches!(self, Self::StandardLibrary)
    }

    pub fn is_third_party(self) -> bool {
        matches!(self, Self::ThirdParty)
    }

    pub fn is_first_party(self) -> bool {
        matches!(self, Self::FirstParty)
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandardLibrary => write!(f, "stdlib"),
            Self::ThirdParty => write!(f, "third-party"),
            Self::FirstParty => write!(f, "first-party"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifies module names against an injected [`ModuleLocator`].
///
/// Precedence: standard library, explicit config overrides, first-party,
/// third-party; first match wins, everything else is `Unknown`.
#[derive(Debug)]
pub struct ModuleClassifier<L> {
    config: Config,
    locator: L,
    /// Project root, canonicalized once for descendant tests
    project_root: PathBuf,
    /// Cache of module classifications
    classification_cache: IndexMap<String, ModuleKind>,
}

impl<L: ModuleLocator> ModuleClassifier<L> {
    pub fn new(config: Config, locator: L) -> Self {
        let project_root = match config.project_root.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(
                    "Failed to canonicalize project root {}: {}",
                    config.project_root.display(),
                    e
                );
                config.project_root.clone()
            }
        };

        Self {
            config,
            locator,
            project_root,
            classification_cache: IndexMap::new(),
        }
    }

    /// Classify an import as standard library, first-party, third-party, or
    /// unknown.
    pub fn classify(&mut self, module_name: &str) -> ModuleKind {
        if let Some(cached_kind) = self.classification_cache.get(module_name) {
            return *cached_kind;
        }

        let kind = self.classify_uncached(module_name);
        debug!("Classified '{module_name}' as {kind}");
        self.classification_cache
            .insert(module_name.to_owned(), kind);
        kind
    }

    fn classify_uncached(&self, module_name: &str) -> ModuleKind {
        // Interpreter built-ins and the stdlib database win outright
        if self.locator.is_builtin(module_name)
            || is_stdlib_module(module_name, self.config.python_version)
        {
            return ModuleKind::StandardLibrary;
        }

        // Explicit classifications from config
        if self.matches_override(&self.config.known_first_party, module_name) {
            return ModuleKind::FirstParty;
        }
        if self.matches_override(&self.config.known_third_party, module_name) {
            return ModuleKind::ThirdParty;
        }

        match self.locator.locate(module_name) {
            // Archives are tested by the containing archive path, native
            // extensions and plain files by their own path
            Some(Located::File(path) | Located::Archive(path)) => self.classify_path(&path),
            Some(Located::Namespace(roots)) => self.classify_namespace(module_name, &roots),
            None => ModuleKind::Unknown,
        }
    }

    fn matches_override(&self, overrides: &indexmap::IndexSet<String>, module_name: &str) -> bool {
        if overrides.contains(module_name) {
            return true;
        }
        // A submodule inherits its top-level package's override
        module_name
            .split('.')
            .next()
            .is_some_and(|top_level| overrides.contains(top_level))
    }

    fn classify_path(&self, path: &Path) -> ModuleKind {
        if self.is_first_party_path(path) {
            ModuleKind::FirstParty
        } else if self.is_third_party_path(path) {
            ModuleKind::ThirdParty
        } else {
            ModuleKind::Unknown
        }
    }

    /// A namespace package is first-party if ANY of its roots is under the
    /// project root.
    fn classify_namespace(&self, module_name: &str, roots: &[PathBuf]) -> ModuleKind {
        if roots.iter().any(|root| self.is_first_party_path(root)) {
            return ModuleKind::FirstParty;
        }
        if roots.iter().any(|root| self.is_third_party_path(root)) {
            return ModuleKind::ThirdParty;
        }
        debug!("Namespace package '{module_name}' has no classifiable root");
        ModuleKind::Unknown
    }

    fn is_first_party_path(&self, path: &Path) -> bool {
        if !path.starts_with(&self.project_root) {
            return false;
        }
        // The denylist wins over project-root descent: a vendored virtualenv
        // inside the repo is never first-party
        if self.is_denylisted(path) {
            return false;
        }
        !Self::is_editable_install_marker(path)
    }

    fn is_denylisted(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.config
            .venv_denylist
            .iter()
            .any(|marker| path_str.contains(marker.as_str()))
    }

    /// Pip editable installs leave marker files (`__editable__*.py`,
    /// `*.egg-link`, `.pth`) that point elsewhere; they are never the
    /// project's own source.
    fn is_editable_install_marker(path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if file_name.starts_with("__editable__") {
            return true;
        }
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("pth" | "egg-link")
        )
    }

    fn is_third_party_path(&self, path: &Path) -> bool {
        if self
            .config
            .site_packages
            .iter()
            .any(|root| path.starts_with(root))
        {
            return true;
        }
        // System installs are recognized by path component rather than by an
        // enumerable set of prefixes
        path.components().any(|component| {
            matches!(
                component.as_os_str().to_str(),
                Some("site-packages" | "dist-packages")
            )
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
