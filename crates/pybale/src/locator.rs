//! Module location.
//!
//! The classifier never touches the filesystem directly; it consults a
//! [`ModuleLocator`], which maps a dotted module name to an on-disk location.
//! The production implementation resolves against explicit search
//! directories; tests can substitute a table-backed locator.

use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Interpreter built-in and frozen modules that have no on-disk source file.
/// These are compiled into CPython itself.
const BUILTIN_MODULES: &[&str] = &[
    "_abc",
    "_ast",
    "_codecs",
    "_collections",
    "_frozen_importlib",
    "_frozen_importlib_external",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_tokenize",
    "_tracemalloc",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "sys",
    "time",
    "zipimport",
];

/// Where a module name resolved on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// A module file: regular source, a package's `__init__.py`, or a
    /// compiled native extension
    File(PathBuf),
    /// A module packaged inside a zip/egg archive; carries the path of the
    /// containing archive, not the inner member
    Archive(PathBuf),
    /// A namespace package: one or more directory roots and no single file
    Namespace(Vec<PathBuf>),
}

/// Resolution provider consulted by the classifier.
pub trait ModuleLocator {
    /// Resolve a dotted module name to an on-disk location, if any.
    fn locate(&self, name: &str) -> Option<Located>;

    /// Whether the name is an interpreter built-in (compiled into the
    /// runtime, no source file).
    fn is_builtin(&self, name: &str) -> bool;

    /// All directory roots matching the name, for namespace packages.
    fn search_roots(&self, name: &str) -> Vec<PathBuf>;
}

/// Outcome of probing a single search directory.
enum DirResolution {
    Found(Located),
    /// The name matched a plain directory without `__init__.py`; a namespace
    /// package candidate, to be merged across search directories
    NamespaceRoot(PathBuf),
    NotFound,
}

/// Filesystem-backed locator resolving against an ordered list of search
/// directories followed by the configured package installation roots.
#[derive(Debug)]
pub struct PathLocator {
    search_dirs: Vec<PathBuf>,
    site_packages: Vec<PathBuf>,
}

impl PathLocator {
    pub fn new(search_dirs: Vec<PathBuf>, site_packages: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            site_packages,
        }
    }

    /// Canonicalize a path, handling errors gracefully
    fn canonicalize_path(path: PathBuf) -> PathBuf {
        match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!("Failed to canonicalize path {}: {}", path.display(), e);
                path
            }
        }
    }

    fn all_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.search_dirs.iter().chain(self.site_packages.iter())
    }

    /// Resolve a module within a specific directory.
    /// Resolution order for the final segment: package (`foo/__init__.py`),
    /// module file (`foo.py`), native extension (`foo.so` / `foo.pyd`),
    /// archive (`foo.zip` / `foo.egg`), namespace directory (`foo/`).
    fn resolve_in_directory(&self, root: &Path, parts: &[&str]) -> DirResolution {
        let mut current_path = root.to_path_buf();

        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;

            if is_last {
                let package_init = current_path.join(part).join("__init__.py");
                if package_init.is_file() {
                    debug!("Found package at: {package_init:?}");
                    return DirResolution::Found(Located::File(Self::canonicalize_path(
                        package_init,
                    )));
                }

                let module_file = current_path.join(format!("{part}.py"));
                if module_file.is_file() {
                    debug!("Found module file at: {module_file:?}");
                    return DirResolution::Found(Located::File(Self::canonicalize_path(
                        module_file,
                    )));
                }

                for ext in ["so", "pyd"] {
                    let native_file = current_path.join(format!("{part}.{ext}"));
                    if native_file.is_file() {
                        debug!("Found native extension at: {native_file:?}");
                        return DirResolution::Found(Located::File(Self::canonicalize_path(
                            native_file,
                        )));
                    }
                }

                if let Some(archive) = Self::find_archive(&current_path, part) {
                    return DirResolution::Found(Located::Archive(archive));
                }

                let namespace_dir = current_path.join(part);
                if namespace_dir.is_dir() {
                    debug!("Found namespace package root at: {namespace_dir:?}");
                    return DirResolution::NamespaceRoot(Self::canonicalize_path(namespace_dir));
                }
            } else {
                let package_dir = current_path.join(part);
                if package_dir.is_dir() {
                    // Regular package or namespace-package segment; either way
                    // descend into it
                    current_path = package_dir;
                } else if let Some(archive) = Self::find_archive(&current_path, part) {
                    // The prefix is packaged as an archive; the whole dotted
                    // name resolves to the containing archive
                    return DirResolution::Found(Located::Archive(archive));
                } else {
                    return DirResolution::NotFound;
                }
            }
        }

        DirResolution::NotFound
    }

    fn find_archive(dir: &Path, part: &str) -> Option<PathBuf> {
        for ext in ["zip", "egg"] {
            let archive = dir.join(format!("{part}.{ext}"));
            if archive.is_file() {
                debug!("Found archive-packaged module at: {archive:?}");
                return Some(Self::canonicalize_path(archive));
            }
        }
        None
    }
}

impl ModuleLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<Located> {
        let parts: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return None;
        }

        let mut namespace_roots = Vec::new();
        for dir in self.all_dirs() {
            match self.resolve_in_directory(dir, &parts) {
                DirResolution::Found(located) => return Some(located),
                DirResolution::NamespaceRoot(root) => namespace_roots.push(root),
                DirResolution::NotFound => {}
            }
        }

        if namespace_roots.is_empty() {
            None
        } else {
            Some(Located::Namespace(namespace_roots))
        }
    }

    fn is_builtin(&self, name: &str) -> bool {
        BUILTIN_MODULES.binary_search(&name).is_ok()
    }

    fn search_roots(&self, name: &str) -> Vec<PathBuf> {
        let parts: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
        let mut roots = Vec::new();
        for dir in self.all_dirs() {
            let candidate = parts.iter().fold(dir.clone(), |path, part| path.join(part));
            if candidate.is_dir() {
                roots.push(Self::canonicalize_path(candidate));
            }
        }
        roots
    }
}
