//! Transitive closure resolution.
//!
//! Expands one entry file's direct imports into the full set of reachable
//! first-party modules plus the third-party package names they require,
//! using a work queue over a visited set. A module already in the import set
//! is never re-enqueued, which also makes import cycles terminate.

use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use anyhow::Result;
use indexmap::IndexSet;
use log::debug;

use crate::{
    error::MissingDependencyError,
    extractor::extract_imports,
    locator::ModuleLocator,
    resolver::{ModuleClassifier, ModuleKind},
};

/// Resolved dependency closure for one unit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnitClosure {
    /// First-party modules to bundle inline, by dotted name
    pub imports: IndexSet<String>,
    /// Top-level third-party package names for the manifest
    pub requirements: IndexSet<String>,
}

/// Map a dotted module name to its source file under the source root.
pub fn module_source_path(source_root: &Path, module_name: &str) -> PathBuf {
    let relative = module_name.replace('.', MAIN_SEPARATOR_STR);
    source_root.join(format!("{relative}.py"))
}

/// Resolve the dependency closure of `entry_file`.
///
/// First-party modules discovered during the walk must exist as files under
/// `source_root`; a missing one fails with [`MissingDependencyError`] naming
/// the module and the unit. The resulting sets are invariant to queue pop
/// order; batches are sorted before enqueueing only so runs and logs are
/// reproducible.
pub fn resolve_closure<L: ModuleLocator>(
    entry_file: &Path,
    source_root: &Path,
    unit: &str,
    classifier: &mut ModuleClassifier<L>,
) -> Result<UnitClosure> {
    let mut closure = UnitClosure::default();

    let seeds = classify_file(entry_file, classifier, &mut closure)?;
    let mut queue: Vec<String> = seeds;
    queue.sort_unstable();

    while let Some(module) = queue.pop() {
        let module_path = module_source_path(source_root, &module);
        if !module_path.is_file() {
            return Err(MissingDependencyError {
                module,
                unit: unit.to_owned(),
            }
            .into());
        }

        debug!("Walking first-party module '{module}' for unit '{unit}'");
        let mut batch = classify_file(&module_path, classifier, &mut closure)?;
        batch.sort_unstable();
        queue.extend(batch);
    }

    Ok(closure)
}

/// Extract and classify one file's imports into `closure`, returning the
/// first-party names not seen before (the next queue batch).
fn classify_file<L: ModuleLocator>(
    path: &Path,
    classifier: &mut ModuleClassifier<L>,
    closure: &mut UnitClosure,
) -> Result<Vec<String>> {
    let extracted = extract_imports(path)?;
    let mut newly_first_party = Vec::new();

    for name in extracted.names() {
        match classifier.classify(name) {
            ModuleKind::FirstParty => {
                if closure.imports.insert(name.to_owned()) {
                    newly_first_party.push(name.to_owned());
                }
            }
            ModuleKind::ThirdParty => {
                // The manifest declares top-level package names only
                let top_level = name.split('.').next().unwrap_or(name);
                closure.requirements.insert(top_level.to_owned());
            }
            ModuleKind::StandardLibrary => {}
            ModuleKind::Unknown => {
                debug!("Dropping unresolvable import '{name}' from {}", path.display());
            }
        }
    }

    Ok(newly_first_party)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::{config::Config, locator::PathLocator};

    struct Fixture {
        _temp_dir: TempDir,
        src: PathBuf,
        classifier: ModuleClassifier<PathLocator>,
    }

    /// Build a project tree: `(module_name, source)` pairs under `src/`,
    /// with everything under the temp root counting as first-party.
    fn fixture(modules: &[(&str, &str)]) -> Fixture {
        let temp_dir = TempDir::new().expect("tempdir");
        let root = temp_dir.path().to_path_buf();
        let src = root.join("src");

        for (module, source) in modules {
            let path = module_source_path(&src, module);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&path, source).expect("write module");
        }

        let config = Config {
            project_root: root,
            src: src.clone(),
            site_packages: Vec::new(),
            known_third_party: IndexSet::from(["requests".to_owned(), "boto3".to_owned()]),
            ..Default::default()
        };
        let locator = PathLocator::new(vec![src.clone()], Vec::new());
        let classifier = ModuleClassifier::new(config, locator);

        Fixture {
            _temp_dir: temp_dir,
            src,
            classifier,
        }
    }

    fn set(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn sorted(set: &IndexSet<String>) -> Vec<String> {
        let mut v: Vec<String> = set.iter().cloned().collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_mixed_imports_scenario() {
        // entry imports os (stdlib), requests (third-party) and utils.helper
        // (first-party), which itself imports json and boto3
        let mut fx = fixture(&[
            ("entry", "import os\nimport requests\nfrom utils.helper import run\n"),
            ("utils/__init__", ""),
            ("utils/helper", "import json\nimport boto3\n"),
        ]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert_eq!(closure.imports, set(&["utils.helper"]));
        assert_eq!(sorted(&closure.requirements), vec!["boto3", "requests"]);
    }

    #[test]
    fn test_closure_completeness_chain() {
        // A imports B imports C: resolving from A must pull in both B and C
        let mut fx = fixture(&[
            ("a", "import b\n"),
            ("b", "import c\n"),
            ("c", "import os\n"),
        ]);

        let entry = module_source_path(&fx.src, "a");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert_eq!(sorted(&closure.imports), vec!["b", "c"]);
        assert!(closure.requirements.is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut fx = fixture(&[
            ("entry", "import a\n"),
            ("a", "import b\n"),
            ("b", "import a\n"),
        ]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert_eq!(sorted(&closure.imports), vec!["a", "b"]);
    }

    #[test]
    fn test_sets_are_disjoint_and_exclude_stdlib() {
        let mut fx = fixture(&[
            ("entry", "import os\nimport sys\nimport helper\nimport requests\n"),
            ("helper", "import json\n"),
        ]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        for stdlib_name in ["os", "sys", "json"] {
            assert!(!closure.imports.contains(stdlib_name));
            assert!(!closure.requirements.contains(stdlib_name));
        }
        assert!(closure.imports.intersection(&closure.requirements).next().is_none());
    }

    #[test]
    fn test_relative_import_skipped() {
        let mut fx = fixture(&[("entry", "from . import sibling\nimport os\n")]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert!(closure.imports.is_empty());
        assert!(closure.requirements.is_empty());
    }

    #[test]
    fn test_unknown_import_dropped() {
        let mut fx = fixture(&[("entry", "import no_such_module_anywhere\n")]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert!(closure.imports.is_empty());
        assert!(closure.requirements.is_empty());
    }

    #[test]
    fn test_missing_dependency_error() {
        // `ghost` resolves as first-party via the locator but its file is
        // removed before the walk reaches it
        let mut fx = fixture(&[("entry", "import ghost\n"), ("ghost", "import os\n")]);

        let ghost_path = module_source_path(&fx.src, "ghost");
        let entry = module_source_path(&fx.src, "entry");

        // Classify once so the locator result is cached, then delete
        assert!(fx.classifier.classify("ghost").is_first_party());
        fs::remove_file(&ghost_path).expect("remove ghost");

        let err = resolve_closure(&entry, &fx.src, "my-unit", &mut fx.classifier)
            .expect_err("should fail");
        let missing = err
            .downcast_ref::<MissingDependencyError>()
            .expect("should be MissingDependencyError");
        assert_eq!(missing.module, "ghost");
        assert_eq!(missing.unit, "my-unit");
    }

    #[test]
    fn test_idempotence() {
        let mut fx = fixture(&[
            ("entry", "import a\nimport b\nimport requests\n"),
            ("a", "import b\n"),
            ("b", "import os\n"),
        ]);

        let entry = module_source_path(&fx.src, "entry");
        let first =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");
        let second =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert_eq!(sorted(&first.imports), sorted(&second.imports));
        assert_eq!(sorted(&first.requirements), sorted(&second.requirements));
    }

    #[test]
    fn test_third_party_submodule_declares_top_level() {
        let mut fx = fixture(&[("entry", "import requests.auth\n")]);

        let entry = module_source_path(&fx.src, "entry");
        let closure =
            resolve_closure(&entry, &fx.src, "unit", &mut fx.classifier).expect("closure");

        assert_eq!(closure.requirements, set(&["requests"]));
    }
}
