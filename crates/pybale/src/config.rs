//! Run configuration.
//!
//! Everything the Python original read ambiently (current directory,
//! `sys.path`, site-packages scans) is an explicit field here, so the
//! classifier and resolver never consult process-global state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root; first-party modules must resolve underneath it
    pub project_root: PathBuf,

    /// Source root containing shared first-party modules
    pub src: PathBuf,

    /// Directory holding one subdirectory per deployable unit
    pub units_dir: PathBuf,

    /// Output root; destructively recreated on every run
    pub dist: PathBuf,

    /// Fixed entry filename a unit directory must contain to be bundled
    pub entry_filename: String,

    /// Target Python minor version (e.g. 10 for 3.10), used for stdlib
    /// membership checks
    pub python_version: u8,

    /// Package installation roots for the third-party test. Defaults cover
    /// the user-site conventions of the three major OS families; system
    /// site-packages directories are matched by path component instead.
    pub site_packages: Vec<PathBuf>,

    /// Path substrings that disqualify a module from being first-party even
    /// when it resolves under the project root
    pub venv_denylist: Vec<String>,

    /// Modules forced to first-party regardless of resolution
    pub known_first_party: IndexSet<String>,

    /// Modules forced to third-party regardless of resolution
    pub known_third_party: IndexSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            src: PathBuf::from("src"),
            units_dir: PathBuf::from("src/lambdas"),
            dist: PathBuf::from("dist"),
            entry_filename: "handler.py".to_owned(),
            python_version: 10,
            site_packages: default_user_site_packages(),
            venv_denylist: vec![
                ".venv".to_owned(),
                "venv".to_owned(),
                "site-packages".to_owned(),
                "dist-packages".to_owned(),
                ".eggs".to_owned(),
            ],
            known_first_party: IndexSet::new(),
            known_third_party: IndexSet::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or fall back to defaults when no
    /// path is given. A given path must exist; a missing default config is
    /// not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let config: Self = toml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

/// User-site package roots for the three major OS conventions, rooted at the
/// current user's home directory.
fn default_user_site_packages() -> Vec<PathBuf> {
    let Ok(home) = etcetera::home_dir() else {
        return Vec::new();
    };

    vec![
        // Linux / generic Unix user site
        home.join(".local/lib"),
        // macOS framework builds
        home.join("Library/Python"),
        // Windows per-user installs
        home.join("AppData/Roaming/Python"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.entry_filename, "handler.py");
        assert_eq!(config.units_dir, PathBuf::from("src/lambdas"));
        assert!(config.venv_denylist.iter().any(|s| s == ".venv"));
    }

    #[test]
    fn test_load_from_toml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pybale.toml");
        std::fs::write(
            &path,
            r#"
entry_filename = "main.py"
units_dir = "functions"
known_third_party = ["requests"]
"#,
        )?;

        let config = Config::load(Some(&path))?;
        assert_eq!(config.entry_filename, "main.py");
        assert_eq!(config.units_dir, PathBuf::from("functions"));
        assert!(config.known_third_party.contains("requests"));
        // Unspecified fields keep their defaults
        assert_eq!(config.dist, PathBuf::from("dist"));
        Ok(())
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/pybale.toml")));
        assert!(result.is_err());
    }
}
