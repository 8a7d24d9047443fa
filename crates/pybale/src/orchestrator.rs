//! Run orchestration.
//!
//! Discovers unit directories, runs closure resolution and bundle assembly
//! per unit, and isolates failures so one broken unit never takes down its
//! siblings.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::{
    bundler, closure::resolve_closure, config::Config, locator::PathLocator,
    resolver::ModuleClassifier,
};

/// Outcome of one bundling run.
#[derive(Debug, Default)]
pub struct BundleSummary {
    /// Units bundled successfully
    pub bundled: Vec<String>,
    /// Unit directories skipped for lacking the entry file
    pub skipped: Vec<String>,
    /// Failed units with their error descriptions
    pub failed: Vec<(String, String)>,
}

impl BundleSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Bundle every unit found under the configured units directory.
///
/// The dist root is destructively cleared and recreated. Non-directory
/// entries and unit directories without the entry file are skipped. A unit
/// that fails (parse error, missing dependency) is recorded in the summary
/// and the remaining units still run.
pub fn bundle_all(config: &Config) -> Result<BundleSummary> {
    if config.dist.exists() {
        std::fs::remove_dir_all(&config.dist).with_context(|| {
            format!("failed to clear dist directory {}", config.dist.display())
        })?;
    }
    std::fs::create_dir_all(&config.dist)
        .with_context(|| format!("failed to create dist directory {}", config.dist.display()))?;

    let locator = PathLocator::new(vec![config.src.clone()], config.site_packages.clone());
    let mut classifier = ModuleClassifier::new(config.clone(), locator);

    let mut summary = BundleSummary::default();
    for unit in discover_units(&config.units_dir)? {
        let entry_file = config.units_dir.join(&unit).join(&config.entry_filename);
        if !entry_file.is_file() {
            debug!("Skipping unit '{unit}': no {} found", config.entry_filename);
            summary.skipped.push(unit);
            continue;
        }

        match bundle_unit(&unit, &entry_file, config, &mut classifier) {
            Ok(()) => {
                info!("Bundled unit '{unit}'");
                summary.bundled.push(unit);
            }
            Err(e) => {
                error!("Failed to bundle unit '{unit}': {e:#}");
                summary.failed.push((unit, format!("{e:#}")));
            }
        }
    }

    info!(
        "Bundled {} unit(s), skipped {}, failed {}",
        summary.bundled.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    Ok(summary)
}

fn bundle_unit(
    unit: &str,
    entry_file: &Path,
    config: &Config,
    classifier: &mut ModuleClassifier<PathLocator>,
) -> Result<()> {
    let closure = resolve_closure(entry_file, &config.src, unit, classifier)?;
    bundler::assemble(unit, entry_file, &closure, config)?;
    Ok(())
}

/// Unit directory names under the units root, sorted for reproducible runs.
fn discover_units(units_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(units_dir)
        .with_context(|| format!("failed to read units directory {}", units_dir.display()))?;

    let mut units = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            units.push(name.to_owned());
        }
    }
    units.sort_unstable();
    Ok(units)
}
