//! Static dependency bundler for independently deployable Python functions.
//!
//! For each unit directory with an entry file, pybale computes the
//! transitive closure of first-party imports, classifies every import as
//! standard-library, first-party, or third-party, and assembles a deployable
//! bundle directory with the sources and a requirements manifest.

pub mod bundler;
pub mod closure;
pub mod config;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod orchestrator;
pub mod resolver;
pub mod stdlib;
