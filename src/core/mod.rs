//! Core data structures for brtools.
//!
//! This module contains the project entity graph:
//! - Project paths and the loaded project
//! - The logical view and its units
//! - Hardware configurations
//! - The registry of projects below the workspace folders

pub mod configuration;
pub mod logical;
pub mod paths;
pub mod project;
pub mod registry;

pub use configuration::Configuration;
pub use logical::{LogicalView, Unit};
pub use paths::ProjectPaths;
pub use project::{Project, ProjectError};
pub use registry::{ProjectRegistry, ProjectSet};
