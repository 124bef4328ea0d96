//! brtools - project model and toolchain catalog for B&R Automation Studio
//!
//! This crate reads Automation Studio projects (package XML files below a
//! `*.apj` project file), discovers installed IDE and gcc versions, and
//! resolves the consolidated C build information for any source file of a
//! project.

pub mod build_info;
pub mod core;
pub mod package;
pub mod toolchain;
pub mod util;
pub mod xml;

/// Test utilities and mocks for brtools unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations for filesystem access,
/// process execution and file watching, plus sample project fixtures.
#[cfg(test)]
pub mod test_support;

pub use build_info::{BuildInfoResolver, CBuildInfo};
pub use core::{Configuration, Project, ProjectRegistry, Unit};
pub use toolchain::ToolchainCatalog;
pub use util::context::GlobalContext;
