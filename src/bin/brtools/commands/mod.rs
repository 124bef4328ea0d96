//! Command implementations

pub mod build_info;
pub mod owner;
pub mod projects;
pub mod toolchains;
