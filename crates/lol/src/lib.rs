//! Command line tooling over the `lol_*` format crates.

pub mod commands;
pub mod hash_dirs;
pub mod report;
