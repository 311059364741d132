//! Entry points that sit around the analysis: the CLI and the project config it reads.
//! The analysis itself never touches the file system.

// The lifetime checker CLI
pub mod cli;

// lifetime_check.toml loading and option resolution
pub mod settings;
