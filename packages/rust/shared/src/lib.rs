//! Shared types, error model, and configuration for edutrace.
//!
//! This crate is the foundation depended on by the parser and the CLI.
//! It provides:
//! - The unified error type, [`EdutraceError`]
//! - Domain types ([`DegreeLevel`], [`DegreeRecord`], [`PersonRecord`])
//! - Configuration ([`AppConfig`], [`ParserConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, ParserConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{EdutraceError, Result};
pub use types::{DegreeLevel, DegreeRecord, PersonRecord, records_to_json};
