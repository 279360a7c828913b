//! Configuration loading and management for the Attendance Reconciliation Engine.
//!
//! This module provides functionality to load the reconciliation policy and
//! the roster (shift templates, role keywords, ID-based fallbacks) from YAML
//! files. The loaded configuration is immutable and injected into the
//! engine components at construction.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Zone: {}", config.config().time_zone);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AssignmentPolicy, ClassifierPolicy, EngineConfig, NamedSessionPolicy, PolicyConfig,
    RoleKeyword, RoleTemplates, RosterConfig, RosterFile, SessionAliases, default_role_keywords,
};
