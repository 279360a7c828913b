//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono_tz::Tz;

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeCodePattern, EmployeeId};

use super::types::{EngineConfig, PolicyConfig, RosterConfig, RosterFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml   # Time zone, assignment and classifier thresholds
/// └── roster.yaml   # Templates, role keywords, managers, reception layouts
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Late threshold: {}", loader.config().classifier.late_threshold_minutes);
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails if a file is missing, is not valid YAML, names an unknown time
    /// zone, carries an invalid code pattern, or lists employee codes that
    /// do not match that pattern.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<PolicyConfig>(&policy_path)?;
        let time_zone = policy.time_zone.parse::<Tz>().map_err(|e| {
            EngineError::ConfigParseError {
                path: policy_path.display().to_string(),
                message: format!("unknown time zone '{}': {}", policy.time_zone, e),
            }
        })?;

        let roster_path = path.join("roster.yaml");
        let roster_file = Self::load_yaml::<RosterFile>(&roster_path)?;
        let (code_pattern, roster) =
            Self::validate_roster(roster_file, &roster_path.display().to_string())?;

        Ok(Self {
            config: EngineConfig {
                time_zone,
                assignment: policy.assignment,
                classifier: policy.classifier,
                code_pattern,
                roster,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Compiles the code pattern and validates every code the roster lists.
    fn validate_roster(
        file: RosterFile,
        path: &str,
    ) -> EngineResult<(EmployeeCodePattern, RosterConfig)> {
        let parse_error = |message: String| EngineError::ConfigParseError {
            path: path.to_string(),
            message,
        };

        let code_pattern = EmployeeCodePattern::new(&file.employee_code_pattern)
            .map_err(|e| parse_error(format!("invalid employee_code_pattern: {}", e)))?;

        let parse_code = |raw: &str| -> EngineResult<EmployeeId> {
            code_pattern
                .parse(raw)
                .map_err(|e| parse_error(e.to_string()))
        };

        let managers = file
            .managers
            .iter()
            .map(|raw| parse_code(raw))
            .collect::<EngineResult<Vec<_>>>()?;

        let mut reception = BTreeMap::new();
        for (raw, layout) in file.reception {
            if layout.sessions.is_empty() {
                return Err(parse_error(format!(
                    "reception layout for '{}' has no sessions",
                    raw
                )));
            }
            if let Some(session) = layout.sessions.iter().find(|s| s.end < s.start) {
                return Err(parse_error(format!(
                    "reception layout for '{}': {} session ends before it starts",
                    raw, session.name
                )));
            }
            let mut names = layout.sessions.iter().map(|s| s.name).collect::<Vec<_>>();
            names.sort();
            if names.windows(2).any(|pair| pair[0] == pair[1]) {
                return Err(parse_error(format!(
                    "reception layout for '{}' repeats a session name",
                    raw
                )));
            }
            reception.insert(parse_code(&raw)?, layout);
        }

        let roster = RosterConfig {
            role_keywords: file.role_keywords,
            templates: file.templates,
            managers,
            reception,
            session_aliases: file.session_aliases,
        };

        Ok((code_pattern, roster))
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
