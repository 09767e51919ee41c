//! Configuration loading: the static catalogues and environment the
//! scheduler is built from.

mod emergencies;
mod env;
mod responders;

pub use emergencies::{emit_emergency_types, parse_emergency_types};
pub use env::parse_environment;
pub use responders::{emit_responder_types, parse_responder_types};

use crate::error::{DispatchError, DispatchResult};
use crate::model::{EmergencyType, ResponderType};

/// Environment keys recognised in the environment config file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentConfig {
    pub queue: Option<String>,
    pub width: i32,
    pub height: i32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            queue: None,
            width: 100,
            height: 100,
        }
    }
}

/// Extracts the contents of each `[...]` group in `s`, in order. Used by
/// the responder and emergency parsers, which both use a bracketed,
/// fixed-field line format.
pub(crate) fn bracket_fields(s: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = s.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c == '[' {
            let mut field = String::new();
            for (_, c2) in chars.by_ref() {
                if c2 == ']' {
                    fields.push(field);
                    break;
                }
                field.push(c2);
            }
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// The full static configuration: everything the scheduler needs before it
/// can admit its first event.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub responder_types: Vec<ResponderType>,
    pub emergency_types: Vec<EmergencyType>,
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Load the three configuration files. An empty catalogue after
    /// parsing is fatal, matching the original parsers' behaviour.
    pub fn load(
        responders_path: &str,
        emergencies_path: &str,
        env_path: &str,
    ) -> DispatchResult<Self> {
        let responder_types = parse_responder_types(responders_path)?;
        if responder_types.is_empty() {
            return Err(DispatchError::EmptyCatalogue("responder"));
        }

        let emergency_types = parse_emergency_types(emergencies_path, &responder_types)?;
        if emergency_types.is_empty() {
            return Err(DispatchError::EmptyCatalogue("emergency"));
        }

        let environment = parse_environment(env_path)?;

        Ok(Self {
            responder_types,
            emergency_types,
            environment,
        })
    }

    pub fn find_emergency_type(&self, name: &str) -> Option<&EmergencyType> {
        self.emergency_types.iter().find(|t| t.name == name)
    }

    pub fn is_within_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.environment.width && y >= 0 && y < self.environment.height
    }
}
