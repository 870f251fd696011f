//! Person Name Value Object
//!
//! First/last name pair carried on the user profile and on outbound
//! event payloads.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum length for either name part
const NAME_MAX_LENGTH: usize = 100;

/// First/last name profile value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    first_name: String,
    last_name: String,
}

impl PersonName {
    /// Create a new name pair with validation
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> AppResult<Self> {
        let first_name = first_name.into().trim().to_string();
        let last_name = last_name.into().trim().to_string();

        for (label, part) in [("First", &first_name), ("Last", &last_name)] {
            if part.is_empty() {
                return Err(AppError::bad_request(format!("{} name cannot be empty", label)));
            }
            if part.chars().count() > NAME_MAX_LENGTH {
                return Err(AppError::bad_request(format!(
                    "{} name must be at most {} characters",
                    label, NAME_MAX_LENGTH
                )));
            }
            if part.chars().any(char::is_control) {
                return Err(AppError::bad_request(format!(
                    "{} name contains invalid characters",
                    label
                )));
            }
        }

        Ok(Self {
            first_name,
            last_name,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// "First Last" rendering for display and event payloads
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
