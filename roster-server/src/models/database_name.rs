//! Database name validation
//!
//! `CREATE DATABASE` cannot bind its target as a parameter, so the name is
//! interpolated into the statement. Only names matching a strict identifier
//! pattern are accepted.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Postgres truncates identifiers beyond this length
const MAX_DATABASE_NAME_LEN: usize = 63;

/// Unquoted identifier: letter or underscore, then letters, digits, underscores
static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex")
});

/// Validated database name, safe to interpolate into DDL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Create a new database name, validating identifier format.
    ///
    /// # Example
    /// ```
    /// use roster_server::models::DatabaseName;
    ///
    /// assert!(DatabaseName::new("roster_app").is_ok());
    /// assert!(DatabaseName::new("roster; DROP TABLE users").is_err());
    /// assert!(DatabaseName::new("1roster").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "database name" });
        }

        if s.len() > MAX_DATABASE_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "database name",
                max: MAX_DATABASE_NAME_LEN,
            });
        }

        if !IDENT_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "database name",
                reason: "must be letters, digits and underscores, starting with a letter or underscore",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier for DDL statements.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
