//! Database and XML name types
//!
//! Two kinds of user-supplied names reach the command layer:
//! - **DatabaseName**: identifies a database in the store catalogue
//! - **QName**: element, attribute and processing-instruction names used by
//!   the update commands
//!
//! ## Validation
//!
//! Database names must:
//! - Be 1-128 characters
//! - Contain only alphanumeric, dash, underscore, dot
//! - Not start with a dash or dot
//!
//! QNames follow the XML name production restricted to ASCII, with at most
//! one prefix separator (`prefix:local`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a database name
pub const MAX_DATABASE_NAME_LENGTH: usize = 128;

/// Validated name of a database
///
/// ## Validation Rules
///
/// - Length: 1-128 characters
/// - Characters: `[a-zA-Z0-9_.-]`
/// - Cannot start with `-` or `.`
///
/// Valid names: `"input"`, `"input.xml"`, `"books_2024"`.
/// Invalid names: `""`, `".hidden"`, `"has spaces"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatabaseName(String);

/// Error when validating a database or XML name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    Empty,
    /// Name exceeds maximum length
    TooLong {
        /// Actual length of the name
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Name contains invalid character
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
    /// Name starts with invalid character
    InvalidStart {
        /// The invalid starting character
        char: char,
    },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name cannot be empty"),
            NameError::TooLong { length, max } => {
                write!(f, "name too long: {} chars (max {})", length, max)
            }
            NameError::InvalidChar { char, position } => {
                write!(f, "invalid character '{}' at position {}", char, position)
            }
            NameError::InvalidStart { char } => {
                write!(f, "name cannot start with '{}'", char)
            }
        }
    }
}

impl std::error::Error for NameError {}

impl DatabaseName {
    /// Create a new DatabaseName, validating the input
    ///
    /// # Errors
    ///
    /// Returns `NameError` if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(DatabaseName(name))
    }

    /// Validate a database name
    pub fn validate(name: &str) -> Result<(), NameError> {
        let first = name.chars().next().ok_or(NameError::Empty)?;

        if name.len() > MAX_DATABASE_NAME_LENGTH {
            return Err(NameError::TooLong {
                length: name.len(),
                max: MAX_DATABASE_NAME_LENGTH,
            });
        }

        if !first.is_ascii_alphanumeric() && first != '_' {
            return Err(NameError::InvalidStart { char: first });
        }

        for (pos, ch) in name.chars().enumerate() {
            if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.') {
                return Err(NameError::InvalidChar {
                    char: ch,
                    position: pos,
                });
            }
        }

        Ok(())
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for DatabaseName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        DatabaseName::new(value)
    }
}

/// Validate an XML qualified name (`local` or `prefix:local`).
///
/// Each part must start with a letter or underscore and continue with
/// letters, digits, `-`, `_` or `.`.
pub fn validate_qname(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let mut part_start = true;
    let mut colons = 0;
    for (pos, ch) in name.chars().enumerate() {
        if part_start {
            if !(ch.is_ascii_alphabetic() || ch == '_') {
                return Err(if pos == 0 {
                    NameError::InvalidStart { char: ch }
                } else {
                    NameError::InvalidChar {
                        char: ch,
                        position: pos,
                    }
                });
            }
            part_start = false;
        } else if ch == ':' {
            colons += 1;
            if colons > 1 {
                return Err(NameError::InvalidChar {
                    char: ch,
                    position: pos,
                });
            }
            part_start = true;
        } else if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.') {
            return Err(NameError::InvalidChar {
                char: ch,
                position: pos,
            });
        }
    }

    if part_start {
        // trailing colon
        return Err(NameError::InvalidChar {
            char: ':',
            position: name.len() - 1,
        });
    }
    Ok(())
}
