//! Command enum defining all ArborDB operations.
//!
//! Commands are the instruction set of the server. Every operation a client
//! can request is a variant of [`Command`]. Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for clients and tests
//! - **Pure data**: Validation and execution live in the executor
//!
//! Sub-type keywords (`ELEMENT`, `PI`, `INFO`, ...) are carried as raw strings
//! and resolved case-insensitively during validation, so `"fragment"` and
//! `"FRAGMENT"` name the same thing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use arbor_core::{validate_qname, DatabaseName};
use arbor_security::Permission;

use crate::error::Error;
use crate::Result;

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Commands | Permission |
/// |----------|----------|------------|
/// | Database | `CreateDb`, `Open`, `Close`, `DropDb`, `List`, `InfoDb`, `Info` | READ / STANDARD |
/// | Selection | `Cs` | READ |
/// | Update | `Insert`, `Update`, `Delete`, `Copy` | WRITE |
/// | Query | `XQuery`, `Run` | STANDARD |
/// | Options | `Set` | STANDARD |
/// | Admin | `Kill` | ADMIN |
///
/// # Example
///
/// ```ignore
/// use arbordb::{Command, NullSink};
///
/// session.execute(Command::Open { name: "input".into() }, &mut NullSink)?;
/// session.execute(Command::Insert {
///     kind: "element".into(),
///     target: "//title".into(),
///     position: None,
///     values: vec!["name".into()],
/// }, &mut NullSink)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Database (7) ====================
    /// Create a database from inline XML or a file and open it.
    CreateDb {
        /// Inline XML (starting with `<`) or a file path
        input: String,
        /// Database name; defaults to the file stem
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Open a database in the current context.
    Open {
        /// Database name
        name: String,
    },

    /// Close the current database.
    Close,

    /// Drop a database.
    DropDb {
        /// Database name
        name: String,
    },

    /// List all databases.
    List,

    /// Describe the current database.
    InfoDb,

    /// Describe the session and server.
    Info,

    // ==================== Selection (1) ====================
    /// Evaluate a path and make its nodes the current selection.
    Cs {
        /// Path expression
        query: String,
    },

    // ==================== Update (4) ====================
    /// Insert new content into every target node.
    Insert {
        /// `ELEMENT`, `TEXT`, `ATTRIBUTE`, `COMMENT`, `PI` or `FRAGMENT`
        kind: String,
        /// Path selecting the target nodes
        target: String,
        /// 1-based child position; absent or 0 appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        /// Kind-specific values (name, value or XML)
        values: Vec<String>,
    },

    /// Rename or rewrite target nodes of the matching kind.
    Update {
        /// Node kind keyword (not `FRAGMENT`)
        kind: String,
        /// Path selecting the target nodes
        target: String,
        /// Kind-specific values
        values: Vec<String>,
    },

    /// Delete every target node and its subtree.
    Delete {
        /// Path selecting the nodes to delete
        target: String,
    },

    /// Copy source nodes into every target element or document node.
    Copy {
        /// Path selecting the nodes to copy
        source: String,
        /// Path selecting the receiving nodes
        target: String,
        /// 1-based child position; absent or 0 appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },

    // ==================== Options (1) ====================
    /// Change a session option.
    Set {
        /// `INFO`, `CHOP` or `RUNS`
        option: String,
        /// New value
        value: String,
    },

    // ==================== Query (2) ====================
    /// Evaluate a query and write its items to the output sink.
    XQuery {
        /// Query text
        query: String,
    },

    /// Read a query from a file and evaluate it.
    Run {
        /// Path of the query file
        path: String,
    },

    // ==================== Admin (1) ====================
    /// Terminate every other active session.
    Kill,
}

impl Command {
    /// Canonical upper-case command name, used in messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateDb { .. } => "CREATE DB",
            Command::Open { .. } => "OPEN",
            Command::Close => "CLOSE",
            Command::DropDb { .. } => "DROP DB",
            Command::List => "LIST",
            Command::InfoDb => "INFO DB",
            Command::Info => "INFO",
            Command::Cs { .. } => "CS",
            Command::Insert { .. } => "INSERT",
            Command::Update { .. } => "UPDATE",
            Command::Delete { .. } => "DELETE",
            Command::Copy { .. } => "COPY",
            Command::Set { .. } => "SET",
            Command::XQuery { .. } => "XQUERY",
            Command::Run { .. } => "RUN",
            Command::Kill => "KILL",
        }
    }

    /// Level an identity needs to run this command.
    pub fn required_permission(&self) -> Permission {
        match self {
            Command::Open { .. }
            | Command::Close
            | Command::List
            | Command::InfoDb
            | Command::Info
            | Command::Cs { .. } => Permission::Read,
            Command::Insert { .. }
            | Command::Update { .. }
            | Command::Delete { .. }
            | Command::Copy { .. } => Permission::Write,
            Command::CreateDb { .. }
            | Command::DropDb { .. }
            | Command::Set { .. }
            | Command::XQuery { .. }
            | Command::Run { .. } => Permission::Standard,
            Command::Kill => Permission::Admin,
        }
    }

    /// Returns true if this command mutates database content or the catalogue.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::CreateDb { .. }
                | Command::DropDb { .. }
                | Command::Insert { .. }
                | Command::Update { .. }
                | Command::Delete { .. }
                | Command::Copy { .. }
        )
    }

    /// Check every argument without touching any state.
    ///
    /// Runs before existence checks, so `DropDb { name: "" }` is a validation
    /// failure even when nothing is open.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::CreateDb { input, name } => {
                non_empty("input", input)?;
                if let Some(name) = name {
                    database_name(name)?;
                }
                Ok(())
            }
            Command::Open { name } | Command::DropDb { name } => database_name(name).map(|_| ()),
            Command::Cs { query } => non_empty("query", query),
            Command::XQuery { .. } => Ok(()),
            Command::Run { path } => non_empty("path", path),
            Command::Insert {
                kind,
                target,
                values,
                ..
            } => {
                let kind: UpdateKind = kind.parse()?;
                non_empty("target", target)?;
                kind.check_values(values)
            }
            Command::Update {
                kind,
                target,
                values,
            } => {
                let kind: UpdateKind = kind.parse()?;
                if kind == UpdateKind::Fragment {
                    return Err(Error::validation("fragments cannot be updated"));
                }
                non_empty("target", target)?;
                kind.check_values(values)
            }
            Command::Delete { target } => non_empty("target", target),
            Command::Copy { source, target, .. } => {
                non_empty("source", source)?;
                non_empty("target", target)
            }
            Command::Set { option, value } => {
                let option: SetOption = option.parse()?;
                option.parse_value(value).map(|_| ())
            }
            Command::Close
            | Command::List
            | Command::InfoDb
            | Command::Info
            | Command::Kill => Ok(()),
        }
    }
}

fn non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} must not be empty", what)));
    }
    Ok(())
}

pub(crate) fn database_name(name: &str) -> Result<DatabaseName> {
    DatabaseName::new(name)
        .map_err(|e| Error::validation(format!("invalid database name '{}': {}", name, e)))
}

fn qname(name: &str) -> Result<()> {
    validate_qname(name).map_err(|e| Error::validation(format!("invalid name '{}': {}", name, e)))
}

// =============================================================================
// Update kinds
// =============================================================================

/// Node kind addressed by `Insert` and `Update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    /// Element: `(name)`
    Element,
    /// Text: `(value)`
    Text,
    /// Attribute: `(name, value)`
    Attribute,
    /// Comment: `(value)`
    Comment,
    /// Processing instruction: `(name, value)`
    Pi,
    /// XML fragment: `(xml)`, insert only
    Fragment,
}

impl UpdateKind {
    /// All kinds, in keyword order.
    pub const ALL: [UpdateKind; 6] = [
        UpdateKind::Element,
        UpdateKind::Text,
        UpdateKind::Attribute,
        UpdateKind::Comment,
        UpdateKind::Pi,
        UpdateKind::Fragment,
    ];

    /// Upper-case keyword
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateKind::Element => "ELEMENT",
            UpdateKind::Text => "TEXT",
            UpdateKind::Attribute => "ATTRIBUTE",
            UpdateKind::Comment => "COMMENT",
            UpdateKind::Pi => "PI",
            UpdateKind::Fragment => "FRAGMENT",
        }
    }

    /// Number of values this kind takes
    pub fn arity(self) -> usize {
        match self {
            UpdateKind::Attribute | UpdateKind::Pi => 2,
            _ => 1,
        }
    }

    fn check_values(self, values: &[String]) -> Result<()> {
        if values.len() != self.arity() {
            return Err(Error::validation(format!(
                "{} expects {} value(s), got {}",
                self,
                self.arity(),
                values.len()
            )));
        }
        match self {
            UpdateKind::Element | UpdateKind::Attribute | UpdateKind::Pi => qname(&values[0]),
            UpdateKind::Fragment => non_empty("fragment", &values[0]),
            UpdateKind::Text | UpdateKind::Comment => Ok(()),
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UpdateKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown node kind '{}'", s)))
    }
}

// =============================================================================
// Options
// =============================================================================

/// Session option changed by `Set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOption {
    /// Report query timings
    Info,
    /// Drop whitespace-only text when parsing
    Chop,
    /// Number of query evaluations
    Runs,
}

/// Parsed option value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    /// `INFO`/`CHOP`
    Flag(bool),
    /// `RUNS`
    Count(u32),
}

impl SetOption {
    /// Upper-case keyword
    pub fn as_str(self) -> &'static str {
        match self {
            SetOption::Info => "INFO",
            SetOption::Chop => "CHOP",
            SetOption::Runs => "RUNS",
        }
    }

    /// Parse `value` for this option
    pub fn parse_value(self, value: &str) -> Result<OptionValue> {
        let value = value.trim();
        match self {
            SetOption::Info | SetOption::Chop => parse_flag(value)
                .map(OptionValue::Flag)
                .ok_or_else(|| {
                    Error::validation(format!("{} expects on/off, got '{}'", self.as_str(), value))
                }),
            SetOption::Runs => match value.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(OptionValue::Count(n)),
                _ => Err(Error::validation(format!(
                    "RUNS expects a positive integer, got '{}'",
                    value
                ))),
            },
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" => Some(true),
        "off" | "false" => Some(false),
        _ => None,
    }
}

impl FromStr for SetOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        [SetOption::Info, SetOption::Chop, SetOption::Runs]
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown option '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keywords_case_insensitive() {
        for s in ["fragment", "FRAGMENT", "Fragment"] {
            assert_eq!(s.parse::<UpdateKind>().unwrap(), UpdateKind::Fragment);
        }
        assert_eq!("pi".parse::<UpdateKind>().unwrap(), UpdateKind::Pi);
        assert!("node".parse::<UpdateKind>().is_err());
    }

    #[test]
    fn test_permission_table() {
        assert_eq!(Command::Kill.required_permission(), Permission::Admin);
        assert_eq!(
            Command::XQuery { query: "1".into() }.required_permission(),
            Permission::Standard
        );
        assert_eq!(
            Command::Delete { target: "/".into() }.required_permission(),
            Permission::Write
        );
        assert_eq!(Command::Close.required_permission(), Permission::Read);
    }

    #[test]
    fn test_write_commands() {
        assert!(Command::Delete { target: "/".into() }.is_write());
        assert!(Command::DropDb { name: "x".into() }.is_write());
        assert!(!Command::XQuery { query: "1".into() }.is_write());
        assert!(!Command::Set {
            option: "info".into(),
            value: "on".into(),
        }
        .is_write());
        assert!(!Command::Kill.is_write());
    }

    #[test]
    fn test_insert_arity() {
        let cmd = Command::Insert {
            kind: "attribute".into(),
            target: "//a".into(),
            position: None,
            values: vec!["name".into()],
        };
        assert!(matches!(cmd.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_update_rejects_fragment_and_bad_names() {
        let frag = Command::Update {
            kind: "fragment".into(),
            target: "//a".into(),
            values: vec!["<x/>".into()],
        };
        assert!(frag.validate().is_err());
        let bad = Command::Update {
            kind: "ELEMENT".into(),
            target: "//a".into(),
            values: vec!["in valid".into()],
        };
        assert!(bad.validate().is_err());
        let empty = Command::Update {
            kind: "ELEMENT".into(),
            target: "//a".into(),
            values: vec!["".into()],
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_set_values() {
        assert_eq!(
            SetOption::Info.parse_value("ON").unwrap(),
            OptionValue::Flag(true)
        );
        assert_eq!(
            SetOption::Chop.parse_value("false").unwrap(),
            OptionValue::Flag(false)
        );
        assert_eq!(SetOption::Runs.parse_value("3").unwrap(), OptionValue::Count(3));
        assert!(SetOption::Runs.parse_value("true").is_err());
        assert!(SetOption::Runs.parse_value("0").is_err());
        assert!("runs".parse::<SetOption>().is_ok());
        assert!("verbose".parse::<SetOption>().is_err());
    }

    #[test]
    fn test_validation_ignores_state() {
        assert!(Command::DropDb { name: "".into() }.validate().is_err());
        assert!(Command::Delete { target: " ".into() }.validate().is_err());
        assert!(Command::CreateDb {
            input: "".into(),
            name: None
        }
        .validate()
        .is_err());
        assert!(Command::Open {
            name: "input.xml".into()
        }
        .validate()
        .is_ok());
    }
}
