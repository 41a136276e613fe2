//! Server configuration via `arbor.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working server. Session options (`INFO`, `CHOP`, `RUNS`) start from these
//! values and are changed per session with the `Set` command.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use arbor_security::Permission;

use crate::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "arbor.toml";

/// Server configuration loaded from `arbor.toml`.
///
/// # Example
///
/// ```toml
/// query_info = false
/// chop = true
/// runs = 1
/// output_buffer = 64
/// interrupt_poll_ms = 10
/// default_permission = "standard"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArborConfig {
    /// Initial `INFO` option: report query timings.
    #[serde(default)]
    pub query_info: bool,
    /// Initial `CHOP` option: drop whitespace-only text when parsing.
    #[serde(default = "default_chop")]
    pub chop: bool,
    /// Initial `RUNS` option: evaluations per query.
    #[serde(default = "default_runs")]
    pub runs: u32,
    /// Capacity of channel-backed output sinks.
    #[serde(default = "default_output_buffer")]
    pub output_buffer: usize,
    /// How often blocked lock waits check for termination, in milliseconds.
    #[serde(default = "default_interrupt_poll_ms")]
    pub interrupt_poll_ms: u64,
    /// Permission granted to sessions opened without an explicit identity.
    #[serde(default = "default_permission_str")]
    pub default_permission: String,
}

fn default_chop() -> bool {
    true
}

fn default_runs() -> u32 {
    1
}

fn default_output_buffer() -> usize {
    64
}

fn default_interrupt_poll_ms() -> u64 {
    10
}

fn default_permission_str() -> String {
    "standard".to_string()
}

impl Default for ArborConfig {
    fn default() -> Self {
        Self {
            query_info: false,
            chop: default_chop(),
            runs: default_runs(),
            output_buffer: default_output_buffer(),
            interrupt_poll_ms: default_interrupt_poll_ms(),
            default_permission: default_permission_str(),
        }
    }
}

impl ArborConfig {
    /// Parse the default permission keyword.
    pub fn permission(&self) -> Result<Permission> {
        self.default_permission
            .parse()
            .map_err(|e: arbor_security::UnknownPermission| {
                Error::validation(format!("arbor.toml: {}", e))
            })
    }

    /// Lock wait polling interval
    pub fn interrupt_poll(&self) -> Duration {
        Duration::from_millis(self.interrupt_poll_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        self.permission()?;
        if self.runs == 0 {
            return Err(Error::validation("arbor.toml: runs must be at least 1"));
        }
        if self.output_buffer == 0 {
            return Err(Error::validation(
                "arbor.toml: output_buffer must be at least 1",
            ));
        }
        if self.interrupt_poll_ms == 0 {
            return Err(Error::validation(
                "arbor.toml: interrupt_poll_ms must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# ArborDB server configuration
#
# Report parse/compile/evaluation timings for queries (session option INFO)
query_info = false

# Drop whitespace-only text nodes when parsing documents (session option CHOP)
chop = true

# Number of times each query is evaluated (session option RUNS)
runs = 1

# Items buffered between a query and a slow output consumer
output_buffer = 64

# Milliseconds between termination checks while waiting for a database lock
interrupt_poll_ms = 10

# Permission of sessions opened without an explicit identity:
# "none", "read", "write", "standard" or "admin"
default_permission = "standard"
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Validation` if it cannot
    /// be parsed or holds out-of-range values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: ArborConfig = toml::from_str(&content).map_err(|e| {
            Error::validation(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Io {
                reason: format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }
}
