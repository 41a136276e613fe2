//! Access control for ArborDB sessions.
//!
//! This crate provides the [`Permission`] scale and the [`Identity`] a session
//! runs under. Every command declares the lowest permission it needs; a
//! session may run it only if its identity ranks at least that high.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered permission scale.
///
/// `None < Read < Write < Standard < Admin`. A higher level implies every
/// lower one: `Standard` covers everything an ordinary user does (queries,
/// creating and dropping databases), `Write` only content updates on
/// databases someone else created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Permission {
    /// No access at all.
    None,
    /// Open databases and inspect them.
    Read,
    /// Modify database content.
    Write,
    /// Regular user: queries, database lifecycle, options.
    #[default]
    Standard,
    /// Administration: session control.
    Admin,
}

impl Permission {
    /// All levels in ascending order.
    pub const ALL: [Permission; 5] = [
        Permission::None,
        Permission::Read,
        Permission::Write,
        Permission::Standard,
        Permission::Admin,
    ];

    /// Whether this level satisfies `required`.
    #[inline]
    pub fn allows(self, required: Permission) -> bool {
        self >= required
    }

    /// Upper-case keyword used in messages and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::None => "NONE",
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::Standard => "STANDARD",
            Permission::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a permission keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission '{0}' (expected none, read, write, standard or admin)")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    /// Keywords are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// The authenticated user a session acts for.
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User name.
    pub user: String,
    /// Granted permission level.
    pub permission: Permission,
}

impl Identity {
    /// Create an identity.
    pub fn new(user: impl Into<String>, permission: Permission) -> Self {
        Self {
            user: user.into(),
            permission,
        }
    }

    /// The built-in administrator.
    pub fn admin() -> Self {
        Self::new("admin", Permission::Admin)
    }

    /// Whether this identity may run something requiring `required`.
    pub fn allows(&self, required: Permission) -> bool {
        self.permission.allows(required)
    }
}
