//! Role-based authorization gate.
//!
//! A single pure function decides whether a role may perform an action, so
//! the policy lives in one place instead of ad hoc checks per route.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary member; may issue and return items.
    Student,
    /// May additionally delete catalog items.
    Teacher,
    /// Full access, including the full ledger view.
    Admin,
}

impl Role {
    /// The role assigned at registration when none is requested.
    pub const DEFAULT: Self = Self::Student;

    /// Returns the lowercase wire representation of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Actions gated by role-based authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Register a new catalog item.
    AddBook,
    /// Issue an available item.
    IssueBook,
    /// Return an issued item.
    ReturnBook,
    /// Delete a catalog item and its ledger history.
    DeleteBook,
    /// View the caller's own ledger.
    ViewOwnLedger,
    /// View the full ledger with user enrichment.
    ViewFullLedger,
}

/// Error reported when a role may not perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("role {role} is not authorized to perform this action")]
pub struct NotAuthorized {
    /// The role that was denied.
    pub role: Role,
}

/// Decides whether `role` may perform `action`.
///
/// Any authenticated role may add, issue, and return items and view its own
/// ledger. Deleting items requires teacher or admin; the full ledger view
/// requires admin exactly. Unauthenticated callers are rejected before this
/// gate is consulted.
///
/// # Errors
///
/// Returns `NotAuthorized` when the role is not permitted.
pub const fn authorize(action: Action, role: Role) -> Result<(), NotAuthorized> {
    let allowed = match action {
        Action::AddBook | Action::IssueBook | Action::ReturnBook | Action::ViewOwnLedger => true,
        Action::DeleteBook => matches!(role, Role::Teacher | Role::Admin),
        Action::ViewFullLedger => matches!(role, Role::Admin),
    };

    if allowed { Ok(()) } else { Err(NotAuthorized { role }) }
}
