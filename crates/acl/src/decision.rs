use serde::Serialize;
use thiserror::Error;

use crate::{Operation, PermissionSet, Scope};

/// Outcome of an access-control evaluation.
pub type AuthDecision = Result<Grant, Denial>;

/// Why a request was let through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    /// Trusted internal caller presented the endpoint's internal token.
    InternalBypass,
    /// Endpoint is explicitly public.
    Public,
    /// Session rights cover the required operation.
    Granted,
}

/// A successful decision with the effective rights for the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub section_rights: PermissionSet,
    pub read_admin: bool,
    pub write_admin: bool,
    pub reason: AllowReason,
}

impl Grant {
    /// Build a grant, deriving the admin flags from the `"all"` scope.
    pub fn new(section_rights: PermissionSet, reason: AllowReason) -> Self {
        Self {
            read_admin: section_rights.read.includes(Scope::All),
            write_admin: section_rights.write.includes(Scope::All),
            section_rights,
            reason,
        }
    }

    pub fn is_admin_for(&self, operation: Operation) -> bool {
        match operation {
            Operation::Read => self.read_admin,
            Operation::Write => self.write_admin,
        }
    }
}

/// Every way a request can be denied.
///
/// The first two are authentication problems (401); the rest are
/// authorization problems (403).
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Denial {
    #[error("token missing")]
    TokenMissing,

    #[error("token expired")]
    TokenExpired,

    #[error("no access to this app")]
    NoAppAccess,

    #[error("no section defined; protected by default")]
    NoSectionDefined,

    #[error("insufficient permissions")]
    SectionNotFound,

    #[error("insufficient permissions")]
    InsufficientPermission,
}

impl Denial {
    /// HTTP-style status: 401 or 403.
    pub const fn status_code(self) -> u16 {
        if self.is_authentication() { 401 } else { 403 }
    }

    pub const fn is_authentication(self) -> bool {
        matches!(self, Self::TokenMissing | Self::TokenExpired)
    }

    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::TokenMissing => "token_missing",
            Self::TokenExpired => "token_expired",
            Self::NoAppAccess => "no_app_access",
            Self::NoSectionDefined => "no_section_defined",
            Self::SectionNotFound => "section_not_found",
            Self::InsufficientPermission => "insufficient_permission",
        }
    }
}
