//! Request-scoped context established by the access check.

use serde::Serialize;
use uuid::Uuid;

use rfapi_acl::Grant;

use crate::session::Session;

/// Correlation id for one request, echoed in logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What the access middleware established about a request.
///
/// Inserted into request extensions once the request is allowed; immutable
/// from then on.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub grant: Grant,
    pub session: Option<Session>,
    pub token: Option<String>,
}
