//! `rfapi-acl`: section-based access control for API endpoints.
//!
//! This crate is intentionally decoupled from HTTP, storage and logging: it
//! maps an already resolved session to an allow/deny decision.

pub mod decision;
pub mod engine;
pub mod operation;
pub mod origin;
pub mod resolve;
pub mod rights;
pub mod scope;
pub mod session;
pub mod settings;

pub use decision::{AllowReason, AuthDecision, Denial, Grant};
pub use engine::{AccessRequest, Authorizer};
pub use operation::Operation;
pub use origin::TrustedOrigins;
pub use rights::{Access, PermissionSet, RightsGrant, SectionRights};
pub use scope::Scope;
pub use session::SessionState;
pub use settings::{EndpointSettings, SectionSpec};
