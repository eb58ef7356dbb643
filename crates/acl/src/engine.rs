use std::net::IpAddr;

use subtle::ConstantTimeEq;

use crate::resolve::resolve_sections;
use crate::{
    AllowReason, AuthDecision, Denial, EndpointSettings, Grant, Operation, PermissionSet,
    SessionState, TrustedOrigins,
};

/// What is being asked of an endpoint, as seen by the access check.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub settings: &'a EndpointSettings,
    pub operation: Operation,
    /// Internal token presented by the caller, if any.
    pub internal_token: Option<&'a str>,
    /// Network origin of the caller, if known.
    pub origin: Option<IpAddr>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(settings: &'a EndpointSettings, operation: Operation) -> Self {
        Self {
            settings,
            operation,
            internal_token: None,
            origin: None,
        }
    }

    pub fn with_internal_token(mut self, token: Option<&'a str>) -> Self {
        self.internal_token = token;
        self
    }

    pub fn with_origin(mut self, origin: Option<IpAddr>) -> Self {
        self.origin = origin;
        self
    }
}

/// Access-control decision engine for one application.
///
/// Holds no per-request state; share it freely across requests.
#[derive(Debug, Clone)]
pub struct Authorizer {
    app_name: String,
    trusted: TrustedOrigins,
}

impl Authorizer {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            trusted: TrustedOrigins::none(),
        }
    }

    pub fn with_trusted_origins(mut self, trusted: TrustedOrigins) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn trusted_origins(&self) -> &TrustedOrigins {
        &self.trusted
    }

    /// Decide whether `request` may proceed under `session`.
    ///
    /// - No IO
    /// - No panics
    /// - Same inputs, same decision
    ///
    /// Checks run in a fixed order: internal bypass, public opt-out, missing
    /// section (fail closed), token validity, application grant, section
    /// permissions. The first check that settles the request wins.
    pub fn evaluate(&self, request: &AccessRequest<'_>, session: &SessionState) -> AuthDecision {
        if self.is_internal_bypass(request) {
            return Ok(Grant::new(PermissionSet::full(), AllowReason::InternalBypass));
        }

        if request.settings.is_public() {
            return Ok(Grant::new(PermissionSet::none(), AllowReason::Public));
        }

        let Some(section) = request.settings.declared_section() else {
            return Err(Denial::NoSectionDefined);
        };

        if !session.token_valid {
            return Err(if session.token_present {
                Denial::TokenExpired
            } else {
                Denial::TokenMissing
            });
        }

        let app_rights = session
            .rights
            .as_ref()
            .and_then(|rights| rights.app(&self.app_name))
            .ok_or(Denial::NoAppAccess)?;

        let section_rights = resolve_sections(app_rights, section).ok_or(Denial::SectionNotFound)?;

        if !section_rights.access(request.operation).is_granted() {
            return Err(Denial::InsufficientPermission);
        }

        Ok(Grant::new(section_rights, AllowReason::Granted))
    }

    fn is_internal_bypass(&self, request: &AccessRequest<'_>) -> bool {
        let (Some(expected), Some(presented), Some(origin)) = (
            request.settings.internal_token.as_deref(),
            request.internal_token,
            request.origin,
        ) else {
            return false;
        };

        !expected.is_empty()
            && bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
            && self.trusted.contains(origin)
    }
}
