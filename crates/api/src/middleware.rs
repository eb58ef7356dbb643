//! Per-endpoint access check, run before every handler.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};

use rfapi_acl::{AccessRequest, Authorizer, EndpointSettings, Operation};

use crate::context::{RequestContext, RequestId};
use crate::response::denial_response;
use crate::session::SessionResolver;

/// Header carrying the internal service-to-service token.
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Per-endpoint state for [`access_middleware`].
#[derive(Clone)]
pub struct AccessGuard {
    pub endpoint: Arc<str>,
    pub settings: Arc<EndpointSettings>,
    pub operation: Operation,
    pub authorizer: Arc<Authorizer>,
    pub sessions: Arc<dyn SessionResolver>,
}

pub async fn access_middleware(
    State(guard): State<AccessGuard>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = RequestId::new();
    if !guard.settings.log_disabled {
        tracing::info!(%request_id, "{}: {}", req.method(), guard.endpoint);
    }

    let token = extract_bearer(req.headers()).map(str::to_owned);
    let resolved = guard.sessions.resolve(token.as_deref()).await;

    let access = AccessRequest::new(&guard.settings, guard.operation)
        .with_internal_token(extract_internal_token(req.headers()))
        .with_origin(peer_ip(req.extensions()));

    match guard.authorizer.evaluate(&access, &resolved.state) {
        Ok(grant) => {
            tracing::debug!(%request_id, reason = ?grant.reason, "request allowed");
            req.extensions_mut().insert(RequestContext {
                request_id,
                grant,
                session: resolved.session,
                token,
            });
            next.run(req).await
        }
        Err(denial) => {
            tracing::warn!(
                %request_id,
                endpoint = %guard.endpoint,
                status = denial.status_code(),
                code = denial.code(),
                "request denied: {denial}"
            );
            denial_response(denial)
        }
    }
}

/// Bearer token from `Authorization`, if well-formed and non-empty.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub fn extract_internal_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Peer address, available when served with connect info.
pub fn peer_ip(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
