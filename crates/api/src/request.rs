//! Normalized request handed to endpoint handlers.
//!
//! Clients send their payload as `{"data": ...}` in the body of write calls,
//! and as base64-encoded JSON in the `data` query parameter of read calls.

use std::collections::HashMap;

use axum::{
    async_trait,
    body::{Body, to_bytes},
    extract::{FromRequest, Query},
    http::{Method, Request, request::Parts},
};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

use rfapi_acl::{Grant, RightsGrant};

use crate::context::{RequestContext, RequestId};
use crate::response::ApiError;
use crate::session::Session;

/// Upper bound for request bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Standard alphabet, padding optional.
const QUERY_DATA: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug)]
pub struct ApiRequest {
    pub request_id: RequestId,
    /// Effective rights established by the access check.
    pub grant: Grant,
    pub session: Option<Session>,
    pub token: Option<String>,
    /// Client payload; `{}` when none was sent.
    pub data: Value,
    /// Original transport parts (method, uri, headers, extensions).
    pub original: Parts,
}

impl ApiRequest {
    pub fn user(&self) -> Option<&Value> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn rights(&self) -> Option<&RightsGrant> {
        self.session.as_ref().map(|s| &s.rights)
    }

    pub fn method(&self) -> &Method {
        &self.original.method
    }

    /// Deserialize the payload into a typed value.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| ApiError::bad_request(format!("invalid data: {e}")))
    }
}

#[async_trait]
impl<S> FromRequest<S> for ApiRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let context = parts
            .extensions
            .remove::<RequestContext>()
            .ok_or_else(|| ApiError::internal("request reached a handler without an access check"))?;

        let data = if reads_from_query(&parts.method) {
            data_from_query(&parts)?
        } else {
            let bytes = to_bytes(body, MAX_BODY_BYTES)
                .await
                .map_err(|e| ApiError::bad_request(format!("unreadable body: {e}")))?;
            data_from_body(&bytes)?
        };

        Ok(Self {
            request_id: context.request_id,
            grant: context.grant,
            session: context.session,
            token: context.token,
            data,
            original: parts,
        })
    }
}

/// `GET` routes also answer `HEAD`; every other mounted route is `POST`.
fn reads_from_query(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

fn empty() -> Value {
    Value::Object(Map::new())
}

fn data_from_query(parts: &Parts) -> Result<Value, ApiError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|e| ApiError::bad_request(format!("invalid query: {e}")))?;

    match params.get("data").filter(|d| !d.is_empty()) {
        Some(encoded) => decode_query_data(encoded),
        None => Ok(empty()),
    }
}

/// Decode the base64-encoded JSON payload of a read call.
///
/// Accepts padded or unpadded input in either the standard or the URL-safe
/// alphabet.
pub fn decode_query_data(encoded: &str) -> Result<Value, ApiError> {
    // An unescaped '+' arrives as a space after query decoding.
    let normalized: String = encoded
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    let bytes = QUERY_DATA
        .decode(normalized)
        .map_err(|_| ApiError::bad_request("data parameter is not valid base64"))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::bad_request("data parameter is not valid JSON"))
}

fn data_from_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(empty());
    }
    let mut body: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("body is not valid JSON: {e}")))?;

    Ok(match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => empty(),
        Some(data) => data,
    })
}
