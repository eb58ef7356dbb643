//! Session resolution: bearer token → [`SessionState`] for the access check.
//!
//! Token verification and session lookup live behind [`SessionResolver`]; the
//! access check only ever sees the resulting state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rfapi_acl::{RightsGrant, SessionState};

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// A logged-in session as stored server side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Decoded identity, opaque to this crate.
    #[serde(default)]
    pub user: serde_json::Value,

    #[serde(default)]
    pub rights: RightsGrant,
}

impl Session {
    pub fn new(user: serde_json::Value, rights: RightsGrant) -> Self {
        Self { user, rights }
    }
}

/// Session lookup by token.
pub trait SessionStore: Send + Sync {
    fn find(&self, token: &str) -> Option<Session>;
}

/// In-memory store for dev/test wiring.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, session: Session) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), session);
    }

    pub fn remove(&self, token: &str) -> Option<Session> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
    }
}

impl SessionStore for InMemorySessionStore {
    fn find(&self, token: &str) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }
}

/// Result of resolving one request's token.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession {
    pub state: SessionState,
    pub session: Option<Session>,
}

impl ResolvedSession {
    fn rejected() -> Self {
        Self {
            state: SessionState::expired(),
            session: None,
        }
    }

    fn accepted(session: Session) -> Self {
        Self {
            state: SessionState::valid(session.rights.clone()),
            session: Some(session),
        }
    }
}

/// Turns the presented token (if any) into session state.
///
/// Never fails: a token that cannot be accepted yields an invalid state.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: Option<&str>) -> ResolvedSession;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("no session found")]
    NotFound,
}

/// Verifies HS256 session tokens, then looks the session up by token.
pub struct JwtSessionResolver {
    key: DecodingKey,
    validation: Validation,
    store: Arc<dyn SessionStore>,
}

impl JwtSessionResolver {
    pub fn new(secret: &[u8], store: Arc<dyn SessionStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims` so expiry is distinguishable.
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            store,
        }
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;
        self.store.find(token).ok_or(SessionError::NotFound)
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, token: Option<&str>) -> ResolvedSession {
        let Some(token) = token else {
            return ResolvedSession::default();
        };

        match self.verify(token, Utc::now()) {
            Ok(session) => ResolvedSession::accepted(session),
            Err(e) => {
                tracing::debug!("session rejected: {e}");
                ResolvedSession::rejected()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use rfapi_acl::{Access, PermissionSet, SectionRights};

    use super::*;

    const SECRET: &str = "test-secret";

    fn mint(secret: &str, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &SessionClaims::new("user-1", issued_at, expires_at),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn session() -> Session {
        Session::new(
            json!({ "name": "Alice" }),
            RightsGrant::new().with_app(
                "erp",
                SectionRights::new().with_section(
                    "orders",
                    PermissionSet::new(Access::scopes(["own"]), Access::None),
                ),
            ),
        )
    }

    fn resolver(store: Arc<InMemorySessionStore>) -> JwtSessionResolver {
        JwtSessionResolver::new(SECRET.as_bytes(), store)
    }

    #[tokio::test]
    async fn no_token_is_missing() {
        let resolved = resolver(Arc::new(InMemorySessionStore::new())).resolve(None).await;
        assert_eq!(resolved.state, SessionState::missing());
        assert!(resolved.session.is_none());
    }

    #[tokio::test]
    async fn known_session_is_valid() {
        let now = Utc::now();
        let token = mint(SECRET, now, now + Duration::minutes(10));
        let store = Arc::new(InMemorySessionStore::new());
        store.insert(token.clone(), session());

        let resolved = resolver(store).resolve(Some(&token)).await;
        assert!(resolved.state.token_valid);
        assert_eq!(resolved.state.rights, Some(session().rights));
        assert_eq!(resolved.session, Some(session()));
    }

    #[tokio::test]
    async fn expired_token_is_present_but_invalid() {
        let now = Utc::now();
        let token = mint(SECRET, now - Duration::minutes(20), now - Duration::minutes(10));
        let store = Arc::new(InMemorySessionStore::new());
        store.insert(token.clone(), session());

        let resolved = resolver(store).resolve(Some(&token)).await;
        assert_eq!(resolved.state, SessionState::expired());
    }

    #[tokio::test]
    async fn foreign_signature_is_rejected() {
        let now = Utc::now();
        let token = mint("other-secret", now, now + Duration::minutes(10));
        let store = Arc::new(InMemorySessionStore::new());
        store.insert(token.clone(), session());

        let resolved = resolver(store).resolve(Some(&token)).await;
        assert_eq!(resolved.state, SessionState::expired());
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let now = Utc::now();
        let token = mint(SECRET, now, now + Duration::minutes(10));
        let store = Arc::new(InMemorySessionStore::new());

        let verified = resolver(store.clone()).verify(&token, now);
        assert!(matches!(verified, Err(SessionError::NotFound)));

        store.insert(token.clone(), session());
        assert!(store.remove(&token).is_some());
        let resolved = resolver(store).resolve(Some(&token)).await;
        assert!(!resolved.state.token_valid);
        assert!(resolved.state.token_present);
    }

    #[test]
    fn expiry_is_reported_as_claims_error() {
        let now = Utc::now();
        let token = mint(SECRET, now - Duration::minutes(20), now - Duration::minutes(10));
        let verified = resolver(Arc::new(InMemorySessionStore::new())).verify(&token, now);
        assert!(matches!(verified, Err(SessionError::Claims(TokenValidationError::Expired))));
    }
}
