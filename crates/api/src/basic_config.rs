//! Client bootstrap info: app name and login links, merged with the caller's
//! session when one can be found.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use rfapi_acl::{EndpointSettings, RightsGrant};

use crate::config::{ApiConfig, LoginUrls};
use crate::request::ApiRequest;
use crate::response::ApiError;
use crate::router::Api;
use crate::session::{JwtSessionResolver, Session, SessionError, SessionStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub app: String,
    pub login_url: String,
    pub login_main_url: String,
    pub terms_and_policy_link: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_login: bool,
    /// Session identity without its group memberships.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<RightsGrant>,
}

impl BasicInfo {
    fn with_session(mut self, session: Session) -> Self {
        let mut user = session.user;
        if let Some(fields) = user.as_object_mut() {
            fields.remove("groups");
        }
        self.user = Some(user);
        self.rights = Some(session.rights);
        self
    }
}

#[derive(Clone)]
pub struct BasicConfig {
    app: String,
    login: LoginUrls,
    has_login: bool,
    sessions: Arc<JwtSessionResolver>,
}

impl BasicConfig {
    pub fn new(app: impl Into<String>, login: LoginUrls, sessions: Arc<JwtSessionResolver>) -> Self {
        Self {
            app: app.into(),
            login,
            has_login: false,
            sessions,
        }
    }

    pub fn from_config(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Self {
        let sessions = JwtSessionResolver::new(config.session_secret.as_bytes(), store);
        Self::new(config.app_name.clone(), config.login.clone(), Arc::new(sessions))
    }

    /// Advertise that this app serves its own login.
    pub fn with_login(mut self) -> Self {
        self.has_login = true;
        self
    }

    /// Info handed out without a session.
    pub fn info(&self) -> BasicInfo {
        BasicInfo {
            app: self.app.clone(),
            login_url: self.login.login_url(),
            login_main_url: self.login.main.clone(),
            terms_and_policy_link: self.login.terms_and_policy_link.clone(),
            has_login: self.has_login,
            user: None,
            rights: None,
        }
    }

    /// Info for the presented token.
    ///
    /// Without a token, or when the token has no session, the plain info is
    /// returned. A token that fails verification is an error.
    pub fn for_token(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<BasicInfo, SessionError> {
        let Some(token) = token else {
            return Ok(self.info());
        };

        match self.sessions.verify(token, now) {
            Ok(session) => Ok(self.info().with_session(session)),
            Err(SessionError::NotFound) => {
                tracing::debug!("no session for token; serving basic config only");
                Ok(self.info())
            }
            Err(e) => {
                tracing::warn!("bad token: {e}");
                Err(e)
            }
        }
    }
}

impl Api {
    /// Mount the public `GET /<name>` endpoint serving [`BasicInfo`].
    pub fn basic_config(self, name: &str, basic: BasicConfig) -> Self {
        self.get(name, EndpointSettings::public(), move |req: ApiRequest, _| {
            let basic = basic.clone();
            async move {
                basic
                    .for_token(req.token.as_deref(), Utc::now())
                    .map_err(|e| ApiError::authorization_required(format!("Bad token: {e}")))
            }
        })
    }
}
