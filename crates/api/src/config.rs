//! Process configuration, read from `RFAPI_*` environment variables.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use rfapi_acl::{Authorizer, TrustedOrigins};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_SESSION_SECRET: &str = "dev-session-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where clients send users to log in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginUrls {
    /// Base URL of the login application.
    pub main: String,
    /// Login page path, appended to `main`.
    pub login: String,
    pub terms_and_policy_link: String,
}

impl LoginUrls {
    pub fn login_url(&self) -> String {
        format!("{}{}", self.main, self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Top-level key into every session's rights grant.
    pub app_name: String,
    pub bind_addr: SocketAddr,
    /// HS256 secret used to verify session tokens.
    pub session_secret: String,
    /// Origins allowed to use internal tokens, besides the ranges below.
    pub trusted_addrs: Vec<IpAddr>,
    /// Off by default. Behind a same-host reverse proxy every caller
    /// arrives from loopback, so enabling this would let the internal
    /// token alone grant access.
    pub trust_loopback: bool,
    pub trust_private: bool,
    pub login: LoginUrls,
}

impl ApiConfig {
    /// Defaults for everything except the application name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_secret: DEV_SESSION_SECRET.to_string(),
            trusted_addrs: Vec::new(),
            trust_loopback: false,
            trust_private: false,
            login: LoginUrls::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let app_name = var("RFAPI_APP_NAME").ok_or(ConfigError::Missing("RFAPI_APP_NAME"))?;

        let bind_addr = var("RFAPI_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "RFAPI_BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let session_secret = var("RFAPI_SESSION_SECRET").unwrap_or_else(|| {
            tracing::warn!("RFAPI_SESSION_SECRET not set; using insecure dev default");
            DEV_SESSION_SECRET.to_string()
        });

        let trusted_addrs = match var("RFAPI_TRUSTED_ADDRS") {
            Some(list) => parse_addrs(&list)?,
            None => Vec::new(),
        };

        Ok(Self {
            app_name: app_name.trim().to_string(),
            bind_addr,
            session_secret,
            trusted_addrs,
            trust_loopback: parse_flag("RFAPI_TRUST_LOOPBACK", var("RFAPI_TRUST_LOOPBACK"), false)?,
            trust_private: parse_flag("RFAPI_TRUST_PRIVATE", var("RFAPI_TRUST_PRIVATE"), false)?,
            login: LoginUrls {
                main: var("RFAPI_LOGIN_MAIN_URL").unwrap_or_default(),
                login: var("RFAPI_LOGIN_PATH").unwrap_or_default(),
                terms_and_policy_link: var("RFAPI_TERMS_URL").unwrap_or_default(),
            },
        })
    }

    pub fn trusted_origins(&self) -> TrustedOrigins {
        TrustedOrigins::none()
            .trust_loopback(self.trust_loopback)
            .trust_private(self.trust_private)
            .with_addrs(self.trusted_addrs.iter().copied())
    }

    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(self.app_name.clone()).with_trusted_origins(self.trusted_origins())
    }
}

fn parse_addrs(list: &str) -> Result<Vec<IpAddr>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Invalid {
                name: "RFAPI_TRUSTED_ADDRS",
                value: s.to_string(),
            })
        })
        .collect()
}

fn parse_flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn app_name_is_required() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("RFAPI_APP_NAME"));
    }

    #[test]
    fn defaults_apply() {
        let config = ApiConfig::from_lookup(lookup(&[("RFAPI_APP_NAME", "erp")])).unwrap();
        assert_eq!(config, ApiConfig::new("erp"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn loopback_is_untrusted_unless_enabled() {
        let config = ApiConfig::from_lookup(lookup(&[("RFAPI_APP_NAME", "erp")])).unwrap();
        assert!(!config.trust_loopback);
        assert!(!config.trusted_origins().contains("127.0.0.1".parse().unwrap()));

        let config = ApiConfig::from_lookup(lookup(&[
            ("RFAPI_APP_NAME", "erp"),
            ("RFAPI_TRUST_LOOPBACK", "true"),
        ]))
        .unwrap();
        assert!(config.trusted_origins().contains("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn all_settings_are_read() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("RFAPI_APP_NAME", "erp"),
            ("RFAPI_BIND_ADDR", "127.0.0.1:9000"),
            ("RFAPI_SESSION_SECRET", "top-secret"),
            ("RFAPI_TRUSTED_ADDRS", "10.0.0.7, 10.0.0.8,"),
            ("RFAPI_TRUST_LOOPBACK", "false"),
            ("RFAPI_TRUST_PRIVATE", "yes"),
            ("RFAPI_LOGIN_MAIN_URL", "https://login.example.com"),
            ("RFAPI_LOGIN_PATH", "/login"),
            ("RFAPI_TERMS_URL", "https://example.com/terms"),
        ]))
        .unwrap();

        assert_eq!(config.login.login_url(), "https://login.example.com/login");
        assert_eq!(config.login.terms_and_policy_link, "https://example.com/terms");

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.session_secret, "top-secret");
        assert_eq!(config.trusted_addrs.len(), 2);
        assert!(!config.trust_loopback);
        assert!(config.trust_private);

        let trusted = config.trusted_origins();
        assert!(trusted.contains("10.0.0.7".parse().unwrap()));
        assert!(!trusted.contains("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let bad_addr = ApiConfig::from_lookup(lookup(&[
            ("RFAPI_APP_NAME", "erp"),
            ("RFAPI_TRUSTED_ADDRS", "10.0.0.300"),
        ]));
        assert!(matches!(bad_addr, Err(ConfigError::Invalid { name: "RFAPI_TRUSTED_ADDRS", .. })));

        let bad_flag = ApiConfig::from_lookup(lookup(&[
            ("RFAPI_APP_NAME", "erp"),
            ("RFAPI_TRUST_PRIVATE", "maybe"),
        ]));
        assert!(matches!(bad_flag, Err(ConfigError::Invalid { name: "RFAPI_TRUST_PRIVATE", .. })));

        let bad_bind = ApiConfig::from_lookup(lookup(&[
            ("RFAPI_APP_NAME", "erp"),
            ("RFAPI_BIND_ADDR", "localhost"),
        ]));
        assert!(matches!(bad_bind, Err(ConfigError::Invalid { name: "RFAPI_BIND_ADDR", .. })));
    }
}
