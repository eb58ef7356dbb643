use serde::{Deserialize, Serialize};

/// Section(s) an endpoint belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionSpec {
    Single(String),
    /// Grouped endpoint; the broadest grant across the listed sections applies.
    Many(Vec<String>),
}

impl SectionSpec {
    /// `false` for `""` and `[]`, which count as "no section".
    pub fn is_declared(&self) -> bool {
        match self {
            Self::Single(name) => !name.is_empty(),
            Self::Many(names) => !names.is_empty(),
        }
    }
}

/// Access-control settings declared per endpoint at route registration.
///
/// # Invariants
/// - Without a declared section, and unless `permission` is explicitly
///   `Some(false)`, every request to the endpoint is denied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionSpec>,

    /// `Some(false)` marks the endpoint public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<bool>,

    /// Shared secret that lets trusted internal callers skip session checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_token: Option<String>,

    #[serde(default)]
    pub log_disabled: bool,
}

impl EndpointSettings {
    /// Settings with nothing declared: protected by default.
    pub fn protected() -> Self {
        Self::default()
    }

    pub fn section(name: impl Into<String>) -> Self {
        Self {
            section: Some(SectionSpec::Single(name.into())),
            ..Self::default()
        }
    }

    pub fn sections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            section: Some(SectionSpec::Many(names.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    pub fn public() -> Self {
        Self {
            permission: Some(false),
            ..Self::default()
        }
    }

    pub fn with_internal_token(mut self, token: impl Into<String>) -> Self {
        self.internal_token = Some(token.into());
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.log_disabled = true;
        self
    }

    pub fn is_public(&self) -> bool {
        self.permission == Some(false)
    }

    pub fn declared_section(&self) -> Option<&SectionSpec> {
        self.section.as_ref().filter(|s| s.is_declared())
    }
}
