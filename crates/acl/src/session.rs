use crate::RightsGrant;

/// Session facts the decision needs, produced once per request by whatever
/// verifies tokens and looks sessions up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub token_valid: bool,
    pub token_present: bool,
    pub rights: Option<RightsGrant>,
}

impl SessionState {
    /// No token was presented.
    pub fn missing() -> Self {
        Self::default()
    }

    /// A token was presented but could not be accepted.
    pub fn expired() -> Self {
        Self {
            token_present: true,
            ..Self::default()
        }
    }

    pub fn valid(rights: RightsGrant) -> Self {
        Self {
            token_valid: true,
            token_present: true,
            rights: Some(rights),
        }
    }
}
