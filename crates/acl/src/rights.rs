//! Rights model carried by a session.
//!
//! JSON shape (one grant per session):
//!
//! ```json
//! { "erp": { "orders": { "read": ["own"], "write": false } } }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Operation;
use crate::scope::{Scope, rank_of};

/// One side (`read` or `write`) of a [`PermissionSet`].
///
/// `false` and an empty token list both mean "no access"; any non-empty list
/// is access, whatever its tokens are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    None,
    Scopes(Vec<String>),
}

impl Access {
    pub fn scopes<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Scopes(tokens.into_iter().map(Into::into).collect())
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            Self::None => &[],
            Self::Scopes(tokens) => tokens,
        }
    }

    pub fn is_granted(&self) -> bool {
        !self.tokens().is_empty()
    }

    /// Highest scope rank among the tokens; `None` when no access is granted.
    pub fn highest_rank(&self) -> Option<u8> {
        self.tokens().iter().map(|t| rank_of(t)).max()
    }

    pub fn includes(&self, scope: Scope) -> bool {
        self.tokens().iter().any(|t| t == scope.as_str())
    }
}

impl Serialize for Access {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_bool(false),
            Self::Scopes(tokens) => tokens.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccess {
    Flag(bool),
    Scopes(Vec<String>),
}

impl<'de> Deserialize<'de> for Access {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawAccess>::deserialize(deserializer)? {
            None | Some(RawAccess::Flag(false)) => Ok(Self::None),
            Some(RawAccess::Flag(true)) => Err(serde::de::Error::custom(
                "`true` is not an access value; grant a list of scope tokens instead",
            )),
            Some(RawAccess::Scopes(tokens)) => Ok(Self::Scopes(tokens)),
        }
    }
}

/// Read and write access to one section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub read: Access,
    #[serde(default)]
    pub write: Access,
}

impl PermissionSet {
    pub fn new(read: Access, write: Access) -> Self {
        Self { read, write }
    }

    /// No access of either kind.
    pub fn none() -> Self {
        Self::default()
    }

    /// Unrestricted access of both kinds.
    pub fn full() -> Self {
        Self::new(
            Access::scopes([Scope::All.as_str()]),
            Access::scopes([Scope::All.as_str()]),
        )
    }

    pub fn access(&self, operation: Operation) -> &Access {
        match operation {
            Operation::Read => &self.read,
            Operation::Write => &self.write,
        }
    }
}

/// Section name → permissions, for one application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionRights(HashMap<String, PermissionSet>);

impl SectionRights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: impl Into<String>, permissions: PermissionSet) -> Self {
        self.0.insert(section.into(), permissions);
        self
    }

    pub fn get(&self, section: &str) -> Option<&PermissionSet> {
        self.0.get(section)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, PermissionSet)> for SectionRights {
    fn from_iter<I: IntoIterator<Item = (S, PermissionSet)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Application name → section rights. Owned by the session, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightsGrant(HashMap<String, SectionRights>);

impl RightsGrant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: impl Into<String>, sections: SectionRights) -> Self {
        self.0.insert(app.into(), sections);
        self
    }

    pub fn app(&self, app: &str) -> Option<&SectionRights> {
        self.0.get(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn false_and_empty_list_are_both_no_access() {
        assert!(!Access::None.is_granted());
        assert!(!Access::Scopes(vec![]).is_granted());
        assert!(Access::scopes(["-"]).is_granted());
    }

    #[test]
    fn unknown_tokens_still_grant_access() {
        let access = Access::scopes(["legacy"]);
        assert!(access.is_granted());
        assert_eq!(access.highest_rank(), Some(0));
    }

    #[test]
    fn highest_rank_picks_broadest_token() {
        assert_eq!(Access::scopes(["own", "group", "account"]).highest_rank(), Some(3));
        assert_eq!(Access::None.highest_rank(), None);
    }

    #[test]
    fn permission_set_from_json() {
        let set: PermissionSet =
            serde_json::from_value(json!({ "read": ["own", "all"], "write": false })).unwrap();
        assert_eq!(set.read, Access::scopes(["own", "all"]));
        assert_eq!(set.write, Access::None);
        assert!(set.read.includes(Scope::All));
    }

    #[test]
    fn missing_and_null_sides_mean_no_access() {
        let set: PermissionSet = serde_json::from_value(json!({ "read": null })).unwrap();
        assert_eq!(set, PermissionSet::none());
    }

    #[test]
    fn true_is_rejected() {
        let err = serde_json::from_value::<PermissionSet>(json!({ "read": true, "write": false }));
        assert!(err.is_err());
    }

    #[test]
    fn access_serializes_back_to_false_or_list() {
        let set = PermissionSet::new(Access::scopes(["own"]), Access::None);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({ "read": ["own"], "write": false })
        );
    }

    #[test]
    fn rights_grant_from_json() {
        let grant: RightsGrant = serde_json::from_value(json!({
            "erp": { "orders": { "read": ["own"], "write": false } }
        }))
        .unwrap();

        let orders = grant.app("erp").and_then(|s| s.get("orders")).unwrap();
        assert_eq!(orders.read, Access::scopes(["own"]));
        assert!(grant.app("crm").is_none());
    }
}
