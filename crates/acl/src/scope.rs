/// Breadth of a granted permission.
///
/// Scope tokens travel as plain strings inside a [`crate::PermissionSet`];
/// this enum is the ranked vocabulary used to compare them. Declaration order
/// is rank order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// `"-"`: granted, but without any particular breadth.
    Unscoped,
    /// `"own"`: records owned by the caller.
    Own,
    /// `"account"`: records of the caller's account.
    Account,
    /// `"group"`: records of the caller's groups.
    Group,
    /// `"all"`: every record; the admin scope.
    All,
}

impl Scope {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "-" => Some(Self::Unscoped),
            "own" => Some(Self::Own),
            "account" => Some(Self::Account),
            "group" => Some(Self::Group),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unscoped => "-",
            Self::Own => "own",
            Self::Account => "account",
            Self::Group => "group",
            Self::All => "all",
        }
    }

    pub const fn rank(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank of a raw scope token. Unknown tokens rank like `"-"`.
pub fn rank_of(token: &str) -> u8 {
    Scope::parse(token).map_or(0, Scope::rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_vocabulary_order() {
        let ranks: Vec<u8> = ["-", "own", "account", "group", "all"]
            .iter()
            .map(|t| rank_of(t))
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn unknown_tokens_rank_zero() {
        assert_eq!(rank_of("everything"), 0);
        assert_eq!(rank_of(""), 0);
        assert_eq!(rank_of("ALL"), 0);
    }

    #[test]
    fn parse_round_trips_through_as_str() {
        for scope in [Scope::Unscoped, Scope::Own, Scope::Account, Scope::Group, Scope::All] {
            assert_eq!(Scope::parse(scope.as_str()), Some(scope));
        }
    }
}
