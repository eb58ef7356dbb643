use serde::{Deserialize, Serialize};

/// Kind of access a request needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// Derive the operation from an HTTP verb.
    ///
    /// Retrieval verbs (`GET`, `HEAD`, `OPTIONS`) read; everything else writes.
    /// The HTTP router only mounts `GET` (which also answers `HEAD`) and
    /// `POST`, so this mapping matters to callers evaluating other verbs.
    pub fn from_method(method: &str) -> Self {
        if ["GET", "HEAD", "OPTIONS"]
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
        {
            Self::Read
        } else {
            Self::Write
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
