//! Applicability tier attached to a recommendation number

use serde::{Deserialize, Serialize};
use std::fmt;

/// Profile level token, e.g. `(L1)` on the numbering line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileLevel {
    /// Explicit tier (`L1` -> `Tier(1)`)
    Tier(u8),
    /// No tier token on the numbering line
    #[default]
    Unspecified,
}

impl ProfileLevel {
    /// Parse a level token with or without parentheses ("(L1)", "L2")
    ///
    /// An empty token is `Unspecified`; anything else that is not `L<n>`
    /// yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Some(Self::Unspecified);
        }
        let inner = token
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(token);
        inner
            .strip_prefix('L')
            .and_then(|n| n.parse::<u8>().ok())
            .map(Self::Tier)
    }
}

impl fmt::Display for ProfileLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tier(n) => write!(f, "L{}", n),
            Self::Unspecified => Ok(()),
        }
    }
}

impl TryFrom<String> for ProfileLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid profile level '{}'", value))
    }
}

impl From<ProfileLevel> for String {
    fn from(level: ProfileLevel) -> Self {
        level.to_string()
    }
}
