//! Dotted-integer recommendation numbers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation number such as `1.1.1` or `5.2.14`
///
/// Ordering compares components left to right, so `1.9 < 1.10` and
/// `1.1 < 1.1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecommendationNumber {
    /// Number components (e.g., [1, 2, 3] for "1.2.3")
    pub parts: Vec<u32>,
}

impl RecommendationNumber {
    /// Parse a dotted-integer identifier
    ///
    /// Every component must be a positive integer. Examples:
    /// "1.1" -> [1, 1], "2.3.10" -> [2, 3, 10]. "1..2", "1.0" and "" are
    /// rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Option<Vec<u32>> = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u32>().ok().filter(|n| *n > 0)
            })
            .collect();

        parts.map(|parts| Self { parts })
    }
}

impl fmt::Display for RecommendationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self
            .parts
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl TryFrom<String> for RecommendationNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid recommendation number '{}'", value))
    }
}

impl From<RecommendationNumber> for String {
    fn from(number: RecommendationNumber) -> Self {
        number.to_string()
    }
}
