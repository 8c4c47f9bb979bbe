use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a word's priority moves when it is promoted. Fixed per trie.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// +1 per use; equal counts keep whichever word got there first.
    #[default]
    Frequency,
    /// Priority becomes a per-trie clock value, so the latest use wins.
    Recency,
}

impl RankingPolicy {
    pub const ALL: [RankingPolicy; 2] = [RankingPolicy::Frequency, RankingPolicy::Recency];

    pub fn as_str(self) -> &'static str {
        match self {
            RankingPolicy::Frequency => "frequency",
            RankingPolicy::Recency => "recency",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" | "freq" => Ok(RankingPolicy::Frequency),
            "recency" | "recent" => Ok(RankingPolicy::Recency),
            other => Err(format!(
                "unknown ranking policy '{other}' (expected frequency or recency)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("frequency".parse(), Ok(RankingPolicy::Frequency));
        assert_eq!("FREQ".parse(), Ok(RankingPolicy::Frequency));
        assert_eq!(" Recent ".parse(), Ok(RankingPolicy::Recency));
        assert!("lru".parse::<RankingPolicy>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&RankingPolicy::Recency).unwrap();
        assert_eq!(json, "\"recency\"");
        let parsed: RankingPolicy = serde_json::from_str("\"frequency\"").unwrap();
        assert_eq!(parsed, RankingPolicy::Frequency);
    }
}
