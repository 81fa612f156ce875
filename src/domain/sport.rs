//! Sport labels and their normalization from free-form input.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sport {
    Football,
    Basketball,
    Tennis,
    AmericanFootball,
    Hockey,
    Baseball,
    Esports,
    Combat,
    Other,
}

impl Sport {
    /// Two-way head-to-head markets (no regulation draw price in the
    /// generic `home`/`away` pair).
    pub fn is_moneyline_sport(self) -> bool {
        !matches!(self, Self::Football | Self::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Football => "FOOTBALL",
            Self::Basketball => "BASKETBALL",
            Self::Tennis => "TENNIS",
            Self::AmericanFootball => "AMERICAN_FOOTBALL",
            Self::Hockey => "HOCKEY",
            Self::Baseball => "BASEBALL",
            Self::Esports => "ESPORTS",
            Self::Combat => "COMBAT",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Order matters: American football labels contain "FOOTBALL".
const PATTERNS: &[(Sport, &[&str])] = &[
    (
        Sport::AmericanFootball,
        &["NFL", "AM. FOOTBALL", "AMERICAN FOOTBALL", "AMERICAN_FOOTBALL", "NCAAF"],
    ),
    (Sport::Football, &["SOCCER", "FOOTBALL", "FOCI"]),
    (
        Sport::Basketball,
        &["BASKET", "KOSAR", "KOSÁR", "NBA", "EUROLEAGUE"],
    ),
    (Sport::Tennis, &["TENNIS", "ATP", "WTA"]),
    (Sport::Hockey, &["HOCKEY", "NHL"]),
    (Sport::Baseball, &["BASEBALL", "MLB"]),
    (Sport::Esports, &["ESPORT"]),
    (Sport::Combat, &["MMA", "UFC", "BOXING"]),
];

/// Map a free-form sport label onto [`Sport`].
///
/// Empty input defaults to football; anything unrecognised is `Other`.
pub fn normalize_sport(raw: &str) -> Sport {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return Sport::Football;
    }

    PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| upper.contains(n)))
        .map_or_else(
            || {
                warn!(sport = %raw, "unrecognised sport label, using fallback model");
                Sport::Other
            },
            |(sport, _)| *sport,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sport_labels() {
        assert_eq!(normalize_sport("Soccer"), Sport::Football);
        assert_eq!(normalize_sport("foci"), Sport::Football);
        assert_eq!(normalize_sport("NBA"), Sport::Basketball);
        assert_eq!(normalize_sport("Kosárlabda"), Sport::Basketball);
        assert_eq!(normalize_sport("ATP Tour"), Sport::Tennis);
        assert_eq!(normalize_sport("NHL"), Sport::Hockey);
        assert_eq!(normalize_sport("mlb"), Sport::Baseball);
        assert_eq!(normalize_sport("eSports"), Sport::Esports);
        assert_eq!(normalize_sport("UFC 300"), Sport::Combat);
    }

    #[test]
    fn test_american_football_wins_over_football() {
        assert_eq!(normalize_sport("American Football"), Sport::AmericanFootball);
        assert_eq!(normalize_sport("Am. Football"), Sport::AmericanFootball);
        assert_eq!(normalize_sport("NFL"), Sport::AmericanFootball);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(normalize_sport(""), Sport::Football);
        assert_eq!(normalize_sport("   "), Sport::Football);
        assert_eq!(normalize_sport("curling"), Sport::Other);
    }

    #[test]
    fn test_moneyline_sports() {
        assert!(!Sport::Football.is_moneyline_sport());
        assert!(!Sport::Other.is_moneyline_sport());
        assert!(Sport::Hockey.is_moneyline_sport());
        assert!(Sport::Combat.is_moneyline_sport());
    }
}
