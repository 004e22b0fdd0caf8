//! Keyword tags and tribes.
//!
//! Keywords are stored as a bitset so that minion copies stay `Copy`-cheap.
//! Each keyword has a canonical lowercase name ("taunt", "divine shield", ...)
//! used for parsing, display and serialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A combat keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Keyword {
    /// Enemy attacks must target taunt minions first.
    Taunt = 0,
    /// Absorbs the next damage instance, then is consumed.
    DivineShield = 1,
    /// Destroys any minion it damages.
    Poisonous = 2,
    /// Returns once with 1 health after dying.
    Reborn = 3,
    /// Attacks twice each time it is this minion's turn to attack.
    Windfury = 4,
    /// Attacks without taking retaliation damage.
    Ranged = 5,
}

impl Keyword {
    /// All keywords, in bit order.
    pub const ALL: [Keyword; 6] = [
        Keyword::Taunt,
        Keyword::DivineShield,
        Keyword::Poisonous,
        Keyword::Reborn,
        Keyword::Windfury,
        Keyword::Ranged,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Keyword::Taunt => "taunt",
            Keyword::DivineShield => "divine shield",
            Keyword::Poisonous => "poisonous",
            Keyword::Reborn => "reborn",
            Keyword::Windfury => "windfury",
            Keyword::Ranged => "ranged",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Keyword {
    type Err = String;

    /// Case-insensitive; `_` and `-` are accepted in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Keyword::ALL
            .into_iter()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| format!("unknown keyword `{}`", s))
    }
}

/// A set of keywords.
///
/// ```
/// use bgsim::cards::{Keyword, Keywords};
///
/// let mut kw = Keywords::from_iter([Keyword::Taunt, Keyword::DivineShield]);
/// assert!(kw.has(Keyword::Taunt));
/// kw.remove(Keyword::DivineShield);
/// assert_eq!(kw.to_string(), "taunt");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Keywords(u8);

impl Keywords {
    /// The empty set.
    pub const NONE: Keywords = Keywords(0);

    /// Check membership.
    #[must_use]
    pub const fn has(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    /// Add a keyword.
    pub fn insert(&mut self, keyword: Keyword) {
        self.0 |= keyword.bit();
    }

    /// Remove a keyword, returning whether it was present.
    pub fn remove(&mut self, keyword: Keyword) -> bool {
        let present = self.has(keyword);
        self.0 &= !keyword.bit();
        present
    }

    /// Builder form of `insert`.
    #[must_use]
    pub fn with(mut self, keyword: Keyword) -> Self {
        self.insert(keyword);
        self
    }

    /// Check if no keyword is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL.into_iter().filter(move |k| self.has(*k))
    }

    /// Raw bits, used by observation encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl FromIterator<Keyword> for Keywords {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        let mut set = Keywords::NONE;
        for k in iter {
            set.insert(k);
        }
        set
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(Keyword::name).collect();
        f.write_str(&names.join(", "))
    }
}

impl Serialize for Keywords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Keyword::name))
    }
}

impl<'de> Deserialize<'de> for Keywords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|n| n.parse::<Keyword>().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Minion tribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tribe {
    Mech,
    Murloc,
    Quilboar,
    Undead,
    Naga,
    Elemental,
    Demon,
    Pirate,
    Beast,
    Dragon,
    Neutral,
}

impl Tribe {
    /// All tribes.
    pub const ALL: [Tribe; 11] = [
        Tribe::Mech,
        Tribe::Murloc,
        Tribe::Quilboar,
        Tribe::Undead,
        Tribe::Naga,
        Tribe::Elemental,
        Tribe::Demon,
        Tribe::Pirate,
        Tribe::Beast,
        Tribe::Dragon,
        Tribe::Neutral,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_names() {
        assert_eq!("taunt".parse::<Keyword>(), Ok(Keyword::Taunt));
        assert_eq!("Divine Shield".parse::<Keyword>(), Ok(Keyword::DivineShield));
        assert_eq!("divine_shield".parse::<Keyword>(), Ok(Keyword::DivineShield));
        assert!("discover".parse::<Keyword>().is_err());
    }

    #[test]
    fn test_keyword_set_ops() {
        let mut set = Keywords::NONE.with(Keyword::Poisonous);
        assert!(set.has(Keyword::Poisonous));
        assert!(!set.has(Keyword::Taunt));
        assert!(set.remove(Keyword::Poisonous));
        assert!(!set.remove(Keyword::Poisonous));
        assert!(set.is_empty());
    }

    #[test]
    fn test_keywords_serialize_as_names() {
        let set = Keywords::from_iter([Keyword::DivineShield, Keyword::Taunt]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["taunt","divine shield"]"#);
        let back: Keywords = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_tribe_serialization() {
        assert_eq!(serde_json::to_string(&Tribe::Beast).unwrap(), r#""beast""#);
    }
}
