use std::fmt;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Countries used as the readable half of generated room identifiers.
pub const COUNTRIES: [&str; 32] = [
    "UK", "USA", "Canada", "France", "Germany", "Spain", "Italy", "Japan", "China", "Brazil",
    "India", "Australia", "Sweden", "Norway", "Finland", "Denmark", "Ireland", "Poland",
    "Austria", "Belgium", "Switzerland", "Portugal", "Greece", "Netherlands", "Mexico",
    "SouthAfrica", "NewZealand", "Turkey", "Argentina", "Chile", "Colombia", "Peru",
];

const FORBIDDEN_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Normalized (trimmed, upper-cased) room identifier.
///
/// Identifiers are a lookup convenience only: two teams picking the same
/// slug share a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Normalize user input into a room identifier.
    pub fn parse(input: &str) -> Result<Self, RoomIdError> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(RoomIdError::Empty);
        }
        for (index, ch) in normalized.chars().enumerate() {
            if FORBIDDEN_CHARS.contains(&ch) || ch.is_control() {
                return Err(RoomIdError::InvalidCharacter { ch, index });
            }
        }
        Ok(Self(normalized))
    }

    /// Random `COUNTRY-NNN` identifier.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Random `COUNTRY-NNN` identifier from the supplied random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let country = COUNTRIES.choose(rng).copied().unwrap_or(COUNTRIES[0]);
        let number: u16 = rng.gen_range(100..=999);
        Self(format!("{country}-{number}").to_uppercase())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

/// Why a room identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomIdError {
    /// Nothing but whitespace was supplied.
    #[error("room id is empty")]
    Empty,
    /// The identifier contains a character the store cannot use in keys.
    #[error("invalid character '{ch}' at position {index}")]
    InvalidCharacter {
        /// Offending character.
        ch: char,
        /// Character position in the normalized identifier.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use rand::{rngs::StdRng, SeedableRng};
    use regex::Regex;

    static ROOM_ID_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z]+-\d{3}$").expect("invalid room id regex"));

    #[test]
    fn generated_ids_match_slug_pattern() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let id = RoomId::generate_with(&mut rng);
            assert!(ROOM_ID_RE.is_match(id.as_str()), "unexpected id {id}");
        }
        assert!(ROOM_ID_RE.is_match(RoomId::generate().as_str()));
    }

    #[test]
    fn generated_numbers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let id = RoomId::generate_with(&mut rng);
            let (_, number) = id.as_str().rsplit_once('-').unwrap_or_default();
            let number: u16 = number.parse().unwrap_or(0);
            assert!((100..=999).contains(&number), "out of range in {id}");
        }
    }

    #[test]
    fn parse_trims_and_uppercases() {
        assert_eq!(RoomId::parse("  sweden-482 ").map(String::from), Ok("SWEDEN-482".to_string()));
    }

    #[test]
    fn parse_rejects_blank_and_key_breaking_input() {
        assert_eq!(RoomId::parse("   "), Err(RoomIdError::Empty));
        assert_eq!(
            RoomId::parse("team/a"),
            Err(RoomIdError::InvalidCharacter { ch: '/', index: 4 })
        );
        assert!(RoomId::parse("a.b").is_err());
    }
}
