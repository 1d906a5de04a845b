//! Shared domain models.

mod deck;

pub use deck::{card_tier, is_card_value, pick_emoji, random_emoji, CardTier, CARD_VALUES, EMOJIS};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name shown for participants who left the name blank.
pub const ANONYMOUS: &str = "Anonymous";

/// Participants of a room keyed by client identifier.
pub type Participants = BTreeMap<String, Participant>;

/// Room-level state stored under `rooms/{id}/state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    /// Server timestamp of the first join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Server timestamp of the last room-level write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Story being estimated; empty when unset.
    #[serde(default)]
    pub story: String,
    /// Whether votes are visible to everyone.
    #[serde(default)]
    pub reveal: bool,
    /// Most recent emoji rain broadcast; a malformed one reads as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_emoji_rain",
        skip_serializing_if = "Option::is_none"
    )]
    pub emoji_rain: Option<EmojiRain>,
}

fn lenient_emoji_rain<'de, D>(deserializer: D) -> Result<Option<EmojiRain>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The two activity stamps of a room, read apart from the rest of its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomTimestamps {
    /// Server timestamp of the first join.
    pub created_at: Option<i64>,
    /// Server timestamp of the last room-level write.
    pub updated_at: Option<i64>,
}

impl RoomTimestamps {
    /// Pick `createdAt` and `updatedAt` out of a raw state node. Other fields
    /// are ignored, whatever their shape.
    pub fn from_state(state: &Value) -> Self {
        Self {
            created_at: state.get("createdAt").and_then(Value::as_i64),
            updated_at: state.get("updatedAt").and_then(Value::as_i64),
        }
    }

    /// Activity clock used for expiry: `updatedAt`, falling back to `createdAt`.
    pub fn last_active(&self) -> Option<i64> {
        self.updated_at.or(self.created_at)
    }
}

/// Celebratory broadcast shown by every client once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiRain {
    /// Emoji to rain down.
    pub emoji: String,
    /// Client-side epoch milliseconds when it was triggered.
    pub at: i64,
    /// Client that triggered it.
    #[serde(default)]
    pub by: Option<String>,
}

/// One client's membership record in a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Selected card, empty when no vote was cast.
    #[serde(default)]
    pub vote: String,
    /// Client-local epoch milliseconds of the join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<i64>,
}

impl Participant {
    /// Fresh record with no vote.
    pub fn joining(name: &str, joined_at: i64) -> Self {
        Self {
            name: display_name(name),
            vote: String::new(),
            joined_at: Some(joined_at),
        }
    }

    /// Name with the anonymous fallback applied.
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }

    /// Whether a card has been selected.
    pub fn has_voted(&self) -> bool {
        !self.vote.is_empty()
    }

    /// How this participant's vote should be shown.
    pub fn vote_display(&self, reveal: bool) -> VoteDisplay {
        match (reveal, self.has_voted()) {
            (false, _) => VoteDisplay::Hidden,
            (true, false) => VoteDisplay::Missing,
            (true, true) => VoteDisplay::Shown(self.vote.clone()),
        }
    }
}

/// Trimmed name, or [`ANONYMOUS`] when blank.
pub fn display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Upper-cased first letters of up to the first two words, `?` when blank.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Presentation of a single vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteDisplay {
    /// Votes are masked.
    Hidden,
    /// Revealed, but this participant did not vote.
    Missing,
    /// Revealed value.
    Shown(String),
}

impl VoteDisplay {
    /// Short label used in participant lists.
    pub fn label(&self) -> &str {
        match self {
            VoteDisplay::Hidden => "…",
            VoteDisplay::Missing => "—",
            VoteDisplay::Shown(value) => value,
        }
    }
}

/// Round statistics shown next to the participant list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteSummary {
    /// Participants who selected a card.
    pub voted: usize,
    /// All participants.
    pub total: usize,
    /// Lowest numeric vote, once revealed.
    pub min: Option<f64>,
    /// Highest numeric vote, once revealed.
    pub max: Option<f64>,
    /// Mean of numeric votes, once revealed.
    pub average: Option<f64>,
}

impl VoteSummary {
    /// Compute counts, and numeric statistics when votes are revealed.
    /// `?` and blank votes never count towards the statistics.
    pub fn from_participants(participants: &Participants, reveal: bool) -> Self {
        let total = participants.len();
        let voted = participants.values().filter(|p| p.has_voted()).count();
        let numeric: Vec<f64> = if reveal {
            participants
                .values()
                .filter_map(|p| p.vote.parse::<f64>().ok())
                .collect()
        } else {
            Vec::new()
        };

        if numeric.is_empty() {
            return Self {
                voted,
                total,
                ..Self::default()
            };
        }

        let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = numeric.iter().sum::<f64>() / numeric.len() as f64;
        Self {
            voted,
            total,
            min: Some(min),
            max: Some(max),
            average: Some(average),
        }
    }

    /// `voted / total` label.
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.voted, self.total)
    }

    /// Minimum as text, `—` when unavailable.
    pub fn min_label(&self) -> String {
        format_whole(self.min)
    }

    /// Maximum as text, `—` when unavailable.
    pub fn max_label(&self) -> String {
        format_whole(self.max)
    }

    /// Average with one decimal, `—` when unavailable.
    pub fn average_label(&self) -> String {
        match self.average {
            Some(value) => format!("{value:.1}"),
            None => "—".to_string(),
        }
    }
}

fn format_whole(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 => format!("{}", value as i64),
        Some(value) => format!("{value}"),
        None => "—".to_string(),
    }
}
