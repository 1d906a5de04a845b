use serde_json::Value;
use tracing::{debug, trace};

use crate::models::EmojiRain;

/// Lets each emoji rain broadcast through exactly once per client.
///
/// The store replays the current `emojiRain` value whenever a listener
/// attaches, and delivery is at-least-once. Only broadcasts strictly newer
/// than everything seen since joining pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiRainGate {
    last_seen_at: i64,
}

impl EmojiRainGate {
    /// Gate that rejects anything at or before `watermark`.
    pub fn new(watermark: i64) -> Self {
        Self {
            last_seen_at: watermark,
        }
    }

    /// Largest `at` admitted so far, or the join watermark.
    pub fn last_seen_at(&self) -> i64 {
        self.last_seen_at
    }

    /// Decode a raw `emojiRain` value and admit it if it is new.
    pub fn admit_value(&mut self, value: Option<&Value>) -> Option<EmojiRain> {
        let value = value?;
        match serde_json::from_value::<EmojiRain>(value.clone()) {
            Ok(rain) => self.admit(rain),
            Err(err) => {
                debug!(error = %err, "ignoring malformed emoji rain");
                None
            }
        }
    }

    /// Admit `rain` if it is newer than the watermark, advancing it.
    pub fn admit(&mut self, rain: EmojiRain) -> Option<EmojiRain> {
        if rain.emoji.is_empty() {
            debug!("ignoring emoji rain without an emoji");
            return None;
        }
        if rain.at <= self.last_seen_at {
            trace!(at = rain.at, last_seen_at = self.last_seen_at, "emoji rain already seen");
            return None;
        }
        self.last_seen_at = rain.at;
        Some(rain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_at_or_before_watermark_are_dropped() {
        let mut gate = EmojiRainGate::new(1_000);
        assert_eq!(gate.admit_value(Some(&json!({ "emoji": "🎉", "at": 900 }))), None);
        assert_eq!(gate.admit_value(Some(&json!({ "emoji": "🎉", "at": 1_000 }))), None);
        assert_eq!(gate.last_seen_at(), 1_000);
    }

    #[test]
    fn strictly_newer_events_pass_once() {
        let mut gate = EmojiRainGate::new(1_000);
        let event = json!({ "emoji": "🚀", "at": 1_500, "by": "c_ada" });

        let admitted = gate.admit_value(Some(&event));
        assert_eq!(
            admitted,
            Some(EmojiRain {
                emoji: "🚀".to_string(),
                at: 1_500,
                by: Some("c_ada".to_string()),
            })
        );
        assert_eq!(gate.admit_value(Some(&event)), None);
        assert_eq!(gate.last_seen_at(), 1_500);

        assert!(gate.admit_value(Some(&json!({ "emoji": "🔥", "at": 1_501 }))).is_some());
    }

    #[test]
    fn absent_or_malformed_events_are_ignored() {
        let mut gate = EmojiRainGate::new(0);
        assert_eq!(gate.admit_value(None), None);
        assert_eq!(gate.admit_value(Some(&json!({ "at": 10 }))), None);
        assert_eq!(gate.admit_value(Some(&json!({ "emoji": "🎉" }))), None);
        assert_eq!(gate.admit_value(Some(&json!({ "emoji": "", "at": 10 }))), None);
        assert_eq!(gate.admit_value(Some(&json!("🎉"))), None);
        assert_eq!(gate.last_seen_at(), 0);
    }
}
