use rand::{seq::SliceRandom, Rng};

/// Cards available for voting, in display order.
pub const CARD_VALUES: [&str; 12] = [
    "0", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?",
];

/// Emojis offered for emoji rain.
pub const EMOJIS: [&str; 11] = [
    "🎉", "🚀", "🤖", "✨", "🔥", "💚", "📊", "✅", "🧠", "🌀", "💩",
];

/// Whether `value` is one of [`CARD_VALUES`].
pub fn is_card_value(value: &str) -> bool {
    CARD_VALUES.contains(&value)
}

/// Colour band of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTier {
    /// `0` and `?`.
    Neutral,
    /// `1` to `3`.
    Low,
    /// `5` to `21`.
    Mid,
    /// `34` and above.
    High,
}

/// Tier of a deck card, `None` for values outside the deck.
pub fn card_tier(value: &str) -> Option<CardTier> {
    let index = CARD_VALUES.iter().position(|card| *card == value)?;
    Some(match (value, index) {
        ("0" | "?", _) => CardTier::Neutral,
        (_, 0..=3) => CardTier::Low,
        (_, 4..=7) => CardTier::Mid,
        _ => CardTier::High,
    })
}

/// Pick an emoji from [`EMOJIS`].
pub fn pick_emoji<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    EMOJIS.choose(rng).copied().unwrap_or(EMOJIS[0])
}

/// Pick an emoji using the thread-local generator.
pub fn random_emoji() -> &'static str {
    pick_emoji(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_membership() {
        assert!(is_card_value("13"));
        assert!(is_card_value("?"));
        assert!(!is_card_value("4"));
        assert!(!is_card_value(""));
    }

    #[test]
    fn tiers_follow_deck_position() {
        assert_eq!(card_tier("0"), Some(CardTier::Neutral));
        assert_eq!(card_tier("?"), Some(CardTier::Neutral));
        assert_eq!(card_tier("3"), Some(CardTier::Low));
        assert_eq!(card_tier("21"), Some(CardTier::Mid));
        assert_eq!(card_tier("89"), Some(CardTier::High));
        assert_eq!(card_tier("100"), None);
    }

    #[test]
    fn random_emoji_comes_from_palette() {
        for _ in 0..32 {
            assert!(EMOJIS.contains(&random_emoji()));
        }
    }
}
