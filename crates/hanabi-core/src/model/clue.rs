use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// What a hint names: a rank or a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueValue {
    Rank(Rank),
    Suit(Suit),
}

impl ClueValue {
    pub const fn names_suit(self) -> bool {
        matches!(self, ClueValue::Suit(_))
    }

    /// Colour clues also touch wildcard cards.
    pub fn touches(self, card: Card) -> bool {
        match self {
            ClueValue::Rank(rank) => card.rank == rank,
            ClueValue::Suit(suit) => card.suit == suit || card.suit.is_wildcard(),
        }
    }
}

impl fmt::Display for ClueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClueValue::Rank(rank) => write!(f, "{rank}"),
            ClueValue::Suit(suit) => write!(f, "{suit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClueValue;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn rank_clue_touches_matching_rank_only() {
        let clue = ClueValue::Rank(Rank::Two);
        assert!(clue.touches(Card::new(Rank::Two, Suit::Blue)));
        assert!(!clue.touches(Card::new(Rank::Three, Suit::Blue)));
        assert!(!clue.names_suit());
    }

    #[test]
    fn colour_clue_touches_rainbow() {
        let clue = ClueValue::Suit(Suit::Red);
        assert!(clue.touches(Card::new(Rank::Four, Suit::Red)));
        assert!(clue.touches(Card::new(Rank::Four, Suit::Rainbow)));
        assert!(!clue.touches(Card::new(Rank::Four, Suit::Blue)));
        assert!(clue.names_suit());
    }

    #[test]
    fn display_uses_short_form() {
        assert_eq!(ClueValue::Rank(Rank::Five).to_string(), "5");
        assert_eq!(ClueValue::Suit(Suit::White).to_string(), "w");
    }
}
