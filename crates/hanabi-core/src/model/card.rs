use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_five(self) -> bool {
        matches!(self.rank, Rank::Five)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardParseError {
    Length(String),
    Rank(char),
    Suit(char),
}

impl fmt::Display for CardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardParseError::Length(raw) => write!(f, "card '{raw}' must be rank then suit"),
            CardParseError::Rank(c) => write!(f, "unknown rank '{c}'"),
            CardParseError::Suit(c) => write!(f, "unknown suit '{c}'"),
        }
    }
}

impl std::error::Error for CardParseError {}

/// Parses the compact `"3g"` form used in logs and fixtures.
impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut chars = raw.trim().chars();
        let (Some(rank), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardParseError::Length(raw.to_string()));
        };
        let rank = rank
            .to_digit(10)
            .and_then(|value| Rank::from_value(value as u8))
            .ok_or(CardParseError::Rank(rank))?;
        let suit = Suit::from_symbol(suit).ok_or(CardParseError::Suit(suit))?;
        Ok(Card::new(rank, suit))
    }
}
