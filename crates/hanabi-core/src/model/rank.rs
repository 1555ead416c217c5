use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Rank {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Rank {
    pub const ORDERED: [Rank; 5] = [Rank::One, Rank::Two, Rank::Three, Rank::Four, Rank::Five];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::One),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Copies of this rank per suit in the deck.
    pub const fn copies(self) -> usize {
        match self {
            Rank::One => 3,
            Rank::Two | Rank::Three | Rank::Four => 2,
            Rank::Five => 1,
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.value()
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::from_value(value).ok_or_else(|| format!("rank {value} out of range 1..=5"))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(4), Some(Rank::Four));
        assert_eq!(Rank::from_value(0), None);
        assert_eq!(Rank::from_value(6), None);
    }

    #[test]
    fn copies_follow_deck_distribution() {
        let total: usize = Rank::ORDERED.iter().map(|rank| rank.copies()).sum();
        assert_eq!(total, 10);
        assert_eq!(Rank::One.copies(), 3);
        assert_eq!(Rank::Five.copies(), 1);
    }

    #[test]
    fn serde_uses_numeric_value() {
        let json = serde_json::to_string(&Rank::Three).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<Rank>("9").is_err());
    }
}
