use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Suit {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Blue = 3,
    White = 4,
    /// Wildcard suit: touched by every colour clue, never nameable itself.
    Rainbow = 5,
}

impl Suit {
    pub const COUNT: usize = 6;

    pub const VANILLA: [Suit; 5] = [Suit::Red, Suit::Yellow, Suit::Green, Suit::Blue, Suit::White];

    pub const ALL: [Suit; 6] = [
        Suit::Red,
        Suit::Yellow,
        Suit::Green,
        Suit::Blue,
        Suit::White,
        Suit::Rainbow,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Red),
            1 => Some(Suit::Yellow),
            2 => Some(Suit::Green),
            3 => Some(Suit::Blue),
            4 => Some(Suit::White),
            5 => Some(Suit::Rainbow),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_wildcard(self) -> bool {
        matches!(self, Suit::Rainbow)
    }

    pub const fn symbol(self) -> char {
        match self {
            Suit::Red => 'r',
            Suit::Yellow => 'y',
            Suit::Green => 'g',
            Suit::Blue => 'b',
            Suit::White => 'w',
            Suit::Rainbow => 'm',
        }
    }

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'r' => Some(Suit::Red),
            'y' => Some(Suit::Yellow),
            'g' => Some(Suit::Green),
            'b' => Some(Suit::Blue),
            'w' => Some(Suit::White),
            'm' => Some(Suit::Rainbow),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which suits are in play for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Standard,
    Rainbow,
}

impl Variant {
    pub fn suits(self) -> &'static [Suit] {
        match self {
            Variant::Standard => &Suit::VANILLA,
            Variant::Rainbow => &Suit::ALL,
        }
    }

    pub fn contains(self, suit: Suit) -> bool {
        self.suits().contains(&suit)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Rainbow => "rainbow",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Suit, Variant};

    #[test]
    fn display_returns_ascii_symbols() {
        assert_eq!(Suit::Red.to_string(), "r");
        assert_eq!(Suit::Rainbow.to_string(), "m");
    }

    #[test]
    fn from_index_maps_valid_values() {
        assert_eq!(Suit::from_index(2), Some(Suit::Green));
        assert_eq!(Suit::from_index(6), None);
    }

    #[test]
    fn symbols_roundtrip() {
        for suit in Suit::ALL {
            assert_eq!(Suit::from_symbol(suit.symbol()), Some(suit));
        }
        assert_eq!(Suit::from_symbol('x'), None);
    }

    #[test]
    fn only_rainbow_variant_has_wildcard() {
        assert_eq!(Variant::Standard.suits().len(), 5);
        assert!(!Variant::Standard.contains(Suit::Rainbow));
        assert!(Variant::Rainbow.contains(Suit::Rainbow));
        assert!(Suit::Rainbow.is_wildcard());
        assert!(!Suit::White.is_wildcard());
    }
}
