use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::{Suit, Variant};
use serde::{Deserialize, Serialize};

/// Highest rank played per suit (0 when nothing is down yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    variant: Variant,
    stacks: [u8; Suit::COUNT],
}

impl Progress {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            stacks: [0; Suit::COUNT],
        }
    }

    /// Builds a board from `(suit, height)` pairs; heights above five are clamped.
    pub fn with_stacks(variant: Variant, stacks: &[(Suit, u8)]) -> Self {
        let mut progress = Self::new(variant);
        for &(suit, height) in stacks {
            if variant.contains(suit) {
                progress.stacks[suit.index()] = height.min(Rank::Five.value());
            }
        }
        progress
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn get(&self, suit: Suit) -> u8 {
        self.stacks[suit.index()]
    }

    pub fn is_playable(&self, card: Card) -> bool {
        self.variant.contains(card.suit) && card.rank.value() == self.get(card.suit) + 1
    }

    /// Already played, so the card can never be useful again.
    pub fn is_dead(&self, card: Card) -> bool {
        card.rank.value() <= self.get(card.suit)
    }

    /// Advances the stack if `card` is playable; returns whether it was.
    pub fn advance(&mut self, card: Card) -> bool {
        if !self.is_playable(card) {
            return false;
        }
        self.stacks[card.suit.index()] = card.rank.value();
        true
    }

    /// Cards still missing from the stacks.
    pub fn unplayed(&self) -> usize {
        self.variant
            .suits()
            .iter()
            .map(|suit| usize::from(Rank::Five.value() - self.get(*suit)))
            .sum()
    }

    pub fn score(&self) -> usize {
        self.variant
            .suits()
            .iter()
            .map(|suit| usize::from(self.get(*suit)))
            .sum()
    }

    pub fn max_score(&self) -> usize {
        self.variant.suits().len() * usize::from(Rank::Five.value())
    }

    pub fn is_complete(&self) -> bool {
        self.unplayed() == 0
    }
}
