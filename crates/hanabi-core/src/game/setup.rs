use crate::model::deck::Deck;
use crate::model::round::{RoundError, RoundState};
use crate::model::suit::Variant;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub seed: u64,
    pub players: usize,
    #[serde(default)]
    pub variant: Variant,
}

impl GameSetup {
    pub const fn new(seed: u64, players: usize, variant: Variant) -> Self {
        Self {
            seed,
            players,
            variant,
        }
    }

    /// Setup with a fresh random seed.
    pub fn random(players: usize, variant: Variant) -> Self {
        Self::new(rand::random(), players, variant)
    }

    pub fn deck(&self) -> Deck {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Deck::shuffled(self.variant, &mut rng)
    }

    pub fn deal(&self) -> Result<RoundState, RoundError> {
        RoundState::deal(self.deck(), self.players, self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::GameSetup;
    use crate::model::round::RoundError;
    use crate::model::suit::Variant;

    #[test]
    fn same_seed_deals_same_hands() {
        let setup = GameSetup::new(99, 5, Variant::Standard);
        let a = setup.deal().unwrap();
        let b = setup.deal().unwrap();
        for seat in 0..5 {
            assert!(a.hand(seat).faces().eq(b.hand(seat).faces()));
        }
        assert_eq!(a.deck_size(), 30);
    }

    #[test]
    fn different_seeds_deal_differently() {
        let a = GameSetup::new(1, 4, Variant::Standard).deal().unwrap();
        let b = GameSetup::new(2, 4, Variant::Standard).deal().unwrap();
        let differs = (0..4).any(|seat| !a.hand(seat).faces().eq(b.hand(seat).faces()));
        assert!(differs);
    }

    #[test]
    fn rejects_oversized_table() {
        let err = GameSetup::new(1, 7, Variant::Rainbow).deal().unwrap_err();
        assert_eq!(err, RoundError::PlayerCount(7));
    }

    #[test]
    fn random_setup_keeps_table_shape() {
        let setup = GameSetup::random(4, Variant::Rainbow);
        let round = setup.deal().unwrap();
        assert_eq!(round.players(), 4);
        assert_eq!(round.deck_size(), 44);
    }
}
