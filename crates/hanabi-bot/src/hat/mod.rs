mod codec;
mod forecast;
mod memory;
mod planner;
mod player;
mod simulator;

pub use codec::{
    ACTION_MODULUS, HatAction, PredictedAction, action_to_number, clue_suit_for, clue_to_number,
    external_action_to_number, number_to_action, number_to_clue,
};
pub use forecast::{ChainForecast, Forecast, HintChange, HintProjection, project_hints};
pub use memory::{Adjustment, AdjustmentSource, ClueRecord, PlayerMemory};
pub use planner::{CluePlan, plan_clue};
pub use player::{Decision, DecisionReason, HatPlayer};
pub use simulator::{
    ModifiedReason, count_unplayed_playable, easy_discards, hard_discards, modified_action,
    standard_action,
};

use hanabi_core::model::hand::Hand;
use hanabi_core::model::round::PlayerView;
use thiserror::Error;

/// Name every hat seat reports when the table checks its lineup.
pub const HAT_CONVENTION: &str = "hat";

/// A single clue has to address at least three other seats.
pub const MIN_PLAYERS: usize = 4;

/// Slot thrown away when a seat must act but holds no instruction and no tokens.
pub const FORCED_DISCARD_SLOT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HatFeatures {
    modified_action: bool,
    verbose: bool,
}

impl HatFeatures {
    pub const fn new(modified_action: bool, verbose: bool) -> Self {
        Self {
            modified_action,
            verbose,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    /// Whether the clue giver may pick a smarter action for the first seat of its chain.
    pub const fn modified_action(self) -> bool {
        self.modified_action
    }

    pub const fn verbose(self) -> bool {
        self.verbose
    }

    pub fn with_modified_action(mut self, enabled: bool) -> Self {
        self.modified_action = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let modified_action = read("HANABI_MODIFIED_ACTION")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(true);

        let verbose = read("HANABI_HAT_VERBOSE")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        Self {
            modified_action,
            verbose,
        }
    }
}

impl Default for HatFeatures {
    fn default() -> Self {
        Self {
            modified_action: true,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HatError {
    #[error("hat convention needs at least {min} players, table has {found}")]
    TooFewPlayers { found: usize, min: usize },
    #[error("seat {seat} plays the '{convention}' convention; hat seats only play with other hat seats")]
    MixedTable { seat: usize, convention: String },
    #[error("lineup names {found} seats but the table has {expected}")]
    LineupSize { expected: usize, found: usize },
    #[error("seat {observer} cannot see the hand of seat {seat}")]
    HiddenHand { seat: usize, observer: usize },
    #[error("seat {seat} holds no cards")]
    EmptyHand { seat: usize },
    #[error("seat {seat} fell {behind} actions behind the round log; clues can only be read one action at a time")]
    StaleMemory { seat: usize, behind: usize },
}

/// Another seat's hand, or `HiddenHand` if it belongs to the viewer.
pub(crate) fn visible_hand<'a>(view: &PlayerView<'a>, seat: usize) -> Result<&'a Hand, HatError> {
    view.hand(seat).ok_or(HatError::HiddenHand {
        seat,
        observer: view.seat(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &'static [(&'static str, &'static str)]) -> impl FnMut(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults_keep_modified_action_on() {
        let features = HatFeatures::from_reader(reader(&[]));
        assert!(features.modified_action());
        assert!(!features.verbose());
        assert_eq!(features, HatFeatures::default());
    }

    #[test]
    fn reader_parses_switches() {
        let features = HatFeatures::from_reader(reader(&[
            ("HANABI_MODIFIED_ACTION", "off"),
            ("HANABI_HAT_VERBOSE", " ON "),
        ]));
        assert!(!features.modified_action());
        assert!(features.verbose());
    }

    #[test]
    fn builders_override_individual_flags() {
        let features = HatFeatures::new(false, false)
            .with_modified_action(true)
            .with_verbose(true);
        assert_eq!(features, HatFeatures::new(true, true));
    }

    #[test]
    fn errors_render_context() {
        let err = HatError::TooFewPlayers { found: 3, min: 4 };
        assert_eq!(
            err.to_string(),
            "hat convention needs at least 4 players, table has 3"
        );
        let err = HatError::MixedTable {
            seat: 2,
            convention: "random".into(),
        };
        assert!(err.to_string().contains("seat 2"));
    }
}
