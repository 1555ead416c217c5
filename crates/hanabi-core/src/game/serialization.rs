use super::setup::GameSetup;
use crate::model::action::Action;
use crate::model::round::{RoundError, RoundState, RoundStatus};
use serde::{Deserialize, Serialize};

/// Replayable record of a finished (or interrupted) game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub setup: GameSetup,
    pub score: usize,
    pub max_score: usize,
    pub bombs: u8,
    pub status: String,
    pub actions: Vec<Action>,
}

impl GameRecord {
    pub fn capture(setup: GameSetup, round: &RoundState) -> Self {
        GameRecord {
            setup,
            score: round.score(),
            max_score: round.max_score(),
            bombs: round.bombs(),
            status: status_label(round.status()).to_string(),
            actions: round
                .history()
                .iter()
                .filter_map(|record| record.kind.as_action())
                .collect(),
        }
    }

    /// Re-deals from the seed and applies every recorded action.
    pub fn replay(&self) -> Result<RoundState, RoundError> {
        let mut round = self.setup.deal()?;
        for action in &self.actions {
            round.apply(*action)?;
        }
        Ok(round)
    }

    pub fn to_json(setup: GameSetup, round: &RoundState) -> serde_json::Result<String> {
        let record = Self::capture(setup, round);
        serde_json::to_string_pretty(&record)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub fn status_label(status: RoundStatus) -> &'static str {
    match status {
        RoundStatus::InProgress => "in_progress",
        RoundStatus::Perfect => "perfect",
        RoundStatus::Bombed => "bombed",
        RoundStatus::DeckExhausted => "deck_exhausted",
    }
}
