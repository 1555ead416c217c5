use crate::model::card::Card;
use crate::model::clue::ClueValue;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A move chosen by a seat. Slots count from the oldest card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hint { target: usize, value: ClueValue },
    Play { slot: usize },
    Discard { slot: usize },
}

impl Action {
    pub const fn kind(&self) -> &'static str {
        match self {
            Action::Hint { .. } => "hint",
            Action::Play { .. } => "play",
            Action::Discard { .. } => "discard",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Hint { target, value } => write!(f, "hint p{target} {value}"),
            Action::Play { slot } => write!(f, "play slot {slot}"),
            Action::Discard { slot } => write!(f, "discard slot {slot}"),
        }
    }
}

/// Entry of the public action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub actor: usize,
    pub turn: usize,
    pub kind: RecordedAction,
}

/// Plays and discards remember the newest-first `position` of the card and the
/// hand size at the time, so observers can recover the oldest-first slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordedAction {
    Hint {
        target: usize,
        value: ClueValue,
        touched: Vec<usize>,
    },
    Play {
        card: Card,
        position: usize,
        hand_size: usize,
        success: bool,
    },
    Discard {
        card: Card,
        position: usize,
        hand_size: usize,
    },
}

impl RecordedAction {
    /// Oldest-first slot the card occupied before it left the hand.
    pub fn slot(&self) -> Option<usize> {
        match self {
            RecordedAction::Hint { .. } => None,
            RecordedAction::Play {
                position,
                hand_size,
                ..
            }
            | RecordedAction::Discard {
                position,
                hand_size,
                ..
            } => hand_size.checked_sub(position + 1),
        }
    }

    pub fn card(&self) -> Option<Card> {
        match self {
            RecordedAction::Hint { .. } => None,
            RecordedAction::Play { card, .. } | RecordedAction::Discard { card, .. } => {
                Some(*card)
            }
        }
    }

    /// The move as the actor chose it.
    pub fn as_action(&self) -> Option<Action> {
        match self {
            RecordedAction::Hint { target, value, .. } => Some(Action::Hint {
                target: *target,
                value: *value,
            }),
            RecordedAction::Play { .. } => self.slot().map(|slot| Action::Play { slot }),
            RecordedAction::Discard { .. } => self.slot().map(|slot| Action::Discard { slot }),
        }
    }
}
