use super::HatError;
use hanabi_core::model::action::{Action, RecordedAction};
use hanabi_core::model::card::Card;
use hanabi_core::model::clue::ClueValue;
use hanabi_core::model::hand::Hand;
use hanabi_core::model::round::PlayerView;
use hanabi_core::model::suit::Suit;
use std::fmt;
use tracing::{Level, event};

/// Instructions are residues modulo nine: one hint, four plays, four discards.
pub const ACTION_MODULUS: u8 = 9;

/// Sub-codes per target: rank of the newest card, suit of the newest card, a miss.
const CLUE_KINDS: usize = 3;

/// Suit named for a "colour of the newest card" clue. The wildcard cannot be
/// named, so it borrows a colour that still touches it.
const SUIT_CLUE_TABLE: [Suit; Suit::COUNT] = [
    Suit::Red,
    Suit::Yellow,
    Suit::Green,
    Suit::Blue,
    Suit::White,
    Suit::Green,
];

/// Convention-level action. Slots count from the oldest card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatAction {
    Hint,
    Play(usize),
    Discard(usize),
}

impl HatAction {
    pub const fn slot(self) -> Option<usize> {
        match self {
            HatAction::Hint => None,
            HatAction::Play(slot) | HatAction::Discard(slot) => Some(slot),
        }
    }

    pub const fn is_play(self) -> bool {
        matches!(self, HatAction::Play(_))
    }

    pub const fn is_discard(self) -> bool {
        matches!(self, HatAction::Discard(_))
    }

    /// Card the action would move out of `hand`, if any.
    pub fn card(self, hand: &Hand) -> Option<Card> {
        self.slot().and_then(|slot| hand.card(slot))
    }

    /// Engine action for plays and discards; hints need a concrete clue first.
    pub fn to_action(self) -> Option<Action> {
        match self {
            HatAction::Hint => None,
            HatAction::Play(slot) => Some(Action::Play { slot }),
            HatAction::Discard(slot) => Some(Action::Discard { slot }),
        }
    }
}

impl fmt::Display for HatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HatAction::Hint => f.write_str("hint"),
            HatAction::Play(slot) => write!(f, "play {slot}"),
            HatAction::Discard(slot) => write!(f, "discard {slot}"),
        }
    }
}

/// What a seat downstream of a clue is expected to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictedAction {
    pub seat: usize,
    pub action: HatAction,
    pub card: Option<Card>,
}

pub fn action_to_number(action: HatAction) -> u8 {
    let raw = match action {
        HatAction::Hint => 0,
        HatAction::Play(slot) => 4 - slot as i64,
        HatAction::Discard(slot) => 8 - slot as i64,
    };
    raw.rem_euclid(i64::from(ACTION_MODULUS)) as u8
}

pub fn number_to_action(number: u8) -> HatAction {
    match number % ACTION_MODULUS {
        0 => HatAction::Hint,
        n @ 1..=4 => HatAction::Play(usize::from(4 - n)),
        n => HatAction::Discard(usize::from(8 - n)),
    }
}

/// Residue of an action as it appears in the round log.
pub fn external_action_to_number(recorded: &RecordedAction) -> u8 {
    match recorded {
        RecordedAction::Hint { .. } => 0,
        RecordedAction::Play { .. } => recorded
            .slot()
            .map_or(0, |slot| action_to_number(HatAction::Play(slot))),
        RecordedAction::Discard { .. } => recorded
            .slot()
            .map_or(0, |slot| action_to_number(HatAction::Discard(slot))),
    }
}

pub fn clue_suit_for(suit: Suit) -> Suit {
    SUIT_CLUE_TABLE[suit.index()]
}

/// Number carried by a clue that `cluer` gave to `target`. Must be read right
/// after the clue lands, while the target's newest card is unchanged.
pub fn clue_to_number(view: &PlayerView<'_>, target: usize, value: ClueValue, cluer: usize) -> u8 {
    let players = view.players();
    let skipped = (view.ring().distance(cluer, target) + players - 1) % players;
    let missed_newest = view
        .newest_knowledge(target)
        .and_then(|knowledge| knowledge.last_indirect())
        == Some(value);
    let kind = if missed_newest {
        2
    } else if value.names_suit() {
        1
    } else {
        0
    };
    (CLUE_KINDS * skipped + kind) as u8
}

/// Clue that `me` gives to carry `number`.
pub fn number_to_clue(
    view: &PlayerView<'_>,
    number: u8,
    me: usize,
) -> Result<(usize, ClueValue), HatError> {
    let number = usize::from(number % ACTION_MODULUS);
    let target = view.ring().advance(me, 1 + number / CLUE_KINDS);
    let hand = super::visible_hand(view, target)?;
    let newest = hand
        .newest()
        .ok_or(HatError::EmptyHand { seat: target })?
        .card;

    let value = match number % CLUE_KINDS {
        0 => ClueValue::Rank(newest.rank),
        1 => ClueValue::Suit(clue_suit_for(newest.suit)),
        _ => match clue_missing_newest(hand, newest) {
            Some(value) => value,
            None => {
                event!(
                    target: "hanabi_bot::codec",
                    Level::DEBUG,
                    seat = me,
                    target_seat = target,
                    "no clue misses the newest card; naming its rank"
                );
                ClueValue::Rank(newest.rank)
            }
        },
    };
    Ok((target, value))
}

/// First older card differing from the newest one decides the clue.
fn clue_missing_newest(hand: &Hand, newest: Card) -> Option<ClueValue> {
    let older = hand.len().saturating_sub(1);
    for card in hand.faces().take(older) {
        if card.rank != newest.rank {
            return Some(ClueValue::Rank(card.rank));
        }
        if card.suit != newest.suit && !newest.suit.is_wildcard() {
            if !card.suit.is_wildcard() {
                return Some(ClueValue::Suit(card.suit));
            }
            let fallback = if newest.suit != Suit::Red {
                Suit::Red
            } else {
                Suit::Yellow
            };
            return Some(ClueValue::Suit(fallback));
        }
    }
    None
}
