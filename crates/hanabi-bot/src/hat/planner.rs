//! Encoding pass run by a seat that is about to give a clue.
//!
//! The planner replays every pending chain on a scratch `Forecast`, then
//! simulates the seats of the new chain from the last one back to the first
//! and folds their residues into a single clue.

use super::codec::{
    ACTION_MODULUS, HatAction, action_to_number, number_to_action, number_to_clue,
};
use super::forecast::{ChainForecast, Forecast};
use super::memory::PlayerMemory;
use super::simulator::{ModifiedReason, modified_action, standard_action};
use super::{HatError, HatFeatures, visible_hand};
use hanabi_core::model::clue::ClueValue;
use hanabi_core::model::round::PlayerView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CluePlan {
    pub target: usize,
    pub value: ClueValue,
    pub number: u8,
    /// First seat of the new chain and what it is told to do.
    pub first: usize,
    pub first_action: HatAction,
    pub first_reason: ModifiedReason,
    /// Tokens expected when the next clue giver comes around.
    pub projected_hints: i32,
}

pub fn plan_clue(
    view: &PlayerView<'_>,
    memory: &PlayerMemory,
    features: HatFeatures,
) -> Result<CluePlan, HatError> {
    let me = view.seat();
    let ring = view.ring();

    let mut last_clued_any = memory.last_clued_any();
    if last_clued_any == ring.previous(me) {
        last_clued_any = me;
    }

    let mut forecast = Forecast::start(view, 1);
    if memory.head().is_some() {
        let chain = ChainForecast::from_predictions(memory.next_actions());
        forecast = forecast.absorb(&chain);
    }

    for record in memory.later_records() {
        let mut chain = ChainForecast::new();
        let mut residual = record.residual();
        for seat in ring.between(record.first, record.last).into_iter().rev() {
            if seat == record.first {
                break;
            }
            let hand = visible_hand(view, seat)?;
            let action = standard_action(hand, chain.will_be_played(), forecast.progress());
            chain.record(action, action.card(hand));
            residual = (residual + ACTION_MODULUS - action_to_number(action)) % ACTION_MODULUS;
        }
        let action = number_to_action(residual);
        let hand = visible_hand(view, record.first)?;
        chain.record(action, action.card(hand));
        forecast = forecast.absorb(&chain);
    }

    let seat_hints = forecast.hints();
    let first = ring.next(last_clued_any);
    let mut chain = ChainForecast::new();
    let mut number = 0u8;
    for seat in ring.between(first, ring.previous(me)).into_iter().rev() {
        if seat == first {
            break;
        }
        let hand = visible_hand(view, seat)?;
        let action = standard_action(hand, chain.will_be_played(), forecast.progress());
        chain.record(action, action.card(hand));
        number = (number + action_to_number(action)) % ACTION_MODULUS;
    }

    forecast.project(&chain);
    let hand = visible_hand(view, first)?;
    let (first_action, first_reason) = modified_action(
        hand,
        &forecast,
        &chain,
        seat_hints,
        view.discard_pile(),
        features.modified_action(),
    );
    number = (number + action_to_number(first_action)) % ACTION_MODULUS;

    let (target, value) = number_to_clue(view, number, me)?;
    Ok(CluePlan {
        target,
        value,
        number,
        first,
        first_action,
        first_reason,
        projected_hints: forecast.hints(),
    })
}
