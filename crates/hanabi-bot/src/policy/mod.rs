mod hat;
mod table;

pub use hat::HatPolicy;
pub use table::Table;

use crate::hat::HatError;
use hanabi_core::model::action::Action;
use hanabi_core::model::round::{RoundError, RoundState};
use thiserror::Error;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: usize,
    pub round: &'a RoundState,
    /// Convention reported by each seat, in seat order.
    pub lineup: &'a [String],
}

/// Unified interface for seats at a table
pub trait Policy: Send {
    /// Name of the convention this seat follows.
    fn convention(&self) -> &'static str;

    /// Called for every seat before each turn so that memories stay in step.
    fn observe(&mut self, _ctx: &PolicyContext) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Choose the action for the seat whose turn it is.
    fn decide(&mut self, ctx: &PolicyContext) -> Result<Action, PolicyError>;
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Hat(#[from] HatError),
    #[error("table has {seats} seats but the round has {players} players")]
    SeatCount { seats: usize, players: usize },
    #[error("round rejected the action: {0}")]
    Round(#[from] RoundError),
}
