use super::{Policy, PolicyContext, PolicyError};
use crate::hat::{Decision, DecisionReason, HAT_CONVENTION, HatFeatures, HatPlayer};
use hanabi_core::model::action::Action;
use tracing::{Level, event};

/// Adapter that exposes a `HatPlayer` through the `Policy` trait
pub struct HatPolicy {
    player: HatPlayer,
}

impl HatPolicy {
    pub fn new(seat: usize, players: usize, features: HatFeatures) -> Self {
        Self {
            player: HatPlayer::new(seat, players, features),
        }
    }

    pub fn from_env(seat: usize, players: usize) -> Self {
        Self::new(seat, players, HatFeatures::from_env())
    }

    pub fn player(&self) -> &HatPlayer {
        &self.player
    }
}

impl Policy for HatPolicy {
    fn convention(&self) -> &'static str {
        HAT_CONVENTION
    }

    fn observe(&mut self, ctx: &PolicyContext) -> Result<(), PolicyError> {
        self.player.observe(ctx.round)?;
        Ok(())
    }

    fn decide(&mut self, ctx: &PolicyContext) -> Result<Action, PolicyError> {
        let decision = self.player.decide(ctx.round, ctx.lineup)?;
        log_decision(ctx, &decision);
        Ok(decision.action)
    }
}

fn log_decision(ctx: &PolicyContext, decision: &Decision) {
    if !tracing::enabled!(target: "hanabi_bot::decision", Level::INFO) {
        return;
    }

    let (number, first, first_reason) = match decision.reason {
        DecisionReason::Clue {
            number,
            first,
            first_reason,
        } => (Some(number), Some(first), first_reason.as_str()),
        _ => (None, None, ""),
    };

    event!(
        target: "hanabi_bot::decision",
        Level::INFO,
        seat = ctx.seat,
        turn = ctx.round.turn(),
        action = %decision.action,
        reason = decision.reason.as_str(),
        residual = ?decision.residual,
        clue_number = ?number,
        chain_first = ?first,
        first_reason,
        hints = ctx.round.hints(),
        deck = ctx.round.deck_size(),
    );
}
