use super::codec::{HatAction, number_to_action};
use super::memory::PlayerMemory;
use super::planner::plan_clue;
use super::simulator::{ModifiedReason, count_unplayed_playable};
use super::{FORCED_DISCARD_SLOT, HAT_CONVENTION, HatError, HatFeatures, MIN_PLAYERS};
use hanabi_core::model::action::Action;
use hanabi_core::model::round::{MAX_HINTS, PlayerView, RoundState};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Executes the play its clue decoded to.
    DecodedPlay,
    /// Executes the discard its clue decoded to.
    DecodedDiscard,
    /// No instruction to follow and no token to clue with.
    ForcedDiscard,
    /// Gives a clue; carries what the first seat of the new chain was told.
    Clue {
        number: u8,
        first: usize,
        first_reason: ModifiedReason,
    },
}

impl DecisionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionReason::DecodedPlay => "decoded_play",
            DecisionReason::DecodedDiscard => "decoded_discard",
            DecisionReason::ForcedDiscard => "forced_discard",
            DecisionReason::Clue { .. } => "clue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub reason: DecisionReason,
    /// Decoded instruction, when the seat was clued.
    pub residual: Option<u8>,
}

/// One seat following the hat convention.
#[derive(Debug, Clone)]
pub struct HatPlayer {
    seat: usize,
    features: HatFeatures,
    memory: PlayerMemory,
}

impl HatPlayer {
    pub fn new(seat: usize, players: usize, features: HatFeatures) -> Self {
        Self {
            seat,
            features,
            memory: PlayerMemory::new(seat, players),
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn features(&self) -> HatFeatures {
        self.features
    }

    pub fn memory(&self) -> &PlayerMemory {
        &self.memory
    }

    /// Reads the action logged since the last call. Must run after every action.
    pub fn observe(&mut self, round: &RoundState) -> Result<(), HatError> {
        self.memory.observe(&round.view(self.seat), self.features)
    }

    /// Chooses this seat's action. `lineup` names the convention of every seat.
    pub fn decide(&mut self, round: &RoundState, lineup: &[String]) -> Result<Decision, HatError> {
        self.check_table(round, lineup)?;
        let view = round.view(self.seat);
        self.memory.observe(&view, self.features)?;

        let decision = self.choose(&view)?;
        self.review(&view, &decision);
        if matches!(decision.reason, DecisionReason::Clue { .. }) {
            let ring = view.ring();
            self.memory.set_last_clued_any(ring.previous(self.seat));
        }
        self.memory.reset();
        Ok(decision)
    }

    /// Setup errors surface during the opening lap only.
    fn check_table(&self, round: &RoundState, lineup: &[String]) -> Result<(), HatError> {
        let players = round.players();
        if round.history().len() >= players {
            return Ok(());
        }
        if lineup.len() != players {
            return Err(HatError::LineupSize {
                expected: players,
                found: lineup.len(),
            });
        }
        if let Some((seat, convention)) = lineup
            .iter()
            .enumerate()
            .find(|(_, convention)| convention.as_str() != HAT_CONVENTION)
        {
            return Err(HatError::MixedTable {
                seat,
                convention: convention.clone(),
            });
        }
        if players < MIN_PLAYERS {
            return Err(HatError::TooFewPlayers {
                found: players,
                min: MIN_PLAYERS,
            });
        }
        Ok(())
    }

    fn choose(&self, view: &PlayerView<'_>) -> Result<Decision, HatError> {
        let me = self.seat;
        let hints = view.hints();
        let hand_len = view.hand_len(me);
        let ring = view.ring();

        if let Some(head) = self.memory.head() {
            let residual = head.residual();
            match number_to_action(residual) {
                HatAction::Play(slot) if slot < hand_len => {
                    return Ok(Decision {
                        action: Action::Play { slot },
                        reason: DecisionReason::DecodedPlay,
                        residual: Some(residual),
                    });
                }
                HatAction::Discard(slot) if slot < hand_len => {
                    if self.obeys_discard(view, head.first) {
                        return Ok(Decision {
                            action: Action::Discard { slot },
                            reason: DecisionReason::DecodedDiscard,
                            residual: Some(residual),
                        });
                    }
                    self.anomaly(view, "clue_instead_of_discard");
                }
                HatAction::Hint => {}
                HatAction::Play(_) | HatAction::Discard(_) => {
                    self.anomaly(view, "instruction_outside_hand");
                }
            }
        } else if self.memory.last_clued_any() != ring.previous(me) {
            self.anomaly(view, "unclued_out_of_sequence");
        }

        if hints == 0 {
            if hand_len == 0 {
                return Err(HatError::EmptyHand { seat: me });
            }
            return Ok(Decision {
                action: Action::Discard {
                    slot: FORCED_DISCARD_SLOT.min(hand_len - 1),
                },
                reason: DecisionReason::ForcedDiscard,
                residual: self.memory.head().map(|head| head.residual()),
            });
        }

        let plan = plan_clue(view, &self.memory, self.features)?;
        Ok(Decision {
            action: Action::Hint {
                target: plan.target,
                value: plan.value,
            },
            reason: DecisionReason::Clue {
                number: plan.number,
                first: plan.first,
                first_reason: plan.first_reason,
            },
            residual: self.memory.head().map(|head| head.residual()),
        })
    }

    /// A decoded discard is followed unless cluing is clearly more useful.
    fn obeys_discard(&self, view: &PlayerView<'_>, chain_first: usize) -> bool {
        let hints = view.hints();
        if hints == 0 {
            return true;
        }
        let full = hints == MAX_HINTS;
        if chain_first == self.seat && self.features.modified_action() {
            if !full {
                return true;
            }
            self.anomaly(view, "clue_forced_at_full_tokens");
        }
        if full {
            return false;
        }

        let everyone_plays = self
            .memory
            .next_actions()
            .iter()
            .all(|predicted| predicted.action.is_play());
        let next_target = view.ring().next(self.memory.last_clued_any());
        let progress = view.progress();
        let next_can_play = view
            .hand(next_target)
            .is_some_and(|hand| hand.faces().any(|card| progress.is_playable(card)));
        if everyone_plays && next_can_play {
            return false;
        }
        view.deck_size() >= count_unplayed_playable(progress) || hints <= 1
    }

    /// Flags questionable moves after the fact.
    fn review(&self, view: &PlayerView<'_>, decision: &Decision) {
        if let Action::Discard { .. } = decision.action {
            if view.hints() == MAX_HINTS {
                self.anomaly(view, "discard_at_full_tokens");
            }
            let deck = view.deck_size();
            if deck > 0 && deck < count_unplayed_playable(view.progress()) {
                self.anomaly(view, "endgame_discard");
            }
        }
    }

    fn anomaly(&self, view: &PlayerView<'_>, kind: &'static str) {
        if !self.features.verbose() {
            return;
        }
        event!(
            target: "hanabi_bot::anomaly",
            Level::WARN,
            seat = self.seat,
            kind,
            turn = view.turn(),
            hints = view.hints(),
            deck = view.deck_size(),
            last_clued_any = self.memory.last_clued_any(),
        );
    }
}
