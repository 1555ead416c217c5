use super::codec::{
    ACTION_MODULUS, HatAction, PredictedAction, action_to_number, clue_to_number,
    external_action_to_number, number_to_action,
};
use super::forecast::ChainForecast;
use super::simulator::{easy_discards, standard_action};
use super::{HatError, HatFeatures, visible_hand};
use hanabi_core::model::action::{ActionRecord, RecordedAction};
use hanabi_core::model::player::SeatRing;
use hanabi_core::model::round::PlayerView;
use std::collections::BTreeMap;

/// Where a residue subtracted from a clue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentSource {
    /// The seat acted and the action was read from the log.
    Observed,
    /// The seat clued where it was told to discard; its fallback discard is booked instead.
    Substituted,
    /// The seat acts after the decoder and was simulated.
    Predicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub seat: usize,
    pub residue: u8,
    pub source: AdjustmentSource,
}

/// One clue and the chain of seats it instructs, `first..=last` in turn order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueRecord {
    pub first: usize,
    pub last: usize,
    pub cluer: usize,
    pub encoded: u8,
    /// Easy discard of each instructed seat, fixed when the clue was seen.
    pub discards: BTreeMap<usize, HatAction>,
    adjustments: Vec<Adjustment>,
    decoded: bool,
}

impl ClueRecord {
    pub fn new(
        first: usize,
        last: usize,
        cluer: usize,
        encoded: u8,
        discards: BTreeMap<usize, HatAction>,
    ) -> Self {
        Self {
            first,
            last,
            cluer,
            encoded: encoded % ACTION_MODULUS,
            discards,
            adjustments: Vec::new(),
            decoded: false,
        }
    }

    pub fn adjust(&mut self, seat: usize, residue: u8, source: AdjustmentSource) {
        self.adjustments.push(Adjustment {
            seat,
            residue: residue % ACTION_MODULUS,
            source,
        });
    }

    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// What is left of the clue once every known residue is taken out.
    pub fn residual(&self) -> u8 {
        self.adjustments.iter().fold(self.encoded, |value, adjustment| {
            (value + ACTION_MODULUS - adjustment.residue) % ACTION_MODULUS
        })
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    fn fallback_residue(&self, seat: usize) -> u8 {
        action_to_number(self.discards.get(&seat).copied().unwrap_or(HatAction::Hint))
    }
}

/// Everything one seat remembers about pending clues. Only public
/// information goes in, so every seat's copy evolves the same way.
#[derive(Debug, Clone)]
pub struct PlayerMemory {
    seat: usize,
    ring: SeatRing,
    records: Vec<ClueRecord>,
    last_clued_any: usize,
    next_actions: Vec<PredictedAction>,
    observed: usize,
}

impl PlayerMemory {
    pub fn new(seat: usize, players: usize) -> Self {
        Self {
            seat,
            ring: SeatRing::new(players),
            records: Vec::new(),
            last_clued_any: players.saturating_sub(1),
            next_actions: Vec::new(),
            observed: 0,
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn ring(&self) -> SeatRing {
        self.ring
    }

    /// Last seat covered by any clue so far. The next clue starts right after it.
    pub fn last_clued_any(&self) -> usize {
        self.last_clued_any
    }

    pub fn is_clued(&self) -> bool {
        !self.records.is_empty()
    }

    /// The clue this seat acts on.
    pub fn head(&self) -> Option<&ClueRecord> {
        self.records.first()
    }

    /// Clues given after the head, oldest first.
    pub fn later_records(&self) -> &[ClueRecord] {
        self.records.get(1..).unwrap_or(&[])
    }

    pub fn records(&self) -> &[ClueRecord] {
        &self.records
    }

    /// Simulated actions of the head chain's seats after this one, last seat first.
    pub fn next_actions(&self) -> &[PredictedAction] {
        &self.next_actions
    }

    /// Forgets every pending clue once this seat has acted.
    pub fn reset(&mut self) {
        self.records.clear();
        self.next_actions.clear();
    }

    pub fn set_last_clued_any(&mut self, seat: usize) {
        self.last_clued_any = seat;
    }

    /// Reads the newest logged action, then decodes the head chain if its
    /// first seat is about to act. Clues and discards are read against the
    /// current hands, so at most one action may be pending.
    pub fn observe(&mut self, view: &PlayerView<'_>, features: HatFeatures) -> Result<(), HatError> {
        let history = view.history();
        let behind = history.len().saturating_sub(self.observed);
        if behind > 1 {
            return Err(HatError::StaleMemory {
                seat: self.seat,
                behind,
            });
        }
        if let Some(record) = history.get(self.observed) {
            self.observed += 1;
            self.interpret(view, record, features)?;
        }
        self.decode_chain_start(view)
    }

    fn interpret(
        &mut self,
        view: &PlayerView<'_>,
        record: &ActionRecord,
        features: HatFeatures,
    ) -> Result<(), HatError> {
        let ring = self.ring;
        let actor = record.actor;
        // Seats that keep acting without clues drag the chain start along.
        if self.last_clued_any == ring.previous(actor) {
            self.last_clued_any = actor;
        }

        if actor != self.seat {
            if let Some(head) = self.records.first_mut() {
                if ring.is_between(actor, head.first, head.last) {
                    let residue = external_action_to_number(&record.kind);
                    let exempt = actor == head.first && features.modified_action();
                    if number_to_action(residue) == HatAction::Hint && !exempt {
                        let fallback = head.fallback_residue(actor);
                        head.adjust(actor, fallback, AdjustmentSource::Substituted);
                    } else {
                        head.adjust(actor, residue, AdjustmentSource::Observed);
                    }
                }
            }
        }

        let RecordedAction::Hint { target, value, .. } = &record.kind else {
            return Ok(());
        };
        let first = ring.next(self.last_clued_any);
        let last = ring.previous(actor);
        self.last_clued_any = last;
        if actor == self.seat {
            return Ok(());
        }

        let mut discards = BTreeMap::new();
        for seat in ring.between(first, last) {
            if seat == self.seat {
                continue;
            }
            let hand = visible_hand(view, seat)?;
            discards.insert(seat, easy_discards(hand, view.progress()));
        }
        let encoded = clue_to_number(view, *target, *value, actor);
        self.records
            .push(ClueRecord::new(first, last, actor, encoded, discards));
        Ok(())
    }

    /// Simulates every seat of the head chain that acts after this one. Runs
    /// once, at the start of the chain's first turn.
    fn decode_chain_start(&mut self, view: &PlayerView<'_>) -> Result<(), HatError> {
        let me = self.seat;
        let ring = self.ring;
        let Some(head) = self.records.first_mut() else {
            return Ok(());
        };
        if head.decoded || head.first != view.current_player() {
            return Ok(());
        }

        let mut chain = ChainForecast::new();
        let mut predictions = Vec::new();
        for seat in ring
            .between(head.first, head.last)
            .into_iter()
            .rev()
            .take_while(|seat| *seat != me)
        {
            let hand = visible_hand(view, seat)?;
            let action = standard_action(hand, chain.will_be_played(), view.progress());
            let card = action.card(hand);
            chain.record(action, card);
            head.adjust(seat, action_to_number(action), AdjustmentSource::Predicted);
            predictions.push(PredictedAction { seat, action, card });
        }
        head.decoded = true;
        self.next_actions = predictions;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_core::model::action::Action;
    use hanabi_core::model::card::Card;
    use hanabi_core::model::clue::ClueValue;
    use hanabi_core::model::rank::Rank;
    use hanabi_core::model::round::RoundState;
    use hanabi_core::model::suit::Variant;

    fn cards(raw: &[&str]) -> Vec<Card> {
        raw.iter().map(|card| card.parse().unwrap()).collect()
    }

    fn five_seat_table() -> RoundState {
        RoundState::from_hands(
            Variant::Standard,
            vec![
                cards(&["2r", "3r", "4r", "5r"]),
                cards(&["3y", "4y", "2g", "1y"]),
                cards(&["3g", "4g", "4b", "2w"]),
                cards(&["1b", "3b", "4w", "2b"]),
                cards(&["3w", "4w", "2y", "5g"]),
            ],
            cards(&["1r", "1g", "1w", "5b", "5w"]),
        )
    }

    #[test]
    fn residual_folds_adjustments_mod_nine() {
        let mut record = ClueRecord::new(1, 3, 0, 2, BTreeMap::new());
        record.adjust(1, 4, AdjustmentSource::Observed);
        assert_eq!(record.residual(), 7);
        record.adjust(2, 7, AdjustmentSource::Predicted);
        assert_eq!(record.residual(), 0);
        assert_eq!(record.adjustments().len(), 2);
    }

    #[test]
    fn first_clue_covers_every_other_seat() {
        let mut round = five_seat_table();
        round
            .apply(Action::Hint {
                target: 1,
                value: ClueValue::Rank(Rank::One),
            })
            .unwrap();

        for seat in 1..5 {
            let mut memory = PlayerMemory::new(seat, 5);
            memory
                .observe(&round.view(seat), HatFeatures::default())
                .unwrap();
            let head = memory.head().expect("clued");
            assert_eq!((head.first, head.last, head.cluer), (1, 4, 0));
            assert_eq!(head.encoded, 0);
            assert_eq!(memory.last_clued_any(), 4);
            assert!(!head.discards.contains_key(&seat));
        }

        let mut cluer = PlayerMemory::new(0, 5);
        cluer.observe(&round.view(0), HatFeatures::default()).unwrap();
        assert!(!cluer.is_clued());
        assert_eq!(cluer.last_clued_any(), 4);
    }

    #[test]
    fn chain_start_predicts_seats_after_the_decoder() {
        let mut round = five_seat_table();
        round
            .apply(Action::Hint {
                target: 1,
                value: ClueValue::Rank(Rank::One),
            })
            .unwrap();

        let mut memory = PlayerMemory::new(2, 5);
        memory.observe(&round.view(2), HatFeatures::default()).unwrap();
        let predicted: Vec<_> = memory.next_actions().iter().map(|p| p.seat).collect();
        assert_eq!(predicted, vec![4, 3]);
        // Seat 4 holds nothing playable or dead, seat 3 plays its 1b.
        assert_eq!(memory.next_actions()[0].action, HatAction::Hint);
        assert_eq!(memory.next_actions()[1].action, HatAction::Play(0));
        let head = memory.head().unwrap();
        assert!(head.is_decoded());
        assert_eq!(head.residual(), 5);

        // A second pass in the same turn changes nothing.
        memory.observe(&round.view(2), HatFeatures::default()).unwrap();
        assert_eq!(memory.head().unwrap().adjustments().len(), 2);
    }

    #[test]
    fn hint_by_instructed_seat_books_fallback_discard() {
        let mut round = five_seat_table();
        round
            .apply(Action::Hint {
                target: 1,
                value: ClueValue::Rank(Rank::One),
            })
            .unwrap();
        let mut memory = PlayerMemory::new(3, 5);
        memory.observe(&round.view(3), HatFeatures::default()).unwrap();

        // Seat 1 plays, seat 2 clues instead of its instruction.
        round.apply(Action::Play { slot: 3 }).unwrap();
        memory.observe(&round.view(3), HatFeatures::default()).unwrap();
        round
            .apply(Action::Hint {
                target: 4,
                value: ClueValue::Rank(Rank::Five),
            })
            .unwrap();
        memory.observe(&round.view(3), HatFeatures::default()).unwrap();

        let head = memory.head().unwrap();
        let sources: Vec<_> = head
            .adjustments()
            .iter()
            .map(|adjustment| (adjustment.seat, adjustment.source))
            .collect();
        assert_eq!(
            sources,
            vec![
                (4, AdjustmentSource::Predicted),
                (1, AdjustmentSource::Observed),
                (2, AdjustmentSource::Substituted),
            ]
        );
        assert_eq!(head.adjustments()[1].residue, 1);
        // Seat 2 had no easy discard, so the booked residue is a hint.
        assert_eq!(head.adjustments()[2].residue, 0);
        // The clue by seat 2 opens a new record covering seats 0 and 1.
        assert_eq!(memory.later_records().len(), 1);
        let later = &memory.later_records()[0];
        assert_eq!((later.first, later.last, later.cluer), (0, 1, 2));
    }

    #[test]
    fn memory_that_skips_an_action_refuses_to_decode() {
        let mut round = five_seat_table();
        let mut eager = PlayerMemory::new(2, 5);
        let mut lazy = PlayerMemory::new(2, 5);

        // The "3" touches seat 1's 3y and misses its newest card, the 1y.
        round
            .apply(Action::Hint {
                target: 1,
                value: ClueValue::Rank(Rank::Three),
            })
            .unwrap();
        eager.observe(&round.view(2), HatFeatures::default()).unwrap();
        assert_eq!(eager.head().unwrap().encoded, 2);

        // Seat 1 plays and draws, so its newest card is no longer the 1y.
        round.apply(Action::Play { slot: 3 }).unwrap();
        eager.observe(&round.view(2), HatFeatures::default()).unwrap();
        assert_eq!(eager.head().unwrap().encoded, 2);

        assert_eq!(
            lazy.observe(&round.view(2), HatFeatures::default()),
            Err(HatError::StaleMemory { seat: 2, behind: 2 })
        );
        assert!(!lazy.is_clued());
        assert_eq!(lazy.last_clued_any(), 4);
    }

    #[test]
    fn reset_keeps_chain_pointer() {
        let mut round = five_seat_table();
        round
            .apply(Action::Hint {
                target: 1,
                value: ClueValue::Rank(Rank::One),
            })
            .unwrap();
        let mut memory = PlayerMemory::new(1, 5);
        memory.observe(&round.view(1), HatFeatures::default()).unwrap();
        assert!(memory.is_clued());
        memory.reset();
        assert!(!memory.is_clued());
        assert!(memory.next_actions().is_empty());
        assert_eq!(memory.last_clued_any(), 4);
    }
}
