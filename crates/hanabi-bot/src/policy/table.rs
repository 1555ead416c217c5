use super::{HatPolicy, Policy, PolicyContext, PolicyError};
use crate::hat::HatFeatures;
use hanabi_core::model::action::Action;
use hanabi_core::model::round::{ActionOutcome, RoundState};

/// Seats in turn order. Each turn every seat observes the log before the
/// active seat decides, so private memories never fall behind.
pub struct Table {
    seats: Vec<Box<dyn Policy>>,
    lineup: Vec<String>,
}

impl Table {
    pub fn new(seats: Vec<Box<dyn Policy>>) -> Self {
        let lineup = seats
            .iter()
            .map(|seat| seat.convention().to_string())
            .collect();
        Self { seats, lineup }
    }

    /// Table of `players` hat seats sharing the same features.
    pub fn hat(players: usize, features: HatFeatures) -> Self {
        let seats = (0..players)
            .map(|seat| Box::new(HatPolicy::new(seat, players, features)) as Box<dyn Policy>)
            .collect();
        Self::new(seats)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn lineup(&self) -> &[String] {
        &self.lineup
    }

    pub fn decide(&mut self, round: &RoundState) -> Result<Action, PolicyError> {
        if self.seats.len() != round.players() {
            return Err(PolicyError::SeatCount {
                seats: self.seats.len(),
                players: round.players(),
            });
        }

        for (seat, policy) in self.seats.iter_mut().enumerate() {
            let ctx = PolicyContext {
                seat,
                round,
                lineup: &self.lineup,
            };
            policy.observe(&ctx)?;
        }

        let active = round.current_player();
        let ctx = PolicyContext {
            seat: active,
            round,
            lineup: &self.lineup,
        };
        self.seats[active].decide(&ctx)
    }

    /// Decides for the active seat and applies the action.
    pub fn play_turn(
        &mut self,
        round: &mut RoundState,
    ) -> Result<(Action, ActionOutcome), PolicyError> {
        let action = self.decide(round)?;
        let outcome = round.apply(action)?;
        Ok((action, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_core::game::setup::GameSetup;
    use hanabi_core::model::suit::Variant;

    struct Stubborn;

    impl Policy for Stubborn {
        fn convention(&self) -> &'static str {
            "stubborn"
        }

        fn decide(&mut self, _ctx: &PolicyContext) -> Result<Action, PolicyError> {
            Ok(Action::Discard { slot: 0 })
        }
    }

    #[test]
    fn lineup_follows_seat_conventions() {
        let table = Table::hat(4, HatFeatures::default());
        assert_eq!(table.len(), 4);
        assert!(table.lineup().iter().all(|name| name == "hat"));
    }

    #[test]
    fn seat_count_must_match_round() {
        let round = GameSetup::new(5, 5, Variant::Standard).deal().unwrap();
        let mut table = Table::hat(4, HatFeatures::default());
        assert!(matches!(
            table.decide(&round),
            Err(PolicyError::SeatCount {
                seats: 4,
                players: 5
            })
        ));
    }

    #[test]
    fn mixed_table_fails_on_first_decision() {
        let round = GameSetup::new(9, 4, Variant::Standard).deal().unwrap();
        let mut seats: Vec<Box<dyn Policy>> = (0..3)
            .map(|seat| Box::new(HatPolicy::new(seat, 4, HatFeatures::default())) as Box<dyn Policy>)
            .collect();
        seats.push(Box::new(Stubborn));
        let mut table = Table::new(seats);
        let err = table.decide(&round).unwrap_err();
        assert!(err.to_string().contains("stubborn"));
    }

    #[test]
    fn play_turn_advances_the_round() {
        let mut round = GameSetup::new(21, 5, Variant::Rainbow).deal().unwrap();
        let mut table = Table::hat(5, HatFeatures::default());
        for _ in 0..10 {
            table.play_turn(&mut round).unwrap();
        }
        assert_eq!(round.turn(), 10);
        assert!(round.hints() <= 8);
    }
}
