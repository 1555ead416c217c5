use serde::{Deserialize, Serialize};

/// Modular seat arithmetic for a table of `players` seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRing {
    players: usize,
}

impl SeatRing {
    pub const fn new(players: usize) -> Self {
        Self { players }
    }

    pub const fn players(self) -> usize {
        self.players
    }

    pub const fn next(self, seat: usize) -> usize {
        (seat + 1) % self.players
    }

    pub const fn previous(self, seat: usize) -> usize {
        (seat + self.players - 1) % self.players
    }

    /// Seat `steps` places after `seat`.
    pub const fn advance(self, seat: usize, steps: usize) -> usize {
        (seat + steps) % self.players
    }

    /// Steps needed to walk forward from `from` to `to`.
    pub const fn distance(self, from: usize, to: usize) -> usize {
        (to + self.players - from % self.players) % self.players
    }

    /// Whether `seat` lies on the arc `begin..=end`, wrapping past the last seat.
    pub const fn is_between(self, seat: usize, begin: usize, end: usize) -> bool {
        (begin <= seat && seat <= end)
            || (end < begin && begin <= seat)
            || (seat <= end && end < begin)
    }

    /// Seats on the arc `begin..=end` in turn order.
    pub fn between(self, begin: usize, end: usize) -> Vec<usize> {
        let len = self.distance(begin, end) + 1;
        (0..len).map(|step| self.advance(begin, step)).collect()
    }

    pub fn seats(self) -> impl Iterator<Item = usize> {
        0..self.players
    }
}
