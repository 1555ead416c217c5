use super::codec::{HatAction, PredictedAction};
use hanabi_core::model::card::Card;
use hanabi_core::model::progress::Progress;
use hanabi_core::model::round::{MAX_HINTS, PlayerView};

const TOKEN_CAP: i32 = MAX_HINTS as i32;

/// Token movement caused by one predicted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintChange {
    FivePlayed,
    Discarded,
    Clued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintProjection {
    pub end: i32,
    pub min: i32,
    pub max: i32,
}

/// Walks token changes in turn order starting from `start`.
///
/// A discard above the cap settles at seven: somebody downstream will have
/// clued instead. A negative count means a seat discarded because it could
/// not clue, which leaves one token.
pub fn project_hints<I>(start: i32, changes: I) -> HintProjection
where
    I: IntoIterator<Item = HintChange>,
{
    let mut hints = start;
    let mut min = start;
    let mut max = start;
    for change in changes {
        match change {
            HintChange::Discarded => {
                hints += 1;
                max = max.max(hints);
                if hints > TOKEN_CAP {
                    hints = TOKEN_CAP - 1;
                }
            }
            HintChange::FivePlayed | HintChange::Clued => {
                hints += if change == HintChange::Clued { -1 } else { 1 };
                max = max.max(hints);
                min = min.min(hints);
                if hints < 0 {
                    hints = 1;
                }
                if hints > TOKEN_CAP {
                    hints = TOKEN_CAP;
                }
            }
        }
    }
    HintProjection {
        end: hints,
        min,
        max,
    }
}

/// Scratch state for one chain of predicted actions. Actions are recorded in
/// reverse turn order, the same order the chain is simulated in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainForecast {
    plays: usize,
    discards: usize,
    will_be_played: Vec<Card>,
    discarded: Vec<Card>,
    changes: Vec<HintChange>,
}

impl ChainForecast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_predictions<'a, I>(predictions: I) -> Self
    where
        I: IntoIterator<Item = &'a PredictedAction>,
    {
        let mut chain = Self::new();
        for predicted in predictions {
            chain.record(predicted.action, predicted.card);
        }
        chain
    }

    pub fn record(&mut self, action: HatAction, card: Option<Card>) {
        match action {
            HatAction::Play(_) => {
                self.plays += 1;
                if let Some(card) = card {
                    self.will_be_played.push(card);
                    if card.is_five() {
                        self.changes.push(HintChange::FivePlayed);
                    }
                }
            }
            HatAction::Discard(_) => {
                self.discards += 1;
                self.changes.push(HintChange::Discarded);
                if let Some(card) = card {
                    self.discarded.push(card);
                }
            }
            HatAction::Hint => self.changes.push(HintChange::Clued),
        }
    }

    pub fn plays(&self) -> usize {
        self.plays
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    /// Cards this chain already claims; nobody else is told to play them.
    pub fn will_be_played(&self) -> &[Card] {
        &self.will_be_played
    }

    pub fn discarded(&self) -> &[Card] {
        &self.discarded
    }

    /// Token changes in turn order.
    pub fn changes_in_turn_order(&self) -> impl Iterator<Item = HintChange> + '_ {
        self.changes.iter().rev().copied()
    }
}

/// Board state as it should look once every pending chain has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    progress: Progress,
    deck_size: usize,
    hints: i32,
    min_hints: i32,
    max_hints: i32,
    plays: usize,
    discards: usize,
    discarded: Vec<Card>,
}

impl Forecast {
    /// `penalty` is the token the forecasting seat spends on its own clue.
    pub fn start(view: &PlayerView<'_>, penalty: i32) -> Self {
        let hints = i32::from(view.hints()) - penalty;
        Self {
            progress: *view.progress(),
            deck_size: view.deck_size(),
            hints,
            min_hints: hints,
            max_hints: hints,
            plays: 0,
            discards: 0,
            discarded: Vec::new(),
        }
    }

    /// Folds a finished chain into the board.
    pub fn absorb(mut self, chain: &ChainForecast) -> Self {
        self.plays += chain.plays;
        self.discards += chain.discards;
        for card in &chain.will_be_played {
            self.progress.advance(*card);
        }
        self.deck_size = self
            .deck_size
            .saturating_sub(chain.plays + chain.discards);
        self.project(chain);
        self.discarded.extend_from_slice(&chain.discarded);
        self
    }

    /// Updates the running token count (and its extremes) without touching the board.
    pub fn project(&mut self, chain: &ChainForecast) {
        let projection = project_hints(self.hints, chain.changes_in_turn_order());
        self.hints = projection.end;
        self.min_hints = projection.min;
        self.max_hints = projection.max;
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    pub fn hints(&self) -> i32 {
        self.hints
    }

    pub fn min_hints(&self) -> i32 {
        self.min_hints
    }

    pub fn max_hints(&self) -> i32 {
        self.max_hints
    }

    pub fn plays(&self) -> usize {
        self.plays
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    pub fn discarded(&self) -> &[Card] {
        &self.discarded
    }
}
