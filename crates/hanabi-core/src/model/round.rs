use crate::model::action::{Action, ActionRecord, RecordedAction};
use crate::model::card::Card;
use crate::model::clue::ClueValue;
use crate::model::deck::Deck;
use crate::model::hand::{CardKnowledge, Hand};
use crate::model::player::SeatRing;
use crate::model::progress::Progress;
use crate::model::suit::{Suit, Variant};
use core::fmt;

pub const MAX_HINTS: u8 = 8;
pub const MAX_BOMBS: u8 = 3;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

pub const fn hand_size_for(players: usize) -> usize {
    if players <= 3 { 5 } else { 4 }
}

#[derive(Debug, Clone)]
pub struct RoundState {
    variant: Variant,
    ring: SeatRing,
    hands: Vec<Hand>,
    deck: Deck,
    discard_pile: Vec<Card>,
    progress: Progress,
    hints: u8,
    bombs: u8,
    history: Vec<ActionRecord>,
    current: usize,
    final_turns: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    /// Every stack reached five.
    Perfect,
    /// Third misplay.
    Bombed,
    /// Everyone took their last turn after the deck ran out.
    DeckExhausted,
}

impl RoundState {
    pub fn deal(deck: Deck, players: usize, variant: Variant) -> Result<Self, RoundError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(RoundError::PlayerCount(players));
        }

        let mut deck = deck;
        let mut hands = vec![Hand::new(); players];
        for _ in 0..hand_size_for(players) {
            for hand in hands.iter_mut() {
                let card = deck.draw().ok_or(RoundError::DeckExhausted)?;
                hand.draw(card, 0);
            }
        }

        Ok(Self::assemble(variant, hands, deck))
    }

    /// Table with explicit hands (oldest card first) and draw order.
    pub fn from_hands(variant: Variant, hands: Vec<Vec<Card>>, draw_order: Vec<Card>) -> Self {
        let hands = hands.into_iter().map(Hand::with_cards).collect();
        Self::assemble(variant, hands, Deck::from_cards(draw_order))
    }

    fn assemble(variant: Variant, hands: Vec<Hand>, deck: Deck) -> Self {
        Self {
            variant,
            ring: SeatRing::new(hands.len()),
            hands,
            deck,
            discard_pile: Vec::new(),
            progress: Progress::new(variant),
            hints: MAX_HINTS,
            bombs: 0,
            history: Vec::new(),
            current: 0,
            final_turns: None,
        }
    }

    pub fn with_hints(mut self, hints: u8) -> Self {
        self.hints = hints.min(MAX_HINTS);
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_current(mut self, seat: usize) -> Self {
        self.current = seat % self.ring.players();
        self
    }

    pub fn with_discards(mut self, discards: Vec<Card>) -> Self {
        self.discard_pile = discards;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn suits(&self) -> &'static [Suit] {
        self.variant.suits()
    }

    pub fn players(&self) -> usize {
        self.ring.players()
    }

    pub fn ring(&self) -> SeatRing {
        self.ring
    }

    pub fn hand(&self, seat: usize) -> &Hand {
        &self.hands[seat]
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn hints(&self) -> u8 {
        self.hints
    }

    pub fn bombs(&self) -> u8 {
        self.bombs
    }

    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.history.last()
    }

    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn turn(&self) -> usize {
        self.history.len()
    }

    pub fn score(&self) -> usize {
        self.progress.score()
    }

    pub fn max_score(&self) -> usize {
        self.progress.max_score()
    }

    pub fn status(&self) -> RoundStatus {
        if self.progress.is_complete() {
            RoundStatus::Perfect
        } else if self.bombs >= MAX_BOMBS {
            RoundStatus::Bombed
        } else if self.final_turns == Some(0) {
            RoundStatus::DeckExhausted
        } else {
            RoundStatus::InProgress
        }
    }

    pub fn is_over(&self) -> bool {
        self.status() != RoundStatus::InProgress
    }

    /// What `seat` is allowed to see.
    pub fn view(&self, seat: usize) -> PlayerView<'_> {
        PlayerView { round: self, seat }
    }

    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome, RoundError> {
        if self.is_over() {
            return Err(RoundError::RoundOver);
        }

        let actor = self.current;
        let turn = self.history.len();
        let (kind, outcome) = match action {
            Action::Hint { target, value } => {
                self.check_hint(actor, target, value)?;
                let touched = self.hands[target].receive_clue(value);
                self.hints -= 1;
                (
                    RecordedAction::Hint {
                        target,
                        value,
                        touched: touched.clone(),
                    },
                    ActionOutcome::Hinted { touched },
                )
            }
            Action::Play { slot } => {
                let (card, position, hand_size) = self.take_card(actor, slot)?;
                let success = self.progress.advance(card);
                if success {
                    if card.is_five() && self.hints < MAX_HINTS {
                        self.hints += 1;
                    }
                } else {
                    self.bombs += 1;
                    self.discard_pile.push(card);
                }
                self.replenish(actor, turn);
                (
                    RecordedAction::Play {
                        card,
                        position,
                        hand_size,
                        success,
                    },
                    ActionOutcome::Played { card, success },
                )
            }
            Action::Discard { slot } => {
                let (card, position, hand_size) = self.take_card(actor, slot)?;
                // Discarding at full tokens is tolerated; the token count stays capped.
                self.hints = (self.hints + 1).min(MAX_HINTS);
                self.discard_pile.push(card);
                self.replenish(actor, turn);
                (
                    RecordedAction::Discard {
                        card,
                        position,
                        hand_size,
                    },
                    ActionOutcome::Discarded { card },
                )
            }
        };

        self.history.push(ActionRecord { actor, turn, kind });
        self.advance_turn();
        Ok(outcome)
    }

    fn check_hint(&self, actor: usize, target: usize, value: ClueValue) -> Result<(), RoundError> {
        if target >= self.players() {
            return Err(RoundError::InvalidSeat(target));
        }
        if target == actor {
            return Err(RoundError::SelfHint);
        }
        if self.hints == 0 {
            return Err(RoundError::NoHintsLeft);
        }
        if let ClueValue::Suit(suit) = value {
            if suit.is_wildcard() || !self.variant.contains(suit) {
                return Err(RoundError::UnnameableSuit(suit));
            }
        }
        if self.hands[target].touched_by(value).is_empty() {
            return Err(RoundError::EmptyClue { target, value });
        }
        Ok(())
    }

    fn take_card(&mut self, actor: usize, slot: usize) -> Result<(Card, usize, usize), RoundError> {
        let hand = &mut self.hands[actor];
        let hand_size = hand.len();
        let position = hand
            .position_of(slot)
            .ok_or(RoundError::InvalidSlot { slot, hand_size })?;
        let held = hand
            .remove(slot)
            .ok_or(RoundError::InvalidSlot { slot, hand_size })?;
        Ok((held.card, position, hand_size))
    }

    fn replenish(&mut self, seat: usize, turn: usize) {
        if let Some(card) = self.deck.draw() {
            self.hands[seat].draw(card, turn);
        }
    }

    fn advance_turn(&mut self) {
        match self.final_turns.as_mut() {
            Some(left) => *left = left.saturating_sub(1),
            None if self.deck.is_empty() => self.final_turns = Some(self.players()),
            None => {}
        }
        self.current = self.ring.next(self.current);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Hinted { touched: Vec<usize> },
    Played { card: Card, success: bool },
    Discarded { card: Card },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    PlayerCount(usize),
    DeckExhausted,
    RoundOver,
    InvalidSeat(usize),
    SelfHint,
    NoHintsLeft,
    UnnameableSuit(Suit),
    EmptyClue { target: usize, value: ClueValue },
    InvalidSlot { slot: usize, hand_size: usize },
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::PlayerCount(count) => {
                write!(f, "{count} players requested, {MIN_PLAYERS}..={MAX_PLAYERS} supported")
            }
            RoundError::DeckExhausted => f.write_str("deck ran out while dealing"),
            RoundError::RoundOver => f.write_str("round is already over"),
            RoundError::InvalidSeat(seat) => write!(f, "seat {seat} is not at the table"),
            RoundError::SelfHint => f.write_str("players cannot hint themselves"),
            RoundError::NoHintsLeft => f.write_str("no hint tokens left"),
            RoundError::UnnameableSuit(suit) => write!(f, "suit '{suit}' cannot be named"),
            RoundError::EmptyClue { target, value } => {
                write!(f, "clue {value} touches nothing in seat {target}'s hand")
            }
            RoundError::InvalidSlot { slot, hand_size } => {
                write!(f, "slot {slot} is outside a hand of {hand_size}")
            }
        }
    }
}

impl std::error::Error for RoundError {}

/// Public information from one seat's point of view: other hands, everyone's
/// clue history, and the shared board. The seat's own cards stay hidden.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    round: &'a RoundState,
    seat: usize,
}

impl<'a> PlayerView<'a> {
    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn players(&self) -> usize {
        self.round.players()
    }

    pub fn ring(&self) -> SeatRing {
        self.round.ring
    }

    pub fn variant(&self) -> Variant {
        self.round.variant
    }

    /// Another seat's hand; `None` for the viewer's own seat.
    pub fn hand(&self, seat: usize) -> Option<&'a Hand> {
        if seat == self.seat {
            return None;
        }
        self.round.hands.get(seat)
    }

    pub fn hand_len(&self, seat: usize) -> usize {
        self.round.hands.get(seat).map_or(0, Hand::len)
    }

    /// Clue history of a seat's newest card. Available for the viewer's own hand too.
    pub fn newest_knowledge(&self, seat: usize) -> Option<&'a CardKnowledge> {
        self.round
            .hands
            .get(seat)
            .and_then(Hand::newest)
            .map(|held| &held.knowledge)
    }

    pub fn progress(&self) -> &'a Progress {
        &self.round.progress
    }

    pub fn hints(&self) -> u8 {
        self.round.hints
    }

    pub fn bombs(&self) -> u8 {
        self.round.bombs
    }

    pub fn deck_size(&self) -> usize {
        self.round.deck.len()
    }

    pub fn discard_pile(&self) -> &'a [Card] {
        &self.round.discard_pile
    }

    pub fn history(&self) -> &'a [ActionRecord] {
        &self.round.history
    }

    pub fn current_player(&self) -> usize {
        self.round.current
    }

    pub fn turn(&self) -> usize {
        self.round.turn()
    }
}
