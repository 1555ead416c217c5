use crate::model::card::Card;
use crate::model::clue::ClueValue;
use serde::{Deserialize, Serialize};

/// Public clue history of one card. Visible to every seat, including the holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardKnowledge {
    direct: Vec<ClueValue>,
    indirect: Vec<ClueValue>,
    drawn_turn: usize,
}

impl CardKnowledge {
    pub fn new(drawn_turn: usize) -> Self {
        Self {
            direct: Vec::new(),
            indirect: Vec::new(),
            drawn_turn,
        }
    }

    /// Clues that touched this card.
    pub fn direct(&self) -> &[ClueValue] {
        &self.direct
    }

    /// Clues given to the holder that missed this card.
    pub fn indirect(&self) -> &[ClueValue] {
        &self.indirect
    }

    pub fn last_indirect(&self) -> Option<ClueValue> {
        self.indirect.last().copied()
    }

    pub fn drawn_turn(&self) -> usize {
        self.drawn_turn
    }

    pub fn is_clued(&self) -> bool {
        !self.direct.is_empty()
    }

    fn note(&mut self, value: ClueValue, touched: bool) {
        if touched {
            self.direct.push(value);
        } else {
            self.indirect.push(value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandCard {
    pub card: Card,
    pub knowledge: CardKnowledge,
}

/// Cards ordered oldest first; slot 0 is the oldest card.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<HandCard>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self::new();
        for card in cards {
            hand.draw(card, 0);
        }
        hand
    }

    pub fn draw(&mut self, card: Card, turn: usize) {
        self.cards.push(HandCard {
            card,
            knowledge: CardKnowledge::new(turn),
        });
    }

    pub fn remove(&mut self, slot: usize) -> Option<HandCard> {
        if slot < self.cards.len() {
            Some(self.cards.remove(slot))
        } else {
            None
        }
    }

    /// Slots the clue would touch, without recording anything.
    pub fn touched_by(&self, value: ClueValue) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, held)| value.touches(held.card))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Records the clue on every card and returns the touched slots.
    pub fn receive_clue(&mut self, value: ClueValue) -> Vec<usize> {
        let touched = self.touched_by(value);
        for (slot, held) in self.cards.iter_mut().enumerate() {
            held.knowledge.note(value, touched.contains(&slot));
        }
        touched
    }

    pub fn get(&self, slot: usize) -> Option<&HandCard> {
        self.cards.get(slot)
    }

    pub fn card(&self, slot: usize) -> Option<Card> {
        self.cards.get(slot).map(|held| held.card)
    }

    pub fn newest(&self) -> Option<&HandCard> {
        self.cards.last()
    }

    /// Newest-first position of an oldest-first slot.
    pub fn position_of(&self, slot: usize) -> Option<usize> {
        (slot < self.cards.len()).then(|| self.cards.len() - 1 - slot)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HandCard> + ExactSizeIterator {
        self.cards.iter()
    }

    pub fn faces(&self) -> impl DoubleEndedIterator<Item = Card> + ExactSizeIterator + '_ {
        self.cards.iter().map(|held| held.card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.iter().any(|held| held.card == card)
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::clue::ClueValue;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|raw| raw.parse().unwrap()).collect())
    }

    #[test]
    fn draw_appends_newest_last() {
        let mut hand = hand(&["1r", "2y"]);
        hand.draw(Card::new(Rank::Three, Suit::Blue), 4);
        assert_eq!(hand.len(), 3);
        let newest = hand.newest().unwrap();
        assert_eq!(newest.card, Card::new(Rank::Three, Suit::Blue));
        assert_eq!(newest.knowledge.drawn_turn(), 4);
    }

    #[test]
    fn remove_shifts_later_slots_down() {
        let mut hand = hand(&["1r", "2y", "3g"]);
        let removed = hand.remove(0).unwrap();
        assert_eq!(removed.card.to_string(), "1r");
        assert_eq!(hand.card(0).unwrap().to_string(), "2y");
        assert!(hand.remove(5).is_none());
    }

    #[test]
    fn clue_splits_direct_and_indirect_history() {
        let mut hand = hand(&["1r", "2y", "1m"]);
        let touched = hand.receive_clue(ClueValue::Suit(Suit::Red));
        assert_eq!(touched, vec![0, 2]);
        let middle = &hand.get(1).unwrap().knowledge;
        assert_eq!(middle.last_indirect(), Some(ClueValue::Suit(Suit::Red)));
        assert!(!middle.is_clued());
        assert!(hand.get(2).unwrap().knowledge.is_clued());
    }

    #[test]
    fn positions_count_from_newest() {
        let hand = hand(&["1r", "2y", "3g", "4b"]);
        assert_eq!(hand.position_of(0), Some(3));
        assert_eq!(hand.position_of(3), Some(0));
        assert_eq!(hand.position_of(4), None);
    }
}
