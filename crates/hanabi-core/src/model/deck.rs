use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Variant;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Draw pile; the front is drawn next.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn standard(variant: Variant) -> Self {
        let mut cards = VecDeque::with_capacity(variant.suits().len() * 10);
        for suit in variant.suits().iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                for _ in 0..rank.copies() {
                    cards.push_back(Card::new(rank, suit));
                }
            }
        }
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(variant: Variant, rng: &mut R) -> Self {
        let mut deck = Self::standard(variant);
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(variant: Variant, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(variant, &mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
