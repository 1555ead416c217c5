pub mod action;
pub mod card;
pub mod clue;
pub mod deck;
pub mod hand;
pub mod player;
pub mod progress;
pub mod rank;
pub mod round;
pub mod suit;
