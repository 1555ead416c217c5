//! Deterministic policy every hat seat assumes the others follow.
//!
//! The simulator only ever looks at hands handed to it by the caller, which
//! can only obtain other seats' hands through `PlayerView`.

use super::codec::HatAction;
use super::forecast::{ChainForecast, Forecast};
use hanabi_core::model::card::Card;
use hanabi_core::model::hand::Hand;
use hanabi_core::model::progress::Progress;
use hanabi_core::model::rank::Rank;
use hanabi_core::model::round::MAX_HINTS;

/// Why the first seat of a chain got the action it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedReason {
    /// Modified actions are switched off; the standard action stands.
    Standard,
    Play,
    FiveForToken,
    FullTokens,
    KeepDiscard,
    EasyDiscard,
    UsefulDiscard,
    AllCritical,
    Stall,
}

impl ModifiedReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            ModifiedReason::Standard => "standard",
            ModifiedReason::Play => "play",
            ModifiedReason::FiveForToken => "five_for_token",
            ModifiedReason::FullTokens => "full_tokens",
            ModifiedReason::KeepDiscard => "keep_discard",
            ModifiedReason::EasyDiscard => "easy_discard",
            ModifiedReason::UsefulDiscard => "useful_discard",
            ModifiedReason::AllCritical => "all_critical",
            ModifiedReason::Stall => "stall",
        }
    }
}

pub fn count_unplayed_playable(progress: &Progress) -> usize {
    progress.unplayed()
}

/// Lowest playable card not already claimed, newest first on ties; otherwise
/// whatever `easy_discards` suggests.
pub fn standard_action(hand: &Hand, excluded: &[Card], progress: &Progress) -> HatAction {
    let play = hand
        .faces()
        .enumerate()
        .rev()
        .filter(|(_, card)| progress.is_playable(*card) && !excluded.contains(card))
        .min_by_key(|(_, card)| card.rank);
    match play {
        Some((slot, _)) => HatAction::Play(slot),
        None => easy_discards(hand, progress),
    }
}

/// Oldest card that is already played, then the oldest card held twice.
pub fn easy_discards(hand: &Hand, progress: &Progress) -> HatAction {
    if let Some(slot) = hand.faces().position(|card| progress.is_dead(card)) {
        return HatAction::Discard(slot);
    }
    let faces: Vec<Card> = hand.faces().collect();
    let duplicate = faces
        .iter()
        .position(|card| faces.iter().filter(|seen| *seen == card).count() > 1);
    match duplicate {
        Some(slot) => HatAction::Discard(slot),
        None => HatAction::Hint,
    }
}

/// Least harmful discard when an easy one does not exist: a card somebody
/// else will play, else the highest card with no copy in `discarded`. Fives
/// and ones are never chosen.
pub fn hard_discards(hand: &Hand, excluded: &[Card], discarded: &[Card]) -> HatAction {
    if let Some(slot) = hand.faces().position(|card| excluded.contains(&card)) {
        return HatAction::Discard(slot);
    }
    // Reversed so that the oldest card wins ties.
    let candidate = hand
        .faces()
        .enumerate()
        .rev()
        .filter(|(_, card)| {
            !discarded.contains(card) && card.rank != Rank::Five && card.rank != Rank::One
        })
        .max_by_key(|(_, card)| card.rank);
    match candidate {
        Some((slot, _)) => HatAction::Discard(slot),
        None => HatAction::Hint,
    }
}

/// Action the clue giver picks for the first seat of its new chain.
///
/// `forecast` describes the board up to that seat and has already been
/// projected over the rest of the chain; `chain` holds the actions of the
/// seats after it; `seat_hints` is the token count when the seat acts.
pub fn modified_action(
    hand: &Hand,
    forecast: &Forecast,
    chain: &ChainForecast,
    seat_hints: i32,
    discard_pile: &[Card],
    enabled: bool,
) -> (HatAction, ModifiedReason) {
    let progress = forecast.progress();
    let excluded = chain.will_be_played();
    let standard = standard_action(hand, excluded, progress);
    if !enabled {
        return (standard, ModifiedReason::Standard);
    }

    if let HatAction::Play(slot) = standard {
        let planned_five = hand.card(slot).is_some_and(Card::is_five);
        if forecast.min_hints() > 0 && !planned_five {
            let five = hand
                .faces()
                .position(|card| card.is_five() && progress.is_playable(card));
            if let Some(five) = five {
                return (HatAction::Play(five), ModifiedReason::FiveForToken);
            }
        }
        return (standard, ModifiedReason::Play);
    }

    if seat_hints >= i32::from(MAX_HINTS) {
        return (HatAction::Hint, ModifiedReason::FullTokens);
    }

    let unplayed = count_unplayed_playable(progress);
    let endgame = forecast.deck_size() < unplayed;
    if standard.is_discard() && !endgame {
        return (standard, ModifiedReason::KeepDiscard);
    }

    let nobody_plays = chain.plays() == 0 && forecast.plays() == 0;
    let nobody_discards = chain.discards() == 0 && forecast.discards() == 0;
    let stall = forecast.min_hints() <= 0
        || forecast.hints() <= 1
        || (nobody_plays && nobody_discards)
        || (nobody_plays && !endgame);
    if !stall {
        return (HatAction::Hint, ModifiedReason::Stall);
    }

    let easy = easy_discards(hand, progress);
    if easy.is_discard() {
        return (easy, ModifiedReason::EasyDiscard);
    }
    let mut seen = discard_pile.to_vec();
    seen.extend_from_slice(forecast.discarded());
    seen.extend_from_slice(chain.discarded());
    let hard = hard_discards(hand, excluded, &seen);
    if hard.is_discard() {
        return (hard, ModifiedReason::UsefulDiscard);
    }
    (HatAction::Hint, ModifiedReason::AllCritical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_core::model::round::RoundState;
    use hanabi_core::model::suit::{Suit, Variant};

    fn card(raw: &str) -> Card {
        raw.parse().unwrap()
    }

    fn hand(raw: &[&str]) -> Hand {
        Hand::with_cards(raw.iter().map(|c| card(c)).collect())
    }

    fn stacks(heights: &[(Suit, u8)]) -> Progress {
        Progress::with_stacks(Variant::Standard, heights)
    }

    /// Forecast with the given board and deck, projected over `chain`.
    fn forecast_for(
        progress: Progress,
        deck: usize,
        hints: u8,
        chain: &ChainForecast,
    ) -> Forecast {
        let filler = vec![vec![card("1r")]; 4];
        let draw = vec![card("2r"); deck];
        let round = RoundState::from_hands(Variant::Standard, filler, draw)
            .with_progress(progress)
            .with_hints(hints);
        let mut forecast = Forecast::start(&round.view(0), 1);
        forecast.project(chain);
        forecast
    }

    #[test]
    fn plays_lowest_card_with_newest_tiebreak() {
        let board = stacks(&[(Suit::Red, 1), (Suit::Blue, 2)]);
        let hand = hand(&["3b", "2r", "1g", "1y"]);
        assert_eq!(standard_action(&hand, &[], &board), HatAction::Play(3));
        assert_eq!(
            standard_action(&hand, &[card("1y")], &board),
            HatAction::Play(2)
        );
    }

    #[test]
    fn falls_back_to_dead_then_duplicate_cards() {
        let board = stacks(&[(Suit::Red, 3)]);
        let dead = hand(&["4g", "2r", "4g", "1r"]);
        assert_eq!(standard_action(&dead, &[], &board), HatAction::Discard(1));
        let doubles = hand(&["5w", "4g", "3b", "4g"]);
        assert_eq!(easy_discards(&doubles, &board), HatAction::Discard(1));
        let clean = hand(&["5w", "4g", "3b", "2y"]);
        assert_eq!(easy_discards(&clean, &board), HatAction::Hint);
    }

    #[test]
    fn hard_discards_prefer_claimed_then_highest_safe_card() {
        let claimed = hand(&["2y", "3b", "4g"]);
        assert_eq!(
            hard_discards(&claimed, &[card("3b")], &[]),
            HatAction::Discard(1)
        );
        let risky = hand(&["3g", "4b", "5w", "1r", "4y"]);
        assert_eq!(hard_discards(&risky, &[], &[]), HatAction::Discard(1));
        assert_eq!(
            hard_discards(&risky, &[], &[card("4b")]),
            HatAction::Discard(4)
        );
        let critical = hand(&["5w", "1r", "5g"]);
        assert_eq!(hard_discards(&critical, &[], &[]), HatAction::Hint);
    }

    #[test]
    fn substitutes_a_playable_five_when_tokens_allow() {
        let board = stacks(&[(Suit::Red, 1), (Suit::White, 4)]);
        let hand = hand(&["2r", "5w", "3g"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 20, 4, &chain);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 3, &[], true),
            (HatAction::Play(1), ModifiedReason::FiveForToken)
        );
    }

    #[test]
    fn no_five_substitution_without_spare_tokens() {
        let board = stacks(&[(Suit::Red, 1), (Suit::White, 4)]);
        let hand = hand(&["2r", "5w", "3g"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 20, 1, &chain);
        assert_eq!(forecast.min_hints(), 0);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 0, &[], true),
            (HatAction::Play(0), ModifiedReason::Play)
        );
    }

    #[test]
    fn full_tokens_force_a_clue() {
        let board = stacks(&[(Suit::Red, 3)]);
        let hand = hand(&["2r", "4g", "3b"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 20, 8, &chain);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 8, &[], true),
            (HatAction::Hint, ModifiedReason::FullTokens)
        );
    }

    #[test]
    fn keeps_discard_outside_endgame() {
        let board = stacks(&[(Suit::Red, 3)]);
        let hand = hand(&["2r", "4g", "3b"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 30, 5, &chain);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 4, &[], true),
            (HatAction::Discard(0), ModifiedReason::KeepDiscard)
        );
    }

    #[test]
    fn endgame_discard_is_reconsidered() {
        let board = stacks(&[
            (Suit::Red, 5),
            (Suit::Yellow, 5),
            (Suit::Green, 5),
            (Suit::Blue, 3),
            (Suit::White, 3),
        ]);
        assert_eq!(count_unplayed_playable(&board), 4);
        let hand = hand(&["2r", "5b", "5w"]);
        let mut chain = ChainForecast::new();
        chain.record(HatAction::Play(0), Some(card("4b")));
        let forecast = forecast_for(board, 3, 6, &chain);
        assert_eq!(forecast.deck_size(), 3);
        // Someone plays and tokens are plentiful, so there is no reason to discard.
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 5, &[], true),
            (HatAction::Hint, ModifiedReason::Stall)
        );
        // With tokens running out the discard goes ahead after all.
        let scarce = forecast_for(board, 3, 2, &chain);
        assert_eq!(
            modified_action(&hand, &scarce, &chain, 1, &[], true),
            (HatAction::Discard(0), ModifiedReason::EasyDiscard)
        );
    }

    #[test]
    fn stalled_chain_without_discards_reports_all_critical() {
        let board = stacks(&[(Suit::Red, 1)]);
        let hand = hand(&["5w", "5g", "5b"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 20, 5, &chain);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 4, &[], true),
            (HatAction::Hint, ModifiedReason::AllCritical)
        );
    }

    #[test]
    fn disabled_switch_returns_standard_action() {
        let board = stacks(&[(Suit::Red, 3)]);
        let hand = hand(&["2r", "4g", "3b"]);
        let chain = ChainForecast::new();
        let forecast = forecast_for(board, 20, 8, &chain);
        assert_eq!(
            modified_action(&hand, &forecast, &chain, 8, &[], false),
            (HatAction::Discard(0), ModifiedReason::Standard)
        );
    }
}
