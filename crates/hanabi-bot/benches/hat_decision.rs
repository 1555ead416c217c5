use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hanabi_bot::hat::{HatFeatures, HatPlayer};
use hanabi_core::game::setup::GameSetup;
use hanabi_core::model::suit::Variant;

fn bench_opening_clue(c: &mut Criterion) {
    let round = GameSetup::new(17, 5, Variant::Standard)
        .deal()
        .expect("deal");
    let lineup = vec!["hat".to_string(); 5];
    c.bench_function("hat_opening_clue", |b| {
        b.iter(|| {
            let mut player = HatPlayer::new(0, 5, HatFeatures::default());
            let decision = player.decide(black_box(&round), &lineup).expect("decide");
            black_box(decision);
        })
    });
}

fn bench_full_game(c: &mut Criterion) {
    let setup = GameSetup::new(99, 4, Variant::Rainbow);
    let lineup = vec!["hat".to_string(); 4];
    c.bench_function("hat_full_game", |b| {
        b.iter(|| {
            let mut round = setup.deal().expect("deal");
            let mut seats: Vec<HatPlayer> = (0..4)
                .map(|seat| HatPlayer::new(seat, 4, HatFeatures::default()))
                .collect();
            while !round.is_over() {
                for seat in seats.iter_mut() {
                    seat.observe(&round).expect("observe");
                }
                let active = round.current_player();
                let decision = seats[active].decide(&round, &lineup).expect("decide");
                round.apply(decision.action).expect("apply");
            }
            black_box(round.score());
        })
    });
}

criterion_group!(benches, bench_opening_clue, bench_full_game);
criterion_main!(benches);
