use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_console::adapter::{ControllerScript, SimulatedBus, SimulatedController};
use tetris_console::core::{
    head_to_head_scores, Configuration, Pairing, ScoreMap, SimpleRng, TournamentBracket,
};
use tetris_console::engine::{CoordinatorSettings, GameSessionCoordinator, ManualClock};
use tetris_console::types::{controller_addresses, ControllerAddress, MAX_PLAYERS};

fn bench_sequence(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);

    c.bench_function("tetromino_sequence", |b| {
        b.iter(|| black_box(rng.sequence()))
    });
}

fn bench_tournament(c: &mut Criterion) {
    let mut rng = SimpleRng::new(777);

    c.bench_function("tournament_8_players", |b| {
        b.iter(|| {
            let mut bracket = TournamentBracket::new(black_box(MAX_PLAYERS));
            while !matches!(bracket.next_match(), Pairing::Complete { .. }) {
                let s1 = rng.next_range(1000) as u16;
                let s2 = rng.next_range(1000) as u16;
                bracket.record_result(s1, s2);
            }
            bracket.champion()
        })
    });
}

fn bench_head_to_head(c: &mut Criterion) {
    let mut scores = ScoreMap::new();
    scores.insert(ControllerAddress(8), 1200);

    c.bench_function("head_to_head_scores", |b| {
        b.iter(|| head_to_head_scores(black_box(&scores)))
    });
}

fn bench_session(c: &mut Criterion) {
    let config = Configuration::default();

    c.bench_function("session_on_simulated_bus", |b| {
        b.iter(|| {
            let mut bus = SimulatedBus::new();
            for addr in controller_addresses() {
                bus.attach(
                    addr,
                    SimulatedController::new(ControllerScript::default().with_game_polls(20)),
                );
            }
            let clock = ManualClock::new(0);
            let mut coord =
                GameSessionCoordinator::new(CoordinatorSettings::default(), SimpleRng::new(9));
            coord.start(&config, 0);
            loop {
                clock.advance(101);
                if coord.tick(&mut bus, &clock).is_some_and(|e| e.ends_game()) {
                    break;
                }
            }
            coord.finish(&mut bus, &clock)
        })
    });
}

criterion_group!(
    benches,
    bench_sequence,
    bench_tournament,
    bench_head_to_head,
    bench_session
);
criterion_main!(benches);
