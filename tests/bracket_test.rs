use tetris_console::core::{Pairing, SimpleRng, TournamentBracket, Verdict};
use tetris_console::types::{MAX_PLAYERS, MIN_PLAYERS};

/// Play a whole tournament with pseudo-random scores.
///
/// Returns (champion, rounds started, matches played).
fn run_tournament(n: u8, rng: &mut SimpleRng) -> (Option<u8>, u8, u32) {
    let mut b = TournamentBracket::new(n);
    let mut matches = 0;
    let mut alive_at_round_start = b.alive_count();

    loop {
        match b.next_match() {
            Pairing::Complete { champion } => return (champion, b.round(), matches),
            Pairing::NewRound { round, .. } => {
                assert_eq!(round, b.round());
                assert!(
                    b.alive_count() < alive_at_round_start,
                    "alive count must shrink across rounds"
                );
                alive_at_round_start = b.alive_count();
                assert!(b.players().iter().all(|&id| id != 0));
            }
            Pairing::Match(_) => {}
        }

        let before = b.alive_count();
        let s1 = rng.next_range(4) as u16;
        let s2 = rng.next_range(4) as u16;
        let verdict = b.record_result(s1, s2).expect("a match is in progress");
        let removed = before - b.alive_count();
        match verdict {
            Verdict::Tie => assert_eq!(removed, 2),
            _ => assert_eq!(removed, 1),
        }
        matches += 1;

        if b.is_terminal() {
            return (b.champion(), b.round(), matches);
        }
    }
}

#[test]
fn every_size_terminates_with_at_most_one_champion() {
    let mut rng = SimpleRng::new(2024);
    for n in MIN_PLAYERS..=MAX_PLAYERS {
        for _ in 0..50 {
            let (champion, rounds, matches) = run_tournament(n, &mut rng);
            if let Some(id) = champion {
                assert!((1..=n).contains(&id));
            }
            assert!(rounds <= n);
            assert!(matches < n as u32);
        }
    }
}

#[test]
fn eight_players_without_draws_take_three_rounds() {
    let mut b = TournamentBracket::new(8);
    let mut new_rounds = 0;
    let mut matches = 0;
    while !b.is_terminal() {
        match b.next_match() {
            Pairing::NewRound { .. } => new_rounds += 1,
            Pairing::Match(_) => {}
            Pairing::Complete { .. } => break,
        }
        // Second seat always wins.
        b.record_result(1, 2);
        matches += 1;
    }
    assert_eq!(new_rounds, 2);
    assert_eq!(matches, 7);
    assert_eq!(b.champion(), Some(8));
}

#[test]
fn five_player_progression_reaches_bye_before_pairing() {
    let mut b = TournamentBracket::new(5);
    let pairs: Vec<(u8, u8)> = (0..2)
        .map(|_| match b.next_match() {
            Pairing::Match(p) => {
                b.record_result(9, 0);
                (p.player_one, p.player_two)
            }
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(pairs, vec![(1, 2), (3, 4)]);
    assert_eq!(b.players(), &[1, 0, 3, 0, 5]);

    assert!(matches!(b.next_match(), Pairing::NewRound { round: 2, .. }));
    assert_eq!(b.players(), &[1, 3, 5]);
}
