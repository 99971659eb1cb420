use std::collections::{BTreeMap, VecDeque};

use tetris_console::adapter::{ControllerLink, RetryPolicy, TransportError};
use tetris_console::core::{Configuration, SessionPhase, SimpleRng};
use tetris_console::engine::{
    Clock, ControllerFault, CoordinatorSettings, GameSessionCoordinator, ManualClock, SessionEvent,
};
use tetris_console::types::ControllerAddress;

const P1: ControllerAddress = ControllerAddress(8);
const P2: ControllerAddress = ControllerAddress(9);

/// Link that answers requests from per-address reply queues and records sends.
#[derive(Default)]
struct ScriptedLink {
    replies: BTreeMap<ControllerAddress, VecDeque<Vec<u8>>>,
    sent: Vec<(ControllerAddress, Vec<u8>)>,
    requests: Vec<(ControllerAddress, usize)>,
}

impl ScriptedLink {
    fn reply(&mut self, addr: ControllerAddress, bytes: &[u8]) -> &mut Self {
        self.replies.entry(addr).or_default().push_back(bytes.to_vec());
        self
    }

    fn sent_to(&self, addr: ControllerAddress) -> Vec<Vec<u8>> {
        self.sent
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, b)| b.clone())
            .collect()
    }
}

impl ControllerLink for ScriptedLink {
    fn send(&mut self, address: ControllerAddress, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.push((address, bytes.to_vec()));
        Ok(())
    }

    fn request(
        &mut self,
        address: ControllerAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransportError> {
        self.requests.push((address, count));
        Ok(self
            .replies
            .get_mut(&address)
            .and_then(|q| q.pop_front())
            .unwrap_or_default())
    }
}

fn coordinator(attempts: u32) -> GameSessionCoordinator {
    GameSessionCoordinator::new(
        CoordinatorSettings {
            retry: RetryPolicy {
                max_attempts: attempts,
                retry_delay_ms: 100,
            },
            ..CoordinatorSettings::default()
        },
        SimpleRng::new(3),
    )
}

fn start(c: &mut GameSessionCoordinator, link: &mut ScriptedLink, clock: &ManualClock) {
    link.reply(P1, b"r").reply(P2, b"r");
    c.start(&Configuration::default(), clock.now_ms());
    assert_eq!(c.tick(link, clock), None);
    assert_eq!(c.tick(link, clock), Some(SessionEvent::Started));
}

#[test]
fn big_endian_score_after_game_over_status() {
    let clock = ManualClock::new(0);
    let mut link = ScriptedLink::default();
    let mut c = coordinator(3);
    start(&mut c, &mut link, &clock);

    link.reply(P1, b"x").reply(P1, &[0x00, 0x2A]);
    link.reply(P2, b"x").reply(P2, &[0x01, 0x00]);
    let scores = c.finish(&mut link, &clock);

    assert_eq!(scores.get(&P1), Some(&42));
    assert_eq!(scores.get(&P2), Some(&256));
    assert_eq!(c.phase(), SessionPhase::Finished);
}

#[test]
fn start_exchange_streams_sequence_in_batches() {
    let clock = ManualClock::new(0);
    let mut link = ScriptedLink::default();
    let mut c = coordinator(3);
    start(&mut c, &mut link, &clock);

    let sent = link.sent_to(P1);
    let lens: Vec<usize> = sent.iter().map(Vec::len).collect();
    assert_eq!(lens, vec![1, 32, 32, 32, 4, 1]);
    assert_eq!(sent[0], b"s");
    assert_eq!(sent[5], b"e");
    let streamed: Vec<u8> = sent[1..5].concat();
    assert_eq!(streamed.as_slice(), &c.session().unwrap().sequence[..]);
    assert!(streamed.iter().all(|&t| t < 7));
}

#[test]
fn still_ongoing_after_stop_yields_no_score_but_reset() {
    let clock = ManualClock::new(0);
    let mut link = ScriptedLink::default();
    let mut c = coordinator(3);
    start(&mut c, &mut link, &clock);

    link.reply(P1, b"o");
    link.reply(P2, b"x").reply(P2, &[0, 9]);
    let scores = c.finish(&mut link, &clock);

    assert_eq!(scores.get(&P1), None);
    assert_eq!(scores.get(&P2), Some(&9));
    assert!(!link.requests.contains(&(P1, 2)));
    for addr in [P1, P2] {
        let sent = link.sent_to(addr);
        assert_eq!(sent[sent.len() - 2..], [b"q".to_vec(), b"-".to_vec()]);
    }
}

#[test]
fn late_score_bytes_are_retried_within_budget() {
    let clock = ManualClock::new(0);
    let mut link = ScriptedLink::default();
    let mut c = coordinator(4);
    start(&mut c, &mut link, &clock);

    // Score arrives on the third request.
    link.reply(P1, b"x").reply(P1, &[]).reply(P1, &[7]).reply(P1, &[0, 5]);
    link.reply(P2, b"x").reply(P2, &[0, 1]);
    let before = clock.now_ms();
    let scores = c.finish(&mut link, &clock);

    assert_eq!(scores.get(&P1), Some(&5));
    assert_eq!(clock.now_ms() - before, 200);
}

#[test]
fn never_ready_handshake_is_bounded() {
    let clock = ManualClock::new(0);
    let mut link = ScriptedLink::default();
    let mut c = coordinator(20);
    for _ in 0..100 {
        link.reply(P1, b"w");
    }
    link.reply(P2, b"r");
    c.start(&Configuration::default(), 0);
    c.tick(&mut link, &clock);
    c.tick(&mut link, &clock);

    assert_eq!(
        c.faults().get(&P1),
        Some(&ControllerFault::NotReady {
            attempts: 20,
            last: 'w'
        })
    );
    // 19 waits of 100 ms between 20 attempts.
    assert_eq!(clock.now_ms(), 1_900);
    // No sequence went to the faulted controller.
    assert_eq!(link.sent_to(P1), vec![b"s".to_vec()]);
    assert_eq!(c.phase(), SessionPhase::Running);
}
