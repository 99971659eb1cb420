//! Winner determination.
//!
//! Both game modes share one contract: compare collected scores and report a
//! winner or a tie. Competitive mode compares exactly the two bracket
//! participants (controller slot 0 plays bracket player one, slot 1 plays
//! player two). Casual mode is the degenerate case across all controllers.

use std::collections::BTreeMap;

use crate::types::ControllerAddress;

/// Final scores per controller, as read at the end of a game.
pub type ScoreMap = BTreeMap<ControllerAddress, u16>;

/// Head-to-head comparison of two scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FirstWins,
    SecondWins,
    /// Equal scores. In a tournament both competitors are eliminated.
    Tie,
}

pub fn compare(first: u16, second: u16) -> Verdict {
    match first.cmp(&second) {
        std::cmp::Ordering::Greater => Verdict::FirstWins,
        std::cmp::Ordering::Less => Verdict::SecondWins,
        std::cmp::Ordering::Equal => Verdict::Tie,
    }
}

/// Result of a casual game across all controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Highest score, by controller slot (0-based).
    Winner { slot: usize, score: u16 },
    Tie,
    /// No controller reported a score.
    NoContest,
}

impl Outcome {
    /// Text shown after "Winner: ".
    pub fn label(&self) -> String {
        match self {
            Outcome::Winner { slot, .. } => format!("Player {}", slot + 1),
            Outcome::Tie => "Tie".to_string(),
            Outcome::NoContest => "None".to_string(),
        }
    }
}

/// Highest of all collected scores; a shared maximum is a tie.
pub fn casual_outcome(scores: &ScoreMap) -> Outcome {
    let mut best: Option<(ControllerAddress, u16)> = None;
    let mut shared = false;
    for (&addr, &score) in scores {
        match best {
            None => best = Some((addr, score)),
            Some((_, top)) if score > top => {
                best = Some((addr, score));
                shared = false;
            }
            Some((_, top)) if score == top => shared = true,
            Some(_) => {}
        }
    }

    match best {
        None => Outcome::NoContest,
        Some(_) if shared => Outcome::Tie,
        Some((addr, score)) => Outcome::Winner {
            slot: addr.slot().unwrap_or(0),
            score,
        },
    }
}

/// Scores of the two competitors seated at controller slots 0 and 1.
///
/// A controller that produced no score (faulted or still ongoing when stopped)
/// counts as zero.
pub fn head_to_head_scores(scores: &ScoreMap) -> (u16, u16) {
    let at = |slot: usize| {
        scores
            .get(&ControllerAddress::from_slot(slot))
            .copied()
            .unwrap_or(0)
    };
    (at(0), at(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(u8, u16)]) -> ScoreMap {
        pairs
            .iter()
            .map(|&(a, s)| (ControllerAddress(a), s))
            .collect()
    }

    #[test]
    fn compare_orders_scores() {
        assert_eq!(compare(5, 3), Verdict::FirstWins);
        assert_eq!(compare(3, 5), Verdict::SecondWins);
        assert_eq!(compare(4, 4), Verdict::Tie);
    }

    #[test]
    fn casual_highest_score_wins() {
        let out = casual_outcome(&scores(&[(8, 120), (9, 340)]));
        assert_eq!(out, Outcome::Winner { slot: 1, score: 340 });
        assert_eq!(out.label(), "Player 2");
    }

    #[test]
    fn casual_shared_maximum_is_tie() {
        let out = casual_outcome(&scores(&[(8, 50), (9, 50)]));
        assert_eq!(out, Outcome::Tie);
        assert_eq!(out.label(), "Tie");
    }

    #[test]
    fn casual_lower_tie_does_not_hide_winner() {
        // Single-controller map: one score is a winner.
        let out = casual_outcome(&scores(&[(9, 7)]));
        assert_eq!(out, Outcome::Winner { slot: 1, score: 7 });
    }

    #[test]
    fn casual_without_scores_is_no_contest() {
        assert_eq!(casual_outcome(&ScoreMap::new()), Outcome::NoContest);
    }

    #[test]
    fn missing_head_to_head_score_counts_as_zero() {
        assert_eq!(head_to_head_scores(&scores(&[(9, 42)])), (0, 42));
        assert_eq!(head_to_head_scores(&scores(&[(8, 3), (9, 1)])), (3, 1));
    }
}
