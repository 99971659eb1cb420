//! Append-only JSON-lines record of resolved rounds.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::menu::RoundReport;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journal I/O: {0}")]
    Io(#[from] io::Error),

    #[error("journal encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerScore {
    pub address: u8,
    pub score: u16,
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_minutes: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u8>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<[u8; 2]>,
    pub scores: Vec<ControllerScore>,
    pub faulted: Vec<u8>,
    pub winner: String,
}

impl From<&RoundReport> for MatchRecord {
    fn from(report: &RoundReport) -> Self {
        Self {
            mode: if report.competitive {
                "competitive".to_string()
            } else {
                "casual".to_string()
            },
            timer_minutes: report.timer_minutes,
            round: report.round,
            match_index: report.match_index,
            players: report.pair.map(|(a, b)| [a, b]),
            scores: report
                .scores
                .iter()
                .map(|(addr, &score)| ControllerScore {
                    address: addr.0,
                    score,
                })
                .collect(),
            faulted: report.faulted.iter().map(|a| a.0).collect(),
            winner: report.winner.clone(),
        }
    }
}

impl MatchRecord {
    pub fn to_line(&self) -> Result<String, JournalError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct ResultJournal {
    out: BufWriter<File>,
}

impl ResultJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, record: &MatchRecord) -> Result<(), JournalError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoreMap;
    use crate::types::ControllerAddress;

    fn report() -> RoundReport {
        let mut scores = ScoreMap::new();
        scores.insert(ControllerAddress(8), 42);
        scores.insert(ControllerAddress(9), 7);
        RoundReport {
            competitive: true,
            timer_minutes: None,
            round: Some(1),
            match_index: Some(2),
            pair: Some((3, 4)),
            scores,
            faulted: vec![],
            winner: "Player 3".to_string(),
        }
    }

    #[test]
    fn record_line_shape() {
        let line = MatchRecord::from(&report()).to_line().unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["mode"], "competitive");
        assert_eq!(v["match"], 2);
        assert_eq!(v["players"], serde_json::json!([3, 4]));
        assert_eq!(v["scores"][0]["address"], 8);
        assert_eq!(v["scores"][0]["score"], 42);
        assert!(v.get("timer_minutes").is_none());
    }

    #[test]
    fn append_writes_one_line_per_record() {
        let path =
            std::env::temp_dir().join(format!("console-journal-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut journal = ResultJournal::open(&path).unwrap();
        let record = MatchRecord::from(&report());
        journal.append(&record).unwrap();
        journal.append(&record).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: MatchRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, record);
        let _ = std::fs::remove_file(&path);
    }
}
