use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_NUMBER_TO_WIN: u32 = 3;
/// Entrant id written into a set slot that holds nobody.
pub const EMPTY_ENTRANT_ID: &str = "null";

// ── Ids ────────────────────────────────────────────────────────────────

/// Bracket-local match id. Ids start at 1 and are handed out round by round.
pub type MatchId = u32;

// ── Layout / side ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Layout {
    #[default]
    #[serde(rename = "single-elim")]
    SingleElimination,
    #[serde(rename = "double-elim")]
    DoubleElimination,
    #[serde(rename = "round-robin")]
    RoundRobin,
}

impl Layout {
    pub fn is_elimination(self) -> bool {
        matches!(self, Layout::SingleElimination | Layout::DoubleElimination)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::SingleElimination => "single-elim",
            Layout::DoubleElimination => "double-elim",
            Layout::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    /// Accepts the interchange names ("double-elim") as well as the spelled
    /// out forms ("double elimination", "double_elimination").
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', ' '], "-");
        match key.as_str() {
            "single-elim" | "single-elimination" | "se" => Ok(Layout::SingleElimination),
            "double-elim" | "double-elimination" | "de" => Ok(Layout::DoubleElimination),
            "round-robin" | "rr" => Ok(Layout::RoundRobin),
            _ => Err(format!("Unknown bracket layout: {raw}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Winners,
    Losers,
}

// ── Set state ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SetStatus {
    #[default]
    Pending,
    Started,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetGameResult {
    Win,
    Lose,
    Draw,
    Disqualified,
}

impl SetGameResult {
    pub fn is_loss(self) -> bool {
        matches!(self, SetGameResult::Lose | SetGameResult::Disqualified)
    }
}
