use serde_json::Value;

use crate::obf::GameRecord;
use crate::types::{MatchId, SetGameResult, SetStatus, Side, DEFAULT_NUMBER_TO_WIN};

/// One pairing in the bracket tree. Links are ids into the bracket's arena.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchNode {
  pub id: MatchId,
  pub side: Side,
  pub round: u32,
  pub entrants: [Option<String>; 2],
  pub scores: [Option<i32>; 2],
  pub results: [Option<SetGameResult>; 2],
  pub status: SetStatus,
  pub number_to_win: u32,
  /// Placement of this match's loser, 0 when the loser is not eliminated here
  pub placement: u32,
  /// Matches whose winners fill slot 0 / slot 1
  pub children: [Option<MatchId>; 2],
  /// Match this match's winner advances to
  pub parent: Option<MatchId>,
  /// Upper bracket matches whose losers fill slot 0 / slot 1
  pub sources: [Option<MatchId>; 2],
  /// Match this match's loser drops to
  pub drop: Option<MatchId>,
  pub games: Vec<GameRecord>,
  /// Opaque metadata from an imported record
  pub other: Option<Value>,
}

impl MatchNode {
  pub fn new(id: MatchId, side: Side, round: u32) -> Self {
    MatchNode {
      id,
      side,
      round,
      entrants: [None, None],
      scores: [None, None],
      results: [None, None],
      status: SetStatus::Pending,
      number_to_win: DEFAULT_NUMBER_TO_WIN,
      placement: 0,
      children: [None, None],
      parent: None,
      sources: [None, None],
      drop: None,
      games: Vec::new(),
      other: None,
    }
  }

  /// Slot is filled by an earlier match rather than by direct assignment.
  pub fn is_fed(&self, slot: usize) -> bool {
    self.children[slot].is_some() || self.sources[slot].is_some()
  }

  pub fn slot_of_child(&self, child: MatchId) -> Option<usize> {
    self.children.iter().position(|c| *c == Some(child))
  }

  pub fn slot_of_source(&self, source: MatchId) -> Option<usize> {
    self.sources.iter().position(|s| *s == Some(source))
  }

  pub fn child_ids(&self) -> impl Iterator<Item = MatchId> + '_ {
    self.children.iter().flatten().copied()
  }

  pub fn entrant(&self, slot: usize) -> Option<&str> {
    self.entrants.get(slot)?.as_deref()
  }

  pub fn has_entrant(&self, id: &str) -> bool {
    self.entrants.iter().any(|e| e.as_deref() == Some(id))
  }

  pub fn assign_entrant(&mut self, slot: usize, entrant: impl Into<String>) {
    self.entrants[slot] = Some(entrant.into());
  }

  pub fn update_score(&mut self, slot: usize, score: i32) {
    self.scores[slot] = Some(score);
  }

  /// Slot of the winner, taken from results first and scores second.
  pub fn winner_slot(&self) -> Option<usize> {
    match self.results {
      [Some(SetGameResult::Win), _] => return Some(0),
      [_, Some(SetGameResult::Win)] => return Some(1),
      [Some(a), _] if a.is_loss() => return Some(1),
      [_, Some(b)] if b.is_loss() => return Some(0),
      _ => {}
    }
    if self.status != SetStatus::Completed {
      return None;
    }
    let a = self.scores[0].unwrap_or(0);
    let b = self.scores[1].unwrap_or(0);
    if a > b {
      Some(0)
    } else if b > a {
      Some(1)
    } else {
      None
    }
  }

  pub fn winner(&self) -> Option<&str> {
    self.entrant(self.winner_slot()?)
  }

  pub fn loser(&self) -> Option<&str> {
    self.entrant(1 - self.winner_slot()?)
  }

  /// Best-of descriptor, e.g. "bo5" for three wins.
  pub fn set_format(&self) -> String {
    format!("bo{}", (self.number_to_win * 2).saturating_sub(1))
  }

  /// Signed round id: winners rounds positive, losers rounds negative.
  pub fn round_id(&self) -> i64 {
    match self.side {
      Side::Winners => self.round as i64,
      Side::Losers => -(self.round as i64),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_winner_from_results_then_scores() {
    let mut node = MatchNode::new(1, Side::Winners, 1);
    node.assign_entrant(0, "a");
    node.assign_entrant(1, "b");
    assert_eq!(node.winner_slot(), None);

    node.scores = [Some(1), Some(3)];
    assert_eq!(node.winner_slot(), None);
    node.status = SetStatus::Completed;
    assert_eq!(node.winner(), Some("b"));
    assert_eq!(node.loser(), Some("a"));

    node.results = [Some(SetGameResult::Win), Some(SetGameResult::Lose)];
    assert_eq!(node.winner(), Some("a"));

    node.results = [Some(SetGameResult::Disqualified), None];
    assert_eq!(node.winner(), Some("b"));
  }

  #[test]
  fn test_format_and_round_id() {
    let mut node = MatchNode::new(7, Side::Losers, 2);
    assert_eq!(node.set_format(), "bo5");
    assert_eq!(node.round_id(), -2);
    node.number_to_win = 2;
    assert_eq!(node.set_format(), "bo3");
  }

  #[test]
  fn test_slot_lookup() {
    let mut node = MatchNode::new(5, Side::Losers, 1);
    node.children[1] = Some(2);
    node.sources[0] = Some(3);
    assert_eq!(node.slot_of_child(2), Some(1));
    assert_eq!(node.slot_of_source(3), Some(0));
    assert!(node.is_fed(0) && node.is_fed(1));
    assert_eq!(node.child_ids().collect::<Vec<_>>(), vec![2]);
  }
}
