use tracing::debug;

use crate::builder::{BuildContext, WinnersBracket};
use crate::entrants::{Entrant, EntrantRegistry};
use crate::seeding::round1_pairings;
use crate::topology::round_count;
use crate::types::{Layout, Side};

/// Fill the entrant slots of a freshly built bracket.
pub fn place_entrants(ctx: &mut BuildContext, winners: &WinnersBracket, entrants: &EntrantRegistry) {
  if entrants.len() < 2 {
    return;
  }
  match ctx.layout {
    Layout::SingleElimination | Layout::DoubleElimination => place_elimination(ctx, winners, entrants),
    Layout::RoundRobin => place_round_robin(ctx, entrants),
  }
}

/// Seeded pairs fill round 1 by position. A seed whose partner does not exist
/// skips round 1 and takes the round 2 slot the missing match would have fed.
fn place_elimination(ctx: &mut BuildContext, winners: &WinnersBracket, entrants: &EntrantRegistry) {
  let entrant_id = |rank: u32| entrants.by_rank(rank).map(|e| e.id().to_string());
  let mut byes = 0;

  for (position, (first, second)) in round1_pairings(entrants.len()).into_iter().enumerate() {
    let first_id = entrant_id(first);
    match second {
      Some(second) => {
        let Some(match_id) = winners.rounds.first().and_then(|r| r.get(position)).copied().flatten() else {
          debug_assert!(false, "no round 1 match at position {position}");
          continue;
        };
        if let Some(node) = ctx.node_mut(match_id) {
          node.entrants = [first_id, entrant_id(second)];
        }
      }
      None => {
        let target = winners.rounds.get(1).and_then(|r| r.get(position / 2)).copied().flatten();
        let Some(match_id) = target else {
          debug_assert!(false, "no round 2 match for bye at position {position}");
          continue;
        };
        if let Some(node) = ctx.node_mut(match_id) {
          debug_assert!(!node.is_fed(position % 2));
          node.entrants[position % 2] = first_id;
        }
        byes += 1;
      }
    }
  }
  debug!("placed {} entrants, {byes} bye(s)", entrants.len());
}

/// Circle method: the first entrant stays fixed while the rest rotate one
/// place per round. An odd field gets a placeholder and its partner idles.
fn place_round_robin(ctx: &mut BuildContext, entrants: &EntrantRegistry) {
  let mut ring: Vec<Option<&Entrant>> = entrants.iter().map(Some).collect();
  if ring.len() % 2 == 1 {
    ring.push(None);
  }
  let len = ring.len();

  for round in 1..=round_count(entrants.len(), Layout::RoundRobin) {
    let mut slots = ctx.nodes_in_round(Side::Winners, round as u32).into_iter();
    for i in 0..len / 2 {
      let (Some(a), Some(b)) = (ring[i], ring[len - 1 - i]) else {
        continue;
      };
      let Some(match_id) = slots.next() else {
        debug_assert!(false, "round {round} ran out of matches");
        break;
      };
      if let Some(node) = ctx.node_mut(match_id) {
        node.entrants = [Some(a.id().to_string()), Some(b.id().to_string())];
      }
    }
    if let Some(last) = ring.pop() {
      ring.insert(1, last);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::build_winners;
  use crate::obf::EntrantRecord;
  use std::collections::HashSet;

  fn registry(n: usize) -> EntrantRegistry {
    let records = (1..=n)
      .map(|seed| EntrantRecord {
        entrant_id: format!("e{seed}"),
        initial_seed: seed as u32,
        ..EntrantRecord::default()
      })
      .collect::<Vec<_>>();
    EntrantRegistry::from_records(&records)
  }

  fn placed(layout: Layout, n: usize) -> BuildContext {
    let entrants = registry(n);
    let mut ctx = BuildContext::new(layout, n, 3);
    let winners = build_winners(&mut ctx);
    place_entrants(&mut ctx, &winners, &entrants);
    ctx
  }

  fn pair(ctx: &BuildContext, id: u32) -> [Option<&str>; 2] {
    let node = ctx.node(id).unwrap();
    [node.entrant(0), node.entrant(1)]
  }

  #[test]
  fn test_four_entrants_round_one() {
    let ctx = placed(Layout::SingleElimination, 4);
    assert_eq!(pair(&ctx, 1), [Some("e1"), Some("e4")]);
    assert_eq!(pair(&ctx, 2), [Some("e2"), Some("e3")]);
    assert_eq!(pair(&ctx, 3), [None, None]);
  }

  #[test]
  fn test_five_entrants_byes() {
    let ctx = placed(Layout::SingleElimination, 5);
    assert_eq!(pair(&ctx, 1), [Some("e4"), Some("e5")]);
    // Seed 1 waits for the 4/5 winner, seeds 2 and 3 meet in round 2.
    assert_eq!(pair(&ctx, 2), [Some("e1"), None]);
    assert_eq!(pair(&ctx, 3), [Some("e2"), Some("e3")]);
  }

  #[test]
  fn test_every_entrant_placed_once() {
    for n in 2..=33 {
      let ctx = placed(Layout::DoubleElimination, n);
      let mut seen = HashSet::new();
      for node in ctx.nodes() {
        for entrant in node.entrants.iter().flatten() {
          assert!(seen.insert(entrant.clone()), "{entrant} placed twice for {n}");
        }
      }
      assert_eq!(seen.len(), n);
    }
  }

  #[test]
  fn test_round_robin_three() {
    let ctx = placed(Layout::RoundRobin, 3);
    assert_eq!(ctx.nodes().len(), 3);
    assert_eq!(pair(&ctx, 1), [Some("e2"), Some("e3")]);
    assert_eq!(pair(&ctx, 2), [Some("e1"), Some("e3")]);
    assert_eq!(pair(&ctx, 3), [Some("e1"), Some("e2")]);
  }

  #[test]
  fn test_round_robin_every_pair_once() {
    for n in 2..=12 {
      let ctx = placed(Layout::RoundRobin, n);
      let mut pairs = HashSet::new();
      for node in ctx.nodes() {
        let (Some(a), Some(b)) = (node.entrant(0), node.entrant(1)) else {
          panic!("empty round robin match for {n}");
        };
        let key = if a < b { (a, b) } else { (b, a) };
        assert!(pairs.insert(key), "{key:?} repeated for {n}");
      }
      assert_eq!(pairs.len(), n * (n - 1) / 2);
    }
  }
}
