use std::collections::HashSet;

use tracing::debug;

use crate::builder::{BuildContext, WinnersBracket};
use crate::types::{Layout, MatchId, Side};

/// What fills one slot of a losers match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feed {
  /// Loser of a winners match
  Drop(MatchId),
  /// Winner of an earlier losers match, by template index
  Node(usize),
}

#[derive(Clone, Debug)]
struct TemplateMatch {
  template_round: usize,
  feeds: [Feed; 2],
  /// Winners matches whose losers can reach this match
  coverage: HashSet<MatchId>,
}

/// The losers bracket of the padded size, kept only where both slots are fed.
#[derive(Debug, Default)]
struct Template {
  matches: Vec<TemplateMatch>,
}

impl Template {
  fn coverage(&self, feed: Option<Feed>) -> HashSet<MatchId> {
    match feed {
      Some(Feed::Drop(id)) => HashSet::from([id]),
      Some(Feed::Node(idx)) => self.matches[idx].coverage.clone(),
      None => HashSet::new(),
    }
  }

  /// Pair two feeds. With one feed missing the pairing collapses and the
  /// other feed passes through to the next round.
  fn pair(&mut self, template_round: usize, a: Option<Feed>, b: Option<Feed>) -> Option<Feed> {
    match (a, b) {
      (Some(a), Some(b)) => {
        let mut coverage = self.coverage(Some(a));
        coverage.extend(self.coverage(Some(b)));
        self.matches.push(TemplateMatch {
          template_round,
          feeds: [a, b],
          coverage,
        });
        Some(Feed::Node(self.matches.len() - 1))
      }
      (Some(single), None) | (None, Some(single)) => Some(single),
      (None, None) => None,
    }
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LosersBracket {
  /// Losers final
  pub root: Option<MatchId>,
  pub round_count: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrandFinals {
  pub grand_finals: Option<MatchId>,
  pub reset: Option<MatchId>,
}

/// Build the losers bracket under an already built winners bracket and wire
/// every winners match's drop link.
///
/// Round 1 pairs the losers of adjacent round 1 positions. Each later winners
/// round r adds a minor round, where every survivor meets a loser dropping
/// from round r, followed (below the final round) by a major round pairing
/// survivors with each other. Bye positions leave template slots empty and
/// those pairings collapse, so exactly n - 2 matches remain.
pub fn build_losers(ctx: &mut BuildContext, winners: &WinnersBracket) -> LosersBracket {
  let n = ctx.entrant_count;
  let rounds = winners.round_count();
  if ctx.layout != Layout::DoubleElimination || n <= 2 || rounds < 2 {
    debug!("no losers bracket for {n} entrants");
    return LosersBracket::default();
  }

  let mut template = Template::default();
  let mut survivors: Vec<Option<Feed>> = Vec::with_capacity(winners.rounds[0].len() / 2);
  for pair in winners.rounds[0].chunks(2) {
    let a = pair[0].map(Feed::Drop);
    let b = pair.get(1).copied().flatten().map(Feed::Drop);
    survivors.push(template.pair(1, a, b));
  }

  for round in 2..=rounds {
    let drops = winners.rounds[round - 1].iter().flatten().copied().collect::<Vec<_>>();
    debug_assert_eq!(drops.len(), survivors.len(), "drops into minor round of winners round {round}");
    let order = choose_drop_order(ctx, &template, &survivors, &drops);
    debug!("winners round {round} drops in order {order:?}");

    let mut minor = Vec::with_capacity(survivors.len());
    for (survivor, idx) in survivors.iter().zip(order.iter()) {
      minor.push(template.pair(2 * round - 2, *survivor, Some(Feed::Drop(drops[*idx]))));
    }
    survivors = minor;

    if round < rounds {
      let mut major = Vec::with_capacity(survivors.len() / 2);
      for pair in survivors.chunks(2) {
        major.push(template.pair(2 * round - 1, pair[0], pair.get(1).copied().flatten()));
      }
      survivors = major;
    }
  }

  // Template rounds left empty by collapsing are skipped in the numbering.
  let mut ids = Vec::with_capacity(template.matches.len());
  let mut round_number = 0u32;
  let mut last_template_round = 0;
  for entry in &template.matches {
    if entry.template_round != last_template_round {
      round_number += 1;
      last_template_round = entry.template_round;
    }
    ids.push(ctx.push_node(Side::Losers, round_number));
  }
  for (entry, id) in template.matches.iter().zip(ids.iter()) {
    for (slot, feed) in entry.feeds.iter().enumerate() {
      match feed {
        Feed::Node(idx) => ctx.link_child(*id, slot, ids[*idx]),
        Feed::Drop(upper) => ctx.link_drop(*upper, *id, slot),
      }
    }
  }
  debug_assert_eq!(ids.len(), n - 2, "losers bracket size for {n} entrants");

  let root = match survivors.first().copied().flatten() {
    Some(Feed::Node(idx)) => ids.get(idx).copied(),
    _ => None,
  };
  debug!("losers bracket: {} matches over {round_number} rounds", ids.len());
  LosersBracket {
    root,
    round_count: round_number as usize,
  }
}

/// Grand finals between the two bracket winners, plus the reset match that is
/// played when the losers bracket finalist takes grand finals.
pub fn build_grand_finals(
  ctx: &mut BuildContext,
  winners: &WinnersBracket,
  losers: &LosersBracket,
  with_reset: bool,
) -> GrandFinals {
  let (Some(winners_root), Some(losers_root)) = (winners.root, losers.root) else {
    return GrandFinals::default();
  };
  let round = winners.round_count() as u32 + 1;
  let grand_finals = ctx.push_node(Side::Winners, round);
  ctx.link_child(grand_finals, 0, winners_root);
  ctx.link_child(grand_finals, 1, losers_root);

  let reset = if with_reset {
    let reset = ctx.push_node(Side::Winners, round + 1);
    ctx.link_child(reset, 0, grand_finals);
    ctx.link_drop(grand_finals, reset, 1);
    Some(reset)
  } else {
    None
  };
  debug!("grand finals {grand_finals}, reset {reset:?}");
  GrandFinals { grand_finals: Some(grand_finals), reset }
}

/// Pick the order in which one winners round drops into the minor losers
/// round. Candidates are scored by how many of each drop's direct winners
/// children already feed the survivor it would meet, then by the overlap with
/// the drop's whole winners path. The lowest score wins, first candidate on
/// ties.
fn choose_drop_order(
  ctx: &BuildContext,
  template: &Template,
  survivors: &[Option<Feed>],
  drops: &[MatchId],
) -> Vec<usize> {
  let coverage = survivors.iter().map(|s| template.coverage(*s)).collect::<Vec<_>>();
  let mut best: Option<((usize, usize), Vec<usize>)> = None;
  for order in drop_order_candidates(drops.len()) {
    let mut score = (0, 0);
    for (k, idx) in order.iter().enumerate() {
      let drop = drops[*idx];
      score.0 += ctx
        .node(drop)
        .map(|node| node.child_ids().filter(|c| coverage[k].contains(c)).count())
        .unwrap_or(0);
      score.1 += winners_subtree(ctx, drop)
        .iter()
        .filter(|id| coverage[k].contains(id))
        .count();
    }
    let better = match &best {
      None => true,
      Some((current, _)) => score < *current,
    };
    if better {
      best = Some((score, order));
    }
  }
  best
    .map(|(_, order)| order)
    .unwrap_or_else(|| (0..drops.len()).collect())
}

fn drop_order_candidates(len: usize) -> Vec<Vec<usize>> {
  let reversed = (0..len).rev().collect::<Vec<_>>();
  let identity = (0..len).collect::<Vec<_>>();
  let half_swap = (len / 2..len).chain(0..len / 2).collect::<Vec<_>>();
  let half_swap_reversed = half_swap.iter().rev().copied().collect::<Vec<_>>();
  vec![reversed, identity, half_swap, half_swap_reversed]
}

/// Every match below `root` through child links.
fn winners_subtree(ctx: &BuildContext, root: MatchId) -> Vec<MatchId> {
  let mut found = Vec::new();
  let mut stack = vec![root];
  while let Some(id) = stack.pop() {
    if let Some(node) = ctx.node(id) {
      for child in node.child_ids() {
        found.push(child);
        stack.push(child);
      }
    }
  }
  found
}
