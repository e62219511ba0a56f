use tracing::debug;

use crate::seeding::round1_pairings;
use crate::set::MatchNode;
use crate::topology::{matches_in_round, round_count};
use crate::types::{Layout, MatchId, Side};

/// State threaded through every construction step of one bracket: the
/// entrant count, the running id counter and the node arena.
#[derive(Clone, Debug)]
pub struct BuildContext {
  pub layout: Layout,
  pub entrant_count: usize,
  pub number_to_win: u32,
  next_id: MatchId,
  nodes: Vec<MatchNode>,
}

/// Winners bracket nodes per round. Round 1 is indexed by seed position and
/// holds `None` where a bye leaves no match; later rounds are dense.
#[derive(Clone, Debug, Default)]
pub struct WinnersBracket {
  pub rounds: Vec<Vec<Option<MatchId>>>,
  pub root: Option<MatchId>,
}

impl WinnersBracket {
  pub fn round_count(&self) -> usize {
    self.rounds.len()
  }
}

impl BuildContext {
  pub fn new(layout: Layout, entrant_count: usize, number_to_win: u32) -> Self {
    BuildContext {
      layout,
      entrant_count,
      number_to_win,
      next_id: 1,
      nodes: Vec::new(),
    }
  }

  pub fn push_node(&mut self, side: Side, round: u32) -> MatchId {
    let id = self.next_id;
    self.next_id += 1;
    let mut node = MatchNode::new(id, side, round);
    node.number_to_win = self.number_to_win;
    self.nodes.push(node);
    id
  }

  pub fn node(&self, id: MatchId) -> Option<&MatchNode> {
    let idx = (id as usize).checked_sub(1)?;
    self.nodes.get(idx)
  }

  pub fn node_mut(&mut self, id: MatchId) -> Option<&mut MatchNode> {
    let idx = (id as usize).checked_sub(1)?;
    self.nodes.get_mut(idx)
  }

  pub fn nodes(&self) -> &[MatchNode] {
    &self.nodes
  }

  pub fn into_nodes(self) -> Vec<MatchNode> {
    self.nodes
  }

  /// `child`'s winner fills `slot` of `parent`.
  pub fn link_child(&mut self, parent: MatchId, slot: usize, child: MatchId) {
    debug_assert!(
      self.node(child).map(|c| c.parent.is_none()).unwrap_or(false),
      "match {child} already has a parent"
    );
    if let Some(node) = self.node_mut(parent) {
      debug_assert!(!node.is_fed(slot), "slot {slot} of match {parent} is already fed");
      node.children[slot] = Some(child);
    }
    if let Some(node) = self.node_mut(child) {
      node.parent = Some(parent);
    }
  }

  /// `upper`'s loser drops into `slot` of `lower`.
  pub fn link_drop(&mut self, upper: MatchId, lower: MatchId, slot: usize) {
    debug_assert!(
      self.node(upper).map(|u| u.drop.is_none()).unwrap_or(false),
      "match {upper} already drops its loser"
    );
    if let Some(node) = self.node_mut(lower) {
      debug_assert!(!node.is_fed(slot), "slot {slot} of match {lower} is already fed");
      node.sources[slot] = Some(upper);
    }
    if let Some(node) = self.node_mut(upper) {
      node.drop = Some(lower);
    }
  }

  pub fn nodes_in_round(&self, side: Side, round: u32) -> Vec<MatchId> {
    self
      .nodes
      .iter()
      .filter(|node| node.side == side && node.round == round)
      .map(|node| node.id)
      .collect()
  }
}

pub fn build_winners(ctx: &mut BuildContext) -> WinnersBracket {
  let n = ctx.entrant_count;
  let layout = ctx.layout;
  if n < 2 {
    debug!("{n} entrant(s): nothing to build");
    return WinnersBracket::default();
  }
  if layout == Layout::RoundRobin {
    build_round_robin_rounds(ctx);
    return WinnersBracket::default();
  }

  let rounds = round_count(n, layout);
  let mut by_round: Vec<Vec<Option<MatchId>>> = Vec::with_capacity(rounds);

  let round1 = round1_pairings(n)
    .iter()
    .map(|(_, second)| second.map(|_| ctx.push_node(Side::Winners, 1)))
    .collect::<Vec<_>>();
  debug_assert_eq!(
    round1.iter().flatten().count(),
    matches_in_round(1, n, layout, 0),
    "round 1 size for {n} entrants"
  );
  by_round.push(round1);

  for round in 2..=rounds {
    let previous = by_round[round - 2].clone();
    let mut current = Vec::with_capacity(previous.len() / 2);
    for pair in previous.chunks(2) {
      let id = ctx.push_node(Side::Winners, round as u32);
      for (slot, child) in pair.iter().enumerate() {
        if let Some(child) = child {
          ctx.link_child(id, slot, *child);
        }
      }
      current.push(Some(id));
    }
    debug_assert_eq!(
      current.len(),
      matches_in_round(round, n, layout, previous.iter().flatten().count()),
      "round {round} size for {n} entrants"
    );
    by_round.push(current);
  }

  let root = by_round.last().and_then(|round| round.first().copied().flatten());
  debug!(
    "winners bracket: {n} entrants, {rounds} rounds, {} matches",
    by_round.iter().flatten().flatten().count()
  );
  WinnersBracket { rounds: by_round, root }
}

fn build_round_robin_rounds(ctx: &mut BuildContext) {
  let n = ctx.entrant_count;
  let rounds = round_count(n, Layout::RoundRobin);
  for round in 1..=rounds {
    for _ in 0..matches_in_round(round, n, Layout::RoundRobin, 0) {
      ctx.push_node(Side::Winners, round as u32);
    }
  }
  debug!("round robin: {n} entrants, {rounds} rounds, {} matches", ctx.nodes().len());
}
