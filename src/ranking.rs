use crate::builder::BuildContext;
use crate::losers::GrandFinals;
use crate::types::MatchId;

/// Matches grouped by distance from `root` along child links.
pub fn depth_levels(ctx: &BuildContext, root: MatchId) -> Vec<Vec<MatchId>> {
  let mut levels = Vec::new();
  let mut current = vec![root];
  while !current.is_empty() {
    let next = current
      .iter()
      .filter_map(|id| ctx.node(*id))
      .flat_map(|node| node.child_ids())
      .collect::<Vec<_>>();
    levels.push(current);
    current = next;
  }
  levels
}

/// Write the placement a match's loser finishes at. Every match at the same
/// depth shares the first placement of its range.
///
/// With a losers bracket, grand finals (and the reset) decide second place
/// and the losers bracket is ranked from its final down; winners matches
/// there keep 0 since their loser is not eliminated.
pub fn assign_placements(
  ctx: &mut BuildContext,
  root: Option<MatchId>,
  losers_root: Option<MatchId>,
  finals: GrandFinals,
) {
  match losers_root {
    Some(losers_root) => {
      for id in [finals.grand_finals, finals.reset].into_iter().flatten() {
        if let Some(node) = ctx.node_mut(id) {
          node.placement = 2;
        }
      }
      assign_by_depth(ctx, losers_root, 3);
    }
    None => {
      if let Some(root) = root {
        assign_by_depth(ctx, root, 2);
      }
    }
  }
}

fn assign_by_depth(ctx: &mut BuildContext, root: MatchId, first: u32) {
  let mut placement = first;
  for level in depth_levels(ctx, root) {
    for id in &level {
      if let Some(node) = ctx.node_mut(*id) {
        node.placement = placement;
      }
    }
    placement += level.len() as u32;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::build_winners;
  use crate::losers::{build_grand_finals, build_losers};
  use crate::types::Layout;

  fn placements(layout: Layout, n: usize) -> Vec<u32> {
    let mut ctx = BuildContext::new(layout, n, 3);
    let winners = build_winners(&mut ctx);
    let losers = build_losers(&mut ctx, &winners);
    let finals = build_grand_finals(&mut ctx, &winners, &losers, true);
    let root = finals.reset.or(finals.grand_finals).or(winners.root);
    assign_placements(&mut ctx, root, losers.root, finals);
    ctx.nodes().iter().map(|n| n.placement).collect()
  }

  #[test]
  fn test_single_elimination_four() {
    assert_eq!(placements(Layout::SingleElimination, 4), vec![3, 3, 2]);
  }

  #[test]
  fn test_single_elimination_with_byes() {
    // Round 2 matches share third place; the lone round 1 match loser is fifth.
    assert_eq!(placements(Layout::SingleElimination, 5), vec![5, 3, 3, 2]);
  }

  #[test]
  fn test_double_elimination_eight() {
    let placed = placements(Layout::DoubleElimination, 8);
    assert_eq!(&placed[..7], &[0; 7]);
    assert_eq!(&placed[7..], &[7, 7, 5, 5, 4, 3, 2, 2]);
  }

  #[test]
  fn test_round_robin_unranked() {
    assert!(placements(Layout::RoundRobin, 6).iter().all(|p| *p == 0));
  }

  #[test]
  fn test_depth_levels() {
    let mut ctx = BuildContext::new(Layout::SingleElimination, 8, 3);
    let winners = build_winners(&mut ctx);
    let levels = depth_levels(&ctx, winners.root.unwrap());
    assert_eq!(levels, vec![vec![7], vec![5, 6], vec![1, 2, 3, 4]]);
  }
}
