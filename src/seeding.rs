use crate::topology::highest_power_of_two_at_least;

/// Seed order of the first round of a `size`-slot bracket, where `size` is a
/// power of two. Adjacent entries play each other.
pub fn seed_order(size: usize) -> Vec<u32> {
  let mut seeds = vec![1u32];
  while seeds.len() < size {
    let n = seeds.len() as u32;
    let mut next = Vec::with_capacity(seeds.len() * 2);
    for seed in seeds.iter().copied() {
      next.push(seed);
      next.push((n * 2 + 1).saturating_sub(seed));
    }
    seeds = next;
  }
  seeds
}

/// Seeds expected in each round when the favourite always wins. Index 0 is
/// round 1 and the last entry is the final, `[1, 2]`.
pub fn seed_projection(rounds: usize) -> Vec<Vec<u32>> {
  if rounds == 0 {
    return Vec::new();
  }
  let mut by_round = vec![vec![1u32, 2]];
  for _ in 1..rounds {
    let Some(later) = by_round.last() else {
      break;
    };
    let size = later.len() as u32 * 2;
    let mut earlier = Vec::with_capacity(size as usize);
    for seed in later.iter().copied() {
      earlier.push(seed);
      earlier.push(size + 1 - seed);
    }
    by_round.push(earlier);
  }
  by_round.reverse();
  by_round
}

/// Round 1 pairings for `n` entrants, in bracket position order. A missing
/// second seed means the first seed has a bye.
pub fn round1_pairings(n: usize) -> Vec<(u32, Option<u32>)> {
  if n < 2 {
    return Vec::new();
  }
  let size = highest_power_of_two_at_least(n);
  seed_order(size)
    .chunks(2)
    .map(|pair| {
      let second = pair.get(1).copied().filter(|seed| *seed as usize <= n);
      (pair[0], second)
    })
    .collect()
}
