use crate::types::Layout;

pub fn is_power_of_two(n: usize) -> bool {
  n.is_power_of_two()
}

pub fn highest_power_of_two_at_least(n: usize) -> usize {
  if n < 2 {
    return n;
  }
  n.next_power_of_two()
}

pub fn bye_count(n: usize) -> usize {
  highest_power_of_two_at_least(n) - n
}

pub fn round_count(n: usize, layout: Layout) -> usize {
  if n < 2 {
    return 0;
  }
  match layout {
    Layout::SingleElimination | Layout::DoubleElimination => {
      highest_power_of_two_at_least(n).trailing_zeros() as usize
    }
    Layout::RoundRobin => {
      if n % 2 == 0 {
        n - 1
      } else {
        n
      }
    }
  }
}

pub fn matches_in_round(round: usize, n: usize, layout: Layout, previous_round_matches: usize) -> usize {
  if n < 2 || round == 0 {
    return 0;
  }
  match layout {
    Layout::SingleElimination | Layout::DoubleElimination => {
      let byes = bye_count(n);
      match round {
        1 => (n - byes) / 2,
        2 => (byes + previous_round_matches) / 2,
        _ => previous_round_matches / 2,
      }
    }
    Layout::RoundRobin => n / 2,
  }
}

/// Match count of every round, round 1 first.
pub fn round_sizes(n: usize, layout: Layout) -> Vec<usize> {
  let rounds = round_count(n, layout);
  let mut sizes = Vec::with_capacity(rounds);
  let mut previous = 0;
  for round in 1..=rounds {
    let count = matches_in_round(round, n, layout, previous);
    sizes.push(count);
    previous = count;
  }
  sizes
}

/// Matches every entrant must be able to play through, excluding the
/// conditional grand finals reset.
pub fn total_matches(n: usize, layout: Layout) -> usize {
  match layout {
    Layout::SingleElimination | Layout::RoundRobin => round_sizes(n, layout).iter().sum(),
    Layout::DoubleElimination => {
      if n <= 2 {
        round_sizes(n, layout).iter().sum()
      } else {
        2 * n - 2
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_power_of_two_helpers() {
    assert_eq!(highest_power_of_two_at_least(0), 0);
    assert_eq!(highest_power_of_two_at_least(1), 1);
    assert_eq!(highest_power_of_two_at_least(5), 8);
    assert_eq!(highest_power_of_two_at_least(8), 8);
    assert!(is_power_of_two(16));
    assert!(!is_power_of_two(12));
    assert_eq!(bye_count(5), 3);
    assert_eq!(bye_count(6), 2);
  }

  #[test]
  fn test_round_count_by_layout() {
    assert_eq!(round_count(1, Layout::SingleElimination), 0);
    assert_eq!(round_count(2, Layout::SingleElimination), 1);
    assert_eq!(round_count(5, Layout::DoubleElimination), 3);
    assert_eq!(round_count(8, Layout::SingleElimination), 3);
    assert_eq!(round_count(4, Layout::RoundRobin), 3);
    assert_eq!(round_count(3, Layout::RoundRobin), 3);
  }

  #[test]
  fn test_round_sizes_with_byes() {
    assert_eq!(round_sizes(4, Layout::SingleElimination), vec![2, 1]);
    assert_eq!(round_sizes(5, Layout::SingleElimination), vec![1, 2, 1]);
    assert_eq!(round_sizes(6, Layout::SingleElimination), vec![2, 2, 1]);
    assert_eq!(round_sizes(12, Layout::SingleElimination), vec![4, 4, 2, 1]);
    assert_eq!(round_sizes(5, Layout::RoundRobin), vec![2; 5]);
  }

  #[test]
  fn test_total_matches() {
    for n in 2..40 {
      assert_eq!(total_matches(n, Layout::SingleElimination), n - 1, "n={n}");
      assert_eq!(total_matches(n, Layout::RoundRobin), n * (n - 1) / 2, "n={n}");
    }
    assert_eq!(total_matches(8, Layout::DoubleElimination), 14);
  }
}
