//! Greedy balanced split of a group of weighted members into two groups.

use crate::error::{Error, Result};

/// Splits `counts` into two non-empty groups of positions with roughly equal sums.
///
/// Positions are sorted ascending by count (stable, ties keep their order).
/// The left group is the longest prefix of that order whose cumulative sum
/// does not exceed half of the total, i.e. it stops right before the first
/// member whose cumulative sum strictly exceeds `total / 2`. The right group
/// holds the remaining positions, in sorted order.
///
/// If the total is 0 no member exceeds half; the positions are then split
/// by position at `n / 2`.
///
/// # Returns
/// Positions into `counts` for the left and the right group.
///
/// # Errors
/// Returns [Error::EmptySplitGroup] if a group would be empty, which
/// happens only for fewer than two members.
///
/// # Example
/// ```
/// use bintax::convert::split_evenly;
///
/// // sorted: [1, 3], cumulative: [1, 4], first exceeding 4/2 is at position 1
/// let (left, right) = split_evenly(&[3, 1]).unwrap();
/// assert_eq!(left, vec![1]);
/// assert_eq!(right, vec![0]);
/// ```
pub fn split_evenly(counts: &[u64]) -> Result<(Vec<usize>, Vec<usize>)> {
    let total: u64 = counts.iter().sum();
    let empty_group = || Error::EmptySplitGroup {
        num_members: counts.len(),
        total,
    };

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by_key(|&i| counts[i]);

    let split_index = if total == 0 {
        counts.len() / 2
    } else {
        let mut cumulative = 0;
        order
            .iter()
            .position(|&i| {
                cumulative += counts[i];
                2 * cumulative > total
            })
            .ok_or_else(empty_group)?
    };

    if split_index == 0 || split_index == counts.len() {
        return Err(empty_group());
    }

    let right = order.split_off(split_index);
    Ok((order, right))
}
