//! Positional ordering of sibling questions or options.
//!
//! Siblings always carry the indices `0..N-1`. A move removes the item from
//! its slot, reinserts it at the target and then every sibling is assigned
//! its new rank; there are no incremental shifts.

/// Move the item at `from` to `to`, clamping `to` to the last slot.
/// Returns the position the item ended up at, or `None` if `from` is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Option<usize> {
    if from >= items.len() {
        return None;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    Some(to)
}

/// Pair each item with its 0-based rank.
pub fn ranked<T>(items: &[T]) -> impl Iterator<Item = (i64, &T)> {
    items.iter().enumerate().map(|(rank, item)| (rank as i64, item))
}

/// True when `indices`, in any order, are exactly `0..len`.
pub fn is_contiguous(indices: &[i64]) -> bool {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(rank, index)| *index == rank as i64)
}
