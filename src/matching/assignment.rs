//! One-to-one assignment of thresholded candidate pairs.

use super::{AssignmentMethod, Candidate};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Above this many distinct segments per side, `Optimal` falls back to greedy.
const HUNGARIAN_LIMIT: usize = 2_000;

/// Score scale for the integer Hungarian cost matrix.
const SCALE: f64 = 1_000_000.0;

/// Greedy commit order: similarity descending, then smaller combined
/// position, then smaller old index, then smaller new index.
pub(crate) fn commit_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| (a.old_index + a.new_index).cmp(&(b.old_index + b.new_index)))
        .then_with(|| a.old_index.cmp(&b.old_index))
        .then_with(|| a.new_index.cmp(&b.new_index))
}

/// Choose a one-to-one subset of `candidates`.
///
/// The result is always in commit order.
pub(crate) fn assign(candidates: Vec<Candidate>, method: AssignmentMethod) -> Vec<Candidate> {
    if candidates.is_empty() {
        return Vec::new();
    }
    match method {
        AssignmentMethod::Greedy => greedy_assignment(candidates),
        AssignmentMethod::Optimal => hungarian_assignment(candidates),
    }
}

/// Pick the best remaining pair, commit it, remove both endpoints, repeat.
fn greedy_assignment(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(commit_order);

    let mut used_old: HashSet<usize> = HashSet::new();
    let mut used_new: HashSet<usize> = HashSet::new();
    let mut result = Vec::new();
    for candidate in candidates {
        if !used_old.contains(&candidate.old_index) && !used_new.contains(&candidate.new_index) {
            used_old.insert(candidate.old_index);
            used_new.insert(candidate.new_index);
            result.push(candidate);
        }
    }
    result
}

/// Hungarian algorithm (Kuhn-Munkres) maximizing total similarity.
fn hungarian_assignment(candidates: Vec<Candidate>) -> Vec<Candidate> {
    use pathfinding::kuhn_munkres::kuhn_munkres_min;
    use pathfinding::matrix::Matrix;

    let old_ids: Vec<usize> = candidates
        .iter()
        .map(|c| c.old_index)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let new_ids: Vec<usize> = candidates
        .iter()
        .map(|c| c.new_index)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let n = old_ids.len().max(new_ids.len());
    if n > HUNGARIAN_LIMIT {
        tracing::debug!(size = n, "assignment too large for Hungarian, using greedy");
        return greedy_assignment(candidates);
    }

    let old_pos: HashMap<usize, usize> = old_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let new_pos: HashMap<usize, usize> = new_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut scores: HashMap<(usize, usize), &Candidate> = HashMap::new();
    for c in &candidates {
        scores.insert((old_pos[&c.old_index], new_pos[&c.new_index]), c);
    }

    // Negated scores for minimization; missing edges and padding cost nothing
    let weights: Vec<i64> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|key| {
            scores
                .get(&key)
                .map_or(0, |c| -((c.similarity * SCALE).round() as i64))
        })
        .collect();

    let Ok(matrix) = Matrix::from_vec(n, n, weights) else {
        return greedy_assignment(candidates);
    };
    let (_, assignment) = kuhn_munkres_min(&matrix);

    let mut result: Vec<Candidate> = assignment
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| scores.get(&(i, j)).map(|c| (*c).clone()))
        .collect();
    result.sort_by(commit_order);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(old_index: usize, new_index: usize, similarity: f64) -> Candidate {
        Candidate {
            old_index,
            new_index,
            similarity,
        }
    }

    fn pairs(result: &[Candidate]) -> Vec<(usize, usize)> {
        result.iter().map(|c| (c.old_index, c.new_index)).collect()
    }

    #[test]
    fn test_greedy_highest_first() {
        let result = assign(
            vec![c(0, 0, 0.8), c(0, 1, 0.95), c(1, 1, 0.9)],
            AssignmentMethod::Greedy,
        );
        // (0,1) wins; (1,1) is then blocked; (0,0) is blocked
        assert_eq!(pairs(&result), vec![(0, 1)]);
    }

    #[test]
    fn test_tie_break_combined_position() {
        let result = assign(
            vec![c(2, 3, 0.9), c(2, 0, 0.9), c(1, 3, 0.9)],
            AssignmentMethod::Greedy,
        );
        // Sums: 5, 2, 4 -> (2,0) first, then (1,3)
        assert_eq!(pairs(&result), vec![(2, 0), (1, 3)]);
    }

    #[test]
    fn test_tie_break_old_then_new() {
        let mut all = vec![c(2, 1, 0.5), c(1, 2, 0.5), c(3, 0, 0.5)];
        all.sort_by(commit_order);
        assert_eq!(pairs(&all), vec![(1, 2), (2, 1), (3, 0)]);

        let mut same_old = vec![c(1, 2, 0.5), c(1, 1, 0.5)];
        same_old.sort_by(commit_order);
        assert_eq!(pairs(&same_old), vec![(1, 1), (1, 2)]);
    }

    #[test]
    fn test_optimal_beats_greedy_total() {
        let candidates = vec![c(0, 0, 0.9), c(0, 1, 0.85), c(1, 0, 0.8)];
        let greedy = assign(candidates.clone(), AssignmentMethod::Greedy);
        assert_eq!(pairs(&greedy), vec![(0, 0)]);

        let optimal = assign(candidates, AssignmentMethod::Optimal);
        let mut found = pairs(&optimal);
        found.sort_unstable();
        assert_eq!(found, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_empty() {
        assert!(assign(Vec::new(), AssignmentMethod::Optimal).is_empty());
    }
}
