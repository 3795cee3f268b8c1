//! Top-N selection over parallel candidate/score slices

use std::cmp::Ordering;

/// Return the `n` best-scoring candidates, best first
///
/// Uses a partial selection so only the selected prefix gets sorted. Scores
/// are compared with [`f64::total_cmp`]; equal scores fall back to the
/// smaller candidate index. Extra entries in the longer slice are ignored.
pub fn top_n(candidates: &[usize], scores: &[f64], n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = candidates
        .iter()
        .copied()
        .zip(scores.iter().copied())
        .collect();

    let n = n.min(ranked.len());
    if n == 0 {
        return Vec::new();
    }
    if n < ranked.len() {
        ranked.select_nth_unstable_by(n - 1, rank_order);
        ranked.truncate(n);
    }
    ranked.sort_unstable_by(rank_order);

    ranked.into_iter().map(|(candidate, _)| candidate).collect()
}

/// Descending score, then ascending candidate index
fn rank_order(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
