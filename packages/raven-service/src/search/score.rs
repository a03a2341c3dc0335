use std::cmp::Ordering;

use crate::search::ScoredCandidate;

/// Observability triple describing one cliff selection.
#[derive(Clone, Copy, Debug)]
pub struct CliffStats {
	pub best: f32,
	pub threshold: f32,
	pub total_considered: usize,
}

/// Map raw distances onto pool-relative relevance in `[0, 1]`, one
/// value per input, same order, higher = better.
///
/// Embedding-distance scales vary by model and query, so the
/// normalization is min-max within the current pool: rank order is
/// preserved and the output is bounded for threshold comparisons. A
/// zero-range pool (including a single candidate) normalizes to `1.0`
/// everywhere; there is no division by zero.
pub fn normalize_relevance(distances: &[f32]) -> Vec<f32> {
	let Some(first) = distances.first() else {
		return Vec::new();
	};
	let mut min = *first;
	let mut max = *first;

	for distance in distances {
		min = min.min(*distance);
		max = max.max(*distance);
	}

	let range = max - min;

	distances
		.iter()
		.map(|distance| if range > 0.0 { 1.0 - ((distance - min) / range) } else { 1.0 })
		.collect()
}

/// Cut a distance-sorted candidate list at the relevance cliff.
///
/// The input must already be sorted ascending by distance. A candidate
/// stays relevant while its distance is at most `multiplier` times the
/// best distance; the walk stops at the first violation, so a zero best
/// distance admits exactly the zero-distance prefix. Empty input yields
/// an empty prefix, not an error.
pub fn select_by_cliff(
	scored: Vec<ScoredCandidate>,
	multiplier: f32,
) -> (Vec<ScoredCandidate>, CliffStats) {
	let total_considered = scored.len();
	let Some(first) = scored.first() else {
		return (Vec::new(), CliffStats { best: 0.0, threshold: 0.0, total_considered });
	};
	let best = first.candidate.distance;
	let threshold = best * multiplier;
	let mut selected = Vec::with_capacity(scored.len());

	for item in scored {
		if item.candidate.distance > threshold {
			break;
		}

		selected.push(item);
	}

	(selected, CliffStats { best, threshold, total_considered })
}

/// NaN-safe ascending comparison; NaN sorts last.
pub fn cmp_f32_asc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
	}
}
