use std::collections::HashSet;

use crate::search::ScoredCandidate;

/// Collapse duplicate and near-duplicate candidates, keeping the best
/// representative of each.
///
/// Chunked emails produce many near-identical hits per conversation;
/// without consolidation one long thread dominates a result list. The
/// walk runs most-recent-first, so recency is the tie-break authority:
/// only the newest chunk of a thread survives, and of two entries whose
/// relevance differs by less than `similarity_closeness` only the
/// higher-relevance one is kept. A closeness of zero disables the
/// near-duplicate check while leaving thread dedup in place.
pub fn consolidate(
	scored: Vec<ScoredCandidate>,
	similarity_closeness: f32,
) -> Vec<ScoredCandidate> {
	let mut ordered = scored;

	ordered.sort_by(|a, b| b.candidate.meta.date.cmp(&a.candidate.meta.date));

	let mut seen_threads: HashSet<String> = HashSet::new();
	let mut out: Vec<ScoredCandidate> = Vec::new();

	for item in ordered {
		if let Some(thread) = item.candidate.thread_id.clone() {
			// The thread counts as seen whether or not the entry
			// survives the near-duplicate check below.
			if !seen_threads.insert(thread) {
				continue;
			}
		}

		let near_duplicate = out
			.iter()
			.position(|existing| (existing.relevance - item.relevance).abs() < similarity_closeness);

		match near_duplicate {
			Some(position) =>
				if item.relevance > out[position].relevance {
					out[position] = item;
				},
			None => out.push(item),
		}
	}

	out
}
