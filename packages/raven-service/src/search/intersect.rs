use std::collections::HashSet;

use uuid::Uuid;

use raven_storage::models::Candidate;

use crate::search::{format::KeywordPoolStat, score};

/// One keyword's retrieval pool, reduced to the ids that cleared the
/// relevance floor.
#[derive(Clone, Debug)]
pub struct KeywordPool {
	pub keyword: String,
	pub ids: HashSet<Uuid>,
}

/// Reduce a keyword's raw retrieval to its qualifying id set: the pool
/// is min-max normalized and hits below `min_relevance` are dropped
/// before the intersection sees them.
pub fn keyword_pool(
	keyword: String,
	candidates: Vec<Candidate>,
	min_relevance: f32,
) -> KeywordPool {
	let distances: Vec<f32> = candidates.iter().map(|candidate| candidate.distance).collect();
	let relevances = score::normalize_relevance(&distances);
	let ids: HashSet<Uuid> = candidates
		.iter()
		.zip(relevances)
		.filter(|(_, relevance)| *relevance >= min_relevance)
		.map(|(candidate, _)| candidate.id)
		.collect();

	KeywordPool { keyword, ids }
}

/// Intersect the per-keyword id sets: a result must appear in every
/// pool to qualify. Any empty pool short-circuits to an empty
/// intersection rather than erroring.
pub fn intersect(pools: &[KeywordPool]) -> HashSet<Uuid> {
	let mut pools = pools.iter();
	let Some(first) = pools.next() else {
		return HashSet::new();
	};
	let mut surviving = first.ids.clone();

	for pool in pools {
		if surviving.is_empty() {
			break;
		}

		surviving.retain(|id| pool.ids.contains(id));
	}

	surviving
}

pub fn pool_stat(pool: &KeywordPool) -> KeywordPoolStat {
	KeywordPoolStat { keyword: pool.keyword.clone(), pool_size: pool.ids.len() }
}
