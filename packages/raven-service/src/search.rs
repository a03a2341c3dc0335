pub mod consolidate;
pub mod filter;
pub mod format;
pub mod intersect;
pub mod score;

pub use format::{FormattedResult, KeywordPoolStat, ResultPayload};
pub use score::CliffStats;

use std::time::Duration;

use tokio::{task::JoinSet, time::timeout};
use uuid::Uuid;

use raven_domain::{
	intent::{IntentKind, QueryIntent},
	predicate::Predicate,
};
use raven_storage::models::Candidate;

use crate::{SearchService, ServiceError, ServiceResult};

/// A candidate annotated with its pool-relative relevance in `[0, 1]`,
/// higher = better. Derived per query, never persisted.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
	pub candidate: Candidate,
	pub relevance: f32,
}

impl SearchService {
	/// Interpret a natural-language query through the intent provider.
	pub async fn interpret(&self, query: &str) -> ServiceResult<QueryIntent> {
		let query = query.trim();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query must be non-empty.".to_string(),
			});
		}

		Ok(self.providers.intent.parse(&self.cfg.providers.intent, query).await?)
	}

	/// The single public entry point of the retrieval pipeline.
	///
	/// Every internal failure is normalized into the `error` payload
	/// here; callers always receive a well-formed [`ResultPayload`].
	pub async fn execute_search(&self, intent: &QueryIntent, limit: u32) -> ResultPayload {
		match self.run_search(intent, limit).await {
			Ok(payload) => payload,
			Err(err) => {
				tracing::error!(error = %err, intent = intent.kind.as_str(), "Search failed.");

				ResultPayload::Error { message: err.to_string() }
			},
		}
	}

	async fn run_search(&self, intent: &QueryIntent, limit: u32) -> ServiceResult<ResultPayload> {
		let limit = limit.max(1);
		let predicate = filter::build(&intent.filters);
		let keywords: Vec<&str> = intent
			.filters
			.keywords
			.iter()
			.map(|keyword| keyword.trim())
			.filter(|keyword| !keyword.is_empty())
			.collect();

		if keywords.len() > 1 {
			return self.run_intersection_search(intent, predicate, &keywords, limit).await;
		}

		let search_text = intent.search_text();

		if search_text.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Intent carries no searchable topic.".to_string(),
			});
		}

		let embedding =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &search_text).await?;
		let candidate_k = candidate_pool_size(limit, self.cfg.search.max_candidates);
		let mut candidates = self.query_index(embedding, predicate, candidate_k).await?;

		// The cliff selector's contract assumes ascending distance;
		// sort here instead of trusting the index ordering.
		candidates.sort_by(|a, b| score::cmp_f32_asc(a.distance, b.distance));

		let distances: Vec<f32> = candidates.iter().map(|candidate| candidate.distance).collect();
		let relevances = score::normalize_relevance(&distances);
		let scored: Vec<ScoredCandidate> = candidates
			.into_iter()
			.zip(relevances)
			.map(|(candidate, relevance)| ScoredCandidate { candidate, relevance })
			.collect();
		let (selected, stats) = score::select_by_cliff(scored, self.cfg.search.cliff_multiplier);

		tracing::debug!(
			best = stats.best,
			threshold = stats.threshold,
			total_considered = stats.total_considered,
			selected = selected.len(),
			"Applied relevance cliff."
		);

		let consolidated =
			consolidate::consolidate(selected, self.cfg.search.similarity_closeness);

		Ok(format::format(
			consolidated,
			intent,
			limit,
			self.cfg.search.preview_chars as usize,
			None,
		))
	}

	/// Multi-keyword flow: one retrieval per keyword, intersected by id.
	/// Survivors are re-fetched and reported as memberships rather than
	/// ranked by distance, since distances across independent
	/// retrievals are not comparable.
	async fn run_intersection_search(
		&self,
		intent: &QueryIntent,
		predicate: Option<Predicate>,
		keywords: &[&str],
		limit: u32,
	) -> ServiceResult<ResultPayload> {
		let candidate_k = candidate_pool_size(limit, self.cfg.search.max_candidates);
		let pools = self.retrieve_keyword_pools(predicate, keywords, candidate_k).await?;
		let surviving = intersect::intersect(&pools);

		tracing::debug!(
			keywords = keywords.len(),
			surviving = surviving.len(),
			"Intersected keyword pools."
		);

		if intent.kind == IntentKind::Count {
			let stats = pools.iter().map(intersect::pool_stat).collect();

			return Ok(ResultPayload::Count {
				count: surviving.len(),
				keyword_pools: Some(stats),
			});
		}
		if surviving.is_empty() {
			return Ok(ResultPayload::empty());
		}

		let ids: Vec<Uuid> = surviving.into_iter().collect();
		let records = self.get_by_ids(&ids).await?;
		// Membership mode: every survivor matched every keyword, so
		// relevance is uniform and near-duplicate consolidation is
		// disabled (it would collapse the whole set otherwise).
		let scored: Vec<ScoredCandidate> = records
			.into_iter()
			.map(|candidate| ScoredCandidate { candidate, relevance: 1.0 })
			.collect();
		let consolidated = consolidate::consolidate(scored, 0.0);

		Ok(format::format(
			consolidated,
			intent,
			limit,
			self.cfg.search.preview_chars as usize,
			None,
		))
	}

	async fn retrieve_keyword_pools(
		&self,
		predicate: Option<Predicate>,
		keywords: &[&str],
		candidate_k: u32,
	) -> ServiceResult<Vec<intersect::KeywordPool>> {
		let mut join_set = JoinSet::new();

		for (position, keyword) in keywords.iter().enumerate() {
			let keyword = keyword.to_string();
			let embedding_cfg = self.cfg.providers.embedding.clone();
			let embedding_provider = self.providers.embedding.clone();
			let index = self.index.clone();
			let predicate = predicate.clone();
			let min_relevance = self.cfg.search.min_keyword_relevance;
			let guard = Duration::from_millis(self.cfg.search.query_timeout_ms);

			join_set.spawn(async move {
				let embedding = embedding_provider.embed(&embedding_cfg, &keyword).await?;
				let candidates =
					match timeout(guard, index.query(embedding, predicate, candidate_k)).await {
						Ok(result) => result?,
						Err(_) =>
							return Err(ServiceError::Timeout { operation: "vector index query" }),
					};

				Ok((position, intersect::keyword_pool(keyword, candidates, min_relevance)))
			});
		}

		let mut pools = Vec::with_capacity(keywords.len());

		while let Some(joined) = join_set.join_next().await {
			match joined {
				Ok(Ok(entry)) => pools.push(entry),
				// A partial intersection is meaningless; the first
				// failure cancels the remaining retrievals.
				Ok(Err(err)) => {
					join_set.abort_all();

					return Err(err);
				},
				Err(err) if err.is_cancelled() => continue,
				Err(err) => {
					join_set.abort_all();

					return Err(ServiceError::Provider {
						message: format!("Keyword retrieval task failed: {err}."),
					});
				},
			}
		}

		pools.sort_by_key(|(position, _)| *position);

		Ok(pools.into_iter().map(|(_, pool)| pool).collect())
	}

	async fn query_index(
		&self,
		embedding: Vec<f32>,
		predicate: Option<Predicate>,
		k: u32,
	) -> ServiceResult<Vec<Candidate>> {
		let guard = Duration::from_millis(self.cfg.search.query_timeout_ms);

		match timeout(guard, self.index.query(embedding, predicate, k)).await {
			Ok(result) => Ok(result?),
			Err(_) => Err(ServiceError::Timeout { operation: "vector index query" }),
		}
	}

	async fn get_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<Candidate>> {
		let guard = Duration::from_millis(self.cfg.search.query_timeout_ms);

		match timeout(guard, self.index.get(ids)).await {
			Ok(result) => Ok(result?),
			Err(_) => Err(ServiceError::Timeout { operation: "vector index lookup" }),
		}
	}
}

/// The index is over-queried relative to the display limit so that
/// consolidation still has material to work with after the cliff.
fn candidate_pool_size(limit: u32, max_candidates: u32) -> u32 {
	limit.saturating_mul(2).min(max_candidates).max(1)
}
