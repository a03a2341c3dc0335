//! In-memory collaborators for exercising the retrieval pipeline
//! without a qdrant instance or any network provider.

use std::{collections::HashMap, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

use raven_config::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Providers as ProviderConfigs, Qdrant,
	Search, Service, Storage,
};
use raven_domain::{intent::QueryIntent, predicate::Predicate};
use raven_service::{
	BoxFuture, EmbeddingProvider, IntentProvider, Providers, SearchService, VectorIndex,
};
use raven_storage::models::{Candidate, EmailMeta};

/// A vector index backed by plain vectors of candidates.
///
/// Pools are addressed by the first component of the query embedding
/// (pair with [`KeyedEmbedding`], which emits the slot a text was
/// assigned), so multi-keyword tests can hand every keyword its own
/// pool. Predicates are evaluated against candidate fields the same way
/// the real backend would.
#[derive(Default)]
pub struct MemoryIndex {
	pools: Vec<Vec<Candidate>>,
	records: HashMap<Uuid, Candidate>,
	fail_with: Option<String>,
}
impl MemoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// An index whose every call fails, for error-path tests.
	pub fn failing(message: &str) -> Self {
		Self { fail_with: Some(message.to_string()), ..Self::default() }
	}

	/// Append a retrieval pool; the pool answers queries whose
	/// embedding starts with its slot number.
	pub fn with_pool(mut self, candidates: Vec<Candidate>) -> Self {
		for candidate in &candidates {
			self.records.insert(candidate.id, candidate.clone());
		}

		self.pools.push(candidates);

		self
	}
}
impl VectorIndex for MemoryIndex {
	fn query<'a>(
		&'a self,
		embedding: Vec<f32>,
		predicate: Option<Predicate>,
		k: u32,
	) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>> {
		Box::pin(async move {
			if let Some(message) = &self.fail_with {
				return Err(raven_storage::Error::InvalidArgument(message.clone()));
			}

			let slot = embedding.first().copied().unwrap_or(0.0) as usize;
			let mut out: Vec<Candidate> = self
				.pools
				.get(slot)
				.into_iter()
				.flatten()
				.filter(|candidate| {
					predicate
						.as_ref()
						.map(|predicate| predicate_matches(predicate, candidate))
						.unwrap_or(true)
				})
				.cloned()
				.collect();

			out.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
			out.truncate(k as usize);

			Ok(out)
		})
	}

	fn get<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>> {
		Box::pin(async move {
			if let Some(message) = &self.fail_with {
				return Err(raven_storage::Error::InvalidArgument(message.clone()));
			}

			Ok(ids.iter().filter_map(|id| self.records.get(id).cloned()).collect())
		})
	}
}

/// Evaluate a predicate against a candidate the way the backend would.
pub fn predicate_matches(predicate: &Predicate, candidate: &Candidate) -> bool {
	match predicate {
		Predicate::Eq { field, value } =>
			string_field(candidate, field).map(|found| found == *value).unwrap_or(false),
		Predicate::In { field, values } =>
			string_field(candidate, field).map(|found| values.contains(&found)).unwrap_or(false),
		Predicate::Gte { field, value } =>
			i64_field(candidate, field).map(|found| found >= *value).unwrap_or(false),
		Predicate::Lte { field, value } =>
			i64_field(candidate, field).map(|found| found <= *value).unwrap_or(false),
		Predicate::And(parts) =>
			parts.iter().all(|part| predicate_matches(part, candidate)),
	}
}

fn string_field(candidate: &Candidate, field: &str) -> Option<String> {
	match field {
		"company" => Some(candidate.meta.company.clone()),
		"from" => Some(candidate.meta.from.clone()),
		"subject" => Some(candidate.meta.subject.clone()),
		_ => None,
	}
}

fn i64_field(candidate: &Candidate, field: &str) -> Option<i64> {
	match field {
		"date" => Some(candidate.meta.date.unix_timestamp()),
		_ => None,
	}
}

/// Embedding provider that maps assigned texts to pool slots; anything
/// unassigned lands in slot zero.
#[derive(Default)]
pub struct KeyedEmbedding {
	slots: HashMap<String, f32>,
}
impl KeyedEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn assign(mut self, text: &str, slot: usize) -> Self {
		self.slots.insert(text.to_string(), slot as f32);

		self
	}
}
impl EmbeddingProvider for KeyedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		let slot = self.slots.get(text).copied().unwrap_or(0.0);

		Box::pin(async move { Ok(vec![slot]) })
	}
}

pub struct FailingEmbedding {
	pub message: String,
}
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move { Err(color_eyre::eyre::eyre!(self.message.clone())) })
	}
}

/// Intent provider that returns a canned intent regardless of query.
pub struct CannedIntent {
	pub intent: QueryIntent,
}
impl IntentProvider for CannedIntent {
	fn parse<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<QueryIntent>> {
		Box::pin(async move { Ok(self.intent.clone()) })
	}
}

/// A candidate with sensible defaults; tests adjust fields directly.
pub fn candidate(company: &str, date_unix: i64, distance: f32) -> Candidate {
	Candidate {
		id: Uuid::new_v4(),
		thread_id: None,
		distance,
		meta: EmailMeta {
			subject: format!("{company} update"),
			from: format!("news@{company}.com"),
			company: company.to_string(),
			date: OffsetDateTime::from_unix_timestamp(date_unix).expect("valid timestamp"),
		},
		content: "Lorem ipsum dolor sit amet.".to_string(),
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://localhost:6334".to_string(),
				collection: "email_chunks_test".to_string(),
				vector_dim: 1,
			},
		},
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/".to_string(),
				model: "m".to_string(),
				dimensions: 1,
				timeout_ms: 1_000,
				default_headers: Default::default(),
			},
			intent: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/".to_string(),
				model: "m".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Default::default(),
			},
		},
		search: Search {
			top_k: 20,
			max_candidates: 10_000,
			cliff_multiplier: 2.5,
			similarity_closeness: 0.05,
			min_keyword_relevance: 0.7,
			preview_chars: 200,
			query_timeout_ms: 5_000,
		},
	}
}

/// Wire a service around an in-memory index and the given providers.
pub fn test_service(
	index: MemoryIndex,
	embedding: impl EmbeddingProvider + 'static,
	intent: QueryIntent,
) -> SearchService {
	SearchService::with_parts(
		test_config(),
		Arc::new(index),
		Providers::new(Arc::new(embedding), Arc::new(CannedIntent { intent })),
	)
}
