use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub intent: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	/// Default number of results returned to the caller.
	pub top_k: u32,
	/// Upper bound on the candidate pool requested from the index.
	#[serde(default = "default_max_candidates")]
	pub max_candidates: u32,
	/// A candidate stays relevant while its distance is at most this
	/// multiple of the best match's distance.
	#[serde(default = "default_cliff_multiplier")]
	pub cliff_multiplier: f32,
	/// Relevance gap below which two consolidated results count as
	/// near-duplicates.
	#[serde(default = "default_similarity_closeness")]
	pub similarity_closeness: f32,
	/// Minimum normalized relevance a hit needs to stay in a per-keyword
	/// pool before intersection.
	#[serde(default = "default_min_keyword_relevance")]
	pub min_keyword_relevance: f32,
	/// Body preview length in characters.
	#[serde(default = "default_preview_chars")]
	pub preview_chars: u32,
	/// Per-call guard on index queries.
	pub query_timeout_ms: u64,
}

fn default_max_candidates() -> u32 {
	10_000
}

fn default_cliff_multiplier() -> f32 {
	2.5
}

fn default_similarity_closeness() -> f32 {
	0.05
}

fn default_min_keyword_relevance() -> f32 {
	0.7
}

fn default_preview_chars() -> u32 {
	200
}
