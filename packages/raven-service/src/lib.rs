pub mod search;

pub use search::{
	CliffStats, FormattedResult, KeywordPoolStat, ResultPayload, ScoredCandidate,
};

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use raven_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use raven_domain::{intent::QueryIntent, predicate::Predicate};
use raven_providers::{embedding, intent};
use raven_storage::{models::Candidate, qdrant::QdrantStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

pub trait IntentProvider
where
	Self: Send + Sync,
{
	fn parse<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<QueryIntent>>;
}

/// The narrow seam to the vector index. `query` must return candidates
/// best match first; `get` serves identifier-based lookup for flows
/// where distances are not comparable.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		embedding: Vec<f32>,
		predicate: Option<Predicate>,
		k: u32,
	) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>>;

	fn get<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	Index { message: String },
	Timeout { operation: &'static str },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub intent: Arc<dyn IntentProvider>,
}

pub struct SearchService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Index { message } => write!(f, "Index error: {message}"),
			Self::Timeout { operation } => write!(f, "Timed out waiting for {operation}."),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<raven_storage::Error> for ServiceError {
	fn from(err: raven_storage::Error) -> Self {
		Self::Index { message: err.to_string() }
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

impl IntentProvider for DefaultProviders {
	fn parse<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<QueryIntent>> {
		Box::pin(intent::parse(cfg, query))
	}
}

impl VectorIndex for QdrantStore {
	fn query<'a>(
		&'a self,
		embedding: Vec<f32>,
		predicate: Option<Predicate>,
		k: u32,
	) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>> {
		Box::pin(async move { QdrantStore::query(self, embedding, predicate.as_ref(), k).await })
	}

	fn get<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, raven_storage::Result<Vec<Candidate>>> {
		Box::pin(QdrantStore::get(self, ids))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, intent: Arc<dyn IntentProvider>) -> Self {
		Self { embedding, intent }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), intent: provider }
	}
}

impl SearchService {
	pub fn new(cfg: Config, qdrant: QdrantStore) -> Self {
		Self { cfg, index: Arc::new(qdrant), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, index: Arc<dyn VectorIndex>, providers: Providers) -> Self {
		Self { cfg, index, providers }
	}
}
