mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Qdrant, Search, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_candidates < cfg.search.top_k {
		return Err(Error::Validation {
			message: "search.max_candidates must be at least search.top_k.".to_string(),
		});
	}
	if !cfg.search.cliff_multiplier.is_finite() || cfg.search.cliff_multiplier < 1.0 {
		return Err(Error::Validation {
			message: "search.cliff_multiplier must be a finite number of at least 1.0.".to_string(),
		});
	}
	if !cfg.search.similarity_closeness.is_finite()
		|| !(0.0..1.0).contains(&cfg.search.similarity_closeness)
	{
		return Err(Error::Validation {
			message: "search.similarity_closeness must be in the range 0.0-1.0 (exclusive)."
				.to_string(),
		});
	}
	if !cfg.search.min_keyword_relevance.is_finite()
		|| !(0.0..=1.0).contains(&cfg.search.min_keyword_relevance)
	{
		return Err(Error::Validation {
			message: "search.min_keyword_relevance must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.preview_chars == 0 {
		return Err(Error::Validation {
			message: "search.preview_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.search.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.query_timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, key) in
		[("embedding", &cfg.providers.embedding.api_key), ("intent", &cfg.providers.intent.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.storage.qdrant.collection = cfg.storage.qdrant.collection.trim().to_string();
}
