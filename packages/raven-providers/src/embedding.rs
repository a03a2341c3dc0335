use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Embed a single text through an Ollama-style embeddings endpoint.
///
/// A failure (transport, HTTP status, or response shape) surfaces as an
/// error; this never degrades to an empty vector.
pub async fn embed(cfg: &raven_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"prompt": text,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vector = parse_embedding_response(json)?;

	if vector.len() != cfg.dimensions as usize {
		return Err(eyre::eyre!(
			"Embedding vector has {} dimensions, expected {}.",
			vector.len(),
			cfg.dimensions
		));
	}

	Ok(vector)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("embedding")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing the embedding array."))?;

	if embedding.is_empty() {
		return Err(eyre::eyre!("Embedding response contains an empty vector."));
	}

	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number =
			value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	Ok(vec)
}
