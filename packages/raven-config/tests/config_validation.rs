use toml::Value;

use raven_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
log_level = "info"

[storage.qdrant]
url        = "http://localhost:6334"
collection = "email_chunks_v1"
vector_dim = 1024

[providers.embedding]
provider_id = "ollama"
api_base    = "http://localhost:11434"
api_key     = "ollama"
path        = "/api/embeddings"
model       = "mxbai-embed-large"
dimensions  = 1024
timeout_ms  = 30000

[providers.intent]
provider_id = "ollama"
api_base    = "http://localhost:11434"
api_key     = "ollama"
path        = "/v1/chat/completions"
model       = "qwen2.5-coder:32b"
temperature = 0.1
timeout_ms  = 60000

[search]
top_k            = 20
query_timeout_ms = 30000
"#;

fn sample_config() -> Config {
	parse(SAMPLE_CONFIG_TOML.to_string())
}

fn parse(raw: String) -> Config {
	toml::from_str(&raw).expect("Failed to parse sample config.")
}

fn with_search_field(field: &str, value: Value) -> Config {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let search = root
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [search].");

	search.insert(field.to_string(), value);

	parse(toml::to_string(&root).expect("Failed to render sample config."))
}

fn assert_rejected(cfg: &Config, needle: &str) {
	match raven_config::validate(cfg) {
		Err(Error::Validation { message }) => {
			assert!(message.contains(needle), "unexpected message: {message}")
		},
		other => panic!("expected a validation error, got {other:?}"),
	}
}

#[test]
fn sample_config_is_valid_with_defaults() {
	let cfg = sample_config();

	raven_config::validate(&cfg).expect("sample config must validate");

	assert_eq!(cfg.search.max_candidates, 10_000);
	assert_eq!(cfg.search.cliff_multiplier, 2.5);
	assert_eq!(cfg.search.similarity_closeness, 0.05);
	assert_eq!(cfg.search.min_keyword_relevance, 0.7);
	assert_eq!(cfg.search.preview_chars, 200);
}

#[test]
fn rejects_mismatched_embedding_dimensions() {
	let mut cfg = sample_config();

	cfg.providers.embedding.dimensions = 768;

	assert_rejected(&cfg, "must match storage.qdrant.vector_dim");
}

#[test]
fn rejects_zero_top_k() {
	let cfg = with_search_field("top_k", Value::Integer(0));

	assert_rejected(&cfg, "search.top_k");
}

#[test]
fn rejects_max_candidates_below_top_k() {
	let cfg = with_search_field("max_candidates", Value::Integer(5));

	assert_rejected(&cfg, "search.max_candidates");
}

#[test]
fn rejects_cliff_multiplier_below_one() {
	let cfg = with_search_field("cliff_multiplier", Value::Float(0.5));

	assert_rejected(&cfg, "search.cliff_multiplier");
}

#[test]
fn rejects_out_of_range_similarity_closeness() {
	let cfg = with_search_field("similarity_closeness", Value::Float(1.0));

	assert_rejected(&cfg, "search.similarity_closeness");
}

#[test]
fn rejects_blank_provider_api_key() {
	let mut cfg = sample_config();

	cfg.providers.intent.api_key = "  ".to_string();

	assert_rejected(&cfg, "intent api_key");
}
