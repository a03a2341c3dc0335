use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use raven_domain::{intent::QueryIntent, registry};

/// Turn a natural-language query into a validated [`QueryIntent`]
/// through a chat-completion endpoint.
///
/// Models occasionally wrap the JSON in prose; the response parser
/// scans for the outermost object before deserializing, and the call is
/// retried a bounded number of times when the payload stays unusable.
pub async fn parse(cfg: &raven_config::LlmProviderConfig, query: &str) -> Result<QueryIntent> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let messages = build_intent_messages(query);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		if let Ok(intent) = parse_intent_response(json) {
			return Ok(intent);
		}
	}

	Err(eyre::eyre!("Intent response is not a valid query intent."))
}

pub fn build_intent_messages(query: &str) -> Vec<Value> {
	let companies = registry::all_keys().join(", ");
	let system_prompt = "You are a query analyst for an email search system. \
Output must be valid JSON only and must match the provided schema exactly. \
Do not add explanations or extra fields.";
	let user_prompt = format!(
		"Analyze this email search query: {query:?}\n\
Available companies: {companies}\n\
Return JSON matching this exact schema:\n\
{{\n\
    \"type\": \"count\" | \"list\" | \"timeline\" | \"trend\" | \"summary\",\n\
    \"topic\": \"main topic or subject\",\n\
    \"filters\": {{\n\
        \"companies\": [\"known company keys that match the query\"],\n\
        \"time_range\": {{ \"start\": unix seconds or null, \"end\": unix seconds or null, \"description\": \"human readable\" }},\n\
        \"keywords\": [\"independent search terms, only when the query combines several\"]\n\
    }},\n\
    \"reasoning\": \"brief explanation of the analysis\"\n\
}}\n\
Constraints:\n\
- \"type\" reflects the answer shape the user wants (count, list, timeline, trend, or summary).\n\
- Only use companies from the available list; omit anything else.\n\
- Omit \"time_range\" when the query has no time constraint."
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn parse_intent_response(json: Value) -> Result<QueryIntent> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let object = extract_json_object(content)
			.ok_or_else(|| eyre::eyre!("Intent content contains no JSON object."))?;
		let value: Value = serde_json::from_str(object)
			.map_err(|_| eyre::eyre!("Intent content is not valid JSON."))?;

		return QueryIntent::from_value(value)
			.map_err(|err| eyre::eyre!("Intent JSON does not match the schema: {err}."));
	}

	if json.is_object() {
		return QueryIntent::from_value(json)
			.map_err(|err| eyre::eyre!("Intent JSON does not match the schema: {err}."));
	}

	Err(eyre::eyre!("Intent response is missing JSON content."))
}

/// The outermost `{...}` span of a possibly-chatty completion.
fn extract_json_object(text: &str) -> Option<&str> {
	let start = text.find('{')?;
	let end = text.rfind('}')?;

	(end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
	use super::*;

	use raven_domain::intent::IntentKind;

	#[test]
	fn parses_choice_content_with_surrounding_prose() {
		let content = "Here is the analysis you asked for:\n\
{ \"type\": \"count\", \"topic\": \"ai adoption\", \"filters\": { \"companies\": [\"bcg\"] }, \"reasoning\": \"count question\" }\n\
Let me know if you need more.";
		let json = serde_json::json!({
			"choices": [ { "message": { "content": content } } ]
		});
		let intent = parse_intent_response(json).expect("parse failed");

		assert_eq!(intent.kind, IntentKind::Count);
		assert_eq!(intent.topic, "ai adoption");
		assert_eq!(intent.filters.companies, vec!["bcg"]);
	}

	#[test]
	fn rejects_content_without_json() {
		let json = serde_json::json!({
			"choices": [ { "message": { "content": "no structure here" } } ]
		});

		assert!(parse_intent_response(json).is_err());
	}

	#[test]
	fn accepts_bare_intent_object() {
		let json = serde_json::json!({
			"type": "list",
			"topic": "cloud spend",
		});
		let intent = parse_intent_response(json).expect("parse failed");

		assert_eq!(intent.kind, IntentKind::List);
	}

	#[test]
	fn extracts_outermost_object() {
		assert_eq!(extract_json_object("x { \"a\": { \"b\": 1 } } y"), Some("{ \"a\": { \"b\": 1 } }"));
		assert_eq!(extract_json_object("} {"), None);
		assert_eq!(extract_json_object("plain text"), None);
	}
}
