use raven_domain::{
	intent::{IntentKind, QueryIntent},
	predicate::Predicate,
	registry,
};

#[test]
fn intent_round_trips_through_json() {
	let value = serde_json::json!({
		"type": "timeline",
		"topic": "climate risk",
		"filters": {
			"companies": ["Deloitte"],
			"keywords": []
		},
		"reasoning": "Chronological view requested."
	});
	let intent = QueryIntent::from_value(value).expect("parse failed");
	let encoded = serde_json::to_value(&intent).expect("encode failed");

	assert_eq!(intent.kind, IntentKind::Timeline);
	assert_eq!(encoded.get("type").and_then(|v| v.as_str()), Some("timeline"));
}

#[test]
fn intent_defaults_missing_filters() {
	let value = serde_json::json!({ "type": "summary", "topic": "quarterly outlook" });
	let intent = QueryIntent::from_value(value).expect("parse failed");

	assert!(intent.filters.companies.is_empty());
	assert!(intent.filters.time_range.is_none());
	assert!(intent.filters.keywords.is_empty());
	assert!(intent.reasoning.is_empty());
}

#[test]
fn predicate_serialization_is_stable() {
	let predicate = Predicate::and(vec![
		Predicate::any_of("company", vec!["mckinsey".to_string()]),
		Predicate::gte("date", 1_700_000_000),
	])
	.expect("expected a predicate");
	let encoded = serde_json::to_value(&predicate).expect("encode failed");
	let decoded: Predicate = serde_json::from_value(encoded).expect("decode failed");

	assert_eq!(decoded, predicate);
}

#[test]
fn registry_exposes_every_key_for_intent_parsing() {
	let keys = registry::all_keys();

	assert!(keys.contains(&"mckinsey"));
	assert!(keys.contains(&"un"));
	assert_eq!(keys.len(), registry::COMPANIES.len());
}
