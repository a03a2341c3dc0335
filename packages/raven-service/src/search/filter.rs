use raven_domain::{intent::FilterConfig, predicate::Predicate, registry};

/// Build the retrieval predicate for a query's filters.
///
/// Unknown company tokens contribute no constraint instead of failing
/// the query, and an empty filter set yields `None` — an unconstrained
/// retrieval, never match-nothing. Pure function of its input.
pub fn build(filters: &FilterConfig) -> Option<Predicate> {
	let mut parts = Vec::new();

	if let Some(companies) = company_predicate(&filters.companies) {
		parts.push(companies);
	}
	if let Some(range) = &filters.time_range {
		if let Some(start) = range.start {
			parts.push(Predicate::gte("date", start.unix_timestamp()));
		}
		if let Some(end) = range.end {
			parts.push(Predicate::lte("date", end.unix_timestamp()));
		}
	}

	Predicate::and(parts)
}

fn company_predicate(companies: &[String]) -> Option<Predicate> {
	let mut keys: Vec<String> = Vec::new();

	for token in companies {
		let Some(key) = registry::canonicalize(token) else {
			tracing::debug!(token = %token, "Dropped unknown company token.");

			continue;
		};

		if !keys.iter().any(|existing| existing.as_str() == key) {
			keys.push(key.to_string());
		}
	}

	// An all-invalid company list must not over-constrain the query.
	(!keys.is_empty()).then(|| Predicate::any_of("company", keys))
}

#[cfg(test)]
mod tests {
	use super::*;

	use time::OffsetDateTime;

	use raven_domain::intent::TimeRange;

	fn ts(unix: i64) -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(unix).expect("valid timestamp")
	}

	#[test]
	fn no_filters_build_no_predicate() {
		assert_eq!(build(&FilterConfig::default()), None);
	}

	#[test]
	fn unknown_tokens_drop_without_constraining() {
		let filters = FilterConfig {
			companies: vec!["mckinsey".to_string(), "not-a-real-company".to_string()],
			..Default::default()
		};

		assert_eq!(
			build(&filters),
			Some(Predicate::any_of("company", vec!["mckinsey".to_string()]))
		);
	}

	#[test]
	fn all_invalid_companies_omit_the_company_filter() {
		let filters = FilterConfig {
			companies: vec!["acme".to_string(), "globex".to_string()],
			..Default::default()
		};

		assert_eq!(build(&filters), None);
	}

	#[test]
	fn duplicate_aliases_collapse_to_one_key() {
		let filters = FilterConfig {
			companies: vec!["McKinsey".to_string(), "email.mckinsey.com".to_string()],
			..Default::default()
		};

		assert_eq!(
			build(&filters),
			Some(Predicate::any_of("company", vec!["mckinsey".to_string()]))
		);
	}

	#[test]
	fn one_sided_range_emits_a_single_bound() {
		let filters = FilterConfig {
			time_range: Some(TimeRange {
				start: Some(ts(1_600_000_000)),
				end: None,
				description: String::new(),
			}),
			..Default::default()
		};

		assert_eq!(build(&filters), Some(Predicate::gte("date", 1_600_000_000)));
	}

	#[test]
	fn full_filters_conjoin_with_and() {
		let filters = FilterConfig {
			companies: vec!["bcg".to_string()],
			time_range: Some(TimeRange {
				start: Some(ts(1_600_000_000)),
				end: Some(ts(1_700_000_000)),
				description: "2020 through 2023".to_string(),
			}),
			keywords: Vec::new(),
		};
		let Some(Predicate::And(parts)) = build(&filters) else {
			panic!("expected a conjunction");
		};

		assert_eq!(parts.len(), 3);
	}
}
