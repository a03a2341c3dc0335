use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use raven_domain::intent::{IntentKind, QueryIntent};

use crate::search::ScoredCandidate;

pub const EMPTY_RESULT_MESSAGE: &str = "No results found matching the criteria.";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FormattedResult {
	pub id: Uuid,
	pub subject: String,
	pub from: String,
	pub company: String,
	#[serde(with = "time::serde::timestamp")]
	pub date: OffsetDateTime,
	pub relevance: f32,
	pub preview: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeywordPoolStat {
	pub keyword: String,
	pub pool_size: usize,
}

/// The answer shape handed back to every caller, keyed by `type`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultPayload {
	Count {
		count: usize,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		keyword_pools: Option<Vec<KeywordPoolStat>>,
	},
	List {
		total_results: usize,
		returned_results: usize,
		results: Vec<FormattedResult>,
	},
	Summary {
		total_results: usize,
		returned_results: usize,
		results: Vec<FormattedResult>,
	},
	Timeline {
		total_results: usize,
		returned_results: usize,
		results: Vec<FormattedResult>,
	},
	Trend {
		total_results: usize,
		returned_results: usize,
		results: Vec<FormattedResult>,
	},
	Empty {
		message: String,
	},
	Error {
		message: String,
	},
}
impl ResultPayload {
	pub fn empty() -> Self {
		Self::Empty { message: EMPTY_RESULT_MESSAGE.to_string() }
	}
}

/// Shape the consolidated candidates into the payload the intent asked
/// for. Pure transform; an empty input yields the `empty` payload
/// regardless of intent.
pub fn format(
	consolidated: Vec<ScoredCandidate>,
	intent: &QueryIntent,
	limit: u32,
	preview_chars: usize,
	keyword_pools: Option<Vec<KeywordPoolStat>>,
) -> ResultPayload {
	if consolidated.is_empty() {
		return ResultPayload::empty();
	}

	let total_results = consolidated.len();

	// Count answers never truncate; the limit only shapes displays.
	if intent.kind == IntentKind::Count {
		return ResultPayload::Count { count: total_results, keyword_pools };
	}

	let mut entries = consolidated;

	match intent.kind {
		IntentKind::List | IntentKind::Summary => {
			entries.sort_by(cmp_rank);
			entries.truncate(limit as usize);
		},
		IntentKind::Timeline => {
			entries.sort_by(cmp_rank);
			entries.truncate(limit as usize);
			// The truncated slice reads chronologically.
			entries.sort_by(|a, b| a.candidate.meta.date.cmp(&b.candidate.meta.date));
		},
		IntentKind::Trend => {
			entries = latest_per_company(entries);
		},
		IntentKind::Count => unreachable!("count returns above"),
	}

	let results: Vec<FormattedResult> =
		entries.iter().map(|entry| formatted(entry, preview_chars)).collect();
	let returned_results = results.len();

	match intent.kind {
		IntentKind::List => ResultPayload::List { total_results, returned_results, results },
		IntentKind::Summary => ResultPayload::Summary { total_results, returned_results, results },
		IntentKind::Timeline =>
			ResultPayload::Timeline { total_results, returned_results, results },
		IntentKind::Trend => ResultPayload::Trend { total_results, returned_results, results },
		IntentKind::Count => unreachable!("count returns above"),
	}
}

fn formatted(entry: &ScoredCandidate, preview_chars: usize) -> FormattedResult {
	FormattedResult {
		id: entry.candidate.id,
		subject: entry.candidate.meta.subject.clone(),
		from: entry.candidate.meta.from.clone(),
		company: entry.candidate.meta.company.clone(),
		date: entry.candidate.meta.date,
		relevance: entry.relevance,
		preview: preview(&entry.candidate.content, preview_chars),
	}
}

fn preview(content: &str, preview_chars: usize) -> String {
	let mut chars = content.chars();
	let head: String = chars.by_ref().take(preview_chars).collect();

	if chars.next().is_some() { format!("{head}...") } else { head }
}

/// One entry per company, the most recent each, ordered by relevance
/// with the company name as a deterministic tie-break.
fn latest_per_company(entries: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
	let mut by_company: HashMap<String, ScoredCandidate> = HashMap::new();

	for entry in entries {
		let company = entry.candidate.meta.company.clone();

		match by_company.get(&company) {
			Some(existing) if existing.candidate.meta.date >= entry.candidate.meta.date => {},
			_ => {
				by_company.insert(company, entry);
			},
		}
	}

	let mut out: Vec<ScoredCandidate> = by_company.into_values().collect();

	out.sort_by(|a, b| {
		cmp_rank(a, b).then_with(|| a.candidate.meta.company.cmp(&b.candidate.meta.company))
	});

	out
}

/// Relevance-descending with recency as the tie-break.
fn cmp_rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
	b.relevance
		.partial_cmp(&a.relevance)
		.unwrap_or(Ordering::Equal)
		.then_with(|| b.candidate.meta.date.cmp(&a.candidate.meta.date))
}
