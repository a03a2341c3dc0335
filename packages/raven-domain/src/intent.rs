use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The five answer shapes a query can ask for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
	Count,
	List,
	Timeline,
	Trend,
	Summary,
}
impl IntentKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Count => "count",
			Self::List => "list",
			Self::Timeline => "timeline",
			Self::Trend => "trend",
			Self::Summary => "summary",
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimeRange {
	#[serde(default, with = "time::serde::timestamp::option")]
	pub start: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::timestamp::option")]
	pub end: Option<OffsetDateTime>,
	/// Human-readable description of the range, e.g. "last 90 days".
	#[serde(default)]
	pub description: String,
}
impl TimeRange {
	pub fn is_unbounded(&self) -> bool {
		self.start.is_none() && self.end.is_none()
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FilterConfig {
	#[serde(default)]
	pub companies: Vec<String>,
	#[serde(default)]
	pub time_range: Option<TimeRange>,
	#[serde(default)]
	pub keywords: Vec<String>,
}

/// Validated query intent. Constructed once at the parser boundary;
/// every downstream component reads it, none mutates it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QueryIntent {
	#[serde(rename = "type")]
	pub kind: IntentKind,
	pub topic: String,
	#[serde(default)]
	pub filters: FilterConfig,
	#[serde(default)]
	pub reasoning: String,
}
impl QueryIntent {
	pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
		serde_json::from_value(value)
	}

	/// The text embedded for single-retrieval flows: the topic plus any
	/// keywords, space-joined.
	pub fn search_text(&self) -> String {
		let mut text = self.topic.trim().to_string();

		for keyword in &self.filters.keywords {
			let keyword = keyword.trim();

			if keyword.is_empty() {
				continue;
			}
			if !text.is_empty() {
				text.push(' ');
			}

			text.push_str(keyword);
		}

		text
	}
}
