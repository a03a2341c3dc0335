use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Filter, GetPointsBuilder, PointId, Query, QueryPointsBuilder, Range, RetrievedPoint,
	ScoredPoint, Value, point_id::PointIdOptions, value::Kind,
};
use time::OffsetDateTime;
use uuid::Uuid;

use raven_domain::{predicate::Predicate, registry};

use crate::{
	Result,
	models::{Candidate, EmailMeta},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &raven_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest-neighbor query, best match first. Points whose payload
	/// cannot be decoded are skipped with a diagnostic rather than
	/// failing the whole retrieval.
	pub async fn query(
		&self,
		embedding: Vec<f32>,
		predicate: Option<&Predicate>,
		k: u32,
	) -> Result<Vec<Candidate>> {
		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(embedding))
			.with_payload(true)
			.limit(k as u64);

		if let Some(predicate) = predicate {
			search = search.filter(predicate_to_filter(predicate));
		}

		let response = self.client.query(search).await?;

		Ok(collect_scored(&response.result))
	}

	/// Fetch full records by id, for flows that already know which
	/// chunks they want. Distances are not meaningful here and are
	/// reported as zero.
	pub async fn get(&self, ids: &[Uuid]) -> Result<Vec<Candidate>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let point_ids: Vec<PointId> =
			ids.iter().map(|id| PointId::from(id.to_string())).collect();
		let response = self
			.client
			.get_points(
				GetPointsBuilder::new(self.collection.clone(), point_ids).with_payload(true),
			)
			.await?;

		Ok(collect_retrieved(&response.result))
	}
}

/// Serialize the backend-agnostic predicate into a qdrant filter.
pub fn predicate_to_filter(predicate: &Predicate) -> Filter {
	match predicate {
		Predicate::And(parts) => Filter::all(parts.iter().map(predicate_to_condition)),
		other => Filter::all([predicate_to_condition(other)]),
	}
}

fn predicate_to_condition(predicate: &Predicate) -> Condition {
	match predicate {
		Predicate::Eq { field, value } => Condition::matches(field.clone(), value.clone()),
		Predicate::In { field, values } => Condition::matches(field.clone(), values.clone()),
		Predicate::Gte { field, value } =>
			Condition::range(field.clone(), Range { gte: Some(*value as f64), ..Default::default() }),
		Predicate::Lte { field, value } =>
			Condition::range(field.clone(), Range { lte: Some(*value as f64), ..Default::default() }),
		Predicate::And(parts) =>
			Condition::from(Filter::all(parts.iter().map(predicate_to_condition))),
	}
}

fn collect_scored(points: &[ScoredPoint]) -> Vec<Candidate> {
	points
		.iter()
		.filter_map(|point| {
			// Cosine similarity converts to the distance scale the
			// pipeline ranks on: lower = closer.
			decode_candidate(point.id.as_ref(), &point.payload, 1.0 - point.score)
		})
		.collect()
}

fn collect_retrieved(points: &[RetrievedPoint]) -> Vec<Candidate> {
	points
		.iter()
		.filter_map(|point| decode_candidate(point.id.as_ref(), &point.payload, 0.0))
		.collect()
}

fn decode_candidate(
	id: Option<&PointId>,
	payload: &HashMap<String, Value>,
	distance: f32,
) -> Option<Candidate> {
	let id = id.and_then(point_id_to_uuid).or_else(|| payload_uuid(payload, "chunk_id"));
	let Some(id) = id else {
		tracing::warn!("Email candidate missing chunk id.");

		return None;
	};
	let Some(date) = payload_i64(payload, "date")
		.and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
	else {
		tracing::warn!(chunk_id = %id, "Email candidate missing date.");

		return None;
	};
	let subject =
		payload_string(payload, "subject").unwrap_or_else(|| "No subject".to_string());
	let from =
		payload_string(payload, "from").unwrap_or_else(|| "Unknown sender".to_string());
	let company = match payload_string(payload, "company") {
		Some(company) if !company.is_empty() && company != registry::UNKNOWN_COMPANY => company,
		// Stored records written before the registry knew the sender
		// carry no usable tag; resolve it again at read time.
		_ => registry::match_sender(&from).to_string(),
	};
	let thread_id = payload_string(payload, "thread_id").filter(|thread| !thread.is_empty());
	let content = payload_string(payload, "text").unwrap_or_default();

	Some(Candidate {
		id,
		thread_id,
		distance,
		meta: EmailMeta { subject, from, company, date },
		content,
	})
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_uuid(payload: &HashMap<String, Value>, key: &str) -> Option<Uuid> {
	payload_string(payload, key).and_then(|text| Uuid::parse_str(&text).ok())
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 {
				Some(*value as i64)
			} else {
				None
			},
		_ => None,
	}
}
