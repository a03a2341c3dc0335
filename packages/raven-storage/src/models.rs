use time::OffsetDateTime;
use uuid::Uuid;

/// One retrieval hit: an email chunk plus the raw distance reported by
/// the index (lower = closer). Never mutated by the pipeline; relevance
/// is derived separately.
#[derive(Clone, Debug)]
pub struct Candidate {
	pub id: Uuid,
	/// Conversation thread the chunk belongs to, when the mailbox
	/// provided one.
	pub thread_id: Option<String>,
	pub distance: f32,
	pub meta: EmailMeta,
	pub content: String,
}

#[derive(Clone, Debug)]
pub struct EmailMeta {
	pub subject: String,
	pub from: String,
	pub company: String,
	pub date: OffsetDateTime,
}
