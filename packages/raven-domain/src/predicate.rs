use serde::{Deserialize, Serialize};

/// Backend-agnostic filter expression evaluated by the vector index
/// during retrieval. Kept independent of any client's filter syntax so
/// a store adapter can serialize it to whatever its backend expects.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
	Eq { field: String, value: String },
	In { field: String, values: Vec<String> },
	Gte { field: String, value: i64 },
	Lte { field: String, value: i64 },
	And(Vec<Predicate>),
}
impl Predicate {
	pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Eq { field: field.into(), value: value.into() }
	}

	pub fn any_of(field: impl Into<String>, values: Vec<String>) -> Self {
		Self::In { field: field.into(), values }
	}

	pub fn gte(field: impl Into<String>, value: i64) -> Self {
		Self::Gte { field: field.into(), value }
	}

	pub fn lte(field: impl Into<String>, value: i64) -> Self {
		Self::Lte { field: field.into(), value }
	}

	/// Conjoin predicates. Zero inputs mean "no constraint" and yield
	/// `None`, never a match-nothing expression; a single input passes
	/// through unwrapped; nested conjunctions flatten.
	pub fn and(predicates: Vec<Self>) -> Option<Self> {
		let mut flat = Vec::with_capacity(predicates.len());

		for predicate in predicates {
			match predicate {
				Self::And(inner) => flat.extend(inner),
				other => flat.push(other),
			}
		}

		match flat.len() {
			0 => None,
			1 => flat.pop(),
			_ => Some(Self::And(flat)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn and_of_nothing_is_unconstrained() {
		assert_eq!(Predicate::and(Vec::new()), None);
	}

	#[test]
	fn and_of_one_unwraps() {
		let only = Predicate::eq("company", "bcg");

		assert_eq!(Predicate::and(vec![only.clone()]), Some(only));
	}

	#[test]
	fn and_flattens_nested_conjunctions() {
		let inner = Predicate::And(vec![
			Predicate::gte("date", 100),
			Predicate::lte("date", 200),
		]);
		let combined = Predicate::and(vec![Predicate::eq("company", "bain"), inner])
			.expect("expected a predicate");
		let Predicate::And(parts) = combined else {
			panic!("expected a conjunction");
		};

		assert_eq!(parts.len(), 3);
		assert!(parts.iter().all(|part| !matches!(part, Predicate::And(_))));
	}
}
