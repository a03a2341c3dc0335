//! Process-wide company lookup table. The table is immutable and
//! compiled in; only pure lookup functions are exposed.

/// Sentinel returned when a sender matches no registered company.
pub const UNKNOWN_COMPANY: &str = "unknown";

#[derive(Clone, Copy, Debug)]
pub struct CompanyEntry {
	/// Canonical registry key, always lowercase.
	pub key: &'static str,
	/// Sender domains attributed to the company.
	pub domains: &'static [&'static str],
	/// Free-text fragments that identify the company in a sender field
	/// or a user-supplied name.
	pub patterns: &'static [&'static str],
}

pub const COMPANIES: &[CompanyEntry] = &[
	// Consulting.
	CompanyEntry {
		key: "mckinsey",
		domains: &["mckinsey.com", "email.mckinsey.com"],
		patterns: &["mckinsey", "mck@"],
	},
	CompanyEntry {
		key: "bcg",
		domains: &["bcg.com", "email.bcg.com"],
		patterns: &["@bcg", "boston consult"],
	},
	CompanyEntry { key: "bain", domains: &["bain.com"], patterns: &["@bain", "bain &"] },
	// Audit.
	CompanyEntry {
		key: "deloitte",
		domains: &["deloitte.com", "email.deloitte.com"],
		patterns: &["@deloitte"],
	},
	CompanyEntry { key: "pwc", domains: &["pwc.com"], patterns: &["@pwc", "pricewaterhouse"] },
	CompanyEntry { key: "ey", domains: &["ey.com"], patterns: &["@ey", "ernst & young"] },
	CompanyEntry { key: "kpmg", domains: &["kpmg.com"], patterns: &["@kpmg"] },
	// Tech.
	CompanyEntry {
		key: "meta",
		domains: &["meta.com", "fb.com", "facebook.com", "instagram.com", "whatsapp.com"],
		patterns: &["@meta", "@fb", "@facebook", "@instagram", "@whatsapp"],
	},
	CompanyEntry { key: "apple", domains: &["apple.com"], patterns: &["@apple"] },
	CompanyEntry {
		key: "amazon",
		domains: &["amazon.com", "aws.amazon.com", "aws.com"],
		patterns: &["@amazon", "@aws"],
	},
	CompanyEntry { key: "netflix", domains: &["netflix.com"], patterns: &["@netflix"] },
	CompanyEntry {
		key: "google",
		domains: &["google.com", "alphabet.com", "gmail.com"],
		patterns: &["@google", "@alphabet"],
	},
	CompanyEntry {
		key: "microsoft",
		domains: &["microsoft.com", "ms.com"],
		patterns: &["@microsoft", "@ms"],
	},
	// International organizations.
	CompanyEntry {
		key: "imf",
		domains: &["imf.org", "internationalmonetaryfund.org"],
		patterns: &["@imf", "international monetary fund"],
	},
	CompanyEntry {
		key: "idb",
		domains: &["iadb.org"],
		patterns: &["@idb", "@iadb", "inter-american development bank"],
	},
	CompanyEntry {
		key: "un",
		domains: &["un.org", "undp.org", "unesco.org", "who.int"],
		patterns: &["@un.org", "@undp", "@unesco", "@who.int", "united nations"],
	},
];

/// Resolve a user-supplied company token to its canonical registry key.
///
/// Matching is case-insensitive and accepts the key itself, any of the
/// company's domains, or a known alias fragment contained in the token.
/// Unknown tokens resolve to `None`; they are dropped by the filter
/// builder rather than failing the query.
pub fn canonicalize(token: &str) -> Option<&'static str> {
	let token = token.trim().to_lowercase();

	if token.is_empty() {
		return None;
	}

	for entry in COMPANIES {
		if entry.key == token {
			return Some(entry.key);
		}
		if entry.domains.iter().any(|domain| *domain == token) {
			return Some(entry.key);
		}
		if entry.patterns.iter().any(|pattern| token.contains(pattern)) {
			return Some(entry.key);
		}
	}

	None
}

/// Match an email sender field against the registry. Returns
/// [`UNKNOWN_COMPANY`] when nothing matches.
pub fn match_sender(from_field: &str) -> &'static str {
	if from_field.trim().is_empty() {
		return UNKNOWN_COMPANY;
	}

	let from_field = from_field.to_lowercase();

	for entry in COMPANIES {
		if entry.domains.iter().any(|domain| from_field.contains(domain)) {
			return entry.key;
		}
		if entry.patterns.iter().any(|pattern| from_field.contains(pattern)) {
			return entry.key;
		}
	}

	UNKNOWN_COMPANY
}

pub fn all_keys() -> Vec<&'static str> {
	COMPANIES.iter().map(|entry| entry.key).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn matches_senders_by_domain_and_pattern() {
		assert_eq!(match_sender("someone@mckinsey.com"), "mckinsey");
		assert_eq!(match_sender("person@email.mckinsey.com"), "mckinsey");
		assert_eq!(match_sender("contact@internationalmonetaryfund.org"), "imf");
		assert_eq!(match_sender("news@imf.org"), "imf");
		assert_eq!(match_sender("noreply@undp.org"), "un");
		assert_eq!(match_sender("noreply@aws.amazon.com"), "amazon");
	}

	#[test]
	fn near_miss_senders_stay_unknown() {
		// "fund"/"refund" must not trip the IMF patterns.
		assert_eq!(match_sender("fund@something.com"), UNKNOWN_COMPANY);
		assert_eq!(match_sender("refund@company.com"), UNKNOWN_COMPANY);
		assert_eq!(match_sender(""), UNKNOWN_COMPANY);
	}

	#[test]
	fn canonicalize_accepts_keys_domains_and_aliases() {
		assert_eq!(canonicalize("McKinsey"), Some("mckinsey"));
		assert_eq!(canonicalize("email.deloitte.com"), Some("deloitte"));
		assert_eq!(canonicalize("Boston Consulting Group"), Some("bcg"));
		assert_eq!(canonicalize("Ernst & Young"), Some("ey"));
		assert_eq!(canonicalize("not-a-real-company"), None);
		assert_eq!(canonicalize("  "), None);
	}

	#[test]
	fn registry_keys_are_lowercase_and_unique() {
		let keys = all_keys();
		let mut deduped = keys.clone();

		deduped.sort();
		deduped.dedup();

		assert_eq!(deduped.len(), keys.len());
		assert!(keys.iter().all(|key| key.chars().all(|ch| !ch.is_ascii_uppercase())));
	}
}
