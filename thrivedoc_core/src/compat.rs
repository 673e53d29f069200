use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::FeeVariable;

/// Result of diffing the fee keys a template requires against the keys a
/// schedule provides. Ephemeral, recomputed whenever either side changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
	pub compatible: bool,
	/// Required keys absent from the schedule, ordered by first occurrence.
	pub missing_variables: Vec<String>,
}

/// Pure diff between required fee keys (bare, from `fees.*` placeholders)
/// and the variables available on a schedule. Total and side-effect-free:
/// identical inputs always yield identical output and
/// `missing_variables ⊆ required`.
pub fn check_compatibility(
	required: &[String],
	available: &[FeeVariable],
) -> CompatibilityResult {
	let available_keys: HashSet<&str> = available.iter().map(|fee| fee.key.as_str()).collect();

	let mut seen: HashSet<&str> = HashSet::new();
	let mut missing = Vec::new();
	for key in required {
		if !available_keys.contains(key.as_str()) && seen.insert(key.as_str()) {
			missing.push(key.clone());
		}
	}

	CompatibilityResult {
		compatible: missing.is_empty(),
		missing_variables: missing,
	}
}
