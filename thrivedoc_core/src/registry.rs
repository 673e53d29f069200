use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

use num_format::Locale;
use num_format::ToFormattedString;
use serde_json::Value;
use tracing::debug;

use crate::EngineError;
use crate::EngineResult;
use crate::RemoteStep;
use crate::model::FeeSchedule;
use crate::model::FeeScheduleDetail;
use crate::model::FeeVariable;
use crate::model::FeeVariableKind;
use crate::model::Variable;
use crate::remote::FeeScheduleSource;
use crate::remote::ScheduleFilter;
use crate::scanner::FEES_NAMESPACE;

/// Namespace of the computed fields available at render time from the
/// examination/application context. Not backed by variable rows and always
/// present regardless of data source availability.
pub const APPLICATION_NAMESPACE: &str = "application";

/// Namespace of custom variables (full keys keep the prefix, display labels
/// drop it).
pub const CUSTOM_NAMESPACE: &str = "custom";

/// The computed `application.*` fields, `(key, label)`. Values are supplied
/// by the platform at render time; at edit time they resolve to an empty
/// string.
pub const APPLICATION_FIELDS: [(&str, &str); 8] = [
	("application.claim_number", "Claim number"),
	("application.examinee_name", "Examinee name"),
	("application.examinee_dob", "Examinee date of birth"),
	("application.examination_date", "Examination date"),
	("application.examiner_name", "Examiner name"),
	("application.clinic_name", "Clinic name"),
	("application.referral_source", "Referral source"),
	("application.report_due_date", "Report due date"),
];

/// Display entries shown for the fees namespace while no schedule is
/// selected. They resolve to [`NO_SCHEDULE_VALUE`] so authored content makes
/// the missing selection visible instead of rendering blank.
pub const NO_SCHEDULE_FEE_FIELDS: [(&str, &str); 3] = [
	("fees.base_fee", "base_fee"),
	("fees.travel_fee", "travel_fee"),
	("fees.hourly_rate", "hourly_rate"),
];

pub const NO_SCHEDULE_VALUE: &str = "No fee schedule selected";

/// One consistent namespace mapping built from the four variable sources.
/// A fresh value every recomputation — derived maps are never mutated in
/// place.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
	/// Every fully qualified key usable for matching placeholders.
	pub valid_keys: HashSet<String>,
	/// Namespace groups in deterministic display order: system namespaces
	/// sorted by name, then `application`, `fees`, `custom`. Entry order
	/// within a group is source-declared.
	pub groups: Vec<DisplayGroup>,
	/// Fully qualified key to formatted display/default value.
	pub values: HashMap<String, String>,
	/// Keys of deactivated variables. Still resolvable (deactivation must
	/// not invalidate published templates), surfaced as lint warnings.
	pub inactive_keys: HashSet<String>,
}

impl Registry {
	pub fn contains(&self, key: &str) -> bool {
		self.valid_keys.contains(key)
	}

	pub fn value(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	pub fn is_inactive(&self, key: &str) -> bool {
		self.inactive_keys.contains(key)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayGroup {
	pub namespace: String,
	pub entries: Vec<DisplayEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
	/// Fully qualified key, e.g. `custom.greeting`.
	pub key: String,
	/// Editor-facing label; for custom variables the `custom.` prefix is
	/// already stripped.
	pub label: String,
	pub value: String,
}

/// Merge the variable sources into one namespace mapping. Deterministic:
/// identical inputs always produce identical output, with no dependency on
/// insertion order across sources. On a full-key collision between the
/// system and custom lists the custom entry wins (documented override
/// order).
pub fn resolve(
	system_vars: &[Variable],
	custom_vars: &[Variable],
	fee_schedule: Option<&FeeScheduleDetail>,
) -> Registry {
	let custom_keys: HashSet<&str> = custom_vars.iter().map(|var| var.key.as_str()).collect();
	let mut inactive_keys = HashSet::new();
	let mut groups = Vec::new();

	// System namespaces, grouped by the prefix before the first dot. The
	// BTreeMap fixes the cross-group order; entries keep source order.
	let mut system_groups: BTreeMap<String, Vec<DisplayEntry>> = BTreeMap::new();
	for var in system_vars {
		if custom_keys.contains(var.key.as_str()) {
			continue;
		}
		if !var.active {
			inactive_keys.insert(var.key.clone());
		}
		system_groups
			.entry(var.namespace().to_string())
			.or_default()
			.push(DisplayEntry {
				key: var.key.clone(),
				label: var.label.clone(),
				value: var.default_value.clone(),
			});
	}
	for (namespace, entries) in system_groups {
		groups.push(DisplayGroup { namespace, entries });
	}

	groups.push(DisplayGroup {
		namespace: APPLICATION_NAMESPACE.to_string(),
		entries: APPLICATION_FIELDS
			.iter()
			.map(|(key, label)| {
				DisplayEntry {
					key: (*key).to_string(),
					label: (*label).to_string(),
					value: String::new(),
				}
			})
			.collect(),
	});

	let fee_entries = match fee_schedule {
		Some(detail) => {
			detail
				.variables
				.iter()
				.map(|fee| {
					DisplayEntry {
						key: format!("{FEES_NAMESPACE}.{}", fee.key),
						label: fee.key.clone(),
						value: format_fee_value(fee),
					}
				})
				.collect()
		}
		None => {
			NO_SCHEDULE_FEE_FIELDS
				.iter()
				.map(|(key, label)| {
					DisplayEntry {
						key: (*key).to_string(),
						label: (*label).to_string(),
						value: NO_SCHEDULE_VALUE.to_string(),
					}
				})
				.collect()
		}
	};
	groups.push(DisplayGroup {
		namespace: FEES_NAMESPACE.to_string(),
		entries: fee_entries,
	});

	let mut custom_entries = Vec::new();
	for var in custom_vars {
		if !var.active {
			inactive_keys.insert(var.key.clone());
		}
		custom_entries.push(DisplayEntry {
			key: var.key.clone(),
			label: var.display_key().to_string(),
			value: var.default_value.clone(),
		});
	}
	groups.push(DisplayGroup {
		namespace: CUSTOM_NAMESPACE.to_string(),
		entries: custom_entries,
	});

	let mut valid_keys = HashSet::new();
	let mut values = HashMap::new();
	for group in &groups {
		for entry in &group.entries {
			valid_keys.insert(entry.key.clone());
			values.insert(entry.key.clone(), entry.value.clone());
		}
	}

	Registry {
		valid_keys,
		groups,
		values,
		inactive_keys,
	}
}

/// Format a fee variable's default for display. The `included` flag
/// overrides everything with the literal word `Included`; unparseable or
/// absent numeric defaults yield an empty string, never NaN-derived text.
pub fn format_fee_value(fee: &FeeVariable) -> String {
	if fee.included {
		return "Included".to_string();
	}

	match fee.kind {
		FeeVariableKind::Money => {
			parse_decimal(&fee.default_value)
				.map(|amount| format_money(amount, &fee.currency, fee.decimals))
				.unwrap_or_default()
		}
		FeeVariableKind::Number => {
			parse_decimal(&fee.default_value)
				.map(|amount| format_number(amount, fee.decimals, fee.unit.as_deref()))
				.unwrap_or_default()
		}
		FeeVariableKind::Text => text_value(&fee.default_value),
	}
}

/// Fetch the schedule list through the collaborator seam.
pub async fn load_fee_schedules(
	source: &dyn FeeScheduleSource,
	filter: &ScheduleFilter,
) -> EngineResult<Vec<FeeSchedule>> {
	source
		.list_schedules(filter)
		.await
		.map_err(|error| EngineError::remote(RemoteStep::FetchSchedule, error))
}

/// Fetch one schedule's detail (its fee variables) through the collaborator
/// seam. Races independently of mutation and save flows.
pub async fn load_fee_schedule(
	source: &dyn FeeScheduleSource,
	id: &str,
) -> EngineResult<FeeScheduleDetail> {
	debug!(schedule_id = id, "loading fee schedule detail");
	source
		.get_schedule(id)
		.await
		.map_err(|error| EngineError::remote(RemoteStep::FetchSchedule, error))
}

/// Tolerant numeric parsing: accepts JSON numbers and numeric strings,
/// treats null and anything else as absent.
fn parse_decimal(value: &Value) -> Option<f64> {
	let parsed = match value {
		Value::Number(number) => number.as_f64(),
		Value::String(text) => text.trim().parse::<f64>().ok(),
		_ => None,
	};
	parsed.filter(|number| number.is_finite())
}

fn text_value(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Number(number) => number.to_string(),
		Value::Bool(flag) => flag.to_string(),
		_ => String::new(),
	}
}

/// Currency string with grouped digits, e.g. `$1,250.00` or `CHF 980.50`.
fn format_money(amount: f64, currency: &str, decimals: u8) -> String {
	let scale = 10u64.pow(u32::from(decimals));
	let negative = amount < 0.0;
	let total = (amount.abs() * scale as f64).round() as u64;
	let grouped = (total / scale).to_formatted_string(&Locale::en);

	let mut magnitude = if decimals == 0 {
		grouped
	} else {
		format!("{grouped}.{:0width$}", total % scale, width = usize::from(decimals))
	};
	if negative {
		magnitude.insert(0, '-');
	}

	match currency_symbol(currency) {
		Some(symbol) => format!("{symbol}{magnitude}"),
		None if currency.is_empty() => magnitude,
		None => format!("{currency} {magnitude}"),
	}
}

fn format_number(amount: f64, decimals: u8, unit: Option<&str>) -> String {
	let value = format!("{amount:.prec$}", prec = usize::from(decimals));
	match unit {
		Some(unit) if !unit.is_empty() => format!("{value} {unit}"),
		_ => value,
	}
}

fn currency_symbol(code: &str) -> Option<&'static str> {
	match code {
		"USD" | "CAD" | "AUD" => Some("$"),
		"EUR" => Some("€"),
		"GBP" => Some("£"),
		_ => None,
	}
}
