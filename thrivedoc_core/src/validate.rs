use serde::Deserialize;
use serde::Serialize;

use crate::registry::APPLICATION_NAMESPACE;
use crate::registry::Registry;
use crate::scanner::Placeholder;

/// Severity of a finding produced by validation. Warnings never block a
/// save; errors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Error,
	Warning,
}

/// One problem attached to one placeholder token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
	/// The offending token, e.g. `thrive.compny_name`.
	pub placeholder: String,
	pub message: String,
}

/// A rule finding before it is sorted into the error or warning list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
	pub severity: Severity,
	pub placeholder: String,
	pub message: String,
}

/// Classification of every placeholder in the current content. Ephemeral,
/// recomputed on each content or registry change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub errors: Vec<ValidationIssue>,
	pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
	/// True iff the error list is empty. Warnings never block.
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}

	/// The offending tokens of every error, for messaging.
	pub fn error_placeholders(&self) -> Vec<String> {
		self.errors
			.iter()
			.map(|issue| issue.placeholder.clone())
			.collect()
	}
}

/// A pluggable lint run over the scanned token list. Each rule yields zero
/// or more findings; the engine sorts them into errors and warnings.
pub trait ValidationRule {
	fn name(&self) -> &'static str;

	fn check(&self, placeholders: &[Placeholder], registry: &Registry) -> Vec<Finding>;
}

/// Classifies placeholders against the registry and runs the registered
/// rules. Registry lookups produce the hard errors; the built-in rules only
/// warn.
pub struct ValidationEngine {
	rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
	/// An engine with no lint rules; only registry lookups apply.
	pub fn bare() -> Self {
		Self { rules: Vec::new() }
	}

	/// An engine with the built-in warning rules registered.
	pub fn new() -> Self {
		let mut engine = Self::bare();
		engine.register(Box::new(InactiveVariableRule));
		engine.register(Box::new(BlankDefaultRule));
		engine
	}

	pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
		self.rules.push(rule);
	}

	/// Classify each detected placeholder:
	///
	/// - unknown key outside the `fees` namespace → error;
	/// - structurally invalid `fees.*` token → error;
	/// - structurally valid `fees.*` token absent from the selected
	///   schedule → provisionally valid. The author may be pre-authoring
	///   content before choosing a schedule; schedule gating happens at
	///   save time through the compatibility check, not here.
	pub fn validate(&self, placeholders: &[Placeholder], registry: &Registry) -> ValidationResult {
		let mut result = ValidationResult::default();

		for placeholder in placeholders {
			if placeholder.is_fee() {
				if !placeholder.well_formed {
					result.errors.push(ValidationIssue {
						placeholder: placeholder.raw.clone(),
						message: format!(
							"`{}` is not a valid fee placeholder (expected fees.key with \
							 lowercase letters, digits, and underscores)",
							placeholder.raw
						),
					});
				}
			} else if !registry.contains(placeholder.full_key()) {
				result.errors.push(ValidationIssue {
					placeholder: placeholder.raw.clone(),
					message: format!("`{}` does not match any known variable", placeholder.raw),
				});
			}
		}

		for rule in &self.rules {
			for finding in rule.check(placeholders, registry) {
				let issue = ValidationIssue {
					placeholder: finding.placeholder,
					message: finding.message,
				};
				match finding.severity {
					Severity::Error => result.errors.push(issue),
					Severity::Warning => result.warnings.push(issue),
				}
			}
		}

		result
	}
}

impl Default for ValidationEngine {
	fn default() -> Self {
		Self::new()
	}
}

/// Warns when a placeholder is bound to a deactivated variable. Deactivation
/// must not invalidate previously published templates, so this is never an
/// error.
pub struct InactiveVariableRule;

impl ValidationRule for InactiveVariableRule {
	fn name(&self) -> &'static str {
		"inactive_variable"
	}

	fn check(&self, placeholders: &[Placeholder], registry: &Registry) -> Vec<Finding> {
		placeholders
			.iter()
			.filter(|placeholder| {
				placeholder.well_formed && registry.is_inactive(placeholder.full_key())
			})
			.map(|placeholder| {
				Finding {
					severity: Severity::Warning,
					placeholder: placeholder.raw.clone(),
					message: format!(
						"`{}` references a deactivated variable and may render stale content",
						placeholder.raw
					),
				}
			})
			.collect()
	}
}

/// Warns when a placeholder resolves to an empty value and would render
/// blank. Computed `application.*` fields are exempt (their values arrive at
/// render time) and so is the fees namespace (gated at save time instead).
pub struct BlankDefaultRule;

impl ValidationRule for BlankDefaultRule {
	fn name(&self) -> &'static str {
		"blank_default"
	}

	fn check(&self, placeholders: &[Placeholder], registry: &Registry) -> Vec<Finding> {
		placeholders
			.iter()
			.filter(|placeholder| {
				placeholder.well_formed
					&& placeholder.namespace != APPLICATION_NAMESPACE
					&& !placeholder.is_fee()
					&& registry.value(placeholder.full_key()) == Some("")
			})
			.map(|placeholder| {
				Finding {
					severity: Severity::Warning,
					placeholder: placeholder.raw.clone(),
					message: format!(
						"`{}` has no default value and will render blank",
						placeholder.raw
					),
				}
			})
			.collect()
	}
}
