use serde::Deserialize;
use serde::Serialize;

/// Key prefix that marks a variable as belonging to the custom population.
/// System and custom variables are distinguished purely by this prefix.
pub const CUSTOM_PREFIX: &str = "custom.";

/// A document template owned by the organization. Templates reference
/// variables and fee schedules, they never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub active: bool,
	/// Fee schedule selected for this template, if any. A template that
	/// references `fees.*` placeholders cannot be published without one.
	#[serde(default)]
	pub fee_schedule_id: Option<String>,
	/// Sequence number of the version currently in effect. `None` until the
	/// first publish.
	#[serde(default)]
	pub current_version: Option<u64>,
}

/// An immutable snapshot of template content and layout.
///
/// Sequence numbers increase monotonically per template and at most one
/// version is current at a time. Both invariants are enforced by the
/// persistence collaborator on publish; this type only carries the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVersion {
	pub sequence: u64,
	pub content: String,
	#[serde(default)]
	pub header: LayoutConfig,
	#[serde(default)]
	pub footer: LayoutConfig,
}

/// Header/footer layout settings carried alongside draft content. The sync
/// pull path replaces content only and must leave this untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
	#[serde(default)]
	pub visible: bool,
	#[serde(default)]
	pub alignment: LayoutAlignment,
	#[serde(default)]
	pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlignment {
	Left,
	#[default]
	Center,
	Right,
}

/// The caller-owned local draft the engine reads during save and rewrites
/// (content only) on a confirmed sync pull.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDocument {
	pub content: String,
	#[serde(default)]
	pub header: LayoutConfig,
	#[serde(default)]
	pub footer: LayoutConfig,
}

/// A centrally owned variable referenced by templates through `{{ns.key}}`
/// placeholders. Keys are dot-namespaced (e.g. `thrive.company_name`) and
/// immutable after creation; edits go through [`VariablePatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
	pub id: String,
	pub key: String,
	pub label: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub default_value: String,
	#[serde(default)]
	pub kind: VariableKind,
	/// Choices for `checkbox_group` variables. Empty for `text`.
	#[serde(default)]
	pub options: Vec<String>,
	#[serde(default = "default_active")]
	pub active: bool,
}

fn default_active() -> bool {
	true
}

impl Variable {
	/// Whether this variable belongs to the custom population.
	pub fn is_custom(&self) -> bool {
		self.key.starts_with(CUSTOM_PREFIX)
	}

	/// The namespace segment before the first dot of the key.
	pub fn namespace(&self) -> &str {
		self.key.split('.').next().unwrap_or(&self.key)
	}

	/// The key shown to editors: custom variables drop their `custom.`
	/// prefix for display, the full key is still used for matching.
	pub fn display_key(&self) -> &str {
		self.key.strip_prefix(CUSTOM_PREFIX).unwrap_or(&self.key)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
	#[default]
	Text,
	CheckboxGroup,
}

/// Creation payload for a new variable. The key prefix decides which local
/// population the created entity lands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariable {
	pub key: String,
	pub label: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub default_value: String,
	#[serde(default)]
	pub kind: VariableKind,
	#[serde(default)]
	pub options: Vec<String>,
	#[serde(default = "default_active")]
	pub active: bool,
}

/// Partial update for an existing variable. Unspecified fields keep their
/// previous values when merged — booleans and enumerated fields included,
/// they never reset to a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablePatch {
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub default_value: Option<String>,
	#[serde(default)]
	pub kind: Option<VariableKind>,
	#[serde(default)]
	pub options: Option<Vec<String>>,
	#[serde(default)]
	pub active: Option<bool>,
}

impl VariablePatch {
	/// Merge this patch over a base entity, producing the optimistic local
	/// entity. Identity and key are carried from the base unchanged.
	pub fn apply_to(&self, base: &Variable) -> Variable {
		Variable {
			id: base.id.clone(),
			key: base.key.clone(),
			label: self.label.clone().unwrap_or_else(|| base.label.clone()),
			description: self
				.description
				.clone()
				.unwrap_or_else(|| base.description.clone()),
			default_value: self
				.default_value
				.clone()
				.unwrap_or_else(|| base.default_value.clone()),
			kind: self.kind.unwrap_or(base.kind),
			options: self.options.clone().unwrap_or_else(|| base.options.clone()),
			active: self.active.unwrap_or(base.active),
		}
	}
}

/// A named, selectable collection of fee variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
	pub id: String,
	pub name: String,
	#[serde(default = "default_active")]
	pub active: bool,
}

/// A fee schedule together with its ordered variable list, as returned by
/// the schedule detail fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleDetail {
	pub schedule: FeeSchedule,
	pub variables: Vec<FeeVariable>,
}

/// A single fee entry of a schedule. `key` is the bare key; the registry
/// exposes it under the `fees.` namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeVariable {
	pub key: String,
	#[serde(default)]
	pub kind: FeeVariableKind,
	/// ISO currency code used when formatting `Money` values.
	#[serde(default)]
	pub currency: String,
	#[serde(default)]
	pub decimals: u8,
	/// Unit suffix appended to `Number` values (e.g. `km`).
	#[serde(default)]
	pub unit: Option<String>,
	/// When set, the displayed value is the literal word `Included`
	/// regardless of kind and default.
	#[serde(default)]
	pub included: bool,
	/// Loosely typed on purpose: upstream data delivers numbers, numeric
	/// strings, or null here. Parsing tolerates all three.
	#[serde(default)]
	pub default_value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeVariableKind {
	Money,
	Number,
	#[default]
	Text,
}
