use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::RemoteError;
use crate::model::FeeSchedule;
use crate::model::FeeScheduleDetail;
use crate::model::LayoutConfig;
use crate::model::NewVariable;
use crate::model::Variable;
use crate::model::VariablePatch;

/// Filter for variable listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableFilter {
	#[serde(default)]
	pub active_only: bool,
	/// Restrict to keys with this prefix (e.g. `custom.`).
	#[serde(default)]
	pub key_prefix: Option<String>,
}

/// Filter for fee schedule listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFilter {
	#[serde(default)]
	pub active_only: bool,
}

/// Acknowledgement of a persisted draft. `external_doc_id` is present once
/// the platform has created (or already holds) the collaborative document
/// copy for this template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReceipt {
	#[serde(default)]
	pub external_doc_id: Option<String>,
}

/// Authoritative store for system and custom variables. The engine performs
/// optimistic local mutations and reconciles against what these calls
/// return.
#[async_trait]
pub trait VariableStore: Send + Sync {
	async fn list_variables(&self, filter: &VariableFilter) -> Result<Vec<Variable>, RemoteError>;

	async fn create_variable(&self, payload: &NewVariable) -> Result<Variable, RemoteError>;

	async fn update_variable(
		&self,
		id: &str,
		patch: &VariablePatch,
	) -> Result<Variable, RemoteError>;
}

/// Persistence for template drafts and version promotion. Draft saves create
/// or overwrite the draft version; publish promotes it to current (the store
/// enforces the monotonic sequence and single-current invariants).
#[async_trait]
pub trait TemplateStore: Send + Sync {
	async fn persist_draft(
		&self,
		template_id: &str,
		content: &str,
		header: &LayoutConfig,
		footer: &LayoutConfig,
	) -> Result<DraftReceipt, RemoteError>;

	async fn publish_version(&self, template_id: &str) -> Result<(), RemoteError>;
}

/// The external collaborative-document copy of a template.
#[async_trait]
pub trait ExternalDocProvider: Send + Sync {
	async fn doc_url(&self, template_id: &str) -> Result<String, RemoteError>;

	/// Fetch the latest external content. The caller replaces local draft
	/// content with it only after an explicit user confirmation.
	async fn pull_latest(&self, template_id: &str) -> Result<String, RemoteError>;
}

/// Read access to fee schedules and their variable lists.
#[async_trait]
pub trait FeeScheduleSource: Send + Sync {
	async fn list_schedules(
		&self,
		filter: &ScheduleFilter,
	) -> Result<Vec<FeeSchedule>, RemoteError>;

	async fn get_schedule(&self, id: &str) -> Result<FeeScheduleDetail, RemoteError>;
}
