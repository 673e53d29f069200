use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

/// Failure reported by an async collaborator (persistence, external
/// document provider). `NotFound` is kept distinct because the mutation
/// coordinator must not roll back after it — the entity is gone on the
/// authoritative store and restoring the snapshot would resurrect a phantom.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
	#[error("entity not found on the authoritative store")]
	NotFound,

	#[error("{0}")]
	Unavailable(String),
}

/// Which collaborator call failed. Remembered by the sync controller's
/// `Error` state so the editor can name the failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteStep {
	PersistDraft,
	PublishVersion,
	RefreshLink,
	PullExternal,
	CommitVariable,
	ListVariables,
	FetchSchedule,
}

impl Display for RemoteStep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let label = match self {
			RemoteStep::PersistDraft => "saving the draft",
			RemoteStep::PublishVersion => "publishing the version",
			RemoteStep::RefreshLink => "refreshing the external document link",
			RemoteStep::PullExternal => "pulling the external document",
			RemoteStep::CommitVariable => "committing the variable",
			RemoteStep::ListVariables => "loading variables",
			RemoteStep::FetchSchedule => "loading the fee schedule",
		};
		write!(f, "{label}")
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EngineError {
	#[error("template content has invalid placeholders: {}", .placeholders.join(", "))]
	#[diagnostic(
		code(thrivedoc::validation),
		help("fix or remove the listed placeholders before saving")
	)]
	Validation { placeholders: Vec<String> },

	#[error("selected fee schedule is missing required variables: {}", .missing.join(", "))]
	#[diagnostic(
		code(thrivedoc::incompatible_fee_schedule),
		help("add the missing variables to the schedule or remove the fees.* placeholders")
	)]
	IncompatibleFeeSchedule { missing: Vec<String> },

	#[error(
		"template references fee variables ({}) but no fee schedule is selected",
		.required.join(", ")
	)]
	#[diagnostic(
		code(thrivedoc::missing_fee_schedule),
		help("select a fee schedule before publishing a fee-bearing template")
	)]
	MissingFeeSchedule { required: Vec<String> },

	#[error("variable `{id}` is no longer present locally")]
	#[diagnostic(
		code(thrivedoc::stale_entity),
		help("refresh the variable list and retry the edit")
	)]
	StaleEntity { id: String },

	#[error("variable `{id}` was deleted by another editor")]
	#[diagnostic(
		code(thrivedoc::conflict_deleted),
		help("the local list has been corrected; re-create the variable if it is still needed")
	)]
	ConflictDeletedRemotely { id: String },

	#[error("{step} failed: {source}")]
	#[diagnostic(code(thrivedoc::remote))]
	Remote { step: RemoteStep, source: RemoteError },

	#[error("no external document is linked to this template yet")]
	#[diagnostic(
		code(thrivedoc::link_not_available),
		help("save the template once to create the external document link")
	)]
	LinkNotAvailable,
}

impl EngineError {
	pub(crate) fn remote(step: RemoteStep, source: RemoteError) -> Self {
		EngineError::Remote { step, source }
	}
}

pub type EngineResult<T> = Result<T, EngineError>;
