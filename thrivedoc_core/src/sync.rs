use tracing::debug;
use tracing::warn;

use crate::EngineError;
use crate::EngineResult;
use crate::RemoteStep;
use crate::compat::check_compatibility;
use crate::model::DraftDocument;
use crate::model::FeeScheduleDetail;
use crate::registry::Registry;
use crate::remote::ExternalDocProvider;
use crate::remote::TemplateStore;
use crate::scanner::required_fee_keys;
use crate::scanner::scan;
use crate::validate::ValidationEngine;

/// Controller state. `Error` remembers which sub-step failed so the editor
/// can name it; it is a resting state — a new save or pull may start from
/// it (manual retry, never automatic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
	Idle,
	Saving,
	Publishing,
	AwaitingSyncConfirmation,
	Syncing,
	Error { step: RemoteStep },
}

impl SyncState {
	/// States with an async operation in flight. Entry points invoked while
	/// busy are ignored rather than interleaved.
	fn is_busy(&self) -> bool {
		matches!(
			self,
			SyncState::Saving | SyncState::Publishing | SyncState::Syncing
		)
	}
}

/// Whether an entry point ran or was ignored as a re-entrant no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
	Completed,
	Ignored,
}

/// Orchestrates the push (save → publish) and pull (confirm-gated external
/// sync) flows for one template's draft.
///
/// Both flows are gated: the push path by validation and fee-schedule
/// compatibility, the pull path by an explicit user confirmation because it
/// overwrites local unsaved edits. Neither gate can be bypassed
/// programmatically.
pub struct SyncController<T, X> {
	template_id: String,
	store: T,
	external: X,
	state: SyncState,
	external_link: Option<String>,
	validator: ValidationEngine,
}

impl<T: TemplateStore, X: ExternalDocProvider> SyncController<T, X> {
	pub fn new(
		template_id: impl Into<String>,
		store: T,
		external: X,
		external_link: Option<String>,
	) -> Self {
		Self {
			template_id: template_id.into(),
			store,
			external,
			state: SyncState::Idle,
			external_link,
			validator: ValidationEngine::new(),
		}
	}

	pub fn state(&self) -> SyncState {
		self.state
	}

	pub fn external_link(&self) -> Option<&str> {
		self.external_link.as_deref()
	}

	/// The validation engine used by the save gate, for registering extra
	/// lint rules.
	pub fn validator_mut(&mut self) -> &mut ValidationEngine {
		&mut self.validator
	}

	/// Persist the draft and promote it to the current version.
	///
	/// Blocked synchronously, before any state change or network call, when
	/// validation reports errors, when fee placeholders are present with no
	/// schedule selected, or when the selected schedule is missing required
	/// fee variables. The compatibility check is only consulted when a
	/// schedule is selected.
	pub async fn save(
		&mut self,
		draft: &DraftDocument,
		registry: &Registry,
		schedule: Option<&FeeScheduleDetail>,
	) -> EngineResult<FlowOutcome> {
		if self.state.is_busy() || self.state == SyncState::AwaitingSyncConfirmation {
			return Ok(FlowOutcome::Ignored);
		}

		let placeholders = scan(&draft.content);
		let validation = self.validator.validate(&placeholders, registry);
		if !validation.is_valid() {
			return Err(EngineError::Validation {
				placeholders: validation.error_placeholders(),
			});
		}

		let required = required_fee_keys(&placeholders);
		match schedule {
			None if !required.is_empty() => {
				return Err(EngineError::MissingFeeSchedule { required });
			}
			None => {}
			Some(detail) => {
				let compatibility = check_compatibility(&required, &detail.variables);
				if !compatibility.compatible {
					return Err(EngineError::IncompatibleFeeSchedule {
						missing: compatibility.missing_variables,
					});
				}
			}
		}

		self.state = SyncState::Saving;
		debug!(template_id = %self.template_id, "persisting draft");
		let receipt = match self
			.store
			.persist_draft(&self.template_id, &draft.content, &draft.header, &draft.footer)
			.await
		{
			Ok(receipt) => receipt,
			Err(error) => {
				self.state = SyncState::Error {
					step: RemoteStep::PersistDraft,
				};
				return Err(EngineError::remote(RemoteStep::PersistDraft, error));
			}
		};

		// The platform creates the external document on first save; cache
		// its link once available. A refresh failure is not a save failure.
		if receipt.external_doc_id.is_some() && self.external_link.is_none() {
			match self.external.doc_url(&self.template_id).await {
				Ok(url) => self.external_link = Some(url),
				Err(error) => {
					warn!(
						template_id = %self.template_id,
						error = %error,
						"external document link refresh failed"
					);
				}
			}
		}

		self.state = SyncState::Publishing;
		debug!(template_id = %self.template_id, "publishing version");
		if let Err(error) = self.store.publish_version(&self.template_id).await {
			self.state = SyncState::Error {
				step: RemoteStep::PublishVersion,
			};
			return Err(EngineError::remote(RemoteStep::PublishVersion, error));
		}

		self.state = SyncState::Idle;
		Ok(FlowOutcome::Completed)
	}

	/// Start the pull flow. Rejected before any state change when no
	/// external document is linked yet; otherwise the controller waits for
	/// an explicit confirmation because local unsaved edits will be
	/// overwritten.
	pub fn request_sync(&mut self) -> EngineResult<FlowOutcome> {
		match self.state {
			SyncState::Idle | SyncState::Error { .. } => {
				if self.external_link.is_none() {
					return Err(EngineError::LinkNotAvailable);
				}
				self.state = SyncState::AwaitingSyncConfirmation;
				Ok(FlowOutcome::Completed)
			}
			_ => Ok(FlowOutcome::Ignored),
		}
	}

	/// Complete a previously requested pull: fetch the latest external
	/// content and replace the local draft content in place. Header and
	/// footer layout are never touched. A no-op unless a confirmation is
	/// actually pending.
	///
	/// A fetch failure returns the controller to `Idle`, not `Error` — the
	/// local content is untouched until the fetch succeeds, so the editor
	/// is not left degraded.
	pub async fn confirm_sync(&mut self, draft: &mut DraftDocument) -> EngineResult<FlowOutcome> {
		if self.state != SyncState::AwaitingSyncConfirmation {
			return Ok(FlowOutcome::Ignored);
		}

		self.state = SyncState::Syncing;
		debug!(template_id = %self.template_id, "pulling external document content");
		match self.external.pull_latest(&self.template_id).await {
			Ok(content) => {
				draft.content = content;
				self.state = SyncState::Idle;
				Ok(FlowOutcome::Completed)
			}
			Err(error) => {
				warn!(template_id = %self.template_id, error = %error, "external pull failed");
				self.state = SyncState::Idle;
				Err(EngineError::remote(RemoteStep::PullExternal, error))
			}
		}
	}

	/// Abandon a pending pull request without touching the draft.
	pub fn cancel_sync(&mut self) -> FlowOutcome {
		if self.state == SyncState::AwaitingSyncConfirmation {
			self.state = SyncState::Idle;
			FlowOutcome::Completed
		} else {
			FlowOutcome::Ignored
		}
	}
}
