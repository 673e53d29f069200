use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::RemoteError;
use crate::model::DraftDocument;
use crate::model::FeeSchedule;
use crate::model::FeeScheduleDetail;
use crate::model::FeeVariable;
use crate::model::FeeVariableKind;
use crate::model::LayoutConfig;
use crate::model::NewVariable;
use crate::model::Variable;
use crate::model::VariableKind;
use crate::model::VariablePatch;
use crate::remote::DraftReceipt;
use crate::remote::ExternalDocProvider;
use crate::remote::FeeScheduleSource;
use crate::remote::ScheduleFilter;
use crate::remote::TemplateStore;
use crate::remote::VariableFilter;
use crate::remote::VariableStore;

pub fn variable(id: &str, key: &str, default_value: &str) -> Variable {
	Variable {
		id: id.to_string(),
		key: key.to_string(),
		label: key.to_string(),
		description: String::new(),
		default_value: default_value.to_string(),
		kind: VariableKind::Text,
		options: Vec::new(),
		active: true,
	}
}

pub fn inactive_variable(id: &str, key: &str, default_value: &str) -> Variable {
	Variable {
		active: false,
		..variable(id, key, default_value)
	}
}

pub fn money_fee(key: &str, default_value: serde_json::Value) -> FeeVariable {
	FeeVariable {
		key: key.to_string(),
		kind: FeeVariableKind::Money,
		currency: "USD".to_string(),
		decimals: 2,
		unit: None,
		included: false,
		default_value,
	}
}

pub fn number_fee(
	key: &str,
	decimals: u8,
	unit: Option<&str>,
	default_value: serde_json::Value,
) -> FeeVariable {
	FeeVariable {
		key: key.to_string(),
		kind: FeeVariableKind::Number,
		currency: String::new(),
		decimals,
		unit: unit.map(ToString::to_string),
		included: false,
		default_value,
	}
}

pub fn schedule(id: &str, variables: Vec<FeeVariable>) -> FeeScheduleDetail {
	FeeScheduleDetail {
		schedule: FeeSchedule {
			id: id.to_string(),
			name: format!("Schedule {id}"),
			active: true,
		},
		variables,
	}
}

pub fn draft(content: &str) -> DraftDocument {
	DraftDocument {
		content: content.to_string(),
		header: LayoutConfig {
			visible: true,
			text: "header".to_string(),
			..LayoutConfig::default()
		},
		footer: LayoutConfig {
			visible: true,
			text: "footer".to_string(),
			..LayoutConfig::default()
		},
	}
}

/// Variable store with scripted per-call outcomes. Unscripted commit calls
/// fail loudly so tests cannot silently pass on a default.
#[derive(Clone, Default)]
pub struct ScriptedVariableStore {
	state: Arc<VariableStoreState>,
}

#[derive(Default)]
struct VariableStoreState {
	listing: Mutex<Vec<Variable>>,
	responses: Mutex<VecDeque<Result<Variable, RemoteError>>>,
	calls: Mutex<Vec<String>>,
}

impl ScriptedVariableStore {
	pub fn with_listing(listing: Vec<Variable>) -> Self {
		let store = Self::default();
		*store.state.listing.lock().unwrap() = listing;
		store
	}

	pub fn queue(&self, response: Result<Variable, RemoteError>) {
		self.state.responses.lock().unwrap().push_back(response);
	}

	pub fn calls(&self) -> Vec<String> {
		self.state.calls.lock().unwrap().clone()
	}

	fn next_response(&self) -> Result<Variable, RemoteError> {
		self.state
			.responses
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Err(RemoteError::Unavailable("unscripted call".to_string())))
	}
}

#[async_trait]
impl VariableStore for ScriptedVariableStore {
	async fn list_variables(&self, _filter: &VariableFilter) -> Result<Vec<Variable>, RemoteError> {
		self.state.calls.lock().unwrap().push("list".to_string());
		Ok(self.state.listing.lock().unwrap().clone())
	}

	async fn create_variable(&self, payload: &NewVariable) -> Result<Variable, RemoteError> {
		self.state
			.calls
			.lock()
			.unwrap()
			.push(format!("create {}", payload.key));
		self.next_response()
	}

	async fn update_variable(
		&self,
		id: &str,
		_patch: &VariablePatch,
	) -> Result<Variable, RemoteError> {
		self.state.calls.lock().unwrap().push(format!("update {id}"));
		self.next_response()
	}
}

/// Template store recording call order; persist and publish succeed unless
/// a failure is scripted.
#[derive(Clone, Default)]
pub struct ScriptedTemplateStore {
	state: Arc<TemplateStoreState>,
}

#[derive(Default)]
struct TemplateStoreState {
	persist: Mutex<VecDeque<Result<DraftReceipt, RemoteError>>>,
	publish: Mutex<VecDeque<Result<(), RemoteError>>>,
	calls: Mutex<Vec<String>>,
}

impl ScriptedTemplateStore {
	pub fn queue_persist(&self, response: Result<DraftReceipt, RemoteError>) {
		self.state.persist.lock().unwrap().push_back(response);
	}

	pub fn queue_publish(&self, response: Result<(), RemoteError>) {
		self.state.publish.lock().unwrap().push_back(response);
	}

	pub fn calls(&self) -> Vec<String> {
		self.state.calls.lock().unwrap().clone()
	}
}

#[async_trait]
impl TemplateStore for ScriptedTemplateStore {
	async fn persist_draft(
		&self,
		_template_id: &str,
		_content: &str,
		_header: &LayoutConfig,
		_footer: &LayoutConfig,
	) -> Result<DraftReceipt, RemoteError> {
		self.state.calls.lock().unwrap().push("persist".to_string());
		self.state
			.persist
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| {
				Ok(DraftReceipt {
					external_doc_id: Some("doc-1".to_string()),
				})
			})
	}

	async fn publish_version(&self, _template_id: &str) -> Result<(), RemoteError> {
		self.state.calls.lock().unwrap().push("publish".to_string());
		self.state.publish.lock().unwrap().pop_front().unwrap_or(Ok(()))
	}
}

/// External document provider with scripted pull outcomes.
#[derive(Clone, Default)]
pub struct ScriptedExternalDoc {
	state: Arc<ExternalDocState>,
}

#[derive(Default)]
struct ExternalDocState {
	url: Mutex<VecDeque<Result<String, RemoteError>>>,
	pull: Mutex<VecDeque<Result<String, RemoteError>>>,
	calls: Mutex<Vec<String>>,
}

impl ScriptedExternalDoc {
	pub fn queue_url(&self, response: Result<String, RemoteError>) {
		self.state.url.lock().unwrap().push_back(response);
	}

	pub fn queue_pull(&self, response: Result<String, RemoteError>) {
		self.state.pull.lock().unwrap().push_back(response);
	}

	pub fn calls(&self) -> Vec<String> {
		self.state.calls.lock().unwrap().clone()
	}
}

#[async_trait]
impl ExternalDocProvider for ScriptedExternalDoc {
	async fn doc_url(&self, template_id: &str) -> Result<String, RemoteError> {
		self.state.calls.lock().unwrap().push("url".to_string());
		self.state
			.url
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Ok(format!("https://collab.example/{template_id}")))
	}

	async fn pull_latest(&self, _template_id: &str) -> Result<String, RemoteError> {
		self.state.calls.lock().unwrap().push("pull".to_string());
		self.state
			.pull
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Err(RemoteError::Unavailable("unscripted pull".to_string())))
	}
}

/// Fee schedule source with a fixed listing and scripted detail fetches.
#[derive(Clone, Default)]
pub struct ScriptedScheduleSource {
	state: Arc<ScheduleSourceState>,
}

#[derive(Default)]
struct ScheduleSourceState {
	listing: Mutex<Vec<FeeSchedule>>,
	details: Mutex<VecDeque<Result<FeeScheduleDetail, RemoteError>>>,
}

impl ScriptedScheduleSource {
	pub fn with_listing(listing: Vec<FeeSchedule>) -> Self {
		let source = Self::default();
		*source.state.listing.lock().unwrap() = listing;
		source
	}

	pub fn queue_detail(&self, response: Result<FeeScheduleDetail, RemoteError>) {
		self.state.details.lock().unwrap().push_back(response);
	}
}

#[async_trait]
impl FeeScheduleSource for ScriptedScheduleSource {
	async fn list_schedules(
		&self,
		filter: &ScheduleFilter,
	) -> Result<Vec<FeeSchedule>, RemoteError> {
		let listing = self.state.listing.lock().unwrap().clone();
		if filter.active_only {
			Ok(listing.into_iter().filter(|entry| entry.active).collect())
		} else {
			Ok(listing)
		}
	}

	async fn get_schedule(&self, _id: &str) -> Result<FeeScheduleDetail, RemoteError> {
		self.state
			.details
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Err(RemoteError::NotFound))
	}
}
