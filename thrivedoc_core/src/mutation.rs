use tracing::debug;
use tracing::warn;

use crate::EngineError;
use crate::EngineResult;
use crate::RemoteError;
use crate::RemoteStep;
use crate::model::CUSTOM_PREFIX;
use crate::model::NewVariable;
use crate::model::Variable;
use crate::model::VariablePatch;
use crate::remote::VariableFilter;
use crate::remote::VariableStore;

/// The authoritative local copies of the two variable populations. Ids are
/// unique across both; a variable's key prefix decides where it lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableCollections {
	pub system: Vec<Variable>,
	pub custom: Vec<Variable>,
}

impl VariableCollections {
	pub fn new(system: Vec<Variable>, custom: Vec<Variable>) -> Self {
		Self { system, custom }
	}

	pub fn find(&self, id: &str) -> Option<&Variable> {
		self.system
			.iter()
			.chain(self.custom.iter())
			.find(|var| var.id == id)
	}

	/// Put an entity back into its population: replace it at the position
	/// its id currently occupies, or append it if the id is gone. Serves
	/// both the canonical replace after a successful commit (self-healing
	/// when the optimistic entry was concurrently removed) and the snapshot
	/// restore on rollback.
	pub fn replace_or_insert(&mut self, entity: Variable) {
		let population = self.population_of_mut(&entity.key);
		match population.iter().position(|var| var.id == entity.id) {
			Some(index) => population[index] = entity,
			None => population.push(entity),
		}
	}

	/// Drop an entity from whichever population holds it. Returns whether
	/// anything was removed.
	pub fn remove(&mut self, id: &str) -> bool {
		let before = self.system.len() + self.custom.len();
		self.system.retain(|var| var.id != id);
		self.custom.retain(|var| var.id != id);
		before != self.system.len() + self.custom.len()
	}

	fn population_of_mut(&mut self, key: &str) -> &mut Vec<Variable> {
		if key.starts_with(CUSTOM_PREFIX) {
			&mut self.custom
		} else {
			&mut self.system
		}
	}
}

/// Executes single-entity variable mutations with optimistic local state and
/// rollback on failure.
///
/// Only one mutation per target id may be in flight at a time; the
/// initiating call site disables re-entry while a request is outstanding.
/// The coordinator does not queue concurrent calls for the same id.
pub struct MutationCoordinator<S> {
	store: S,
	collections: VariableCollections,
}

impl<S: VariableStore> MutationCoordinator<S> {
	pub fn new(store: S) -> Self {
		Self {
			store,
			collections: VariableCollections::default(),
		}
	}

	pub fn with_collections(store: S, collections: VariableCollections) -> Self {
		Self { store, collections }
	}

	pub fn collections(&self) -> &VariableCollections {
		&self.collections
	}

	/// Repopulate both populations from the store, split on the `custom.`
	/// key prefix.
	pub async fn refresh(&mut self) -> EngineResult<()> {
		let variables = self
			.store
			.list_variables(&VariableFilter::default())
			.await
			.map_err(|error| EngineError::remote(RemoteStep::ListVariables, error))?;

		let (custom, system): (Vec<_>, Vec<_>) =
			variables.into_iter().partition(Variable::is_custom);
		self.collections = VariableCollections::new(system, custom);
		Ok(())
	}

	/// Create a new variable. There is no prior snapshot: on success the
	/// canonical entity is appended to the population its key selects, on
	/// failure nothing is added.
	pub async fn create_variable(&mut self, payload: NewVariable) -> EngineResult<Variable> {
		match self.store.create_variable(&payload).await {
			Ok(canonical) => {
				debug!(id = %canonical.id, key = %canonical.key, "variable created");
				self.collections.replace_or_insert(canonical.clone());
				Ok(canonical)
			}
			Err(error) => Err(EngineError::remote(RemoteStep::CommitVariable, error)),
		}
	}

	/// Update an existing variable by id.
	///
	/// Precondition: the entity must still be present locally, otherwise
	/// [`EngineError::StaleEntity`] is returned before any network call. The
	/// patch is applied optimistically, then reconciled against the commit
	/// outcome: canonical replace on success, local removal on a remote
	/// not-found (rollback would resurrect a phantom), snapshot restore on
	/// any other failure.
	pub async fn update_variable(
		&mut self,
		id: &str,
		patch: VariablePatch,
	) -> EngineResult<Variable> {
		let Some(current) = self.collections.find(id) else {
			return Err(EngineError::StaleEntity { id: id.to_string() });
		};
		let snapshot = current.clone();

		let optimistic = patch.apply_to(&snapshot);
		self.collections.replace_or_insert(optimistic);

		match self.store.update_variable(id, &patch).await {
			Ok(canonical) => {
				debug!(id = %canonical.id, "variable update committed");
				self.collections.replace_or_insert(canonical.clone());
				Ok(canonical)
			}
			Err(RemoteError::NotFound) => {
				warn!(id, "variable deleted by another actor during commit");
				self.collections.remove(id);
				Err(EngineError::ConflictDeletedRemotely { id: id.to_string() })
			}
			Err(error) => {
				warn!(id, error = %error, "variable commit failed, rolling back");
				self.collections.replace_or_insert(snapshot);
				Err(EngineError::remote(RemoteStep::CommitVariable, error))
			}
		}
	}
}
