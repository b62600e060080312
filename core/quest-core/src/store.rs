//! The application store: single writer of [`AppState`].
//!
//! `commit` applies a mutation, notifies subscribers in registration order,
//! then hands it to the attached [`MutationSharer`] (if any). Mutations that
//! arrive from sibling windows go through `apply_remote`, which notifies
//! subscribers but never shares them again.

use serde_json::Value;

use crate::error::Result;
use crate::mutation::{AppState, Mutation};
use crate::outcome::ResultState;
use crate::parameters::{FieldUpdate, ParameterStore, Parameters};
use crate::sync::MutationSharer;

/// Observes every committed mutation together with the resulting state.
pub trait Subscriber {
    fn on_commit(&mut self, mutation: &Mutation, state: &AppState);
}

impl<F> Subscriber for F
where
    F: FnMut(&Mutation, &AppState),
{
    fn on_commit(&mut self, mutation: &Mutation, state: &AppState) {
        self(mutation, state)
    }
}

#[derive(Default)]
pub struct AppStore {
    state: AppState,
    subscribers: Vec<Box<dyn Subscriber>>,
    sharer: Option<MutationSharer>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            sharer: None,
        }
    }

    /// Loads parameters from `parameters` and keeps them persisted.
    pub fn with_parameter_store(mut parameters: ParameterStore) -> Self {
        let loaded = parameters.load();
        let mut store = Self::new(AppState::with_parameters(loaded));
        store.subscribe(parameters);
        store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.state.parameters
    }

    pub fn results(&self) -> &ResultState {
        &self.state.results
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn attach_sharer(&mut self, sharer: MutationSharer) {
        self.sharer = Some(sharer);
    }

    pub fn sharer(&self) -> Option<&MutationSharer> {
        self.sharer.as_ref()
    }

    pub fn commit(&mut self, mutation: Mutation) {
        self.apply_and_notify(&mutation);

        if let Some(sharer) = self.sharer.as_mut() {
            if let Err(err) = sharer.share(&mutation) {
                tracing::warn!(
                    error = %err,
                    mutation = mutation.name(),
                    "Failed to share mutation with sibling windows"
                );
            }
        }
    }

    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.commit(Mutation::SetParameters(parameters));
    }

    pub fn update_field(&mut self, update: FieldUpdate) {
        self.commit(Mutation::UpdateField(update));
    }

    /// Form-binding entry point: `update_field_path("parameters.name", &json!("x"))`.
    pub fn update_field_path(&mut self, path: &str, value: &Value) -> Result<()> {
        let update = FieldUpdate::from_path(path, value)?;
        self.update_field(update);
        Ok(())
    }

    pub fn select_action(&mut self, index: Option<usize>) -> Result<()> {
        self.state.results.validate_selection(index)?;
        self.commit(Mutation::SelectAction(index));
        Ok(())
    }

    /// Applies a mutation received from a sibling window.
    pub fn apply_remote(&mut self, mutation: Mutation) {
        tracing::debug!(mutation = mutation.name(), "Applying remote mutation");
        self.apply_and_notify(&mutation);
    }

    /// Drains pending sibling mutations into the store; returns how many were
    /// applied.
    pub fn sync(&mut self) -> usize {
        let incoming = match self.sharer.as_mut() {
            Some(sharer) => match sharer.receive() {
                Ok(incoming) => incoming,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to receive sibling mutations");
                    return 0;
                }
            },
            None => return 0,
        };

        let count = incoming.len();
        for mutation in incoming {
            self.apply_remote(mutation);
        }
        count
    }

    fn apply_and_notify(&mut self, mutation: &Mutation) {
        self.state.apply(mutation);
        for subscriber in self.subscribers.iter_mut() {
            subscriber.on_commit(mutation, &self.state);
        }
    }
}
