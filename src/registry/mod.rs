//! Model Registry module.
//!
//! Thread-safe in-memory view of the routable models: their quality, latency
//! and cost figures, availability, and the endpoint serving each one.

mod error;
mod model;

pub use error::*;
pub use model::*;

use crate::routing::{CandidateSource, ModelCandidate};
use chrono::Utc;
use dashmap::DashMap;

/// The Model Registry stores all routable models.
///
/// # Examples
///
/// ```
/// use orchestrator::registry::{ModelRegistry, ProviderEndpoint, RegisteredModel};
/// use orchestrator::routing::ModelCandidate;
///
/// let registry = ModelRegistry::new();
/// let model = RegisteredModel::new(
///     ModelCandidate::new("gpt-4o", 0.85, 450.0, 7.5),
///     ProviderEndpoint::new("https://api.openai.com"),
/// );
///
/// registry.add_model(model).unwrap();
/// assert_eq!(registry.model_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: DashMap<String, RegisteredModel>,
}

impl ModelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            models: DashMap::new(),
        }
    }

    /// Build a registry from a list of models.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateModel` on the first repeated id.
    pub fn from_models(
        models: impl IntoIterator<Item = RegisteredModel>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for model in models {
            registry.add_model(model)?;
        }
        Ok(registry)
    }

    /// Add a new model.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateModel` if the id is already registered.
    pub fn add_model(&self, model: RegisteredModel) -> Result<(), RegistryError> {
        use dashmap::mapref::entry::Entry;
        match self.models.entry(model.id().to_string()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateModel(e.key().clone())),
            Entry::Vacant(e) => {
                tracing::debug!(model_id = %model.id(), "model registered");
                e.insert(model);
                Ok(())
            }
        }
    }

    /// Remove a model.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ModelNotFound` if no model with the id exists.
    pub fn remove_model(&self, id: &str) -> Result<RegisteredModel, RegistryError> {
        self.models
            .remove(id)
            .map(|(_, model)| model)
            .ok_or_else(|| RegistryError::ModelNotFound(id.to_string()))
    }

    pub fn get_model(&self, id: &str) -> Option<RegisteredModel> {
        self.models.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// All models, sorted by id.
    pub fn list_models(&self) -> Vec<RegisteredModel> {
        let mut models: Vec<RegisteredModel> =
            self.models.iter().map(|e| e.value().clone()).collect();
        models.sort_by(|a, b| a.id().cmp(b.id()));
        models
    }

    /// Registered ids, sorted.
    pub fn model_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.models.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn endpoint(&self, id: &str) -> Option<ProviderEndpoint> {
        self.models.get(id).map(|entry| entry.value().endpoint.clone())
    }

    /// Apply a partial metric update.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` for unknown ids and `InvalidUpdate` for
    /// out-of-range values.
    pub fn update_model(&self, id: &str, update: &ModelUpdate) -> Result<RegisteredModel, RegistryError> {
        update.validate().map_err(|message| RegistryError::InvalidUpdate {
            model: id.to_string(),
            message,
        })?;
        let mut entry = self
            .models
            .get_mut(id)
            .ok_or_else(|| RegistryError::ModelNotFound(id.to_string()))?;
        update.apply(&mut entry.candidate);
        entry.updated_at = Utc::now();
        tracing::debug!(model_id = id, ?update, "model updated");
        Ok(entry.value().clone())
    }

    pub fn set_available(&self, id: &str, available: bool) -> Result<(), RegistryError> {
        self.update_model(
            id,
            &ModelUpdate {
                available: Some(available),
                ..ModelUpdate::default()
            },
        )
        .map(|_| ())
    }
}

impl CandidateSource for ModelRegistry {
    fn list_candidates(&self) -> Vec<ModelCandidate> {
        self.list_models().into_iter().map(|m| m.candidate).collect()
    }
}
