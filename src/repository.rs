//! Custom exercise repository.
//!
//! User-defined exercises are persisted by the calling application, not by
//! the engine: the repository is an explicit interface injected where it
//! is needed, never ambient process-wide storage. The engine ships an
//! in-memory implementation for tests and development; applications supply
//! their own backend behind the same trait.
//!
//! Every definition passes the registry's validation gate on `save`, so a
//! repository can only ever hand back definitions a runner will accept.

use std::collections::HashMap;

use thiserror::Error;

use crate::registry::{
    normalize_key, DefinitionError, ExerciseDefinition, ExerciseDefinitionRecord,
};

/// Failures surfaced by a repository backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The definition failed the validation gate and was not stored.
    #[error("definition rejected: {0}")]
    Rejected(#[from] DefinitionError),

    /// The backend itself failed (I/O, serialization, connectivity).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Storage interface for user-defined exercises.
pub trait ExerciseRepository {
    /// Returns every stored definition.
    fn load(&self) -> Result<Vec<ExerciseDefinition>, RepositoryError>;

    /// Validates and stores a definition record, replacing any existing
    /// entry with the same normalized name.
    fn save(&mut self, record: ExerciseDefinitionRecord) -> Result<(), RepositoryError>;

    /// Removes a definition by name. Returns whether an entry was removed.
    fn delete(&mut self, name: &str) -> Result<bool, RepositoryError>;
}

/// In-memory repository for tests and development. No persistence; data
/// is lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryExerciseRepository {
    entries: HashMap<String, ExerciseDefinition>,
}

impl InMemoryExerciseRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ExerciseRepository for InMemoryExerciseRepository {
    fn load(&self) -> Result<Vec<ExerciseDefinition>, RepositoryError> {
        let mut definitions: Vec<ExerciseDefinition> = self.entries.values().cloned().collect();
        // Deterministic order for callers that render lists.
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }

    fn save(&mut self, record: ExerciseDefinitionRecord) -> Result<(), RepositoryError> {
        let definition = record.into_definition()?;
        self.entries.insert(definition.name.clone(), definition);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.entries.remove(&normalize_key(name)).is_some())
    }
}
