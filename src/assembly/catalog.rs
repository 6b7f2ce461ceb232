//! Catalog of collaborator types known to the hosting environment.
//!
//! The assembler never reflects over live objects; everything it knows about
//! a type (its capabilities, its operations) is declared here. Hosts extend
//! the built-in catalog with their own task types and log hooks.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;

use crate::graph::registration::Capability;

/// Built-in collaborator type names.
pub const TYPE_FILE_TIMESTAMP_STORAGE: &str = "FileTimestampStorage";
pub const TYPE_FILE_MUTEX_DRIVER: &str = "FileMutexDriver";
pub const TYPE_CRITICAL_SECTION: &str = "CriticalSection";
pub const TYPE_COORDINATOR: &str = "Coordinator";
pub const TYPE_TASK_PANEL: &str = "TaskPanel";
pub const TYPE_DIAGNOSTICS_HOST: &str = "DiagnosticsHost";

/// Operations the assembler checks for or wires against.
pub const OP_LOG_START: &str = "log_start";
pub const OP_LOG_END: &str = "log_end";
pub const OP_ADD_TASKS: &str = "add_tasks";
pub const OP_SET_LOG_SERVICE: &str = "set_log_service";
pub const OP_ADD_PANEL: &str = "add_panel";

/// Declared contract of one collaborator type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorType {
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
    pub operations: BTreeSet<String>,
}

impl CollaboratorType {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
            operations: BTreeSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations.extend(operations.into_iter().map(Into::into));
        self
    }

    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }
}

/// Name-indexed collection of collaborator types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorCatalog {
    types: BTreeMap<String, CollaboratorType>,
}

impl CollaboratorCatalog {
    /// An empty catalog. Only useful for hosts that declare everything
    /// themselves; most start from [`builtin`](Self::builtin).
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: default store, driver, wrapper, coordinator,
    /// and diagnostics types.
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    pub fn register(&mut self, collaborator: CollaboratorType) {
        self.types.insert(collaborator.name.clone(), collaborator);
    }

    /// Fluent variant of [`register`](Self::register).
    pub fn with_type(mut self, collaborator: CollaboratorType) -> Self {
        self.register(collaborator);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CollaboratorType> {
        self.types.get(name)
    }

    /// First declared type satisfying a capability, in name order.
    pub fn provider_of(&self, capability: Capability) -> Option<&CollaboratorType> {
        self.types
            .values()
            .find(|collaborator| collaborator.capabilities.contains(&capability))
    }
}

lazy_static! {
    static ref BUILTIN_CATALOG: CollaboratorCatalog = {
        let mut catalog = CollaboratorCatalog::new();
        catalog.register(
            CollaboratorType::new(TYPE_FILE_TIMESTAMP_STORAGE)
                .with_capability(Capability::TimestampStore),
        );
        catalog.register(
            CollaboratorType::new(TYPE_FILE_MUTEX_DRIVER).with_capability(Capability::MutexDriver),
        );
        catalog.register(CollaboratorType::new(TYPE_CRITICAL_SECTION));
        catalog.register(
            CollaboratorType::new(TYPE_COORDINATOR)
                .with_operations([OP_ADD_TASKS, OP_SET_LOG_SERVICE]),
        );
        catalog.register(CollaboratorType::new(TYPE_TASK_PANEL));
        catalog.register(
            CollaboratorType::new(TYPE_DIAGNOSTICS_HOST)
                .with_capability(Capability::DiagnosticsHost)
                .with_operations([OP_ADD_PANEL]),
        );
        catalog
    };
}
