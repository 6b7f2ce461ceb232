//! cronwire - declarative service-graph assembler for a periodic-task
//! runner.
//!
//! Given a structured configuration document, cronwire resolves and wires a
//! set of pluggable runtime components (timestamp store, mutual-exclusion
//! driver, periodic tasks, optional diagnostics panel, optional logging
//! hook) into a single coordinator registration, validating configuration
//! shape and cross-component contracts before the graph is frozen for use.
//!
//! Assembly is synchronous, in-memory, and all-or-nothing: it either yields
//! a read-only [`ServiceGraph`] or fails fast with a descriptive
//! [`AssemblyError`]. Running the tasks, locking, and persistence belong to
//! the collaborators being wired, not to this crate.

// Core infrastructure modules
pub mod core {
    pub mod errors;
}

// Assembly pipeline, leaf-first
pub mod config;   // document shapes, parameter table, validation
pub mod graph;    // registrations and the (frozen) service graph
pub mod assembly; // resolver, task registry, catalog, orchestration

// Re-exports for convenience
pub use assembly::{
    register_tasks, resolve_component, task_identity, Assembler, CollaboratorCatalog,
    CollaboratorType,
};
pub use config::{
    validate_shapes, AssemblyConfig, ComponentSpec, ConfigDocument, Descriptor, ParameterTable,
    TaskSpec,
};
pub use crate::core::errors::{AssemblyError, Result};
pub use graph::{
    ref_arg, Capability, GraphBuilder, Recipe, Registration, ServiceGraph, SetupCall,
    StartupAction, TASK_TAG,
};
