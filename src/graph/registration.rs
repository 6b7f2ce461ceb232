//! Registration types for the service graph.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag carried by every task registration, used purely for later collection.
pub const TASK_TAG: &str = "cron.task";

/// A named contract a component must satisfy to fill a given slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    TimestampStore,
    MutexDriver,
    LogHook,
    DiagnosticsHost,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::TimestampStore => "timestamp-store",
            Capability::MutexDriver => "mutex-driver",
            Capability::LogHook => "log-hook",
            Capability::DiagnosticsHost => "diagnostics-host",
        };
        write!(f, "{name}")
    }
}

/// Construction recipe for a registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recipe {
    /// Direct alias to an existing registration, by key.
    Alias(String),
    /// Generic invocation of a named constructor with arguments.
    Construct { entity: String, args: Vec<Value> },
    /// Direct binding to a type known to the collaborator catalog.
    Type { name: String, args: Vec<Value> },
}

impl Recipe {
    /// The constructor reference this recipe invokes, if any.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Recipe::Alias(_) => None,
            Recipe::Construct { entity, .. } => Some(entity),
            Recipe::Type { name, .. } => Some(name),
        }
    }
}

/// A late-binding mutation recorded against a registration, applied by the
/// owning process after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SetupCall {
    /// Attach the collected task registrations to the coordinator.
    AddTasks(Vec<String>),
    /// Attach the validated log-hook collaborator to the coordinator.
    SetLogService(String),
}

/// One entry in the service graph.
///
/// Everything the assembler creates is non-autowired and injection-skipped:
/// invisible to type-based discovery and to downstream injection mechanisms,
/// except where a capability is explicitly exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub key: String,
    pub recipe: Recipe,
    pub autowired: bool,
    pub inject: bool,
    pub tags: BTreeSet<String>,
    pub capabilities: BTreeSet<Capability>,
    pub setup_calls: Vec<SetupCall>,
}

impl Registration {
    /// An alias registration pointing at an existing key.
    pub fn alias<K: Into<String>, T: Into<String>>(key: K, target: T) -> Self {
        Self::new(key, Recipe::Alias(target.into()))
    }

    /// A generic-invocation registration.
    pub fn construct<K: Into<String>, E: Into<String>>(key: K, entity: E, args: Vec<Value>) -> Self {
        Self::new(
            key,
            Recipe::Construct {
                entity: entity.into(),
                args,
            },
        )
    }

    /// A registration bound directly to a known type.
    pub fn of_type<K: Into<String>, T: Into<String>>(key: K, name: T, args: Vec<Value>) -> Self {
        Self::new(
            key,
            Recipe::Type {
                name: name.into(),
                args,
            },
        )
    }

    fn new<K: Into<String>>(key: K, recipe: Recipe) -> Self {
        Self {
            key: key.into(),
            recipe,
            autowired: true,
            inject: true,
            tags: BTreeSet::new(),
            capabilities: BTreeSet::new(),
            setup_calls: Vec::new(),
        }
    }

    pub fn autowired(mut self, autowired: bool) -> Self {
        self.autowired = autowired;
        self
    }

    /// Mark this registration as skipped by downstream injection.
    pub fn skip_injection(mut self) -> Self {
        self.inject = false;
        self
    }

    pub fn tagged<T: Into<String>>(mut self, tag: T) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Declare a capability this registration satisfies. Only autowired
    /// registrations are eligible for capability-based auto-discovery.
    pub fn provides(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Deferred wiring the owning process performs during its startup sequence,
/// once the finalized graph has been handed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StartupAction {
    /// Register the diagnostics panel with the diagnostics host.
    AttachDiagnosticsPanel {
        panel: String,
        host: String,
        coordinator: String,
        storage: String,
    },
}

/// Encode a reference to another registration as a constructor argument.
pub fn ref_arg(key: &str) -> Value {
    Value::String(format!("@{key}"))
}
