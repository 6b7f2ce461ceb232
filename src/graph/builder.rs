//! Mutable graph under assembly and the frozen result handed to the host.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::core::errors::{AssemblyError, Result};
use crate::graph::registration::{Capability, Registration, SetupCall, StartupAction};

/// The service graph while it is being assembled.
///
/// Keyed by registration identity; the capability and tag indexes are
/// maintained incrementally as registrations are added, so discovery queries
/// never re-scan the whole graph.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    registrations: BTreeMap<String, Registration>,
    // Only autowired registrations are discoverable by capability.
    capability_index: HashMap<Capability, BTreeSet<String>>,
    tag_index: HashMap<String, BTreeSet<String>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, returning its key.
    ///
    /// Re-adding the identical registration is a no-op; a key collision with
    /// a different recipe is an error, the graph never silently overwrites.
    pub fn add(&mut self, registration: Registration) -> Result<String> {
        let key = registration.key.clone();
        if let Some(existing) = self.registrations.get(&key) {
            if *existing == registration {
                return Ok(key);
            }
            return Err(AssemblyError::duplicate_registration(key));
        }

        if registration.autowired {
            for capability in &registration.capabilities {
                self.capability_index
                    .entry(*capability)
                    .or_default()
                    .insert(key.clone());
            }
        }
        for tag in &registration.tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }

        debug!(key = %key, "added registration");
        self.registrations.insert(key.clone(), registration);
        Ok(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registrations.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Registration> {
        self.registrations.get(key)
    }

    /// Record a late-binding setup call on an existing registration.
    pub fn add_setup(&mut self, key: &str, call: SetupCall) -> Result<()> {
        let registration = self
            .registrations
            .get_mut(key)
            .ok_or_else(|| AssemblyError::missing_collaborator(key))?;
        registration.setup_calls.push(call);
        Ok(())
    }

    /// Keys of every autowired registration satisfying a capability,
    /// in deterministic order.
    pub fn keys_by_capability(&self, capability: Capability) -> Vec<String> {
        self.capability_index
            .get(&capability)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Keys of every registration carrying a tag, in deterministic order.
    pub fn keys_by_tag(&self, tag: &str) -> Vec<String> {
        self.tag_index
            .get(tag)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Freeze the graph. No registration can be added, mutated, or deleted
    /// afterwards.
    pub fn freeze(self, startup_actions: Vec<StartupAction>) -> ServiceGraph {
        ServiceGraph {
            registrations: self.registrations,
            startup_actions,
        }
    }
}

/// The finalized, read-only service graph.
///
/// Handed to the owning process after assembly; safe for concurrent reads
/// for the remainder of the program's life.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGraph {
    registrations: BTreeMap<String, Registration>,
    startup_actions: Vec<StartupAction>,
}

impl ServiceGraph {
    pub fn get(&self, key: &str) -> Option<&Registration> {
        self.registrations.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registrations.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Registration)> {
        self.registrations.iter()
    }

    /// Keys of every registration carrying a tag, in deterministic order.
    pub fn keys_by_tag(&self, tag: &str) -> Vec<String> {
        self.registrations
            .iter()
            .filter(|(_, registration)| registration.has_tag(tag))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Wiring deferred to the owning process's startup sequence.
    pub fn startup_actions(&self) -> &[StartupAction] {
        &self.startup_actions
    }
}
