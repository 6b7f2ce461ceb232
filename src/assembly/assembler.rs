//! One-shot assembly of the cron service graph from a configuration
//! document.
//!
//! Pure with respect to its inputs: `(document, parameters, catalog) ->
//! graph or error`. No hidden mutable state, no I/O. Runs once per process
//! lifetime, before any task execution begins.

use serde_json::json;
use tracing::{debug, info};

use crate::assembly::catalog::{
    CollaboratorCatalog, OP_LOG_END, OP_LOG_START, TYPE_COORDINATOR, TYPE_CRITICAL_SECTION,
    TYPE_FILE_MUTEX_DRIVER, TYPE_FILE_TIMESTAMP_STORAGE, TYPE_TASK_PANEL,
};
use crate::assembly::resolver::resolve_component;
use crate::assembly::tasks::register_tasks;
use crate::config::document::{AssemblyConfig, ConfigDocument};
use crate::config::params::ParameterTable;
use crate::config::validate::validate_shapes;
use crate::core::errors::{AssemblyError, Result};
use crate::graph::builder::{GraphBuilder, ServiceGraph};
use crate::graph::registration::{
    ref_arg, Capability, Registration, SetupCall, StartupAction, TASK_TAG,
};

const DEFAULT_PREFIX: &str = "cron";
const DEFAULT_STORAGE_DIRECTORY: &str = "%tempDir%/cron";
const DEFAULT_CRITICAL_SECTION_DIRECTORY: &str = "%tempDir%/critical-section";

/// Assembles the service graph for the periodic-task runner.
pub struct Assembler {
    prefix: String,
    params: ParameterTable,
    catalog: CollaboratorCatalog,
}

impl Assembler {
    /// Assembler with the built-in collaborator catalog and the default
    /// registration prefix.
    pub fn new(params: ParameterTable) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            params,
            catalog: CollaboratorCatalog::builtin(),
        }
    }

    /// Replace the collaborator catalog (hosts add their own task types and
    /// log hooks this way).
    pub fn with_catalog(mut self, catalog: CollaboratorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Override the registration key prefix.
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn storage_key(&self) -> String {
        format!("{}.timestampStorage", self.prefix)
    }

    pub fn driver_key(&self) -> String {
        format!("{}.criticalSectionDriver", self.prefix)
    }

    pub fn critical_section_key(&self) -> String {
        format!("{}.criticalSection", self.prefix)
    }

    pub fn coordinator_key(&self) -> String {
        format!("{}.coordinator", self.prefix)
    }

    pub fn diagnostics_key(&self) -> String {
        format!("{}.diagnostics", self.prefix)
    }

    /// Assemble into an empty graph.
    pub fn assemble(&self, doc: &ConfigDocument) -> Result<ServiceGraph> {
        self.assemble_into(doc, GraphBuilder::new())
    }

    /// Assemble into a graph the host has pre-seeded with its own
    /// registrations (those participate in capability auto-discovery).
    pub fn assemble_into(
        &self,
        doc: &ConfigDocument,
        mut builder: GraphBuilder,
    ) -> Result<ServiceGraph> {
        validate_shapes(doc)?;
        let config = AssemblyConfig::from_document(doc)?;

        let storage_key = self.resolve_storage(&mut builder, &config)?;
        let critical_section_key = self.wire_critical_section(&mut builder, &config)?;
        let coordinator_key = self.register_coordinator(
            &mut builder,
            &config,
            &storage_key,
            &critical_section_key,
        )?;

        register_tasks(
            &mut builder,
            &self.prefix,
            &config.tasks,
            &self.catalog,
            &self.params,
        )?;
        let panel_key = self.register_diagnostics_panel(
            &mut builder,
            &config,
            &coordinator_key,
            &storage_key,
        )?;

        self.collect_tasks(&mut builder, &coordinator_key)?;
        self.attach_log_service(&mut builder, &config, &coordinator_key)?;

        let startup_actions =
            self.finalize(&builder, panel_key, &coordinator_key, &storage_key);

        let graph = builder.freeze(startup_actions);
        info!(
            registrations = graph.len(),
            tasks = graph.keys_by_tag(TASK_TAG).len(),
            "service graph assembled"
        );
        Ok(graph)
    }

    fn resolve_storage(
        &self,
        builder: &mut GraphBuilder,
        config: &AssemblyConfig,
    ) -> Result<String> {
        resolve_component(
            builder,
            &self.storage_key(),
            &config.timestamp_storage,
            Capability::TimestampStore,
            TYPE_FILE_TIMESTAMP_STORAGE,
            &[json!(DEFAULT_STORAGE_DIRECTORY)],
            &self.params,
        )
    }

    fn wire_critical_section(
        &self,
        builder: &mut GraphBuilder,
        config: &AssemblyConfig,
    ) -> Result<String> {
        let directory = config
            .critical_section_directory
            .clone()
            .unwrap_or_else(|| DEFAULT_CRITICAL_SECTION_DIRECTORY.to_string());

        let driver_key = resolve_component(
            builder,
            &self.driver_key(),
            &config.critical_section_driver,
            Capability::MutexDriver,
            TYPE_FILE_MUTEX_DRIVER,
            &[json!(directory)],
            &self.params,
        )?;

        builder.add(
            Registration::of_type(
                self.critical_section_key(),
                TYPE_CRITICAL_SECTION,
                vec![ref_arg(&driver_key)],
            )
            .autowired(false)
            .skip_injection(),
        )
    }

    fn register_coordinator(
        &self,
        builder: &mut GraphBuilder,
        config: &AssemblyConfig,
        storage_key: &str,
        critical_section_key: &str,
    ) -> Result<String> {
        let enforce_time_limit = !self.params.debug_mode();
        builder.add(Registration::of_type(
            self.coordinator_key(),
            TYPE_COORDINATOR,
            vec![
                ref_arg(storage_key),
                ref_arg(critical_section_key),
                json!(config.max_execution_time),
                json!(enforce_time_limit),
            ],
        ))
    }

    fn register_diagnostics_panel(
        &self,
        builder: &mut GraphBuilder,
        config: &AssemblyConfig,
        coordinator_key: &str,
        storage_key: &str,
    ) -> Result<Option<String>> {
        let show = config
            .show_diagnostics_panel
            .unwrap_or_else(|| self.params.debug_mode());
        if !show {
            return Ok(None);
        }
        if self.catalog.provider_of(Capability::DiagnosticsHost).is_none() {
            debug!("diagnostics panel requested but no diagnostics host is available");
            return Ok(None);
        }

        let key = builder.add(
            Registration::of_type(
                self.diagnostics_key(),
                TYPE_TASK_PANEL,
                vec![ref_arg(coordinator_key), ref_arg(storage_key)],
            )
            .autowired(false)
            .skip_injection(),
        )?;
        Ok(Some(key))
    }

    /// Tag collection: strictly after every task declaration has been
    /// registered, attach each task registration to the coordinator.
    fn collect_tasks(&self, builder: &mut GraphBuilder, coordinator_key: &str) -> Result<()> {
        let task_keys = builder.keys_by_tag(TASK_TAG);
        debug!(count = task_keys.len(), "collected task registrations");
        builder.add_setup(coordinator_key, SetupCall::AddTasks(task_keys))
    }

    /// Capability validation of the optional log-hook collaborator.
    fn attach_log_service(
        &self,
        builder: &mut GraphBuilder,
        config: &AssemblyConfig,
        coordinator_key: &str,
    ) -> Result<()> {
        let Some(name) = &config.log_service else {
            return Ok(());
        };

        let collaborator = self
            .catalog
            .get(name)
            .ok_or_else(|| AssemblyError::missing_collaborator(name))?;
        for operation in [OP_LOG_START, OP_LOG_END] {
            if !collaborator.has_operation(operation) {
                return Err(AssemblyError::missing_capability(name, operation));
            }
        }

        debug!(collaborator = %name, "log service validated and attached");
        builder.add_setup(coordinator_key, SetupCall::SetLogService(name.clone()))
    }

    /// Final wiring that depends on the complete shape of the graph.
    fn finalize(
        &self,
        builder: &GraphBuilder,
        panel_key: Option<String>,
        coordinator_key: &str,
        storage_key: &str,
    ) -> Vec<StartupAction> {
        let mut actions = Vec::new();
        if let Some(panel) = panel_key {
            if builder.contains(&panel) {
                // The host type is resolved by capability, not hardcoded, so
                // a replacement diagnostics host is attached the same way.
                if let Some(host) = self.catalog.provider_of(Capability::DiagnosticsHost) {
                    actions.push(StartupAction::AttachDiagnosticsPanel {
                        panel,
                        host: host.name.clone(),
                        coordinator: coordinator_key.to_string(),
                        storage: storage_key.to_string(),
                    });
                }
            }
        }
        actions
    }
}
