//! Task registry builder: heterogeneous task declarations into uniquely-keyed
//! registrations.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::assembly::catalog::CollaboratorCatalog;
use crate::config::document::{Descriptor, TaskSpec};
use crate::config::params::ParameterTable;
use crate::core::errors::Result;
use crate::graph::builder::GraphBuilder;
use crate::graph::registration::{Registration, TASK_TAG};

/// Deterministic identity hash for one task declaration.
///
/// A bare identifier hashes as-is; a descriptor hashes its entity plus the
/// serialized form of the whole declaration. Two identical declarations
/// collapse to one registration; semantically-equal descriptors that
/// serialize differently (for example, differing key order inside nested
/// argument structures) intentionally do not.
pub fn task_identity(spec: &TaskSpec) -> Result<String> {
    let content = match spec {
        TaskSpec::Identifier(name) => name.clone(),
        TaskSpec::Descriptor(descriptor) => {
            format!("{}-{}", descriptor.entity, serde_json::to_string(descriptor)?)
        }
    };
    let digest = Sha256::digest(content.as_bytes());
    Ok(hex::encode(digest))
}

/// Register every task declaration, in order, under `<prefix>.task.<hash>`.
///
/// Descriptor arguments are expanded against the parameter table before the
/// identity is computed, so two declarations that expand to the same
/// arguments collapse to one registration. Re-registration of an identical
/// declaration is a no-op. Each registration is non-autowired,
/// injection-skipped, and tagged for later collection; a declaration whose
/// entity names a type known to the catalog is bound directly to that type,
/// anything else stays a generic invocation.
pub fn register_tasks(
    builder: &mut GraphBuilder,
    prefix: &str,
    tasks: &[TaskSpec],
    catalog: &CollaboratorCatalog,
    params: &ParameterTable,
) -> Result<()> {
    for spec in tasks {
        let descriptor = match spec {
            TaskSpec::Identifier(name) => Descriptor::new(name.clone()),
            TaskSpec::Descriptor(descriptor) => Descriptor::new(descriptor.entity.clone())
                .with_args(params.expand_args(&descriptor.args)?),
        };

        let identity = match spec {
            TaskSpec::Identifier(_) => task_identity(spec)?,
            TaskSpec::Descriptor(_) => task_identity(&TaskSpec::Descriptor(descriptor.clone()))?,
        };
        let key = format!("{prefix}.task.{identity}");
        if builder.contains(&key) {
            debug!(key = %key, "task already registered, skipping duplicate declaration");
            continue;
        }

        let registration = if catalog.contains(&descriptor.entity) {
            Registration::of_type(key, descriptor.entity, descriptor.args)
        } else {
            Registration::construct(key, descriptor.entity, descriptor.args)
        };

        builder.add(registration.autowired(false).skip_injection().tagged(TASK_TAG))?;
    }
    Ok(())
}
