//! Three-tier fallback resolution of one pluggable component slot.

use serde_json::Value;
use tracing::debug;

use crate::config::document::ComponentSpec;
use crate::config::params::ParameterTable;
use crate::core::errors::{AssemblyError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::registration::{Capability, Registration};

/// Resolve a single pluggable component from one configuration value.
///
/// Precedence:
/// 1. identifier naming an existing registration -> alias to it;
/// 2. descriptor -> construct verbatim (arguments placeholder-expanded);
/// 3. exactly one autowired registration satisfying `required` -> alias to
///    it; more than one is a hard [`AssemblyError::ResolutionAmbiguity`];
/// 4. the hardcoded default type with its default arguments expanded
///    against the parameter table.
///
/// Exactly one registration is created per call, always non-autowired and
/// injection-skipped. A fully-absent value never errors; an identifier that
/// names no existing registration falls through to auto-discovery.
pub fn resolve_component(
    builder: &mut GraphBuilder,
    slot_key: &str,
    spec: &ComponentSpec,
    required: Capability,
    default_type: &str,
    default_args: &[Value],
    params: &ParameterTable,
) -> Result<String> {
    let registration = match spec {
        ComponentSpec::Identifier(name) if builder.contains(name) => {
            debug!(slot = slot_key, target = %name, "resolved slot by explicit reference");
            Registration::alias(slot_key, name.clone())
        }
        ComponentSpec::Descriptor(descriptor) => {
            debug!(slot = slot_key, entity = %descriptor.entity, "resolved slot by explicit construction");
            Registration::construct(
                slot_key,
                descriptor.entity.clone(),
                params.expand_args(&descriptor.args)?,
            )
        }
        _ => {
            let candidates = builder.keys_by_capability(required);
            match candidates.len() {
                1 => {
                    debug!(slot = slot_key, target = %candidates[0], "resolved slot by auto-discovery");
                    Registration::alias(slot_key, candidates[0].clone())
                }
                0 => {
                    debug!(slot = slot_key, default = default_type, "resolved slot by hardcoded default");
                    Registration::of_type(slot_key, default_type, params.expand_args(default_args)?)
                }
                _ => return Err(AssemblyError::ambiguity(slot_key, candidates)),
            }
        }
    };

    builder.add(registration.autowired(false).skip_injection())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::Descriptor;
    use crate::graph::registration::Recipe;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn params() -> ParameterTable {
        ParameterTable::with_defaults("/tmp/app", false)
    }

    fn resolve(builder: &mut GraphBuilder, spec: &ComponentSpec) -> Result<String> {
        resolve_component(
            builder,
            "cron.timestampStorage",
            spec,
            Capability::TimestampStore,
            "FileTimestampStorage",
            &[json!("%tempDir%/cron")],
            &params(),
        )
    }

    #[test]
    fn test_identifier_aliases_existing_registration() {
        let mut builder = GraphBuilder::new();
        builder
            .add(Registration::construct("app.storage", "RedisStorage", vec![]))
            .unwrap();

        let key = resolve(
            &mut builder,
            &ComponentSpec::Identifier("app.storage".to_string()),
        )
        .unwrap();

        let registration = builder.get(&key).unwrap();
        assert_eq!(registration.recipe, Recipe::Alias("app.storage".to_string()));
        assert!(!registration.autowired);
        assert!(!registration.inject);
    }

    #[test]
    fn test_descriptor_constructs_verbatim_with_expansion() {
        let mut builder = GraphBuilder::new();
        let spec = ComponentSpec::Descriptor(
            Descriptor::new("CustomStorage").with_args(vec![json!("%tempDir%/state"), json!(7)]),
        );

        let key = resolve(&mut builder, &spec).unwrap();
        assert_eq!(
            builder.get(&key).unwrap().recipe,
            Recipe::Construct {
                entity: "CustomStorage".to_string(),
                args: vec![json!("/tmp/app/state"), json!(7)],
            }
        );
    }

    #[test]
    fn test_absent_discovers_unique_candidate() {
        let mut builder = GraphBuilder::new();
        builder
            .add(
                Registration::construct("app.storage", "RedisStorage", vec![])
                    .provides(Capability::TimestampStore),
            )
            .unwrap();

        let key = resolve(&mut builder, &ComponentSpec::Absent).unwrap();
        assert_eq!(
            builder.get(&key).unwrap().recipe,
            Recipe::Alias("app.storage".to_string())
        );
    }

    #[test]
    fn test_absent_falls_back_to_default() {
        let mut builder = GraphBuilder::new();
        let key = resolve(&mut builder, &ComponentSpec::Absent).unwrap();
        assert_eq!(
            builder.get(&key).unwrap().recipe,
            Recipe::Type {
                name: "FileTimestampStorage".to_string(),
                args: vec![json!("/tmp/app/cron")],
            }
        );
    }

    #[test]
    fn test_unknown_identifier_falls_through_to_default() {
        let mut builder = GraphBuilder::new();
        let key = resolve(
            &mut builder,
            &ComponentSpec::Identifier("no.such.registration".to_string()),
        )
        .unwrap();
        assert!(matches!(
            builder.get(&key).unwrap().recipe,
            Recipe::Type { .. }
        ));
    }

    #[test]
    fn test_ambiguous_discovery_is_fatal() {
        let mut builder = GraphBuilder::new();
        for (key, entity) in [("app.a", "StoreA"), ("app.b", "StoreB")] {
            builder
                .add(
                    Registration::construct(key, entity, vec![])
                        .provides(Capability::TimestampStore),
                )
                .unwrap();
        }

        let err = resolve(&mut builder, &ComponentSpec::Absent).unwrap_err();
        match err {
            AssemblyError::ResolutionAmbiguity { slot, candidates } => {
                assert_eq!(slot, "cron.timestampStorage");
                assert_eq!(candidates, vec!["app.a".to_string(), "app.b".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exactly_one_registration_per_call() {
        let mut builder = GraphBuilder::new();
        resolve(&mut builder, &ComponentSpec::Absent).unwrap();
        let graph = builder.freeze(Vec::new());
        assert_eq!(graph.len(), 1);
    }
}
