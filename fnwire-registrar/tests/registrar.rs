use fnwire_catalog_memory::{MemoryCatalog, MemoryRegistry};
use fnwire_core::binding::StreamFunctionProperties;
use fnwire_core::catalog::ROUTING_FUNCTION_NAME;
use fnwire_core::config::{keys, MapProperties};
use fnwire_core::error::RegistryError;
use fnwire_core::registry::{Component, ComponentRegistry};
use fnwire_core::shape::{BinderAffinity, Many, Single, TypeShape};
use fnwire_core::test_utils::{FailingRegistry, StaticHandler};
use fnwire_registrar::{
    DefinitionSource, FunctionBindingRegistrar, RegistrarError, RegistrarState, SkipReason,
};
use std::sync::Arc;

fn registry() -> Arc<MemoryRegistry> {
    let registry = Arc::new(MemoryRegistry::new());
    registry
        .register_function("simpleSupplier", StaticHandler::new(TypeShape::of_supplier::<String>()))
        .unwrap();
    registry
        .register_function(
            "toUpperCaseProcessor",
            StaticHandler::new(TypeShape::of_function::<Many<String>, Many<String>>()),
        )
        .unwrap();
    registry
        .register_function("onReceive", StaticHandler::new(TypeShape::of_consumer::<String>()))
        .unwrap();
    registry
}

fn registrar(registry: &Arc<MemoryRegistry>, env: MapProperties) -> FunctionBindingRegistrar {
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(registry)));
    FunctionBindingRegistrar::new(catalog, Arc::clone(registry) as Arc<dyn ComponentRegistry>)
        .with_environment(Arc::new(env))
}

fn arity(report: &fnwire_registrar::RegistrationReport, binding: &str) -> (usize, usize) {
    let d = report.table.get(binding).unwrap();
    (d.input_count, d.output_count)
}

// --- Definitions ---

#[test]
fn explicit_definitions_get_bindings() {
    let registry = registry();
    let env = MapProperties::new().with(
        keys::STREAM_DEFINITION,
        "simpleSupplier;toUpperCaseProcessor;onReceive",
    );
    let mut registrar = registrar(&registry, env);
    let report = registrar.run().unwrap();

    assert_eq!(
        report.definition.as_ref().map(|d| d.source),
        Some(DefinitionSource::Explicit)
    );
    assert_eq!(
        report.table.names(),
        vec![
            "simpleSupplier_binding",
            "toUpperCaseProcessor_binding",
            "onReceive_binding"
        ]
    );
    assert_eq!(arity(&report, "simpleSupplier_binding"), (0, 1));
    assert_eq!(arity(&report, "toUpperCaseProcessor_binding"), (1, 1));
    assert_eq!(arity(&report, "onReceive_binding"), (1, 0));
    assert!(report.skipped.is_empty());
    assert_eq!(registrar.state(), RegistrarState::Complete);
}

#[test]
fn bindings_land_in_registry() {
    let registry = registry();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "onReceive");
    registrar(&registry, env).run().unwrap();

    let component = registry.get_component("onReceive_binding").unwrap().unwrap();
    let descriptor = component.as_binding().unwrap();
    assert_eq!(descriptor.function.as_str(), "onReceive");
    assert_eq!(
        descriptor.properties().definition.as_deref(),
        Some("onReceive")
    );
}

#[test]
fn descriptors_share_destination_overrides() {
    let registry = registry();
    let env = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "onReceive")
        .with(keys::destination("onReceive-in-0"), "rbr-test.MESSAGES");
    let report = registrar(&registry, env).run().unwrap();

    let descriptor = report.table.get("onReceive_binding").unwrap();
    assert_eq!(
        descriptor.properties().destination_for("onReceive-in-0"),
        "rbr-test.MESSAGES"
    );
}

#[test]
fn composed_definition_binds_once() {
    let registry = registry();
    registry
        .register_function("reverse", StaticHandler::new(TypeShape::of_function::<String, String>()))
        .unwrap();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "toUpperCaseProcessor|reverse");
    let report = registrar(&registry, env).run().unwrap();

    assert_eq!(report.table.names(), vec!["toUpperCaseProcessor|reverse_binding"]);
    let descriptor = report.table.get("toUpperCaseProcessor|reverse_binding").unwrap();
    assert_eq!(
        descriptor.input_channels(),
        vec!["toUpperCaseProcessorreverse-in-0"]
    );
}

#[test]
fn unresolvable_definition_is_skipped() {
    let registry = registry();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "missing;onReceive");
    let report = registrar(&registry, env).run().unwrap();

    assert_eq!(report.table.names(), vec!["onReceive_binding"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "missing");
    assert_eq!(report.skipped[0].reason, SkipReason::HandlerNotFound);
}

#[test]
fn stream_table_definition_is_not_bound() {
    let registry = registry();
    registry
        .register_function(
            "wordCounts",
            StaticHandler::new(
                TypeShape::of_function::<String, String>()
                    .with_affinity(BinderAffinity::StreamTable),
            ),
        )
        .unwrap();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "wordCounts;onReceive");
    let report = registrar(&registry, env).run().unwrap();

    assert_eq!(report.table.names(), vec!["onReceive_binding"]);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::IneligibleDefinition { .. }
    ));
    assert!(!registry.contains_component("wordCounts_binding").unwrap());
}

#[test]
fn fire_and_forget_transformer_has_no_output_channel() {
    let registry = registry();
    registry
        .register_function(
            "fire",
            StaticHandler::new(TypeShape::of_function::<String, Single<()>>()),
        )
        .unwrap();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "fire");
    let report = registrar(&registry, env).run().unwrap();
    assert_eq!(arity(&report, "fire_binding"), (1, 0));
}

// --- Precedence through run ---

#[test]
fn routing_binds_router_input_only() {
    let registry = registry();
    let env = MapProperties::new().with(keys::ROUTING_ENABLED, "true");
    let report = registrar(&registry, env).run().unwrap();

    let binding = format!("{ROUTING_FUNCTION_NAME}_binding");
    assert_eq!(report.table.names(), vec![binding.as_str()]);
    assert_eq!(arity(&report, &binding), (1, 0));
}

#[test]
fn single_function_is_autodetected() {
    let registry = Arc::new(MemoryRegistry::new());
    registry
        .register_function("onReceive", StaticHandler::new(TypeShape::of_consumer::<String>()))
        .unwrap();
    let report = registrar(&registry, MapProperties::new()).run().unwrap();

    assert_eq!(
        report.definition.map(|d| d.source),
        Some(DefinitionSource::Autodetect)
    );
    assert_eq!(report.table.names(), vec!["onReceive_binding"]);
}

#[test]
fn empty_catalog_registers_nothing() {
    let registry = Arc::new(MemoryRegistry::new());
    let mut registrar = registrar(&registry, MapProperties::new());
    let report = registrar.run().unwrap();

    assert!(report.definition.is_none());
    assert!(report.table.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(registrar.state(), RegistrarState::Complete);
}

// --- Sources ---

#[test]
fn unknown_source_gets_output_binding() {
    let registry = registry();
    let env = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "onReceive")
        .with(keys::SOURCE, "foo; sendMessages");
    let report = registrar(&registry, env).run().unwrap();

    assert_eq!(
        report.table.names(),
        vec!["onReceive_binding", "foo_binding", "sendMessages_binding"]
    );
    assert_eq!(arity(&report, "foo_binding"), (0, 1));
    let foo = report.table.get("foo_binding").unwrap();
    assert_eq!(foo.output_channels(), vec!["foo-out-0"]);
}

#[test]
fn source_naming_a_function_is_skipped() {
    let registry = registry();
    let env = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "simpleSupplier")
        .with(keys::SOURCE, "simpleSupplier");
    let report = registrar(&registry, env).run().unwrap();

    assert_eq!(report.table.names(), vec!["simpleSupplier_binding"]);
    assert_eq!(report.skipped[0].name, "simpleSupplier");
    assert_eq!(report.skipped[0].reason, SkipReason::SourceIsFunction);
}

#[test]
fn aliased_source_with_own_component_is_bound() {
    let registry = registry();
    registry
        .register_value("shout", serde_json::json!("shout"))
        .unwrap();
    let catalog = Arc::new(
        MemoryCatalog::new(Arc::clone(&registry)).with_alias("shout", "toUpperCaseProcessor"),
    );
    let mut registrar = FunctionBindingRegistrar::new(catalog, registry.clone());
    let report = registrar.register_bindings("", &["shout"]).unwrap();

    assert_eq!(report.table.names(), vec!["shout_binding"]);
    assert_eq!(arity(&report, "shout_binding"), (0, 1));
}

#[test]
fn aliased_source_without_component_is_skipped() {
    let registry = registry();
    let catalog = Arc::new(
        MemoryCatalog::new(Arc::clone(&registry)).with_alias("shout", "toUpperCaseProcessor"),
    );
    let mut registrar = FunctionBindingRegistrar::new(catalog, registry.clone());
    let report = registrar.register_bindings("", &["shout"]).unwrap();

    assert!(report.table.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::SourceIsFunction);
}

// --- Collisions ---

#[test]
fn duplicate_binding_name_keeps_later_descriptor() {
    let registry = registry();
    registry
        .register_value("foo_binding", serde_json::json!("stale"))
        .unwrap();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
    let mut registrar = FunctionBindingRegistrar::new(catalog, registry.clone());
    let report = registrar
        .register_bindings("onReceive;onReceive", &["foo"])
        .unwrap();

    assert_eq!(report.table.names(), vec!["onReceive_binding", "foo_binding"]);
    assert!(matches!(
        registry.get_component("foo_binding").unwrap(),
        Some(Component::Binding(_))
    ));
}

#[test]
fn duplicate_binding_name_replaces_whole_descriptor() {
    let registry = registry();
    registry
        .register_value("shout", serde_json::json!("shout"))
        .unwrap();
    let catalog = Arc::new(
        MemoryCatalog::new(Arc::clone(&registry)).with_alias("shout", "toUpperCaseProcessor"),
    );
    let mut registrar = FunctionBindingRegistrar::new(catalog, registry.clone());
    let report = registrar.register_bindings("shout", &["shout"]).unwrap();

    assert_eq!(report.table.names(), vec!["shout_binding"]);
    assert_eq!(arity(&report, "shout_binding"), (0, 1));

    let component = registry.get_component("shout_binding").unwrap().unwrap();
    let stored = component.as_binding().unwrap();
    assert_eq!((stored.input_count, stored.output_count), (0, 1));
}

// --- Failures and lifecycle ---

#[test]
fn registry_failure_aborts_pass() {
    let functions = registry();
    let catalog = Arc::new(MemoryCatalog::new(functions));
    let mut registrar = FunctionBindingRegistrar::new(catalog, Arc::new(FailingRegistry::new()));

    let err = registrar
        .register_bindings("onReceive", &[])
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Registry(RegistryError::Rejected { .. })
    ));
    assert_ne!(registrar.state(), RegistrarState::Complete);
}

#[test]
fn second_run_is_rejected() {
    let registry = registry();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "onReceive");
    let mut registrar = registrar(&registry, env);
    registrar.run().unwrap();

    let err = registrar.run().unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::AlreadyRun(RegistrarState::Complete)
    ));
    let err = registrar.register_bindings("onReceive", &[]).unwrap_err();
    assert!(matches!(err, RegistrarError::AlreadyRun(_)));
}

#[test]
fn explicit_properties_override_environment() {
    let registry = registry();
    let env = MapProperties::new().with(keys::STREAM_DEFINITION, "onReceive");
    let mut registrar = registrar(&registry, env).with_properties(
        StreamFunctionProperties::new().with_definition("simpleSupplier"),
    );
    let report = registrar.run().unwrap();
    assert_eq!(report.table.names(), vec!["simpleSupplier_binding"]);
}

#[test]
fn report_serializes() {
    let registry = registry();
    let env = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "onReceive;missing")
        .with(keys::SOURCE, "foo");
    let report = registrar(&registry, env).run().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["definition"]["source"], "explicit");
    assert_eq!(json["table"][1]["binding_name"], "foo_binding");
    assert_eq!(
        json["skipped"][0],
        serde_json::json!({ "name": "missing", "reason": "handler_not_found" })
    );
}
