//! End-to-end startup: register handlers, derive bindings, attach them.
//!
//! Mirrors a small messaging application:
//!
//! 1. **Explicit definitions**: supplier, processor and consumers bound with
//!    destination overrides, plus an output-only source
//! 2. **Routing**: a single router input dispatching on a header
//! 3. **Layered configuration**: environment variables over defaults
//! 4. **Binder failure**: attachment errors surface to the caller

use async_trait::async_trait;
use fnwire::prelude::*;
use fnwire_catalog_memory::ROUTE_HEADER;
use fnwire_config_env::EnvProperties;
use fnwire_core::binding::ChannelRole;
use fnwire_core::config::keys;
use fnwire_core::test_utils::RecordingBinder;
use std::sync::{Arc, Mutex};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Clock;

#[async_trait]
impl Supplies<i64> for Clock {
    async fn supply(&self) -> Result<Message, HandlerError> {
        Ok(Message::new(12345))
    }
}

struct UpperCase;

#[async_trait]
impl Transforms<Many<String>, Many<String>> for UpperCase {
    async fn transform(&self, message: Message) -> Result<Message, HandlerError> {
        let text = message.payload.as_str().unwrap_or_default().to_uppercase();
        Ok(Message::new(text))
    }
}

type Accepted = Arc<Mutex<Vec<serde_json::Value>>>;

/// Records payloads whose `expectedHeader` is `"1"`.
struct Receive {
    accepted: Accepted,
}

#[async_trait]
impl Consumes<Msg<String>> for Receive {
    async fn consume(&self, message: Message) -> Result<(), HandlerError> {
        if message.header("expectedHeader") == Some("1") {
            self.accepted.lock().unwrap().push(message.payload);
        }
        Ok(())
    }
}

fn application() -> (Arc<MemoryRegistry>, Accepted) {
    let registry = Arc::new(MemoryRegistry::new());
    let accepted = Accepted::default();
    registry
        .register_value("beanValue", serde_json::json!("beanValue"))
        .unwrap();
    registry
        .register_function("simpleSupplier", SupplierHandler::new(Clock))
        .unwrap();
    registry
        .register_function("toUpperCaseProcessor", TransformerHandler::new(UpperCase))
        .unwrap();
    registry
        .register_function(
            "onReceive",
            ConsumerHandler::new(Receive {
                accepted: Arc::clone(&accepted),
            }),
        )
        .unwrap();
    (registry, accepted)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 1. Explicit definitions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn explicit_definitions_attach_with_overrides() {
    let (registry, _) = application();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
    let env = MapProperties::new()
        .with(
            keys::STREAM_DEFINITION,
            "simpleSupplier;toUpperCaseProcessor;onReceive",
        )
        .with(keys::SOURCE, "sendMessages")
        .with(
            keys::destination("toUpperCaseProcessor-in-0"),
            "rbr-test.MESSAGES",
        );

    let mut registrar =
        FunctionBindingRegistrar::new(catalog, registry.clone()).with_environment(Arc::new(env));
    let report = registrar.run().unwrap();
    assert_eq!(
        report.table.names(),
        vec![
            "simpleSupplier_binding",
            "toUpperCaseProcessor_binding",
            "onReceive_binding",
            "sendMessages_binding"
        ]
    );
    assert!(registry.contains_component("sendMessages_binding").unwrap());

    let binder = RecordingBinder::new();
    let bound = report.table.attach(&binder).await.unwrap();
    assert_eq!(bound, binder.bindings());

    let pairs: Vec<(&str, &str, ChannelRole)> = bound
        .iter()
        .map(|b| (b.channel.as_str(), b.destination.as_str(), b.role))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("simpleSupplier-out-0", "simpleSupplier-out-0", ChannelRole::Output),
            ("toUpperCaseProcessor-in-0", "rbr-test.MESSAGES", ChannelRole::Input),
            (
                "toUpperCaseProcessor-out-0",
                "toUpperCaseProcessor-out-0",
                ChannelRole::Output
            ),
            ("onReceive-in-0", "onReceive-in-0", ChannelRole::Input),
            ("sendMessages-out-0", "sendMessages-out-0", ChannelRole::Output),
        ]
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 2. Routing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn routing_binds_one_input_and_dispatches() {
    let (registry, accepted) = application();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
    let env = MapProperties::new().with(keys::ROUTING_ENABLED, "true");

    let mut registrar = FunctionBindingRegistrar::new(catalog.clone(), registry)
        .with_environment(Arc::new(env));
    let report = registrar.run().unwrap();

    let binder = RecordingBinder::new();
    let bound = report.table.attach(&binder).await.unwrap();
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].channel, "functionRouter-in-0");
    assert_eq!(bound[0].role, ChannelRole::Input);

    let router = catalog.lookup("functionRouter").unwrap();
    let out = router
        .apply(Some(
            Message::new("hello")
                .with_header(ROUTE_HEADER, "onReceive")
                .with_header("expectedHeader", "1"),
        ))
        .await
        .unwrap();
    assert!(out.is_none());
    assert_eq!(
        *accepted.lock().unwrap(),
        vec![serde_json::json!("hello")]
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 3. Layered configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn environment_overrides_defaults() {
    // SAFETY: the variable prefix is unique to this test.
    unsafe { std::env::set_var("FNWIRE_STARTUP_STREAM_FUNCTION_DEFINITION", "onReceive") };

    let (registry, _) = application();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
    let defaults = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "simpleSupplier")
        .with(keys::SOURCE, "sendMessages");
    let env = LayeredProperties::new()
        .with_layer(Arc::new(EnvProperties::with_prefix("FNWIRE_STARTUP_")))
        .with_layer(Arc::new(defaults));

    let mut registrar =
        FunctionBindingRegistrar::new(catalog, registry).with_environment(Arc::new(env));
    let report = registrar.run().unwrap();

    // SAFETY: as above.
    unsafe { std::env::remove_var("FNWIRE_STARTUP_STREAM_FUNCTION_DEFINITION") };

    assert_eq!(
        report.table.names(),
        vec!["onReceive_binding", "sendMessages_binding"]
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 4. Binder failure
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn binder_rejection_propagates() {
    let (registry, _) = application();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));
    let env = MapProperties::new()
        .with(keys::STREAM_DEFINITION, "onReceive")
        .with(keys::destination("onReceive-in-0"), "rbr-test.MESSAGES");

    let mut registrar =
        FunctionBindingRegistrar::new(catalog, registry).with_environment(Arc::new(env));
    let report = registrar.run().unwrap();

    let binder = RecordingBinder::rejecting("rbr-test.MESSAGES");
    let err = report.table.attach(&binder).await.unwrap_err();
    assert!(matches!(
        err,
        BinderError::DestinationUnavailable { ref destination, .. } if destination == "rbr-test.MESSAGES"
    ));
    assert!(binder.bindings().is_empty());
}
