//! Registers a handful of handlers, derives their bindings, and attaches
//! them to a binder that only logs.
//!
//! Configuration comes from `FNWIRE_*` environment variables layered over
//! the defaults below, so any key can be overridden, for example:
//!
//!     FNWIRE_STREAM_FUNCTION_DEFINITION=onReceive cargo run -p stream-demo
//!
//! Set RUST_LOG=debug to see state transitions and each registered binding.

use async_trait::async_trait;
use fnwire::fnwire_core::config::keys;
use fnwire::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MESSAGES_DESTINATION: &str = "rbr-test.MESSAGES";

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
        let word = message.payload.as_str().unwrap_or_default();
        tracing::info!(word, "original string");
        Ok(Message::new(word.to_uppercase()))
    }
}

struct LogUpperCase;

#[async_trait]
impl Consumes<Msg<String>> for LogUpperCase {
    async fn consume(&self, message: Message) -> Result<(), HandlerError> {
        tracing::info!(payload = %message.payload, "received upper case message");
        Ok(())
    }
}

struct Receive {
    bean_value: String,
}

#[async_trait]
impl Consumes<Msg<String>> for Receive {
    async fn consume(&self, message: Message) -> Result<(), HandlerError> {
        tracing::info!(bean_value = self.bean_value.as_str(), "external bean value");
        if message.header("expectedHeader") == Some("1") {
            tracing::info!(payload = %message.payload, "received value in consumer");
        } else {
            tracing::info!(?message, "filtering headers from message");
        }
        Ok(())
    }
}

/// Logs each attachment instead of talking to a broker.
struct LoggingBinder;

#[async_trait]
impl DestinationBinder for LoggingBinder {
    async fn bind_consumer(&self, destination: &str, channel: &str) -> Result<(), BinderError> {
        tracing::info!(destination, channel, "consumer bound");
        Ok(())
    }

    async fn bind_producer(&self, destination: &str, channel: &str) -> Result<(), BinderError> {
        tracing::info!(destination, channel, "producer bound");
        Ok(())
    }
}

fn defaults() -> MapProperties {
    MapProperties::new()
        .with(
            keys::STREAM_DEFINITION,
            "simpleSupplier;toUpperCaseProcessor;onUpperCaseMessage;onReceive",
        )
        .with(keys::SOURCE, "sendMessages")
        .with(
            keys::destination("toUpperCaseProcessor-in-0"),
            MESSAGES_DESTINATION,
        )
        .with(
            keys::destination("toUpperCaseProcessor-out-0"),
            "rbr-test.UPPER",
        )
        .with(keys::destination("onUpperCaseMessage-in-0"), "rbr-test.UPPER")
        .with(keys::destination("onReceive-in-0"), MESSAGES_DESTINATION)
}

fn register_handlers(registry: &MemoryRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let bean_value = "beanValue".to_owned();
    registry.register_value("beanValue", serde_json::json!(bean_value))?;
    registry.register_function("simpleSupplier", SupplierHandler::new(Clock))?;
    registry.register_function(
        "toUpperCaseProcessor",
        TransformerHandler::new(UpperCase),
    )?;
    registry.register_function(
        "onUpperCaseMessage",
        ConsumerHandler::new(LogUpperCase),
    )?;
    registry.register_function(
        "onReceive",
        ConsumerHandler::new(Receive { bean_value }),
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let registry = Arc::new(MemoryRegistry::new());
    register_handlers(&registry)?;
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));

    let environment = LayeredProperties::new()
        .with_layer(Arc::new(EnvProperties::new()))
        .with_layer(Arc::new(defaults()));

    let mut registrar = FunctionBindingRegistrar::new(catalog.clone(), registry)
        .with_environment(Arc::new(environment));
    let report = registrar.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let bound = report.table.attach(&LoggingBinder).await?;
    tracing::info!(channels = bound.len(), "binding table attached");

    if let Some(processor) = catalog.lookup("toUpperCaseProcessor") {
        let out = processor
            .apply(Some(Message::new("put this in upper case")))
            .await?;
        if let Some(message) = out {
            tracing::info!(payload = %message.payload, "processor output");
        }
    }

    Ok(())
}
