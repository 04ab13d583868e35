//! The prelude is enough to wire a registrar end to end.

use fnwire::prelude::*;
use std::sync::Arc;

#[tokio::test]
async fn prelude_wires_registrar() {
    let registry = Arc::new(MemoryRegistry::new());
    registry
        .register_function(
            "toUpperCaseProcessor",
            FnHandler::function::<String, String>(|m: Message| {
                let text = m.payload.as_str().unwrap_or_default().to_uppercase();
                Ok(Message::new(text))
            }),
        )
        .unwrap();
    let catalog = Arc::new(MemoryCatalog::new(Arc::clone(&registry)));

    let mut registrar = FunctionBindingRegistrar::new(catalog.clone(), registry);
    let report = registrar.run().unwrap();
    assert_eq!(report.table.names(), vec!["toUpperCaseProcessor_binding"]);

    let invocation = catalog.lookup("toUpperCaseProcessor").unwrap();
    let out = invocation.apply(Some(Message::new("abc"))).await.unwrap();
    assert_eq!(out.unwrap().payload, serde_json::json!("ABC"));
}
