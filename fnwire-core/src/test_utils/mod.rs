//! In-memory doubles for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that prove the trait APIs are usable.

mod failing_registry;
mod recording_binder;
mod static_handler;

pub use failing_registry::FailingRegistry;
pub use recording_binder::RecordingBinder;
pub use static_handler::StaticHandler;
