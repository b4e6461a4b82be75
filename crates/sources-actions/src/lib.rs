//! # sources-actions
//!
//! Shared state store and orchestrated actions for the sources console.
//!
//! Every asynchronous action dispatches PENDING before its collaborator call
//! and FULFILLED or REJECTED after it. The [`Store`] reduces each event into
//! [`ProvidersState`] and rebroadcasts it to subscribers.

pub mod config;
pub mod intent;
pub mod orchestrator;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{ConfigError, ConfigResult, LogConfig, LogFormat, OrchestratorConfig};
pub use intent::{execute_intent, ActionIntent, IntentKind, IntentMeta, NotificationsMeta};
pub use orchestrator::SourcesOrchestrator;
pub use state::{AddSourceState, ProvidersState};
pub use store::Store;
pub use telemetry::init_tracing;
