//! # sources-core
//!
//! Core types, traits, and abstractions for the sources console.
//!
//! This crate provides the catalog and source data structures, the store
//! event sum type and its broadcast bus, and the `SourcesApi` collaborator
//! trait that the wizard and action crates depend on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{ApiError, Error, LoadError, Result};
pub use events::{EventBus, EventEnvelope, StoreEvent};
pub use models::*;
pub use traits::*;
pub use uuid_utils::new_v7;
