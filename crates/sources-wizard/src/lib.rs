//! # sources-wizard
//!
//! Step schema generation for the "add application" wizard.
//!
//! Given a source, its source type, the application being attached and the
//! authentication values already stored, [`select_authentication_step`]
//! computes the declarative step the wizard renders and the router that picks
//! the following step. Everything here is pure: no I/O, no shared state.
//!
//! ## Example
//!
//! ```ignore
//! use sources_wizard::{select_authentication_step, DefaultMessages, SelectAuthenticationInput};
//!
//! let step = select_authentication_step(
//!     &SelectAuthenticationInput {
//!         source: &source,
//!         source_type: &source_type,
//!         app: &app,
//!         authentication_values: &values,
//!     },
//!     &DefaultMessages,
//! )?;
//!
//! let next = step.next_step.resolve(&serde_json::json!({ "authtype": "arn" }))?;
//! ```

pub mod authentication_management;
pub mod fields;
pub mod messages;
pub mod select_authentication;

pub use authentication_management::{
    attached_app_names, AuthenticationSummary, PendingRemoval, SourceEditState,
};
pub use fields::{
    DescriptionContent, FieldSpec, NextStep, SelectOption, StepDefinition, Validator,
};
pub use messages::{DefaultMessages, MessageDescriptor, MessageFormatter};
pub use select_authentication::{
    generate_auth_selection_options, select_authentication_step, SelectAuthenticationInput,
};
