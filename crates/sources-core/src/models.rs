//! Core data models for the sources console.
//!
//! Catalog entries (`SourceType`, `ApplicationType`) are read-only reference
//! data. Sources, applications and authentication values are cached copies of
//! records owned by the remote system of record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// =============================================================================
// CATALOG TYPES
// =============================================================================

/// One authentication variant a source type supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationSchema {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub name: String,
}

/// Schema block of a source type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTypeSchema {
    #[serde(default)]
    pub authentication: Vec<AuthenticationSchema>,
}

/// Catalog entry describing a kind of source (e.g. `amazon`, `openshift`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceType {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub schema: SourceTypeSchema,
}

impl SourceType {
    /// Human-readable name for an authentication type code, if the schema declares it.
    pub fn auth_type_name(&self, auth_type: &str) -> Option<&str> {
        self.schema
            .authentication
            .iter()
            .find(|schema| schema.auth_type == auth_type)
            .map(|schema| schema.name.as_str())
    }
}

/// Catalog entry describing an application that can be attached to sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationType {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub supported_source_types: Vec<String>,
    /// Keyed by source type name. Only meaningful for names listed in
    /// `supported_source_types`.
    #[serde(default)]
    pub supported_authentication_types: HashMap<String, Vec<String>>,
}

impl ApplicationType {
    /// Whether this application can be attached to sources of the given type.
    pub fn supports_source_type(&self, source_type_name: &str) -> bool {
        self.supported_source_types
            .iter()
            .any(|name| name == source_type_name)
    }

    /// Authentication type codes supported for the given source type, in
    /// declaration order. Empty when the source type has no entry.
    pub fn supported_auth_types(&self, source_type_name: &str) -> &[String] {
        self.supported_authentication_types
            .get(source_type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// =============================================================================
// SOURCE TYPES
// =============================================================================

/// Reference from an application to a stored authentication value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationRef {
    pub id: String,
}

/// A source's attachment to an application type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub application_type_id: String,
    #[serde(default)]
    pub authentications: Vec<AuthenticationRef>,
}

impl Application {
    /// Whether this application references the given authentication value.
    pub fn uses_authentication(&self, auth_id: &str) -> bool {
        self.authentications.iter().any(|auth| auth.id == auth_id)
    }
}

/// A user-configured external connection record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type_id: Option<String>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl Source {
    /// Whether an application of the given type is already attached.
    pub fn has_application_type(&self, application_type_id: &str) -> bool {
        self.applications
            .iter()
            .any(|app| app.application_type_id == application_type_id)
    }
}

/// A previously stored credential. Lifecycle is independent of sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationValue {
    pub id: String,
    pub authtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthenticationValue {
    /// Username, treating an empty string as absent.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }
}

// =============================================================================
// LISTING TYPES
// =============================================================================

/// Sort direction for the source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::InvalidInput(format!("unknown sort direction: {}", s))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Paging, sorting and filter parameters for one list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitiesQuery {
    pub page_size: usize,
    pub page_number: usize,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    pub filter_value: String,
}

/// Options merged into list state by the load lifecycle events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded: Option<bool>,
}

impl LoadOptions {
    /// Options that keep the list marked as loaded while a refresh is pending.
    pub fn loaded() -> Self {
        Self { loaded: Some(true) }
    }
}

// =============================================================================
// NOTIFICATION TYPES
// =============================================================================

/// Visual variant of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Danger,
    Warning,
    Info,
}

impl fmt::Display for NotificationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Danger => write!(f, "danger"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Notification descriptor attached to an action before it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    pub variant: NotificationVariant,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dismissable: bool,
}

impl NotificationDescriptor {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Success,
            title: title.into(),
            description: None,
            dismissable: true,
        }
    }
}

/// An enqueued notification consumed by the notification-display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub variant: NotificationVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dismissable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

impl Notification {
    /// Build a dismissable notification with a fresh id.
    pub fn new(
        title: impl Into<String>,
        variant: NotificationVariant,
        description: Option<String>,
        custom_id: Option<String>,
    ) -> Self {
        Self {
            id: crate::uuid_utils::new_v7().to_string(),
            title: title.into(),
            variant,
            description,
            dismissable: true,
            custom_id,
        }
    }

    /// Materialize a descriptor into an enqueueable notification.
    pub fn from_descriptor(descriptor: &NotificationDescriptor) -> Self {
        Self {
            dismissable: descriptor.dismissable,
            ..Self::new(
                descriptor.title.clone(),
                descriptor.variant,
                descriptor.description.clone(),
                None,
            )
        }
    }

    /// Whether `id` matches either the generated id or the caller's custom id.
    pub fn matches(&self, id: &str) -> bool {
        self.id == id || self.custom_id.as_deref() == Some(id)
    }
}

// =============================================================================
// WIRE RESPONSES
// =============================================================================

/// Page of sources returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitiesPage {
    pub sources: Vec<Source>,
}

/// Count metadata block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMeta {
    pub count: usize,
}

/// Response of the count endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub meta: CountMeta,
}

/// Response of the application type catalog endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTypesResponse {
    pub data: Vec<ApplicationType>,
}
