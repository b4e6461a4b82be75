//! Collaborator traits for the sources console.
//!
//! The remote API is an external collaborator; these traits describe only its
//! interface boundary so the orchestrator can be driven by any transport (or
//! by `mock::MockSourcesApi` in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::*;

/// Per-field error titles handed to the update collaborator, which uses them
/// to label the failures it reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateErrorTitles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
}

/// Remote API surface used by the mutation orchestrator.
///
/// Every method fails with [`crate::Error::Api`] when the remote call fails.
#[async_trait]
pub trait SourcesApi: Send + Sync {
    /// Fetch one page of sources with the given paging/sort/filter parameters.
    async fn load_entities(&self, query: &EntitiesQuery) -> Result<EntitiesPage>;

    /// Fetch the total number of sources matching the filter.
    async fn load_count_of_sources(&self, filter_value: &str) -> Result<CountResponse>;

    /// Delete a source.
    async fn remove_source(&self, source_id: &str) -> Result<()>;

    /// Delete an application; `error_title` labels the failure the collaborator reports.
    async fn delete_application(&self, app_id: &str, error_title: &str) -> Result<()>;

    /// Apply edit-form data to a source.
    async fn update_source(
        &self,
        source: &Source,
        form_data: &JsonValue,
        error_titles: &UpdateErrorTitles,
    ) -> Result<()>;

    /// Fetch the source type catalog.
    async fn load_source_types(&self) -> Result<Vec<SourceType>>;

    /// Fetch the application type catalog.
    async fn load_app_types(&self) -> Result<AppTypesResponse>;
}
