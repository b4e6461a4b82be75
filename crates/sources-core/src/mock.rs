//! In-memory mock of the remote sources API for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sources_core::mock::{MockOperation, MockSourcesApi};
//!
//! let api = MockSourcesApi::new()
//!     .with_sources(vec![source("1", "alpha")])
//!     .with_latency_ms(MockOperation::LoadEntities, 50)
//!     .with_failure(MockOperation::RemoveSource, ApiError::with_detail("locked"));
//!
//! api.remove_source("1").await.unwrap_err();
//! assert_eq!(api.call_count(MockOperation::RemoveSource), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, Error, Result};
use crate::models::*;
use crate::traits::{SourcesApi, UpdateErrorTitles};

/// Remote operation identifiers used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    LoadEntities,
    LoadCount,
    RemoveSource,
    DeleteApplication,
    UpdateSource,
    LoadSourceTypes,
    LoadAppTypes,
}

/// One recorded call against the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: MockOperation,
    pub argument: String,
}

#[derive(Debug, Default)]
struct MockState {
    sources: Vec<Source>,
    source_types: Vec<SourceType>,
    app_types: Vec<ApplicationType>,
    failures: HashMap<MockOperation, ApiError>,
    latency_ms: HashMap<MockOperation, u64>,
    filter_latency_ms: HashMap<String, u64>,
    calls: Vec<MockCall>,
}

/// Mock implementation of [`SourcesApi`].
#[derive(Clone, Default)]
pub struct MockSourcesApi {
    state: Arc<Mutex<MockState>>,
}

impl MockSourcesApi {
    /// Create an empty mock with no latency and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(self, sources: Vec<Source>) -> Self {
        self.state.lock().unwrap().sources = sources;
        self
    }

    pub fn with_source_types(self, source_types: Vec<SourceType>) -> Self {
        self.state.lock().unwrap().source_types = source_types;
        self
    }

    pub fn with_app_types(self, app_types: Vec<ApplicationType>) -> Self {
        self.state.lock().unwrap().app_types = app_types;
        self
    }

    /// Make every call of `operation` fail with `error`.
    pub fn with_failure(self, operation: MockOperation, error: ApiError) -> Self {
        self.fail(operation, error);
        self
    }

    /// Delay every call of `operation`.
    pub fn with_latency_ms(self, operation: MockOperation, latency_ms: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .latency_ms
            .insert(operation, latency_ms);
        self
    }

    /// Delay list and count calls made with this exact filter value.
    /// Overrides the per-operation latency for those calls.
    pub fn with_filter_latency_ms(self, filter_value: impl Into<String>, latency_ms: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .filter_latency_ms
            .insert(filter_value.into(), latency_ms);
        self
    }

    /// Start failing `operation` from now on.
    pub fn fail(&self, operation: MockOperation, error: ApiError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: MockOperation) {
        self.state.lock().unwrap().failures.remove(&operation);
    }

    /// Current server-side sources.
    pub fn sources(&self) -> Vec<Source> {
        self.state.lock().unwrap().sources.clone()
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made for one operation.
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear()
    }

    /// Record the call and return the latency to apply and the injected failure.
    fn begin(
        &self,
        operation: MockOperation,
        argument: impl Into<String>,
        filter_value: Option<&str>,
    ) -> (u64, Option<ApiError>) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall {
            operation,
            argument: argument.into(),
        });
        let latency = filter_value
            .and_then(|filter| state.filter_latency_ms.get(filter).copied())
            .or_else(|| state.latency_ms.get(&operation).copied())
            .unwrap_or(0);
        (latency, state.failures.get(&operation).cloned())
    }

    async fn call(
        &self,
        operation: MockOperation,
        argument: impl Into<String>,
        filter_value: Option<&str>,
    ) -> Result<()> {
        let (latency, failure) = self.begin(operation, argument, filter_value);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        match failure {
            Some(error) => Err(Error::Api(error)),
            None => Ok(()),
        }
    }

    fn filtered(&self, filter_value: &str) -> Vec<Source> {
        let needle = filter_value.to_lowercase();
        self.state
            .lock()
            .unwrap()
            .sources
            .iter()
            .filter(|source| needle.is_empty() || source.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SourcesApi for MockSourcesApi {
    async fn load_entities(&self, query: &EntitiesQuery) -> Result<EntitiesPage> {
        self.call(
            MockOperation::LoadEntities,
            format!(
                "{}:{}:{}:{}:{}",
                query.page_size,
                query.page_number,
                query.sort_by,
                query.sort_direction,
                query.filter_value
            ),
            Some(&query.filter_value),
        )
        .await?;

        let mut sources = self.filtered(&query.filter_value);
        if query.sort_by == "name" {
            sources.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if query.sort_direction == SortDirection::Desc {
            sources.reverse();
        }
        let offset = query.page_number.saturating_sub(1) * query.page_size;
        let sources = sources
            .into_iter()
            .skip(offset)
            .take(query.page_size)
            .collect();
        Ok(EntitiesPage { sources })
    }

    async fn load_count_of_sources(&self, filter_value: &str) -> Result<CountResponse> {
        self.call(MockOperation::LoadCount, filter_value, Some(filter_value))
            .await?;
        Ok(CountResponse {
            meta: CountMeta {
                count: self.filtered(filter_value).len(),
            },
        })
    }

    async fn remove_source(&self, source_id: &str) -> Result<()> {
        self.call(MockOperation::RemoveSource, source_id, None).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.sources.len();
        state.sources.retain(|source| source.id != source_id);
        if state.sources.len() == before {
            return Err(Error::Api(ApiError::with_detail(format!(
                "source {} not found",
                source_id
            ))));
        }
        Ok(())
    }

    async fn delete_application(&self, app_id: &str, error_title: &str) -> Result<()> {
        let (latency, failure) = self.begin(MockOperation::DeleteApplication, app_id, None);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if let Some(mut error) = failure {
            error.title = Some(error_title.to_string());
            return Err(Error::Api(error));
        }
        let mut state = self.state.lock().unwrap();
        for source in state.sources.iter_mut() {
            source.applications.retain(|app| app.id != app_id);
        }
        Ok(())
    }

    async fn update_source(
        &self,
        source: &Source,
        form_data: &JsonValue,
        _error_titles: &UpdateErrorTitles,
    ) -> Result<()> {
        self.call(MockOperation::UpdateSource, source.id.as_str(), None)
            .await?;
        let name = form_data
            .get("source")
            .and_then(|s| s.get("name"))
            .and_then(JsonValue::as_str);
        if let Some(name) = name {
            let mut state = self.state.lock().unwrap();
            if let Some(stored) = state.sources.iter_mut().find(|s| s.id == source.id) {
                stored.name = name.to_string();
            }
        }
        Ok(())
    }

    async fn load_source_types(&self) -> Result<Vec<SourceType>> {
        self.call(MockOperation::LoadSourceTypes, "", None).await?;
        Ok(self.state.lock().unwrap().source_types.clone())
    }

    async fn load_app_types(&self) -> Result<AppTypesResponse> {
        self.call(MockOperation::LoadAppTypes, "", None).await?;
        Ok(AppTypesResponse {
            data: self.state.lock().unwrap().app_types.clone(),
        })
    }
}
