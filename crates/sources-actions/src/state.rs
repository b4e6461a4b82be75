//! Shared console state and its reducer.
//!
//! [`ProvidersState`] is the single source of truth the views read. It only
//! changes through [`ProvidersState::apply`], which matches every
//! [`StoreEvent`] variant.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use sources_core::{
    defaults, ApiError, ApplicationType, EntitiesQuery, LoadError, Notification, SortDirection,
    Source, SourceType, StoreEvent,
};

use crate::config::OrchestratorConfig;

/// In-progress "add application" wizard selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddSourceState {
    /// Source the application is being attached to.
    pub source_id: Option<String>,
    pub app: Option<ApplicationType>,
    /// Form values to restore when the wizard is reopened after an undo.
    pub initial_values: Option<JsonValue>,
}

impl AddSourceState {
    pub fn is_empty(&self) -> bool {
        self.source_id.is_none() && self.app.is_none() && self.initial_values.is_none()
    }
}

/// Console-wide list, catalog and notification state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvidersState {
    // List parameters
    pub page_size: usize,
    pub page_number: usize,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    pub filter_value: String,
    pub filter_column: String,

    // List data
    pub entities: Vec<Source>,
    pub count: usize,
    pub loaded: bool,
    pub fetching_error: Option<LoadError>,

    // Catalogs
    pub source_types: Vec<SourceType>,
    pub source_types_loaded: bool,
    pub app_types: Vec<ApplicationType>,
    pub app_types_loaded: bool,
    pub catalog_error: Option<ApiError>,

    // Mutations in flight
    pub removing_sources: BTreeSet<String>,
    pub removing_applications: BTreeSet<String>,
    pub update_error: Option<ApiError>,

    pub add_source: AddSourceState,
    pub notifications: Vec<Notification>,

    /// Sequence number of the most recently started list load.
    pub latest_request_seq: u64,
    #[serde(skip)]
    guard_stale_responses: bool,
}

impl Default for ProvidersState {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

impl ProvidersState {
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self {
            page_size: config.page_size,
            page_number: config.page_number,
            sort_by: config.sort_by.clone(),
            sort_direction: config.sort_direction,
            filter_value: String::new(),
            filter_column: defaults::FILTER_COLUMN.to_string(),
            entities: Vec::new(),
            count: 0,
            loaded: false,
            fetching_error: None,
            source_types: Vec::new(),
            source_types_loaded: false,
            app_types: Vec::new(),
            app_types_loaded: false,
            catalog_error: None,
            removing_sources: BTreeSet::new(),
            removing_applications: BTreeSet::new(),
            update_error: None,
            add_source: AddSourceState::default(),
            notifications: Vec::new(),
            latest_request_seq: 0,
            guard_stale_responses: config.guard_stale_responses,
        }
    }

    /// Query for the list page the current parameters describe.
    pub fn query(&self) -> EntitiesQuery {
        EntitiesQuery {
            page_size: self.page_size,
            page_number: self.page_number,
            sort_by: self.sort_by.clone(),
            sort_direction: self.sort_direction,
            filter_value: self.filter_value.clone(),
        }
    }

    pub fn source(&self, source_id: &str) -> Option<&Source> {
        self.entities.iter().find(|source| source.id == source_id)
    }

    pub fn is_removing_source(&self, source_id: &str) -> bool {
        self.removing_sources.contains(source_id)
    }

    pub fn is_removing_application(&self, app_id: &str) -> bool {
        self.removing_applications.contains(app_id)
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.guard_stale_responses && seq < self.latest_request_seq
    }

    /// Reduce one event into the state.
    ///
    /// Returns `false` when the event was ignored because it answers a
    /// superseded list request.
    pub fn apply(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::LoadEntitiesPending { seq, options } => {
                self.latest_request_seq = self.latest_request_seq.max(*seq);
                self.loaded = options.loaded.unwrap_or(false);
                self.fetching_error = None;
            }
            StoreEvent::LoadEntitiesFulfilled { seq, sources, .. } => {
                if self.is_stale(*seq) {
                    return false;
                }
                self.entities = sources.clone();
                self.loaded = true;
            }
            StoreEvent::LoadEntitiesRejected { seq, error } => {
                if self.is_stale(*seq) {
                    return false;
                }
                self.fetching_error = Some(error.clone());
                self.loaded = true;
            }
            StoreEvent::SetCount { seq, count } => {
                if self.is_stale(*seq) {
                    return false;
                }
                self.count = *count;
            }

            StoreEvent::LoadSourceTypesPending => {
                self.source_types_loaded = false;
            }
            StoreEvent::LoadSourceTypesFulfilled { source_types } => {
                self.source_types = source_types.clone();
                self.source_types_loaded = true;
            }
            StoreEvent::LoadSourceTypesRejected { error } => {
                self.catalog_error = Some(error.clone());
                self.source_types_loaded = true;
            }
            StoreEvent::LoadAppTypesPending => {
                self.app_types_loaded = false;
            }
            StoreEvent::LoadAppTypesFulfilled { app_types } => {
                self.app_types = app_types.clone();
                self.app_types_loaded = true;
            }
            StoreEvent::LoadAppTypesRejected { error } => {
                self.catalog_error = Some(error.clone());
                self.app_types_loaded = true;
            }

            StoreEvent::SortEntities { column, direction } => {
                self.sort_by = column.clone();
                self.sort_direction = *direction;
            }
            StoreEvent::PageAndSize { page, size } => {
                self.page_number = *page;
                self.page_size = *size;
            }
            StoreEvent::FilterProviders { value } => {
                self.filter_value = value.clone();
            }
            StoreEvent::SetFilterColumn { column } => {
                self.filter_column = column.clone();
            }

            StoreEvent::RemoveSourcePending { source_id } => {
                self.removing_sources.insert(source_id.clone());
            }
            StoreEvent::RemoveSourceFulfilled { source_id }
            | StoreEvent::RemoveSourceRejected { source_id } => {
                self.removing_sources.remove(source_id);
            }

            StoreEvent::RemoveApplicationPending { app_id, .. } => {
                self.removing_applications.insert(app_id.clone());
            }
            StoreEvent::RemoveApplicationFulfilled { app_id, source_id } => {
                self.removing_applications.remove(app_id);
                if let Some(source) = self.entities.iter_mut().find(|s| &s.id == source_id) {
                    source.applications.retain(|app| &app.id != app_id);
                }
            }
            StoreEvent::RemoveApplicationRejected { app_id, .. } => {
                self.removing_applications.remove(app_id);
            }

            StoreEvent::UpdateSourceFailed { error } => {
                self.update_error = Some(error.clone());
            }

            StoreEvent::AddNotification { notification } => {
                self.notifications.push(notification.clone());
            }
            StoreEvent::RemoveNotification { id } => {
                self.notifications.retain(|n| !n.matches(id));
            }

            StoreEvent::AddAppToSource { source_id, app } => {
                self.add_source.source_id = Some(source_id.clone());
                self.add_source.app = Some(app.clone());
            }
            StoreEvent::UndoAddSource { values } => {
                self.add_source.initial_values = Some(values.clone());
            }
            StoreEvent::ClearAddSource => {
                self.add_source = AddSourceState::default();
            }
        }
        true
    }
}
