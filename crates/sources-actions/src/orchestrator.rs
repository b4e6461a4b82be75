//! Orchestrated actions against the remote sources API.
//!
//! Each asynchronous action dispatches its lifecycle events on the shared
//! [`Store`] around exactly one collaborator call (two for list loads), and
//! returns the collaborator's error after the failure has been recorded.

use std::sync::Arc;

use futures::future;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn, Span};

use sources_core::{
    logging, ApiError, ApplicationType, Error, LoadOptions, Notification, NotificationDescriptor,
    NotificationVariant, Result, SortDirection, Source, SourcesApi, StoreEvent,
    UpdateErrorTitles,
};

use crate::config::{ConfigResult, OrchestratorConfig};
use crate::intent::{execute_intent, ActionIntent, IntentKind, IntentMeta, NotificationsMeta};
use crate::state::ProvidersState;
use crate::store::Store;

/// Collaborator failure as carried by catalog and update failure events.
fn api_error_of(err: &Error) -> ApiError {
    err.api_error()
        .cloned()
        .unwrap_or_else(|| ApiError::with_detail(err.to_string()))
}

/// Drives list loads, catalog loads and mutations for the sources console.
pub struct SourcesOrchestrator {
    api: Arc<dyn SourcesApi>,
    store: Arc<Store>,
    config: OrchestratorConfig,
}

impl SourcesOrchestrator {
    /// Build an orchestrator with its own store. Fails on an invalid `config`.
    pub fn new(api: Arc<dyn SourcesApi>, config: OrchestratorConfig) -> ConfigResult<Self> {
        let store = Arc::new(Store::new(&config)?);
        Ok(Self::with_store(api, store, config))
    }

    /// Share an existing store, e.g. between several orchestrators.
    pub fn with_store(api: Arc<dyn SourcesApi>, store: Arc<Store>, config: OrchestratorConfig) -> Self {
        Self { api, store, config }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Snapshot of the shared state.
    pub fn state(&self) -> ProvidersState {
        self.store.state()
    }

    // =========================================================================
    // LIST
    // =========================================================================

    /// Load the current page and the total count for the current filter.
    ///
    /// PENDING is dispatched before either request is issued. The count lands
    /// in state as soon as it resolves; FULFILLED waits for both requests.
    /// Failures are recorded as a normalized [`sources_core::LoadError`] and
    /// raise no notification.
    #[instrument(
        skip_all,
        fields(
            subsystem = logging::ACTIONS,
            op = logging::OP_LOAD_ENTITIES,
            request_seq = tracing::field::Empty
        )
    )]
    pub async fn load_entities(&self, options: LoadOptions, pending_options: LoadOptions) -> Result<()> {
        let (seq, query) = self.store.begin_load(pending_options);
        Span::current().record("request_seq", seq);

        let page = self.api.load_entities(&query);
        let count = async {
            let response = self.api.load_count_of_sources(&query.filter_value).await?;
            self.store.dispatch(StoreEvent::SetCount {
                seq,
                count: response.meta.count,
            });
            Ok::<_, Error>(())
        };

        match future::try_join(page, count).await {
            Ok((page, ())) => {
                debug!(
                    request_seq = seq,
                    sources = page.sources.len(),
                    "Loaded source page"
                );
                self.store.dispatch(StoreEvent::LoadEntitiesFulfilled {
                    seq,
                    sources: page.sources,
                    options,
                });
                Ok(())
            }
            Err(err) => {
                let error = api_error_of(&err).normalized(self.config.load_error_title.as_str());
                warn!(request_seq = seq, error = %err, "Loading sources failed");
                self.store
                    .dispatch(StoreEvent::LoadEntitiesRejected { seq, error });
                Err(err)
            }
        }
    }

    /// Change the sort and reload with the new parameters.
    pub async fn sort_entities(&self, column: &str, direction: SortDirection) -> Result<()> {
        self.store.dispatch(StoreEvent::SortEntities {
            column: column.to_string(),
            direction,
        });
        self.load_entities(LoadOptions::default(), LoadOptions::default())
            .await
    }

    /// Change page and page size and reload with the new parameters.
    pub async fn page_and_size(&self, page: usize, size: usize) -> Result<()> {
        self.store.dispatch(StoreEvent::PageAndSize { page, size });
        self.load_entities(LoadOptions::default(), LoadOptions::default())
            .await
    }

    /// Set the list filter. Does not reload.
    pub fn filter_providers(&self, value: &str) {
        self.store.dispatch(StoreEvent::FilterProviders {
            value: value.to_string(),
        });
    }

    /// Set the column the list filter applies to. Does not reload.
    pub fn set_provider_filter_column(&self, column: &str) {
        self.store.dispatch(StoreEvent::SetFilterColumn {
            column: column.to_string(),
        });
    }

    // =========================================================================
    // CATALOGS
    // =========================================================================

    #[instrument(skip_all, fields(subsystem = logging::ACTIONS, op = logging::OP_LOAD_SOURCE_TYPES))]
    pub async fn load_source_types(&self) -> Result<()> {
        self.store.dispatch(StoreEvent::LoadSourceTypesPending);
        match self.api.load_source_types().await {
            Ok(source_types) => {
                debug!(count = source_types.len(), "Loaded source types");
                self.store
                    .dispatch(StoreEvent::LoadSourceTypesFulfilled { source_types });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Loading source types failed");
                self.store.dispatch(StoreEvent::LoadSourceTypesRejected {
                    error: api_error_of(&err),
                });
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(subsystem = logging::ACTIONS, op = logging::OP_LOAD_APP_TYPES))]
    pub async fn load_app_types(&self) -> Result<()> {
        self.store.dispatch(StoreEvent::LoadAppTypesPending);
        match self.api.load_app_types().await {
            Ok(response) => {
                debug!(count = response.data.len(), "Loaded application types");
                self.store.dispatch(StoreEvent::LoadAppTypesFulfilled {
                    app_types: response.data,
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Loading application types failed");
                self.store.dispatch(StoreEvent::LoadAppTypesRejected {
                    error: api_error_of(&err),
                });
                Err(err)
            }
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Delete a source, refresh the list, then notify with `title`.
    ///
    /// A failed deletion is recorded as REJECTED without a notification. A
    /// failed refresh is recorded by the list load itself and does not turn
    /// the removal into a failure.
    #[instrument(
        skip_all,
        fields(subsystem = logging::ACTIONS, op = logging::OP_REMOVE_SOURCE, source_id = %source_id)
    )]
    pub async fn remove_source(&self, source_id: &str, title: &str) -> Result<()> {
        self.store.dispatch(StoreEvent::RemoveSourcePending {
            source_id: source_id.to_string(),
        });

        if let Err(err) = self.api.remove_source(source_id).await {
            warn!(error = %err, "Removing source failed");
            self.store.dispatch(StoreEvent::RemoveSourceRejected {
                source_id: source_id.to_string(),
            });
            return Err(err);
        }

        if let Err(err) = self
            .load_entities(LoadOptions::default(), LoadOptions::loaded())
            .await
        {
            debug!(error = %err, "List refresh after source removal failed");
        }

        self.store.dispatch(StoreEvent::RemoveSourceFulfilled {
            source_id: source_id.to_string(),
        });
        info!("Source removed");
        self.store.dispatch(StoreEvent::AddNotification {
            notification: Notification::new(title, NotificationVariant::Success, None, None),
        });
        Ok(())
    }

    /// Build the deferred removal of an application.
    ///
    /// The intent notifies on success only; nothing is called until it is
    /// passed to [`execute_intent`].
    pub fn remove_application_intent<'a>(
        &'a self,
        app_id: &'a str,
        source_id: &str,
        success_title: &str,
        error_title: &'a str,
    ) -> ActionIntent<'a> {
        ActionIntent {
            kind: IntentKind::RemoveApplication,
            meta: IntentMeta {
                app_id: app_id.to_string(),
                source_id: source_id.to_string(),
                notifications: NotificationsMeta {
                    fulfilled: Some(NotificationDescriptor::success(success_title)),
                    rejected: None,
                },
            },
            payload: self.api.delete_application(app_id, error_title),
        }
    }

    #[instrument(
        skip_all,
        fields(subsystem = logging::ACTIONS, op = logging::OP_REMOVE_APPLICATION, app_id = %app_id, source_id = %source_id)
    )]
    pub async fn remove_application(
        &self,
        app_id: &str,
        source_id: &str,
        success_title: &str,
        error_title: &str,
    ) -> Result<()> {
        let intent = self.remove_application_intent(app_id, source_id, success_title, error_title);
        execute_intent(&self.store, intent).await
    }

    /// Save an edited source and notify with `title` and `description`.
    ///
    /// Failure is recorded as [`StoreEvent::UpdateSourceFailed`] only.
    #[instrument(
        skip_all,
        fields(subsystem = logging::ACTIONS, op = logging::OP_UPDATE_SOURCE, source_id = %source.id)
    )]
    pub async fn update_source(
        &self,
        source: &Source,
        form_data: &JsonValue,
        title: &str,
        description: Option<&str>,
        error_titles: &UpdateErrorTitles,
    ) -> Result<()> {
        match self.api.update_source(source, form_data, error_titles).await {
            Ok(()) => {
                info!("Source updated");
                self.store.dispatch(StoreEvent::AddNotification {
                    notification: Notification::new(
                        title,
                        NotificationVariant::Success,
                        description.map(String::from),
                        None,
                    ),
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Updating source failed");
                self.store.dispatch(StoreEvent::UpdateSourceFailed {
                    error: api_error_of(&err),
                });
                Err(err)
            }
        }
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Enqueue a notification and return its generated id.
    pub fn add_message(
        &self,
        title: &str,
        variant: NotificationVariant,
        description: Option<&str>,
        custom_id: Option<&str>,
    ) -> String {
        let notification = Notification::new(
            title,
            variant,
            description.map(String::from),
            custom_id.map(String::from),
        );
        let id = notification.id.clone();
        self.store
            .dispatch(StoreEvent::AddNotification { notification });
        id
    }

    /// Dequeue notifications whose id or custom id is `id`.
    pub fn remove_message(&self, id: &str) {
        self.store
            .dispatch(StoreEvent::RemoveNotification { id: id.to_string() });
    }

    // =========================================================================
    // ADD APPLICATION WIZARD
    // =========================================================================

    /// Record the application chosen for a source in the add wizard.
    pub fn add_app_to_source(&self, source_id: &str, app: ApplicationType) {
        self.store.dispatch(StoreEvent::AddAppToSource {
            source_id: source_id.to_string(),
            app,
        });
    }

    /// Keep the wizard's form values so it can reopen where it left off.
    pub fn undo_add_source(&self, values: JsonValue) {
        self.store.dispatch(StoreEvent::UndoAddSource { values });
    }

    pub fn clear_add_source(&self) {
        self.store.dispatch(StoreEvent::ClearAddSource);
    }
}
