//! Store event types, envelope schema, and event bus.
//!
//! Every state change in the console goes through a [`StoreEvent`]: the
//! reducer in `sources-actions` matches them exhaustively, and the
//! [`EventBus`] rebroadcasts each one, wrapped in an [`EventEnvelope`], to
//! downstream consumers (notification display, error banners, telemetry).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{ApiError, LoadError};
use crate::models::{
    ApplicationType, LoadOptions, Notification, SortDirection, Source, SourceType,
};

// ============================================================================
// Store Event
// ============================================================================

/// Lifecycle and state-transition events for the sources console.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"RemoveSourcePending","source_id":"7"}`.
///
/// List events carry the request sequence number assigned when the load
/// started so that responses for superseded requests can be recognized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    LoadEntitiesPending {
        seq: u64,
        options: LoadOptions,
    },
    LoadEntitiesFulfilled {
        seq: u64,
        sources: Vec<Source>,
        options: LoadOptions,
    },
    LoadEntitiesRejected {
        seq: u64,
        error: LoadError,
    },
    /// Total count for the current filter; lands as soon as the count resolves.
    SetCount {
        seq: u64,
        count: usize,
    },
    LoadSourceTypesPending,
    LoadSourceTypesFulfilled {
        source_types: Vec<SourceType>,
    },
    LoadSourceTypesRejected {
        error: ApiError,
    },
    LoadAppTypesPending,
    LoadAppTypesFulfilled {
        app_types: Vec<ApplicationType>,
    },
    LoadAppTypesRejected {
        error: ApiError,
    },
    SortEntities {
        column: String,
        direction: SortDirection,
    },
    PageAndSize {
        page: usize,
        size: usize,
    },
    FilterProviders {
        value: String,
    },
    SetFilterColumn {
        column: String,
    },
    RemoveSourcePending {
        source_id: String,
    },
    RemoveSourceFulfilled {
        source_id: String,
    },
    RemoveSourceRejected {
        source_id: String,
    },
    RemoveApplicationPending {
        app_id: String,
        source_id: String,
    },
    RemoveApplicationFulfilled {
        app_id: String,
        source_id: String,
    },
    RemoveApplicationRejected {
        app_id: String,
        source_id: String,
    },
    /// Payload-only failure record for a source update; not part of a
    /// PENDING/FULFILLED/REJECTED triple.
    UpdateSourceFailed {
        error: ApiError,
    },
    AddNotification {
        notification: Notification,
    },
    /// Remove a notification by generated id or custom id.
    RemoveNotification {
        id: String,
    },
    AddAppToSource {
        source_id: String,
        app: ApplicationType,
    },
    UndoAddSource {
        values: JsonValue,
    },
    ClearAddSource,
}

impl StoreEvent {
    /// Stable event type identifier.
    pub fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::LoadEntitiesPending { .. } => "LOAD_ENTITIES_PENDING",
            StoreEvent::LoadEntitiesFulfilled { .. } => "LOAD_ENTITIES_FULFILLED",
            StoreEvent::LoadEntitiesRejected { .. } => "LOAD_ENTITIES_REJECTED",
            StoreEvent::SetCount { .. } => "SET_COUNT",
            StoreEvent::LoadSourceTypesPending => "LOAD_SOURCE_TYPES_PENDING",
            StoreEvent::LoadSourceTypesFulfilled { .. } => "LOAD_SOURCE_TYPES_FULFILLED",
            StoreEvent::LoadSourceTypesRejected { .. } => "LOAD_SOURCE_TYPES_REJECTED",
            StoreEvent::LoadAppTypesPending => "LOAD_APP_TYPES_PENDING",
            StoreEvent::LoadAppTypesFulfilled { .. } => "LOAD_APP_TYPES_FULFILLED",
            StoreEvent::LoadAppTypesRejected { .. } => "LOAD_APP_TYPES_REJECTED",
            StoreEvent::SortEntities { .. } => "SORT_ENTITIES",
            StoreEvent::PageAndSize { .. } => "PAGE_AND_SIZE",
            StoreEvent::FilterProviders { .. } => "FILTER_PROVIDERS",
            StoreEvent::SetFilterColumn { .. } => "SET_FILTER_COLUMN",
            StoreEvent::RemoveSourcePending { .. } => "REMOVE_SOURCE_PENDING",
            StoreEvent::RemoveSourceFulfilled { .. } => "REMOVE_SOURCE_FULFILLED",
            StoreEvent::RemoveSourceRejected { .. } => "REMOVE_SOURCE_REJECTED",
            StoreEvent::RemoveApplicationPending { .. } => "REMOVE_APPLICATION_PENDING",
            StoreEvent::RemoveApplicationFulfilled { .. } => "REMOVE_APPLICATION_FULFILLED",
            StoreEvent::RemoveApplicationRejected { .. } => "REMOVE_APPLICATION_REJECTED",
            StoreEvent::UpdateSourceFailed { .. } => "UPDATE_SOURCE_FAILED",
            StoreEvent::AddNotification { .. } => "ADD_NOTIFICATION",
            StoreEvent::RemoveNotification { .. } => "REMOVE_NOTIFICATION",
            StoreEvent::AddAppToSource { .. } => "ADD_APP_TO_SOURCE",
            StoreEvent::UndoAddSource { .. } => "UNDO_ADD_SOURCE",
            StoreEvent::ClearAddSource => "CLEAR_ADD_SOURCE",
        }
    }

    /// Returns the entity type this event relates to.
    pub fn entity_type(&self) -> Option<&'static str> {
        match self {
            StoreEvent::RemoveSourcePending { .. }
            | StoreEvent::RemoveSourceFulfilled { .. }
            | StoreEvent::RemoveSourceRejected { .. }
            | StoreEvent::AddAppToSource { .. } => Some("source"),
            StoreEvent::RemoveApplicationPending { .. }
            | StoreEvent::RemoveApplicationFulfilled { .. }
            | StoreEvent::RemoveApplicationRejected { .. } => Some("application"),
            StoreEvent::AddNotification { .. } | StoreEvent::RemoveNotification { .. } => {
                Some("notification")
            }
            _ => None,
        }
    }

    /// Returns the primary entity ID this event relates to.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            StoreEvent::RemoveSourcePending { source_id }
            | StoreEvent::RemoveSourceFulfilled { source_id }
            | StoreEvent::RemoveSourceRejected { source_id }
            | StoreEvent::AddAppToSource { source_id, .. } => Some(source_id.as_str()),
            StoreEvent::RemoveApplicationPending { app_id, .. }
            | StoreEvent::RemoveApplicationFulfilled { app_id, .. }
            | StoreEvent::RemoveApplicationRejected { app_id, .. } => Some(app_id.as_str()),
            StoreEvent::AddNotification { notification } => Some(notification.id.as_str()),
            StoreEvent::RemoveNotification { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Event Envelope
// ============================================================================

/// Self-describing wrapper around a dispatched [`StoreEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Stable event type identifier (e.g. `"REMOVE_SOURCE_PENDING"`).
    pub event_type: String,
    /// When the event was dispatched (UTC).
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub payload: StoreEvent,
}

impl EventEnvelope {
    pub fn new(event: StoreEvent) -> Self {
        Self {
            event_id: crate::uuid_utils::new_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: Utc::now(),
            entity_type: event.entity_type().map(String::from),
            entity_id: event.entity_id().map(String::from),
            payload: event,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus for distributing store events to multiple consumers.
///
/// Uses `tokio::sync::broadcast`. Slow receivers that fall behind receive a
/// `Lagged` error and miss events; the store itself never depends on delivery.
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Panics if `capacity` is 0; [`EventBus::default`] is always valid.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently without subscribers.
    pub fn emit(&self, event: StoreEvent) -> EventEnvelope {
        let envelope = EventEnvelope::new(event);
        tracing::trace!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope.clone());
        envelope
    }

    /// Subscribe to receive enveloped events. Each subscriber gets its own stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
