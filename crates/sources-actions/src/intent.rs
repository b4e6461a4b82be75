//! Deferred actions with lifecycle metadata.
//!
//! An [`ActionIntent`] pairs a not-yet-started remote call with the metadata
//! needed to dispatch its PENDING/FULFILLED/REJECTED events and optional
//! notifications. [`execute_intent`] is the one place that runs them.

use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{info, warn};

use sources_core::{logging, Notification, NotificationDescriptor, Result, StoreEvent};

use crate::store::Store;

/// Notifications to enqueue on each outcome. `None` means no notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationsMeta {
    pub fulfilled: Option<NotificationDescriptor>,
    pub rejected: Option<NotificationDescriptor>,
}

/// Entity identifiers and notifications attached to an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentMeta {
    pub app_id: String,
    pub source_id: String,
    pub notifications: NotificationsMeta,
}

/// Kind of deferred action, selecting its lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    RemoveApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Fulfilled,
    Rejected,
}

/// A deferred remote call plus its lifecycle metadata.
///
/// The payload future does nothing until [`execute_intent`] awaits it.
pub struct ActionIntent<'a> {
    pub kind: IntentKind,
    pub meta: IntentMeta,
    pub payload: BoxFuture<'a, Result<()>>,
}

impl std::fmt::Debug for ActionIntent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionIntent")
            .field("kind", &self.kind)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl IntentMeta {
    fn event(&self, kind: IntentKind, phase: Phase) -> StoreEvent {
        let app_id = self.app_id.clone();
        let source_id = self.source_id.clone();
        match (kind, phase) {
            (IntentKind::RemoveApplication, Phase::Pending) => {
                StoreEvent::RemoveApplicationPending { app_id, source_id }
            }
            (IntentKind::RemoveApplication, Phase::Fulfilled) => {
                StoreEvent::RemoveApplicationFulfilled { app_id, source_id }
            }
            (IntentKind::RemoveApplication, Phase::Rejected) => {
                StoreEvent::RemoveApplicationRejected { app_id, source_id }
            }
        }
    }
}

/// Run an intent: PENDING, await the payload, then FULFILLED or REJECTED
/// followed by the matching notification if one is declared.
///
/// The payload's error is returned after REJECTED is dispatched.
pub async fn execute_intent(store: &Store, intent: ActionIntent<'_>) -> Result<()> {
    let ActionIntent {
        kind,
        meta,
        payload,
    } = intent;

    store.dispatch(meta.event(kind, Phase::Pending));

    match payload.await {
        Ok(()) => {
            store.dispatch(meta.event(kind, Phase::Fulfilled));
            info!(
                subsystem = logging::ACTIONS,
                app_id = %meta.app_id,
                source_id = %meta.source_id,
                "Intent fulfilled"
            );
            if let Some(descriptor) = &meta.notifications.fulfilled {
                store.dispatch(StoreEvent::AddNotification {
                    notification: Notification::from_descriptor(descriptor),
                });
            }
            Ok(())
        }
        Err(err) => {
            store.dispatch(meta.event(kind, Phase::Rejected));
            warn!(
                subsystem = logging::ACTIONS,
                app_id = %meta.app_id,
                source_id = %meta.source_id,
                error = %err,
                "Intent rejected"
            );
            if let Some(descriptor) = &meta.notifications.rejected {
                store.dispatch(StoreEvent::AddNotification {
                    notification: Notification::from_descriptor(descriptor),
                });
            }
            Err(err)
        }
    }
}
