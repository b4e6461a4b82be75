//! Event-driven store: reducer state behind a lock plus the event bus.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use sources_core::{logging, EntitiesQuery, EventBus, EventEnvelope, LoadOptions, StoreEvent};

use crate::config::{ConfigResult, OrchestratorConfig};
use crate::state::ProvidersState;

/// Holds [`ProvidersState`] and rebroadcasts every applied event.
///
/// Dispatch is synchronous: the state is updated before `dispatch` returns,
/// so an action's lifecycle events are observed in dispatch order.
pub struct Store {
    state: RwLock<ProvidersState>,
    bus: EventBus,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_state(ProvidersState::default(), EventBus::default())
    }
}

impl Store {
    /// Build a store from a validated `config`.
    pub fn new(config: &OrchestratorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::with_state(
            ProvidersState::from_config(config),
            EventBus::new(config.event_bus_capacity),
        ))
    }

    pub fn with_state(state: ProvidersState, bus: EventBus) -> Self {
        Self {
            state: RwLock::new(state),
            bus,
        }
    }

    /// Reduce `event` into the state, then broadcast it.
    ///
    /// Events answering a superseded list request are neither applied nor
    /// broadcast. Returns the envelope of a broadcast event.
    pub fn dispatch(&self, event: StoreEvent) -> Option<EventEnvelope> {
        let applied = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.apply(&event)
        };

        if !applied {
            warn!(
                subsystem = logging::STORE,
                op = logging::OP_DISPATCH,
                event_type = event.event_type(),
                "Dropped response for superseded list request"
            );
            return None;
        }

        debug!(
            subsystem = logging::STORE,
            op = logging::OP_DISPATCH,
            event_type = event.event_type(),
            entity_id = event.entity_id(),
            "Dispatched event"
        );
        Some(self.bus.emit(event))
    }

    /// Start a list load.
    ///
    /// Allocates the request sequence number, snapshots the query and applies
    /// `LOAD_ENTITIES_PENDING` under one write lock, so a higher sequence
    /// number always carries the query current at its allocation.
    pub fn begin_load(&self, options: LoadOptions) -> (u64, EntitiesQuery) {
        let (seq, query, event) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let seq = state.latest_request_seq + 1;
            let event = StoreEvent::LoadEntitiesPending { seq, options };
            state.apply(&event);
            (seq, state.query(), event)
        };

        debug!(
            subsystem = logging::STORE,
            op = logging::OP_DISPATCH,
            event_type = event.event_type(),
            request_seq = seq,
            "Dispatched event"
        );
        self.bus.emit(event);
        (seq, query)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ProvidersState {
        self.read(Clone::clone)
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&ProvidersState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Receive every event dispatched from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }
}
