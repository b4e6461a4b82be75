//! Structured logging vocabulary for the sources console.
//!
//! Every span and event carries `subsystem` and `op` fields whose values come
//! from the constants below, so log queries can filter on stable names across
//! crates. Entity fields use fixed names: `source_id`, `app_id`, `auth_id`,
//! `auth_type`, `source_type`, `event_type`, `request_seq`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Data-integrity violations (inconsistent catalogs) |
//! | WARN  | Rejected collaborator calls, dropped stale responses |
//! | INFO  | Completed mutations (source removed, application removed) |
//! | DEBUG | Dispatched events, decision points, step generation |
//! | TRACE | Per-item iteration (options, sub-forms) |

// ─── Subsystems (`subsystem` field) ────────────────────────────────────────

/// State store: reducer and event bus.
pub const STORE: &str = "store";

/// Mutation orchestration against the remote API.
pub const ACTIONS: &str = "actions";

/// Wizard step generation.
pub const WIZARD: &str = "wizard";

// ─── Operations (`op` field) ───────────────────────────────────────────────

pub const OP_DISPATCH: &str = "dispatch";
pub const OP_LOAD_ENTITIES: &str = "load_entities";
pub const OP_LOAD_SOURCE_TYPES: &str = "load_source_types";
pub const OP_LOAD_APP_TYPES: &str = "load_app_types";
pub const OP_REMOVE_SOURCE: &str = "remove_source";
pub const OP_REMOVE_APPLICATION: &str = "remove_application";
pub const OP_UPDATE_SOURCE: &str = "update_source";
pub const OP_SELECT_AUTHENTICATION: &str = "select_authentication_step";
