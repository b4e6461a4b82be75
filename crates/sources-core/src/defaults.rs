//! Centralized default constants for the sources console.
//!
//! Every crate references these instead of defining its own magic values.

// =============================================================================
// LISTING
// =============================================================================

/// Default number of sources per page.
pub const PAGE_SIZE: usize = 10;

/// Default (1-based) page number.
pub const PAGE_NUMBER: usize = 1;

/// Default sort column.
pub const SORT_BY: &str = "created_at";

/// Default filter column.
pub const FILTER_COLUMN: &str = "name";

// =============================================================================
// MESSAGES
// =============================================================================

/// Title stored with a rejected list load.
pub const LOAD_ENTITIES_ERROR_TITLE: &str = "Fetching data failed, try refresh page";

// =============================================================================
// WIZARD
// =============================================================================

/// Name of the authentication selection step.
pub const SELECT_AUTHENTICATION_STEP: &str = "selectAuthentication";

/// Option value prefix meaning "define a new authentication of this type".
pub const NEW_AUTHENTICATION_PREFIX: &str = "new-";

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast buffer capacity for the store event bus.
///
/// Recommended: 256 for production, 32 for tests.
pub const EVENT_BUS_CAPACITY: usize = 256;
