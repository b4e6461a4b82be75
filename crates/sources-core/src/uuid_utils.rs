//! UUIDv7 helpers for time-ordered identifiers (event ids, notification ids).

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// ```
/// use sources_core::uuid_utils::new_v7;
///
/// assert_eq!(new_v7().get_version_num(), 7);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}
