//! Arriving guests.
//!
//! A guest is identified by a caller-supplied string id and arrives at an
//! integer minute offset from a shared reference time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single guest waiting to be picked up.
///
/// # Examples
/// ```
/// use shuttle_core::Guest;
///
/// let guest = Guest::new("g1", "Grandma", 30);
/// assert_eq!(guest.guest_id, "g1");
/// assert_eq!(guest.arrival_min, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Guest {
    /// Unique identifier supplied by the caller.
    pub guest_id: String,
    /// Display name, carried through to the plan untouched.
    pub name: String,
    /// Arrival time in minutes from the reference time.
    pub arrival_min: i64,
}

impl Guest {
    /// Construct a guest.
    #[must_use]
    pub fn new(guest_id: impl Into<String>, name: impl Into<String>, arrival_min: i64) -> Self {
        Self {
            guest_id: guest_id.into(),
            name: name.into(),
            arrival_min,
        }
    }
}
