//! Parking stay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One parking session.
///
/// `exit` is `None` while the vehicle is still parked. Callers that want a
/// running total pass "now" through [`Stay::billed_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub entry: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<DateTime<Utc>>,
}

impl Stay {
    pub fn new(entry: DateTime<Utc>, exit: Option<DateTime<Utc>>) -> Self {
        Self { entry, exit }
    }

    /// Build a stay from epoch milliseconds, as delivered by the reservations API.
    ///
    /// Returns `None` if either instant is outside chrono's representable range.
    pub fn from_millis(entry_ms: i64, exit_ms: Option<i64>) -> Option<Self> {
        let entry = DateTime::from_timestamp_millis(entry_ms)?;
        let exit = match exit_ms {
            Some(ms) => Some(DateTime::from_timestamp_millis(ms)?),
            None => None,
        };
        Some(Self { entry, exit })
    }

    pub fn is_active(&self) -> bool {
        self.exit.is_none()
    }

    /// Exit instant to bill against: the recorded exit, or `now` for an active stay.
    pub fn billed_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.exit.unwrap_or(now)
    }
}
