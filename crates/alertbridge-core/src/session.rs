//! Trading session utilities.
//!
//! Classifies an instant as regular or extended US equity trading hours.
//! The classification is done in exchange-local time (`America/New_York`),
//! so DST transitions are handled by the time zone database rather than by
//! fixed UTC offsets.
//!
//! Session is re-evaluated for every order. Time is read through the
//! [`Clock`] trait so callers and tests can pin arbitrary instants.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Exchange time zone used for session boundaries.
pub const EXCHANGE_TZ: Tz = New_York;

/// Regular session open, seconds after exchange-local midnight (09:30:00).
const REGULAR_OPEN_SECS: u32 = 9 * 3600 + 30 * 60;

/// Regular session close, seconds after exchange-local midnight (16:00:00).
const REGULAR_CLOSE_SECS: u32 = 16 * 3600;

/// Trading session classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    /// Monday–Friday 09:30:00–16:00:00 exchange time, both ends inclusive.
    Regular,
    /// Everything else: pre-market, after-hours, overnight and weekends.
    Extended,
}

impl Session {
    #[must_use]
    pub fn is_regular(&self) -> bool {
        matches!(self, Self::Regular)
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "Regular"),
            Self::Extended => write!(f, "Extended"),
        }
    }
}

/// Get the trading session at a given UTC instant.
#[must_use]
pub fn session_at(dt: DateTime<Utc>) -> Session {
    let local = dt.with_timezone(&EXCHANGE_TZ);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return Session::Extended;
    }

    // Whole seconds only: every instant within one second classifies alike.
    let secs = local.num_seconds_from_midnight();

    if (REGULAR_OPEN_SECS..=REGULAR_CLOSE_SECS).contains(&secs) {
        Session::Regular
    } else {
        Session::Extended
    }
}

/// Get the trading session for the clock's current instant.
#[must_use]
pub fn current_session(clock: &dyn Clock) -> Session {
    session_at(clock.now())
}

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to an instant that tests can move.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(RwLock::new(instant)),
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.write() = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read()
    }
}
