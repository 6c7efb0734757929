//! Wall-clock timestamp representation.
//!
//! Milliseconds since the Unix epoch are the canonical unit so that
//! timestamps serialize identically across formats and languages.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (UTC).
///
/// Signed so that pre-epoch values from a misconfigured printer clock
/// still order correctly instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create from milliseconds since the epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Create from whole seconds since the epoch, clamping at the
    /// representable range.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Get the value in milliseconds.
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Get the value in whole seconds (floored).
    pub const fn as_secs(&self) -> i64 {
        self.0.div_euclid(1000)
    }

    /// Add a duration, clamping at the representable maximum.
    pub fn saturating_add(self, d: Duration) -> Self {
        Self(self.0.saturating_add(duration_millis(d)))
    }

    /// Subtract a duration, clamping at the representable minimum.
    pub fn saturating_sub(self, d: Duration) -> Self {
        Self(self.0.saturating_sub(duration_millis(d)))
    }

    /// Elapsed time from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        let delta = self.0.checked_sub(earlier.0)?;
        u64::try_from(delta).ok().map(Duration::from_millis)
    }

    /// Absolute distance between two timestamps.
    pub fn abs_diff(&self, other: Timestamp) -> Duration {
        Duration::from_millis(self.0.abs_diff(other.0))
    }
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(duration_millis(after)),
            Err(before) => Self(-duration_millis(before.duration())),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        let magnitude = Duration::from_millis(t.0.unsigned_abs());
        if t.0 >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_round_trip() {
        let t = Timestamp::from_millis(1_700_000_000_123);
        let st: SystemTime = t.into();
        assert_eq!(Timestamp::from(st), t);
    }

    #[test]
    fn pre_epoch_values_are_negative() {
        let st = UNIX_EPOCH - Duration::from_secs(2);
        assert_eq!(Timestamp::from(st), Timestamp::from_millis(-2000));
        assert_eq!(Timestamp::from_millis(-1).as_secs(), -1);
    }

    #[test]
    fn duration_since_is_none_when_reversed() {
        let a = Timestamp::from_secs(10);
        let b = Timestamp::from_secs(12);
        assert_eq!(b.duration_since(a), Some(Duration::from_secs(2)));
        assert_eq!(a.duration_since(b), None);
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = Timestamp::from_millis(500);
        let b = Timestamp::from_millis(1750);
        assert_eq!(a.abs_diff(b), Duration::from_millis(1250));
        assert_eq!(b.abs_diff(a), Duration::from_millis(1250));
    }

    #[test]
    fn from_secs_clamps_instead_of_overflowing() {
        assert_eq!(Timestamp::from_secs(i64::MAX).as_millis(), i64::MAX);
        assert_eq!(Timestamp::from_secs(i64::MIN).as_millis(), i64::MIN);
        assert_eq!(Timestamp::from_secs(-3).as_millis(), -3000);
    }

    #[test]
    fn saturating_arithmetic_clamps() {
        let t = Timestamp::from_millis(i64::MAX - 1);
        assert_eq!(t.saturating_add(Duration::from_secs(1)).as_millis(), i64::MAX);

        let t = Timestamp::from_millis(1000);
        assert_eq!(
            t.saturating_sub(Duration::from_millis(250)),
            Timestamp::from_millis(750)
        );
    }

    #[test]
    fn ordering() {
        let a = Timestamp::from_millis(100);
        let b = Timestamp::from_millis(200);
        assert!(a < b);
        assert_eq!(a.max(b), b);
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
    }
}
