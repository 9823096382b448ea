use std::{
    fmt,
    ops::{Add, Div, Neg, Sub},
    time::Duration,
};

/// An instant on one of the two clocks involved in congestion control: the
/// sender's clock for departure and feedback-arrival times, the receiver's
/// clock for packet-arrival times. The clocks are not synchronized, so only
/// instants taken from the same clock may be subtracted.
///
/// The zero value marks an unset timestamp (e.g. the arrival time of a packet
/// that never arrived).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub const fn from_micros(micros: i64) -> Timestamp {
        Timestamp(micros)
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> Timestamp {
        Timestamp(millis * 1000)
    }

    #[inline]
    pub const fn from_secs(secs: i64) -> Timestamp {
        Timestamp(secs * 1_000_000)
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    #[inline]
    fn sub(self, rhs: Timestamp) -> TimeDelta {
        TimeDelta(self.0 - rhs.0)
    }
}

impl Add<TimeDelta> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: TimeDelta) -> Timestamp {
        Timestamp(self.0 + rhs.0)
    }
}

impl Sub<TimeDelta> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> Timestamp {
        Timestamp(self.0 - rhs.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// A signed duration between two [`Timestamp`]s of the same clock.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeDelta(i64);

impl TimeDelta {
    pub const ZERO: TimeDelta = TimeDelta(0);

    #[inline]
    pub const fn from_micros(micros: i64) -> TimeDelta {
        TimeDelta(micros)
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> TimeDelta {
        TimeDelta(millis * 1000)
    }

    #[inline]
    pub const fn from_secs(secs: i64) -> TimeDelta {
        TimeDelta(secs * 1_000_000)
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl From<Duration> for TimeDelta {
    #[inline]
    fn from(d: Duration) -> TimeDelta {
        TimeDelta(d.as_micros() as i64)
    }
}

impl Add for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn add(self, rhs: TimeDelta) -> TimeDelta {
        TimeDelta(self.0 + rhs.0)
    }
}

impl Sub for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> TimeDelta {
        TimeDelta(self.0 - rhs.0)
    }
}

impl Neg for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn neg(self) -> TimeDelta {
        TimeDelta(-self.0)
    }
}

impl Div<i64> for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn div(self, rhs: i64) -> TimeDelta {
        TimeDelta(self.0 / rhs)
    }
}

impl fmt::Debug for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}
