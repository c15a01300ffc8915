//! Timers - Repeating intervals on one logical thread
//!
//! The host advances a virtual clock; every interval that falls due inside
//! the advanced window fires once per period, in due-time order. Intervals
//! due at the same instant fire in the order they were armed.

use std::time::Duration;

/// Which game callback an interval drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    RaceTick,
    RoadScroll,
    Countdown,
    OpponentSpeed,
    OpponentLane,
    PowerUpSpawn,
}

impl TimerKind {
    pub fn period(self) -> Duration {
        match self {
            TimerKind::RaceTick | TimerKind::RoadScroll => Duration::from_millis(100),
            TimerKind::Countdown => Duration::from_secs(1),
            TimerKind::OpponentSpeed => Duration::from_secs(2),
            TimerKind::OpponentLane | TimerKind::PowerUpSpawn => Duration::from_secs(3),
        }
    }
}

/// Intervals armed for an active race, in firing priority
pub const RACE_TIMERS: [TimerKind; 6] = [
    TimerKind::RaceTick,
    TimerKind::RoadScroll,
    TimerKind::Countdown,
    TimerKind::OpponentSpeed,
    TimerKind::OpponentLane,
    TimerKind::PowerUpSpawn,
];

#[derive(Debug, Clone)]
struct Interval {
    kind: TimerKind,
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    now: Duration,
    intervals: Vec<Interval>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an interval whose first firing is one period from now
    pub fn arm(&mut self, kind: TimerKind, period: Duration) {
        assert!(!period.is_zero(), "timer period must be non-zero");
        self.intervals.push(Interval {
            kind,
            period,
            next_due: self.now + period,
        });
    }

    /// Disarm everything and rewind the clock
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.now = Duration::ZERO;
    }

    /// Replace whatever is armed with the full set of race intervals
    pub fn arm_race(&mut self) {
        self.clear();
        for kind in RACE_TIMERS {
            self.arm(kind, kind.period());
        }
    }

    pub fn is_armed(&self) -> bool {
        !self.intervals.is_empty()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Pop the next interval due at or before `deadline`, moving the clock to it
    pub fn poll(&mut self, deadline: Duration) -> Option<TimerKind> {
        let mut next: Option<usize> = None;
        for (i, interval) in self.intervals.iter().enumerate() {
            if interval.next_due > deadline {
                continue;
            }
            match next {
                Some(j) if self.intervals[j].next_due <= interval.next_due => {}
                _ => next = Some(i),
            }
        }

        let interval = &mut self.intervals[next?];
        self.now = interval.next_due;
        interval.next_due += interval.period;
        Some(interval.kind)
    }

    /// Move the clock to `deadline` once everything due has been polled
    pub fn settle(&mut self, deadline: Duration) {
        if self.is_armed() && deadline > self.now {
            self.now = deadline;
        }
    }
}
