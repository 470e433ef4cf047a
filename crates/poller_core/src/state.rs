use std::fmt;
use std::time::{Duration, Instant};

use crate::{ContentDigest, RunSummary, SeenSet, Uniqueness};

/// Budget for one run: whichever limit is hit first ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub run_duration: Duration,
    pub max_unique: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            run_duration: Duration::from_secs(10 * 60),
            max_unique: 20,
        }
    }
}

/// Stand-in deadline when the configured duration cannot be represented.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TimeLimit,
    QuotaReached,
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TimeLimit => write!(f, "time limit reached"),
            StopReason::QuotaReached => write!(f, "collected enough unique responses"),
            StopReason::Interrupted => write!(f, "stopped by user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Stopped(StopReason),
}

/// Everything the poll loop mutates: limits, the deadline, counters and the seen set.
///
/// Time is always passed in by the caller so the deadline is compared against
/// a single clock.
#[derive(Debug, Clone)]
pub struct RunState {
    limits: RunLimits,
    started: Instant,
    deadline: Instant,
    queries: u64,
    unique: usize,
    seen: SeenSet,
    phase: RunPhase,
}

impl RunState {
    pub fn new(limits: RunLimits, now: Instant) -> Self {
        let deadline = now
            .checked_add(limits.run_duration)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self {
            limits,
            started: now,
            deadline,
            queries: 0,
            unique: 0,
            seen: SeenSet::new(),
            phase: RunPhase::Running,
        }
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn queries(&self) -> u64 {
        self.queries
    }

    pub fn unique(&self) -> usize {
        self.unique
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Exit condition checked at the top of every iteration. The time limit
    /// wins when both limits are met.
    pub fn stop_reason(&self, now: Instant) -> Option<StopReason> {
        if let RunPhase::Stopped(reason) = self.phase {
            return Some(reason);
        }
        if now >= self.deadline {
            Some(StopReason::TimeLimit)
        } else if self.unique >= self.limits.max_unique {
            Some(StopReason::QuotaReached)
        } else {
            None
        }
    }

    /// Count a new query and return its 1-based number.
    pub fn begin_query(&mut self) -> u64 {
        self.queries += 1;
        self.queries
    }

    pub fn observe(&mut self, digest: ContentDigest) -> Uniqueness {
        self.seen.check_and_insert(digest)
    }

    /// Count a successfully saved unique response and return the new total.
    pub fn record_saved(&mut self) -> usize {
        self.unique += 1;
        self.unique
    }

    /// Move to `Stopped` and produce the final statistics. The first reason sticks.
    pub fn finish(&mut self, now: Instant, reason: StopReason) -> RunSummary {
        let reason = match self.phase {
            RunPhase::Running => {
                self.phase = RunPhase::Stopped(reason);
                reason
            }
            RunPhase::Stopped(previous) => previous,
        };
        RunSummary {
            reason,
            runtime: self.elapsed(now),
            queries: self.queries,
            unique: self.unique,
        }
    }
}
