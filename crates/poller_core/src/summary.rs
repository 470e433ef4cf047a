use std::fmt;
use std::time::Duration;

use crate::StopReason;

/// Final statistics printed when a run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub runtime: Duration,
    pub queries: u64,
    pub unique: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== Final Results ==========")?;
        writeln!(f, "Program completed: {}", self.reason)?;
        writeln!(
            f,
            "Total runtime: {:.2} minutes",
            self.runtime.as_secs_f64() / 60.0
        )?;
        writeln!(f, "Total queries: {}", self.queries)?;
        writeln!(f, "Unique responses collected: {}", self.unique)?;
        write!(f, "==================================")
    }
}
