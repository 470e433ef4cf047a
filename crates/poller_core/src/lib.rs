//! Poller core: digests, the seen set, run bookkeeping and response
//! statistics. No IO.
mod digest;
mod seen;
mod state;
pub mod stats;
mod summary;

pub use digest::ContentDigest;
pub use seen::{SeenSet, Uniqueness};
pub use state::{RunLimits, RunPhase, RunState, StopReason};
pub use summary::RunSummary;
