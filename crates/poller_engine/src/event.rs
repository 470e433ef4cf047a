use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use poller_core::{ContentDigest, RunSummary};

use crate::FetchError;

/// Progress reported by the poll loop, in the order it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Started {
        url: String,
        /// Wall-clock time of the run's deadline.
        ends_at: Option<DateTime<Local>>,
        max_unique: usize,
    },
    QueryStarted {
        query: u64,
        elapsed: Duration,
        remaining: Duration,
    },
    Fetched {
        byte_len: usize,
    },
    /// The server answered with an empty body; treated as no data.
    EmptyBody,
    FetchFailed(FetchError),
    Duplicate {
        digest: ContentDigest,
    },
    Saved {
        path: PathBuf,
        unique: usize,
        max_unique: usize,
    },
    SaveFailed {
        digest: ContentDigest,
        message: String,
    },
    Waiting {
        delay: Duration,
    },
    Finished(RunSummary),
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}
