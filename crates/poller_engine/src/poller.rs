use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeDelta};
use poll_logging::{poll_debug, poll_error, poll_info, poll_warn};
use poller_core::{ContentDigest, RunLimits, RunState, RunSummary, StopReason, Uniqueness};
use tokio_util::sync::CancellationToken;

use crate::{Fetcher, PollEvent, ProgressSink, ResponsePersister};

pub const DEFAULT_URL: &str = "http://test.brightsign.io:3000";

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub url: String,
    pub limits: RunLimits,
    /// Pause between iterations; skipped after the last one.
    pub delay: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            limits: RunLimits::default(),
            delay: Duration::from_secs(5),
        }
    }
}

/// The single clock the poll loop reads. Follows tokio's clock so paused-time
/// tests stay deterministic.
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Local wall-clock time of `instant`; `None` if it cannot be represented.
fn wall_clock_at(instant: Instant) -> Option<DateTime<Local>> {
    let ahead = TimeDelta::from_std(instant.saturating_duration_since(now())).ok()?;
    Local::now().checked_add_signed(ahead)
}

/// Sequential fetch -> dedupe -> persist loop.
pub struct Poller {
    settings: PollSettings,
    fetcher: Box<dyn Fetcher>,
    persister: ResponsePersister,
}

impl Poller {
    pub fn new(
        settings: PollSettings,
        fetcher: Box<dyn Fetcher>,
        persister: ResponsePersister,
    ) -> Self {
        Self {
            settings,
            fetcher,
            persister,
        }
    }

    /// Fresh run state whose deadline starts now.
    pub fn begin(&self) -> RunState {
        RunState::new(self.settings.limits, now())
    }

    /// Poll until the deadline, the quota, or `cancel` fires.
    pub async fn run(
        &self,
        state: &mut RunState,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> RunSummary {
        let limits = state.limits();
        poll_info!(
            "Polling {} for up to {:?} or {} unique responses",
            self.settings.url,
            limits.run_duration,
            limits.max_unique
        );
        sink.emit(PollEvent::Started {
            url: self.settings.url.clone(),
            ends_at: wall_clock_at(state.deadline()),
            max_unique: limits.max_unique,
        });

        let reason = loop {
            if let Some(reason) = state.stop_reason(now()) {
                break reason;
            }
            if cancel.is_cancelled() {
                break StopReason::Interrupted;
            }

            let query = state.begin_query();
            let at = now();
            sink.emit(PollEvent::QueryStarted {
                query,
                elapsed: state.elapsed(at),
                remaining: state.remaining(at),
            });
            poll_debug!("Query #{} -> {}", query, self.settings.url);

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Interrupted,
                result = self.fetcher.fetch(&self.settings.url) => result,
            };

            match fetched {
                Ok(body) => {
                    poll_debug!(
                        "Query #{} returned {} bytes (status {})",
                        query,
                        body.byte_len,
                        body.status
                    );
                    sink.emit(PollEvent::Fetched {
                        byte_len: body.byte_len,
                    });
                    if body.text.is_empty() {
                        poll_warn!("Query #{} returned an empty body", query);
                        sink.emit(PollEvent::EmptyBody);
                    } else {
                        self.process(state, &body.text, sink);
                    }
                }
                Err(err) => {
                    poll_warn!("Query #{} failed: {}", query, err);
                    sink.emit(PollEvent::FetchFailed(err));
                }
            }

            if state.stop_reason(now()).is_some() {
                continue;
            }

            sink.emit(PollEvent::Waiting {
                delay: self.settings.delay,
            });
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Interrupted,
                _ = tokio::time::sleep(self.settings.delay) => {}
            }
        };

        let summary = state.finish(now(), reason);
        poll_info!(
            "Run finished ({}): {} queries, {} unique",
            summary.reason,
            summary.queries,
            summary.unique
        );
        sink.emit(PollEvent::Finished(summary.clone()));
        summary
    }

    /// Dedupe and persist one body. A digest stays in the seen set even when
    /// the write fails, so the same body is not retried later in the run.
    fn process(&self, state: &mut RunState, body: &str, sink: &dyn ProgressSink) {
        let digest = ContentDigest::of(body);
        if state.observe(digest.clone()) == Uniqueness::Seen {
            poll_debug!("Duplicate response {}", digest.short());
            sink.emit(PollEvent::Duplicate { digest });
            return;
        }

        match self.persister.save(body, &digest) {
            Ok(path) => {
                let unique = state.record_saved();
                poll_info!("Saved unique response {} to {:?}", digest.short(), path);
                sink.emit(PollEvent::Saved {
                    path,
                    unique,
                    max_unique: state.limits().max_unique,
                });
            }
            Err(err) => {
                poll_error!(
                    "Failed to save response {} under {:?}: {}",
                    digest.short(),
                    self.persister.output_dir(),
                    err
                );
                sink.emit(PollEvent::SaveFailed {
                    digest,
                    message: err.to_string(),
                });
            }
        }
    }
}
