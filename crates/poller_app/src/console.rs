//! Human-readable progress on stdout.

use chrono::{DateTime, Local};
use poller_core::StopReason;
use poller_engine::{PollEvent, ProgressSink};

/// Prints one block of lines per poll event.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: PollEvent) {
        println!("{}", render(&event, Local::now()));
    }
}

fn render(event: &PollEvent, now: DateTime<Local>) -> String {
    match event {
        PollEvent::Started {
            url,
            ends_at,
            max_unique,
        } => {
            let until = ends_at
                .map(|end| end.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "the time limit".to_string());
            format!(
                "Starting to query {url}\n\
                 Will run until {until} or until {max_unique} unique responses are collected"
            )
        }
        PollEvent::QueryStarted {
            query,
            elapsed,
            remaining,
        } => format!(
            "\nQuery #{query} at {}\n\
             Time elapsed: {:.2} minutes, Time remaining: {:.2} minutes\n\
             Sending request...",
            now.format("%H:%M:%S"),
            minutes(elapsed.as_secs_f64()),
            minutes(remaining.as_secs_f64()),
        ),
        PollEvent::Fetched { byte_len } => format!("Response received: {byte_len} bytes"),
        PollEvent::EmptyBody => "Response was empty, nothing to save".to_string(),
        PollEvent::FetchFailed(err) => format!("Error fetching data: {err}"),
        PollEvent::Duplicate { .. } => "Response already saved, skipping...".to_string(),
        PollEvent::Saved {
            path,
            unique,
            max_unique,
        } => format!(
            "Unique response saved to {}\nUnique responses: {unique}/{max_unique}",
            path.display()
        ),
        PollEvent::SaveFailed { message, .. } => format!("Error saving file: {message}"),
        PollEvent::Waiting { delay } => format!(
            "Waiting {} seconds before next request...",
            delay.as_secs_f64()
        ),
        PollEvent::Finished(summary) => {
            if summary.reason == StopReason::Interrupted {
                format!("\nProgram stopped by user\n\n{summary}")
            } else {
                format!("\n{summary}")
            }
        }
    }
}

fn minutes(secs: f64) -> f64 {
    secs / 60.0
}
