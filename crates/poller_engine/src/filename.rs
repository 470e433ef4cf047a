use chrono::Local;
use poller_core::ContentDigest;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `response_{timestamp}_{digest prefix}.json`. The body is stored verbatim
/// whatever its format; the extension is only a naming convention.
pub fn response_filename(timestamp: &str, digest: &ContentDigest) -> String {
    format!("response_{timestamp}_{}.json", digest.short())
}

/// Current local time at second resolution, e.g. `20240131_235959`.
pub fn local_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
