//! Poller engine: HTTP fetching, response persistence and the poll loop.
mod decode;
mod event;
mod fetch;
mod filename;
mod persist;
mod poller;
mod types;

pub use decode::{decode_body, DecodedBody};
pub use event::{PollEvent, ProgressSink};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{local_timestamp, response_filename};
pub use persist::{prepare_output_dir, PersistError, ResponsePersister, TimestampFn};
pub use poller::{now, PollSettings, Poller, DEFAULT_URL};
pub use types::{FailureKind, FetchError, FetchedBody};
