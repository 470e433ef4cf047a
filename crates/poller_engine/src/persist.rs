use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use poller_core::ContentDigest;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::{local_timestamp, response_filename};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create output directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Produces the timestamp embedded in saved filenames.
pub type TimestampFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Make sure `dir` is a usable directory, creating it and its parents when
/// absent. Succeeds without touching an existing directory.
pub fn prepare_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        Err(err) => Err(PersistError::Io(err)),
    }
}

/// Saves unique response bodies under the output directory.
pub struct ResponsePersister {
    output_dir: PathBuf,
    timestamp: TimestampFn,
}

impl ResponsePersister {
    pub fn new(output_dir: PathBuf) -> Self {
        Self::with_timestamp(output_dir, Arc::new(local_timestamp))
    }

    pub fn with_timestamp(output_dir: PathBuf, timestamp: TimestampFn) -> Self {
        Self {
            output_dir,
            timestamp,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `body` verbatim and return the new file's path.
    ///
    /// The body goes to a temp file in the output directory first and is then
    /// renamed over the final name, so readers never see a half-written
    /// response. The directory is re-checked on every save in case it was
    /// removed mid-run.
    pub fn save(&self, body: &str, digest: &ContentDigest) -> Result<PathBuf, PersistError> {
        prepare_output_dir(&self.output_dir)?;
        let target = self
            .output_dir
            .join(response_filename(&(self.timestamp)(), digest));

        let mut staged = NamedTempFile::new_in(&self.output_dir)?;
        staged.write_all(body.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|err| err.error)?;
        Ok(target)
    }
}
