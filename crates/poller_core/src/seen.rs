use std::collections::HashSet;

use crate::ContentDigest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    New,
    Seen,
}

/// Digests observed during one run. Grows monotonically and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    digests: HashSet<ContentDigest>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `digest`, reporting whether it was already present.
    pub fn check_and_insert(&mut self, digest: ContentDigest) -> Uniqueness {
        if self.digests.insert(digest) {
            Uniqueness::New
        } else {
            Uniqueness::Seen
        }
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.digests.contains(digest)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
