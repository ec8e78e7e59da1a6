//! Versioned snapshots of validated configuration.
//!
//! Every successful [`VersionedCache::load`] stores the candidate as a new
//! snapshot under the next version number and makes it current. Only the
//! most recent `retention` snapshots are kept; older ones are evicted as new
//! ones arrive. A candidate that fails validation is rejected and the cache
//! is left exactly as it was.
//!
//! Readers get an [`Arc`] to the current snapshot, so a reload never
//! invalidates a value already handed out.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{BoxError, TagfigError};

/// Self-validation for configuration values.
pub trait Validate {
    /// `Ok(true)` accepts the value; `Ok(false)` or an error rejects it.
    fn validate(&self) -> Result<bool, BoxError>;
}

#[derive(Debug)]
pub struct VersionedCache<T> {
    retention: usize,
    inner: RwLock<Snapshots<T>>,
}

#[derive(Debug)]
struct Snapshots<T> {
    current: u64,
    entries: BTreeMap<u64, Arc<T>>,
}

impl<T: Validate> VersionedCache<T> {
    /// A cache keeping at most `retention` snapshots. A retention of 0 or 1
    /// keeps only the current one.
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            inner: RwLock::new(Snapshots {
                current: 0,
                entries: BTreeMap::new(),
            }),
        }
    }

    /// Validate `candidate` and store it as the new current snapshot.
    ///
    /// Returns the version it was stored under. The first snapshot is
    /// version 0.
    pub fn load(&self, candidate: T) -> Result<u64, TagfigError> {
        match candidate.validate() {
            Ok(true) => {}
            Ok(false) => {
                warn!("configuration rejected by validation");
                return Err(TagfigError::Validation {
                    reason: "candidate was rejected".into(),
                });
            }
            Err(e) => {
                warn!(error = %e, "configuration failed validation");
                return Err(TagfigError::Validation {
                    reason: e.to_string(),
                });
            }
        }

        let mut snapshots = self.inner.write();
        if !snapshots.entries.is_empty() {
            snapshots.current += 1;
        }
        let version = snapshots.current;
        snapshots.entries.insert(version, Arc::new(candidate));

        let limit = self.retention as u64;
        if snapshots.entries.len() as u64 > limit {
            let evicted = version - limit;
            snapshots.entries.remove(&evicted);
            debug!(version = evicted, "evicted snapshot");
        }
        debug!(version, retained = snapshots.entries.len(), "loaded snapshot");
        Ok(version)
    }

    /// The current snapshot, or `None` before the first successful load.
    pub fn get(&self) -> Option<Arc<T>> {
        let snapshots = self.inner.read();
        snapshots.entries.get(&snapshots.current).cloned()
    }

    /// A specific retained snapshot.
    pub fn get_version(&self, version: u64) -> Option<Arc<T>> {
        self.inner.read().entries.get(&version).cloned()
    }

    /// Current version, or `None` before the first successful load.
    pub fn version(&self) -> Option<u64> {
        let snapshots = self.inner.read();
        (!snapshots.entries.is_empty()).then_some(snapshots.current)
    }

    /// Retained versions, oldest first.
    pub fn versions(&self) -> Vec<u64> {
        self.inner.read().entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}
