//! The process-wide upload registry.

use crate::error::{FilesError, FilesResult};
use crate::resource::{self, TempUpload, UploadLease};
use betus_core::UploadId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Suffix of the metadata sidecar file, appended to the upload id.
pub const METADATA_SUFFIX: &str = ".mdata";

/// The two in-memory id sets, guarded by one mutex.
///
/// `in_use` is always a subset of `known`. All file I/O happens outside the
/// lock; exclusivity of the files rests on the lease invariant.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) known: HashSet<UploadId>,
    pub(crate) in_use: HashSet<UploadId>,
}

/// State shared between the manager and its outstanding resources.
pub(crate) struct Shared {
    root: PathBuf,
    registry: Mutex<Registry>,
}

impl Shared {
    pub(crate) fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock()
    }

    /// Path of the raw data file for an upload id.
    pub(crate) fn data_path(&self, id: UploadId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Path of the metadata sidecar for an upload id.
    pub(crate) fn metadata_path(&self, id: UploadId) -> PathBuf {
        self.root.join(format!("{id}{METADATA_SUFFIX}"))
    }
}

/// Owner of one upload directory.
///
/// Mints unique upload ids, materialises the two-file pair per upload, and
/// enforces at-most-one concurrent lease per id. The directory is owned
/// exclusively by one manager instance per process.
pub struct FilesManager {
    shared: Arc<Shared>,
}

impl FilesManager {
    /// Create a manager over a directory, creating it if absent.
    pub async fn new(root: impl AsRef<Path>) -> FilesResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            shared: Arc::new(Shared {
                root,
                registry: Mutex::new(Registry::default()),
            }),
        })
    }

    /// Mint a fresh upload id and hand out the temporary resource that owns
    /// it. The id enters both sets immediately; the files are created by
    /// [`TempUpload::initialize`], which is where creation failures surface.
    pub fn new_temporary(&self) -> TempUpload {
        let id = {
            let mut reg = self.shared.registry();
            // Collisions are vanishingly rare; retry against the known set
            // anyway.
            let id = loop {
                let candidate = UploadId::new();
                if !reg.known.contains(&candidate) {
                    break candidate;
                }
            };
            reg.known.insert(id);
            reg.in_use.insert(id);
            id
        };
        TempUpload::new(self.shared.clone(), id)
    }

    /// Acquire an exclusive lease on a persisted upload. Never blocks:
    /// an unknown id is [`FilesError::NotFound`], an id with an outstanding
    /// lease is [`FilesError::Busy`].
    pub fn acquire(&self, id: UploadId) -> FilesResult<UploadLease> {
        {
            let mut reg = self.shared.registry();
            if !reg.known.contains(&id) {
                return Err(FilesError::NotFound(id.to_string()));
            }
            if !reg.in_use.insert(id) {
                return Err(FilesError::Busy(id.to_string()));
            }
        }
        Ok(UploadLease::new(self.shared.clone(), id))
    }

    /// Whether an upload id is currently known.
    pub fn contains(&self, id: UploadId) -> bool {
        self.shared.registry().known.contains(&id)
    }

    /// Number of known uploads.
    pub fn len(&self) -> usize {
        self.shared.registry().known.len()
    }

    /// Whether no uploads are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unlink every known pair and clear both sets, returning the number of
    /// ids removed. The caller must ensure no leases are outstanding; used at
    /// shutdown and in tests.
    pub fn delete_all(&self) -> usize {
        let ids: Vec<UploadId> = {
            let mut reg = self.shared.registry();
            reg.in_use.clear();
            reg.known.drain().collect()
        };
        for id in &ids {
            resource::remove_pair(&self.shared, *id);
        }
        ids.len()
    }
}
