//! Temporary and leased upload resources.

use crate::error::{FilesError, FilesResult};
use crate::manager::Shared;
use betus_core::UploadId;
use betus_core::checksum::hex_upper;
use betus_core::record::Metadata;
use sha1::{Digest, Sha1};
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Block size for streaming checksum reads (2 KiB).
const CHECKSUM_BLOCK_SIZE: usize = 2048;

/// A freshly minted upload whose existence is not yet advertised.
///
/// Dropping it unpersisted removes both files and forgets the id, so a
/// half-constructed upload never leaks.
pub struct TempUpload {
    shared: Arc<Shared>,
    id: UploadId,
    persisted: bool,
}

impl TempUpload {
    pub(crate) fn new(shared: Arc<Shared>, id: UploadId) -> Self {
        Self {
            shared,
            id,
            persisted: false,
        }
    }

    /// The upload id owned by this resource.
    pub fn id(&self) -> UploadId {
        self.id
    }

    /// Create both files: the data file sized to `total_length` (sparse
    /// allowed) and the metadata record with offset 0. This is the only
    /// writer of `length` and `comment` over the upload's life.
    pub async fn initialize(&mut self, total_length: u64, comment: &str) -> FilesResult<()> {
        let mut md = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.shared.metadata_path(self.id))
            .await
            .map_err(FilesError::BadDescriptor)?;
        md.write_all(&Metadata::encode_new(total_length, comment))
            .await
            .map_err(FilesError::BadDescriptor)?;
        md.sync_all().await.map_err(FilesError::BadDescriptor)?;

        let dt = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.shared.data_path(self.id))
            .await
            .map_err(FilesError::BadDescriptor)?;
        dt.set_len(total_length)
            .await
            .map_err(FilesError::BadDescriptor)?;
        Ok(())
    }

    /// Write initial content at offset 0 (creation-with-upload).
    /// Returns bytes written, or 0 on any I/O failure.
    pub async fn write_initial(&mut self, body: &[u8]) -> u64 {
        write_at(&self.shared.data_path(self.id), 0, body).await
    }

    /// Mark the upload as persisted: the id stays known after this resource
    /// is dropped and only the mint-time lease is released. Idempotent.
    pub fn persist(&mut self) {
        self.persisted = true;
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        let mut reg = self.shared.registry();
        reg.in_use.remove(&self.id);
        if !self.persisted {
            reg.known.remove(&self.id);
            drop(reg);
            remove_pair(&self.shared, self.id);
        }
    }
}

/// Exclusive read/write access to a persisted upload's file pair.
///
/// Obtained from [`crate::FilesManager::acquire`]; the lease is released when
/// the value is dropped. A lease marked for deletion unlinks both files and
/// forgets the id on release.
pub struct UploadLease {
    shared: Arc<Shared>,
    id: UploadId,
    delete_mark: bool,
}

impl UploadLease {
    pub(crate) fn new(shared: Arc<Shared>, id: UploadId) -> Self {
        Self {
            shared,
            id,
            delete_mark: false,
        }
    }

    /// The leased upload id.
    pub fn id(&self) -> UploadId {
        self.id
    }

    /// Read the metadata record. An unreadable record yields the corrupted
    /// sentinel (`offset = -1`), which the protocol layer maps to 410 or 500.
    pub async fn metadata(&self) -> Metadata {
        match fs::read(self.shared.metadata_path(self.id)).await {
            Ok(buf) => Metadata::decode(&buf),
            Err(_) => Metadata::corrupted(),
        }
    }

    /// Whether the data file is absent from the directory.
    pub async fn data_file_missing(&self) -> bool {
        !fs::try_exists(self.shared.data_path(self.id))
            .await
            .unwrap_or(false)
    }

    /// Stream the data file from `begin` for `count` bytes (`count == 0`
    /// means through end-of-file) and return the uppercase SHA-1 hex digest.
    /// Returns the empty string when the range falls outside the file or on
    /// any read failure.
    pub async fn checksum_sha1_hex(&self, begin: u64, count: u64) -> String {
        let Ok(mut file) = fs::File::open(self.shared.data_path(self.id)).await else {
            return String::new();
        };
        let Ok(file_meta) = file.metadata().await else {
            return String::new();
        };
        let file_size = file_meta.len();
        if begin >= file_size {
            return String::new();
        }
        let count = if count == 0 { file_size - begin } else { count };
        if begin + count > file_size {
            return String::new();
        }
        if file.seek(SeekFrom::Start(begin)).await.is_err() {
            return String::new();
        }

        let mut hasher = Sha1::new();
        let mut block = [0u8; CHECKSUM_BLOCK_SIZE];
        let mut remaining = count;
        while remaining > 0 {
            let want = remaining.min(CHECKSUM_BLOCK_SIZE as u64) as usize;
            match file.read(&mut block[..want]).await {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&block[..n]);
                    remaining -= n as u64;
                }
                Err(_) => return String::new(),
            }
        }
        hex_upper(&hasher.finalize())
    }

    /// Seek to `offset` in the data file and write the body there.
    /// Returns total bytes written, or 0 on any I/O failure.
    pub async fn write_at(&mut self, offset: u64, body: &[u8]) -> u64 {
        write_at(&self.shared.data_path(self.id), offset, body).await
    }

    /// Mark this upload for deletion on lease release.
    pub fn mark_delete(&mut self) {
        self.delete_mark = true;
    }

    /// Rewrite the record's offset field in place (bytes 0..8 only).
    /// Returns false if the metadata file could not be updated.
    pub async fn commit_offset(&mut self, offset: i64) -> bool {
        let path = self.shared.metadata_path(self.id);
        let Ok(mut file) = OpenOptions::new().write(true).open(&path).await else {
            return false;
        };
        if file
            .write_all(&Metadata::encode_offset(offset))
            .await
            .is_err()
        {
            return false;
        }
        file.sync_all().await.is_ok()
    }
}

impl Drop for UploadLease {
    fn drop(&mut self) {
        let mut reg = self.shared.registry();
        reg.in_use.remove(&self.id);
        if self.delete_mark {
            reg.known.remove(&self.id);
            drop(reg);
            remove_pair(&self.shared, self.id);
        }
    }
}

/// Seek-and-write helper shared by the temporary and leased resources.
async fn write_at(path: &Path, offset: u64, body: &[u8]) -> u64 {
    let mut file = match OpenOptions::new().write(true).open(path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "data file not writable");
            return 0;
        }
    };
    if let Err(e) = file.seek(SeekFrom::Start(offset)).await {
        tracing::warn!(path = %path.display(), offset, error = %e, "seek failed");
        return 0;
    }
    match file.write_all(body).await {
        Ok(()) => body.len() as u64,
        Err(e) => {
            tracing::warn!(path = %path.display(), offset, error = %e, "write failed");
            0
        }
    }
}

/// Best-effort unlink of an upload's file pair. Unlink errors are logged and
/// not propagated: they cannot recover state, and the in-memory sets remain
/// the authoritative record for the rest of the process's life.
pub(crate) fn remove_pair(shared: &Shared, id: UploadId) {
    for path in [shared.data_path(id), shared.metadata_path(id)] {
        if let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove upload file");
        }
    }
}
