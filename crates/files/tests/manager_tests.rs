//! Lifecycle and lease-discipline tests for the files manager.

use betus_core::UploadId;
use betus_core::checksum::sha1_hex_upper;
use betus_files::{FilesError, FilesManager};
use std::path::Path;
use tempfile::tempdir;

fn data_path(dir: &Path, id: UploadId) -> std::path::PathBuf {
    dir.join(id.to_string())
}

fn mdata_path(dir: &Path, id: UploadId) -> std::path::PathBuf {
    dir.join(format!("{id}.mdata"))
}

/// Create, initialize and persist an upload, returning its id.
async fn persisted_upload(manager: &FilesManager, length: u64, comment: &str) -> UploadId {
    let mut tmp = manager.new_temporary();
    tmp.initialize(length, comment).await.unwrap();
    tmp.persist();
    tmp.id()
}

#[tokio::test]
async fn test_unpersisted_temporary_leaves_no_trace() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();

    let id = {
        let mut tmp = manager.new_temporary();
        tmp.initialize(64, "").await.unwrap();
        tmp.id()
        // dropped without persist
    };

    assert!(!manager.contains(id));
    assert!(manager.is_empty());
    assert!(!data_path(dir.path(), id).exists());
    assert!(!mdata_path(dir.path(), id).exists());
    assert!(matches!(manager.acquire(id), Err(FilesError::NotFound(_))));
}

#[tokio::test]
async fn test_persisted_upload_has_file_pair_and_fresh_record() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();

    let id = persisted_upload(&manager, 4096, "Zm9vLnR4dA==").await;

    assert!(manager.contains(id));
    assert!(data_path(dir.path(), id).exists());
    assert!(mdata_path(dir.path(), id).exists());
    assert_eq!(data_path(dir.path(), id).metadata().unwrap().len(), 4096);

    let lease = manager.acquire(id).unwrap();
    assert_eq!(lease.id(), id);
    let md = lease.metadata().await;
    assert_eq!(md.offset, 0);
    assert_eq!(md.length, 4096);
    assert_eq!(md.comment, "Zm9vLnR4dA==");
}

#[tokio::test]
async fn test_offset_accumulates_across_leases() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 11, "").await;

    {
        let mut lease = manager.acquire(id).unwrap();
        assert_eq!(lease.write_at(0, b"hello ").await, 6);
        assert!(lease.commit_offset(6).await);
    }
    {
        let mut lease = manager.acquire(id).unwrap();
        assert_eq!(lease.metadata().await.offset, 6);
        assert_eq!(lease.write_at(6, b"world").await, 5);
        assert!(lease.commit_offset(11).await);
    }

    let lease = manager.acquire(id).unwrap();
    let md = lease.metadata().await;
    assert_eq!(md.offset, 11);
    assert_eq!(md.length, 11);
    assert_eq!(
        lease.checksum_sha1_hex(0, 0).await,
        sha1_hex_upper(b"hello world")
    );
}

#[tokio::test]
async fn test_second_acquire_is_busy() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 8, "").await;

    let lease = manager.acquire(id).unwrap();
    assert!(matches!(manager.acquire(id), Err(FilesError::Busy(_))));
    drop(lease);

    // Released on drop; a fresh acquire succeeds.
    assert!(manager.acquire(id).is_ok());
}

#[tokio::test]
async fn test_mint_lease_blocks_acquire_until_persist() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();

    let mut tmp = manager.new_temporary();
    tmp.initialize(8, "").await.unwrap();
    let id = tmp.id();

    // The temporary resource owns the mint-time lease.
    assert!(matches!(manager.acquire(id), Err(FilesError::Busy(_))));

    tmp.persist();
    drop(tmp);
    assert!(manager.acquire(id).is_ok());
}

#[tokio::test]
async fn test_minted_ids_are_distinct() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();

    let mut seen = std::collections::HashSet::new();
    for _ in 0..64 {
        let mut tmp = manager.new_temporary();
        tmp.initialize(1, "").await.unwrap();
        tmp.persist();
        assert!(seen.insert(tmp.id()));
    }
    assert_eq!(manager.len(), 64);
}

#[tokio::test]
async fn test_checksum_ranges() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 11, "").await;

    let mut lease = manager.acquire(id).unwrap();
    assert_eq!(lease.write_at(0, b"hello world").await, 11);

    assert_eq!(
        lease.checksum_sha1_hex(0, 11).await,
        sha1_hex_upper(b"hello world")
    );
    assert_eq!(
        lease.checksum_sha1_hex(6, 5).await,
        sha1_hex_upper(b"world")
    );
    // count = 0 reads through end-of-file
    assert_eq!(
        lease.checksum_sha1_hex(6, 0).await,
        sha1_hex_upper(b"world")
    );

    // Out-of-range requests yield the empty string.
    assert_eq!(lease.checksum_sha1_hex(11, 0).await, "");
    assert_eq!(lease.checksum_sha1_hex(0, 12).await, "");
}

#[tokio::test]
async fn test_corrupted_metadata_yields_sentinel() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 8, "").await;

    std::fs::write(mdata_path(dir.path(), id), b"short").unwrap();

    let lease = manager.acquire(id).unwrap();
    let md = lease.metadata().await;
    assert!(md.is_corrupted());
    assert_eq!(md.offset, -1);
    assert_eq!(md.length, 0);
    assert!(!lease.data_file_missing().await);
}

#[tokio::test]
async fn test_missing_metadata_yields_sentinel() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 8, "").await;

    std::fs::remove_file(mdata_path(dir.path(), id)).unwrap();

    let lease = manager.acquire(id).unwrap();
    assert!(lease.metadata().await.is_corrupted());
}

#[tokio::test]
async fn test_delete_mark_unlinks_on_release() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    let id = persisted_upload(&manager, 8, "").await;

    let mut lease = manager.acquire(id).unwrap();
    lease.mark_delete();
    drop(lease);

    assert!(!manager.contains(id));
    assert!(!data_path(dir.path(), id).exists());
    assert!(!mdata_path(dir.path(), id).exists());
    assert!(matches!(manager.acquire(id), Err(FilesError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_all_clears_directory_and_sets() {
    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();
    for _ in 0..3 {
        persisted_upload(&manager, 4, "").await;
    }
    assert_eq!(manager.len(), 3);

    assert_eq!(manager.delete_all(), 3);
    assert!(manager.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
#[cfg(unix)]
async fn test_initialize_fails_in_unwritable_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let manager = FilesManager::new(dir.path()).await.unwrap();

    let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
    perms.set_mode(0o555);
    std::fs::set_permissions(dir.path(), perms.clone()).unwrap();

    {
        let mut tmp = manager.new_temporary();
        let err = tmp.initialize(16, "").await.unwrap_err();
        assert!(matches!(err, FilesError::BadDescriptor(_)));
    }

    // The failed temporary leaves no registry entry behind.
    assert!(manager.is_empty());

    perms.set_mode(0o755);
    std::fs::set_permissions(dir.path(), perms).unwrap();
}
