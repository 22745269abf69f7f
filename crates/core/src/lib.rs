//! Core domain types and shared logic for the BeTus upload server.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Upload identifiers
//! - The on-disk metadata record
//! - tus protocol constants and header names
//! - `Upload-Checksum` parsing and digest comparison
//! - Configuration types

pub mod checksum;
pub mod config;
pub mod error;
pub mod protocol;
pub mod record;
pub mod upload;

pub use checksum::UploadChecksum;
pub use error::{Error, Result};
pub use record::Metadata;
pub use upload::UploadId;

/// Default maximum accepted upload length: 1 GiB.
///
/// Advertised to clients in the `Tus-Max-Size` response header.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;
