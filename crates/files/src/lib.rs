//! On-disk upload storage for the BeTus server.
//!
//! A [`FilesManager`] owns one local directory and keeps, per upload id, a
//! pair of regular files: the raw data file and a small metadata sidecar.
//! The manager hands out exclusive, process-local leases over those pairs:
//!
//! - [`TempUpload`]: a freshly minted upload whose existence is not yet
//!   advertised. Dropping it unpersisted removes every trace from disk.
//! - [`UploadLease`]: exclusive read/write access to a persisted upload.
//!   At most one lease per id exists at any instant; concurrent callers get
//!   [`FilesError::Busy`] instead of blocking.
//!
//! The manager never parses HTTP; the protocol layer never touches the
//! filesystem directly.

pub mod error;
pub mod manager;
pub mod resource;

pub use error::{FilesError, FilesResult};
pub use manager::FilesManager;
pub use resource::{TempUpload, UploadLease};
