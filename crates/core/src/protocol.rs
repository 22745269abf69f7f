//! tus 1.0.0 protocol constants.
//!
//! Header names are lowercase so they can be used both for case-insensitive
//! lookups and as static `HeaderName` values on responses.

/// Protocol version header, required on every non-OPTIONS request.
pub const TUS_RESUMABLE: &str = "tus-resumable";
/// Versions supported by this server.
pub const TUS_VERSION: &str = "tus-version";
/// Maximum upload size advertised to clients.
pub const TUS_MAX_SIZE: &str = "tus-max-size";
/// Comma-separated extension list.
pub const TUS_EXTENSION: &str = "tus-extension";
/// Comma-separated checksum algorithm list.
pub const TUS_CHECKSUM_ALGORITHM: &str = "tus-checksum-algorithm";
/// Declared total length of a new upload.
pub const UPLOAD_LENGTH: &str = "upload-length";
/// Opaque client metadata, stored verbatim.
pub const UPLOAD_METADATA: &str = "upload-metadata";
/// Current/target byte offset of an upload.
pub const UPLOAD_OFFSET: &str = "upload-offset";
/// Per-request integrity checksum, `<algorithm> <base64 digest>`.
pub const UPLOAD_CHECKSUM: &str = "upload-checksum";

/// The single protocol version this server speaks.
pub const SUPPORTED_VERSION: &str = "1.0.0";
/// Value of the `Tus-Version` response header.
pub const SUPPORTED_VERSIONS: &str = "1.0.0";
/// Extensions implemented by this server.
pub const SUPPORTED_EXTENSIONS: &str = "creation,creation-with-upload,terminate,checksum";
/// Checksum algorithms accepted in `Upload-Checksum`.
pub const SUPPORTED_CHECKSUM: &str = "sha1";
/// Value of the `Tus-Checksum-Algorithm` response header.
pub const SUPPORTED_CHECKSUMS: &str = "sha1";

/// Required `Content-Type` for request bodies carrying upload data.
pub const OFFSET_OCTET_STREAM: &str = "application/offset+octet-stream";

/// `Server` header value.
pub const SERVER_NAME: &str = "BeTus 0.1";

/// Path prefix under which all upload resources live.
pub const FILES_PREFIX: &str = "/files";

/// Non-standard status code for a failed `Upload-Checksum` verification.
pub const STATUS_CHECKSUM_MISMATCH: u16 = 460;
