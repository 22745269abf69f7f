//! The on-disk metadata record.
//!
//! Each upload keeps a small sidecar file next to its data file:
//!
//! ```text
//! bytes 0..8   offset  (little-endian i64, bytes durably received)
//! bytes 8..16  length  (little-endian u64, declared total length)
//! byte  16     newline
//! then         optional single-line comment, newline-terminated
//! ```
//!
//! Only the first 8 bytes are ever rewritten after creation; `length` and the
//! comment are fixed for the life of the upload.

/// Byte width of the fixed-size header (offset + length).
pub const HEADER_LEN: usize = 16;

/// Decoded metadata record for one upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    /// Number of data bytes durably received. `-1` is the sentinel for a
    /// missing or unreadable record.
    pub offset: i64,
    /// Total expected byte count, declared at creation.
    pub length: u64,
    /// Opaque client-supplied comment (the `Upload-Metadata` header value).
    pub comment: String,
}

impl Metadata {
    /// The sentinel returned when the record cannot be read.
    pub fn corrupted() -> Self {
        Self {
            offset: -1,
            length: 0,
            comment: String::new(),
        }
    }

    /// Whether this record is the unreadable-record sentinel.
    pub fn is_corrupted(&self) -> bool {
        self.offset < 0
    }

    /// Encode a fresh record with `offset = 0`.
    pub fn encode_new(length: u64, comment: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + 1 + comment.len() + 1);
        buf.extend_from_slice(&0i64.to_le_bytes());
        buf.extend_from_slice(&length.to_le_bytes());
        buf.push(b'\n');
        if !comment.is_empty() {
            buf.extend_from_slice(comment.as_bytes());
            buf.push(b'\n');
        }
        buf
    }

    /// Encode just the offset field, for in-place updates of bytes 0..8.
    pub fn encode_offset(offset: i64) -> [u8; 8] {
        offset.to_le_bytes()
    }

    /// Decode a record from raw file contents.
    ///
    /// A buffer too short to hold the fixed header decodes to the corrupted
    /// sentinel. A missing comment line is tolerated (comment is empty).
    pub fn decode(buf: &[u8]) -> Self {
        if buf.len() < HEADER_LEN {
            return Self::corrupted();
        }
        let offset = i64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ]);
        let length = u64::from_le_bytes([
            buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
        ]);

        // Comment line, if any, follows the header's newline.
        let comment = match buf.get(HEADER_LEN) {
            Some(b'\n') => {
                let rest = &buf[HEADER_LEN + 1..];
                let end = rest
                    .iter()
                    .position(|&b| b == b'\n')
                    .unwrap_or(rest.len());
                String::from_utf8_lossy(&rest[..end]).into_owned()
            }
            _ => String::new(),
        };

        Self {
            offset,
            length,
            comment,
        }
    }
}
