//! Admin wire codec.
//!
//! Two halves:
//!
//! - [`escape`] turns arbitrary bytes (names, file content) into printable
//!   RPC parameters and back.
//! - [`records`] defines the packed binary reply records and their
//!   field-by-field encoders/decoders.
//!
//! ## Layout
//!
//! All records are packed (no padding) and little-endian:
//!
//! ```text
//! list_response    count:u32 | 8 x { name:[u8;256] | ino:u32 | type:u8 }   2092 bytes
//! lookup_response  ino:u32 | type:u8                                         5 bytes
//! create_response  ino:u32                                                   4 bytes
//! remove_response  (empty)                                                   0 bytes
//! read_response    size:u32 | content:[u8;1024]                           1028 bytes
//! write_response   (empty)                                                   0 bytes
//! ```

pub mod escape;
pub mod records;

use thiserror::Error;

pub use escape::{escape, unescape, unescape_str};
pub use records::{
    CreateResponse, ListEntry, ListResponse, LookupResponse, ReadResponse, RemoveResponse,
    WireRecord, WriteResponse,
};

/// Wire codec error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Reply body does not have the record's fixed size.
    #[error("{record}: expected {expected} bytes, got {actual}")]
    Length {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// `list_response.count` exceeds the entry slots.
    #[error("list_response: count {0} exceeds the entry slots")]
    TooManyEntries(u32),

    /// Unrecognized `type` byte.
    #[error("unknown node type byte {0}")]
    UnknownKind(u8),

    /// Escaped parameter is malformed.
    #[error("malformed escape at position {position}")]
    BadEscape { position: usize },

    /// Value does not fit a fixed-width field.
    #[error("{field}: {len} bytes exceeds field width {max}")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Unescaped parameter is not valid UTF-8.
    #[error("parameter is not valid UTF-8")]
    NotUtf8,
}
