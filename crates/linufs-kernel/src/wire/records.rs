//! Packed admin reply records.
//!
//! Each record is serialized field by field, little-endian, with no
//! padding. Nothing here relies on the in-memory layout of a Rust struct.

use super::WireError;
use crate::constants::{LIST_MAX_ENTRIES, NAME_FIELD_LEN, NAME_MAX_LEN, REMOTE_CONTENT_CAPACITY};
use crate::store::{Ino, NodeKind};

/// A fixed-layout reply record.
pub trait WireRecord: Sized {
    /// Record name, as the admin service calls it.
    const NAME: &'static str;

    /// Exact encoded size in bytes.
    const SIZE: usize;

    /// Encode into exactly [`Self::SIZE`] bytes.
    fn encode(&self) -> Result<Vec<u8>, WireError>;

    /// Decode from exactly [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Result<Self, WireError>;
}

fn check_len<R: WireRecord>(bytes: &[u8]) -> Result<(), WireError> {
    if bytes.len() == R::SIZE {
        Ok(())
    } else {
        Err(WireError::Length {
            record: R::NAME,
            expected: R::SIZE,
            actual: bytes.len(),
        })
    }
}

/// Sequential reader over a length-checked record body.
struct Fields<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let field = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        field
    }

    fn u32(&mut self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4));
        u32::from_le_bytes(raw)
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn kind(&mut self) -> Result<NodeKind, WireError> {
        let byte = self.u8();
        NodeKind::from_wire(byte).ok_or(WireError::UnknownKind(byte))
    }
}

/// Decode a null-padded name field.
///
/// Stops at the first NUL; a field with no NUL is cut at
/// [`NAME_MAX_LEN`] bytes, as if its last byte were the terminator.
fn decode_name(field: &[u8]) -> String {
    let end = field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(NAME_MAX_LEN)
        .min(NAME_MAX_LEN);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn encode_name(name: &str, out: &mut Vec<u8>) -> Result<(), WireError> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_MAX_LEN {
        return Err(WireError::FieldTooLarge {
            field: "name",
            len: bytes.len(),
            max: NAME_MAX_LEN,
        });
    }
    out.extend_from_slice(bytes);
    out.resize(out.len() + NAME_FIELD_LEN - bytes.len(), 0);
    Ok(())
}

// ============================================================================
// list
// ============================================================================

/// One slot of a `list_response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub ino: Ino,
    pub kind: NodeKind,
}

impl ListEntry {
    /// Encoded size of one slot.
    pub const SIZE: usize = NAME_FIELD_LEN + 4 + 1;

    pub fn new(name: impl Into<String>, ino: Ino, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            ino,
            kind,
        }
    }
}

/// `list_response`: `count` followed by 8 fixed entry slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResponse {
    pub entries: Vec<ListEntry>,
}

impl WireRecord for ListResponse {
    const NAME: &'static str = "list_response";
    const SIZE: usize = 4 + LIST_MAX_ENTRIES * ListEntry::SIZE;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        if self.entries.len() > LIST_MAX_ENTRIES {
            return Err(WireError::TooManyEntries(self.entries.len() as u32));
        }
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            encode_name(&entry.name, &mut out)?;
            out.extend_from_slice(&entry.ino.get().to_le_bytes());
            out.push(entry.kind.to_wire());
        }
        // Unused slots are zero-filled.
        out.resize(Self::SIZE, 0);
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        let mut fields = Fields::new(bytes);
        let count = fields.u32();
        if count as usize > LIST_MAX_ENTRIES {
            return Err(WireError::TooManyEntries(count));
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = decode_name(fields.take(NAME_FIELD_LEN));
            let ino = Ino::new(fields.u32());
            let kind = fields.kind()?;
            entries.push(ListEntry { name, ino, kind });
        }
        Ok(Self { entries })
    }
}

// ============================================================================
// lookup / create / remove
// ============================================================================

/// `lookup_response`: identifier and kind of the named entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupResponse {
    pub ino: Ino,
    pub kind: NodeKind,
}

impl WireRecord for LookupResponse {
    const NAME: &'static str = "lookup_response";
    const SIZE: usize = 4 + 1;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&self.ino.get().to_le_bytes());
        out.push(self.kind.to_wire());
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        let mut fields = Fields::new(bytes);
        let ino = Ino::new(fields.u32());
        let kind = fields.kind()?;
        Ok(Self { ino, kind })
    }
}

/// `create_response`: identifier of the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateResponse {
    pub ino: Ino,
}

impl WireRecord for CreateResponse {
    const NAME: &'static str = "create_response";
    const SIZE: usize = 4;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(self.ino.get().to_le_bytes().to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            ino: Ino::new(Fields::new(bytes).u32()),
        })
    }
}

/// `remove_response`: empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveResponse;

impl WireRecord for RemoveResponse {
    const NAME: &'static str = "remove_response";
    const SIZE: usize = 0;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(Vec::new())
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        Ok(Self)
    }
}

// ============================================================================
// read / write
// ============================================================================

/// `read_response`: reported size and the fixed content field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadResponse {
    /// Size as reported by the service; may exceed the field width.
    pub size: u32,
    /// Content bytes, at most [`REMOTE_CONTENT_CAPACITY`].
    pub content: Vec<u8>,
}

impl ReadResponse {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            size: content.len() as u32,
            content,
        }
    }

    /// True when the reported size did not fit the content field.
    pub fn is_truncated(&self) -> bool {
        self.size as usize > self.content.len()
    }
}

impl WireRecord for ReadResponse {
    const NAME: &'static str = "read_response";
    const SIZE: usize = 4 + REMOTE_CONTENT_CAPACITY;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        if self.content.len() > REMOTE_CONTENT_CAPACITY {
            return Err(WireError::FieldTooLarge {
                field: "content",
                len: self.content.len(),
                max: REMOTE_CONTENT_CAPACITY,
            });
        }
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.content);
        out.resize(Self::SIZE, 0);
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        let mut fields = Fields::new(bytes);
        let size = fields.u32();
        let field = fields.take(REMOTE_CONTENT_CAPACITY);
        let len = (size as usize).min(REMOTE_CONTENT_CAPACITY);
        Ok(Self {
            size,
            content: field[..len].to_vec(),
        })
    }
}

/// `write_response`: empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteResponse;

impl WireRecord for WriteResponse {
    const NAME: &'static str = "write_response";
    const SIZE: usize = 0;

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(Vec::new())
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_len::<Self>(bytes)?;
        Ok(Self)
    }
}
