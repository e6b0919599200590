//! # Wire Codec
//!
//! The generic binary encoding used for everything nested inside a
//! transaction body: contract parameters, schema-described records, and the
//! handful of opaque leaf types the chain understands.
//!
//! ## Wire rules
//!
//! ```text
//! bool                 1 byte, 0 or 1
//! u8..u64, i8..i64     little-endian, declared width
//! string / bytes / seq u32 LE count ‖ elements
//! map                  u32 LE count ‖ (key ‖ value)*   canonical key order
//! Option<T>            presence byte (0 | 1) ‖ T if present
//! [u8; N]              N raw bytes
//! timestamp, duration  u64 LE milliseconds
//! record               schema-included fields in declaration order
//! ```
//!
//! Two layers share these rules:
//!
//! - [`Encode`] / [`Decode`] are implemented per concrete type. A type's own
//!   impl *is* its custom override, so leaf types with special encodings
//!   never fall through to structural dispatch. [`wire_record!`](crate::wire_record)
//!   generates impls for records from a declarative field schema.
//! - [`Value`] / [`Shape`] describe values whose type is only known at
//!   runtime (untyped contract parameters, JSON input). Decoding needs a
//!   target [`Shape`] because the bytes themselves carry no type tags.
//!
//! The outer transaction fields (amounts, addresses, names in the body and
//! header) are big-endian and do NOT go through this module. See
//! [`crate::transaction::payload`].

mod leaf;
mod primitives;
mod record;
mod value;

use thiserror::Error;

pub use leaf::CustomLeaf;
pub use primitives::IterationOrder;
pub use record::{decode_optional, encode_optional, FieldMode, FieldSpec, Record};
pub use value::{decode_value, decode_value_prefix, Shape, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while encoding or decoding wire values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A declared length (or a fixed width) runs past the end of the buffer.
    #[error("insufficient bytes: needed {needed}, only {remaining} remaining")]
    InsufficientBytes { needed: usize, remaining: usize },

    /// A top-level decode finished with input left over.
    #[error("{remaining} trailing bytes after decoded value")]
    TrailingBytes { remaining: usize },

    /// The value kind has no wire encoding.
    #[error("unsupported value kind: {0}")]
    UnsupportedKind(String),

    /// A custom leaf encoder rejected its value.
    #[error("custom encoder for {type_name} failed: {reason}")]
    CustomEncodeFailure {
        type_name: &'static str,
        reason: String,
    },

    /// A custom leaf decoder rejected its input.
    #[error("custom decoder for {type_name} failed: {reason}")]
    CustomDecodeFailure {
        type_name: &'static str,
        reason: String,
    },

    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    #[error("invalid presence flag 0x{0:02x}")]
    InvalidPresenceFlag(u8),

    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The collection is too large for the 4-byte length prefix.
    #[error("length {0} does not fit in a 4-byte prefix")]
    LengthOverflow(usize),

    /// Two map entries encode to the same key bytes.
    #[error("duplicate map key in encoded mapping")]
    DuplicateMapKey,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A type with a wire encoding.
pub trait Encode {
    /// Appends the encoding of `self` to `out`.
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// Number of bytes [`encode_to`](Self::encode_to) would append.
    fn encoded_len(&self) -> Result<usize, CodecError> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf)?;
        Ok(buf.len())
    }
}

/// A type that can be read back from its wire encoding.
pub trait Decode: Sized {
    /// Reads one value from the reader, advancing it past the bytes consumed.
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        (**self).encode_to(out)
    }
}

/// Encodes a value into a fresh buffer.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    value.encode_to(&mut out)?;
    Ok(out)
}

/// Decodes one value from the front of `bytes` and reports how many bytes
/// it consumed. Remaining input is left for the caller.
pub fn decode_prefix<T: Decode>(bytes: &[u8]) -> Result<(T, usize), CodecError> {
    let mut reader = Reader::new(bytes);
    let value = T::decode_from(&mut reader)?;
    Ok((value, reader.position()))
}

/// Decodes exactly one value. Fails with [`CodecError::TrailingBytes`] if
/// `bytes` holds more than that value.
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut reader = Reader::new(bytes);
    let value = T::decode_from(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Writes a u32 LE length prefix.
pub(crate) fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

/// Appends one element of a counted sequence or mapping. Elements must take
/// at least one byte, otherwise the count prefix could not be checked
/// against the input on the way back in.
pub(crate) fn encode_element(
    out: &mut Vec<u8>,
    write: impl FnOnce(&mut Vec<u8>) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
    let start = out.len();
    write(out)?;
    if out.len() == start {
        return Err(zero_width_element());
    }
    Ok(())
}

fn zero_width_element() -> CodecError {
    CodecError::UnsupportedKind("zero-width element in a counted sequence".to_string())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over an input buffer.
///
/// Every read either returns exactly the bytes asked for or fails with
/// [`CodecError::InsufficientBytes`]; it never panics on short input.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::InsufficientBytes {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64_be(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads a u32 LE length prefix.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?) as usize)
    }

    /// Reads the u32 LE element count of a sequence or mapping.
    ///
    /// Elements take at least one byte each, so a count above the remaining
    /// input fails here instead of driving an oversized allocation.
    pub fn read_count(&mut self) -> Result<usize, CodecError> {
        let count = self.read_len()?;
        if count > self.remaining() {
            return Err(CodecError::InsufficientBytes {
                needed: count,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Reads one element of a counted sequence, rejecting elements that
    /// consume no input.
    pub fn read_element<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        let start = self.pos;
        let value = read(self)?;
        if self.pos == start {
            return Err(zero_width_element());
        }
        Ok(value)
    }

    /// Reads a presence byte: `false` for 0, `true` for 1.
    pub fn read_presence(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidPresenceFlag(other)),
        }
    }

    /// Consumes the reader, failing if any input is left.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { remaining }),
        }
    }
}
