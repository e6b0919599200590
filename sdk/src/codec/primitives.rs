//! Structural encodings for the built-in Rust types.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use super::{encode_element, write_len, CodecError, Decode, Encode, Reader};

// ---------------------------------------------------------------------------
// Integers and bool
// ---------------------------------------------------------------------------

macro_rules! impl_le_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
                out.extend_from_slice(&self.to_le_bytes());
                Ok(())
            }

            fn encoded_len(&self) -> Result<usize, CodecError> {
                Ok(std::mem::size_of::<$ty>())
            }
        }

        impl Decode for $ty {
            fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
                Ok(<$ty>::from_le_bytes(reader.read_array()?))
            }
        }
    )*};
}

impl_le_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Encode for bool {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.push(u8::from(*self));
        Ok(())
    }
}

impl Decode for bool {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Strings and sequences
// ---------------------------------------------------------------------------

impl Encode for str {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_len(out, self.len())?;
        out.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl Encode for String {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.as_str().encode_to(out)
    }
}

impl Decode for String {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = reader.read_len()?;
        let bytes = reader.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_len(out, self.len())?;
        for item in self {
            encode_element(out, |out| item.encode_to(out))?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.as_slice().encode_to(out)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = reader.read_count()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(reader.read_element(T::decode_from)?);
        }
        Ok(items)
    }
}

/// Fixed-size byte arrays are raw: no length prefix.
impl<const N: usize> Encode for [u8; N] {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.extend_from_slice(self);
        Ok(())
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_array()
    }
}

// ---------------------------------------------------------------------------
// Option
// ---------------------------------------------------------------------------

impl<T: Encode> Encode for Option<T> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            None => out.push(0),
            Some(inner) => {
                out.push(1);
                inner.encode_to(out)?;
            }
        }
        Ok(())
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        if reader.read_presence()? {
            Ok(Some(T::decode_from(reader)?))
        } else {
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Writes a mapping in canonical order: entries sorted by their encoded key
/// bytes. The result is independent of the map type and of hasher state.
fn encode_canonical_map<'a, K, V, I>(
    len: usize,
    entries: I,
    out: &mut Vec<u8>,
) -> Result<(), CodecError>
where
    K: Encode + 'a,
    V: Encode + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut encoded = Vec::with_capacity(len);
    for (k, v) in entries {
        let mut key = Vec::new();
        k.encode_to(&mut key)?;
        let mut value = Vec::new();
        v.encode_to(&mut value)?;
        encoded.push((key, value));
    }
    encoded.sort_by(|a, b| a.0.cmp(&b.0));

    write_len(out, encoded.len())?;
    for (key, value) in encoded {
        encode_element(out, |out| {
            out.extend_from_slice(&key);
            out.extend_from_slice(&value);
            Ok(())
        })?;
    }
    Ok(())
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        encode_canonical_map(self.len(), self.iter(), out)
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        encode_canonical_map(self.len(), self.iter(), out)
    }
}

fn read_entry<K: Decode, V: Decode>(reader: &mut Reader<'_>) -> Result<(K, V), CodecError> {
    let key = K::decode_from(reader)?;
    let value = V::decode_from(reader)?;
    Ok((key, value))
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = reader.read_count()?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let (key, value) = reader.read_element(read_entry::<K, V>)?;
            if map.insert(key, value).is_some() {
                return Err(CodecError::DuplicateMapKey);
            }
        }
        Ok(map)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = reader.read_count()?;
        let mut map = HashMap::with_capacity_and_hasher(count, S::default());
        for _ in 0..count {
            let (key, value) = reader.read_element(read_entry::<K, V>)?;
            if map.insert(key, value).is_some() {
                return Err(CodecError::DuplicateMapKey);
            }
        }
        Ok(map)
    }
}

/// Encodes a `HashMap` in whatever order it iterates.
///
/// This reproduces the legacy behaviour of encoders that walked hash maps
/// directly. The output is NOT stable across runs for maps with more than
/// one entry; use it only to compare against bytes produced that way.
#[derive(Debug)]
pub struct IterationOrder<'a, K, V, S = std::collections::hash_map::RandomState>(
    pub &'a HashMap<K, V, S>,
);

impl<K: Encode, V: Encode, S> Encode for IterationOrder<'_, K, V, S> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_len(out, self.0.len())?;
        for (k, v) in self.0 {
            encode_element(out, |out| {
                k.encode_to(out)?;
                v.encode_to(out)
            })?;
        }
        Ok(())
    }
}
