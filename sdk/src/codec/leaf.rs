//! Opaque leaf types with fixed, hand-written encodings.
//!
//! Timestamps and durations are both a u64 LE millisecond count. Anything
//! else that needs a bespoke (and possibly fallible) encoding implements
//! [`CustomLeaf`] and registers itself with [`impl_custom_leaf!`](crate::impl_custom_leaf).

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{CodecError, Decode, Encode, Reader};

impl Encode for DateTime<Utc> {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let millis =
            u64::try_from(self.timestamp_millis()).map_err(|_| CodecError::CustomEncodeFailure {
                type_name: "DateTime<Utc>",
                reason: format!("timestamp {} precedes the unix epoch", self),
            })?;
        millis.encode_to(out)
    }
}

impl Decode for DateTime<Utc> {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let millis = u64::decode_from(reader)?;
        i64::try_from(millis)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or(CodecError::CustomDecodeFailure {
                type_name: "DateTime<Utc>",
                reason: format!("{} ms is outside the representable range", millis),
            })
    }
}

impl Encode for Duration {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let millis =
            u64::try_from(self.as_millis()).map_err(|_| CodecError::CustomEncodeFailure {
                type_name: "Duration",
                reason: format!("{:?} overflows a u64 millisecond count", self),
            })?;
        millis.encode_to(out)
    }
}

impl Decode for Duration {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Duration::from_millis(u64::decode_from(reader)?))
    }
}

/// A leaf type that supplies its own encoding.
///
/// Implement this and invoke [`impl_custom_leaf!`](crate::impl_custom_leaf)
/// to get [`Encode`]/[`Decode`]. Errors returned from the hooks surface as
/// [`CodecError::CustomEncodeFailure`] and [`CodecError::CustomDecodeFailure`]
/// tagged with [`TYPE_NAME`](Self::TYPE_NAME).
pub trait CustomLeaf: Sized {
    const TYPE_NAME: &'static str;

    fn encode_leaf(&self, out: &mut Vec<u8>) -> Result<(), String>;

    fn decode_leaf(reader: &mut Reader<'_>) -> Result<Self, String>;
}

/// Implements [`Encode`] and [`Decode`] for a [`CustomLeaf`] type.
#[macro_export]
macro_rules! impl_custom_leaf {
    ($ty:ty) => {
        impl $crate::codec::Encode for $ty {
            fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), $crate::codec::CodecError> {
                // Encode into scratch space so a failing hook leaves `out` untouched.
                let mut scratch = Vec::new();
                <$ty as $crate::codec::CustomLeaf>::encode_leaf(self, &mut scratch).map_err(
                    |reason| $crate::codec::CodecError::CustomEncodeFailure {
                        type_name: <$ty as $crate::codec::CustomLeaf>::TYPE_NAME,
                        reason,
                    },
                )?;
                out.extend_from_slice(&scratch);
                Ok(())
            }
        }

        impl $crate::codec::Decode for $ty {
            fn decode_from(
                reader: &mut $crate::codec::Reader<'_>,
            ) -> Result<Self, $crate::codec::CodecError> {
                <$ty as $crate::codec::CustomLeaf>::decode_leaf(reader).map_err(|reason| {
                    $crate::codec::CodecError::CustomDecodeFailure {
                        type_name: <$ty as $crate::codec::CustomLeaf>::TYPE_NAME,
                        reason,
                    }
                })
            }
        }
    };
}
