//! Schema-described records.
//!
//! A record's wire form is its fields in declaration order, filtered and
//! shaped by a per-field [`FieldMode`]. The schema is declared once, next to
//! the struct, through [`wire_record!`](crate::wire_record):
//!
//! ```
//! use aurum_sdk::wire_record;
//! use aurum_sdk::codec::{self, FieldMode, Record};
//!
//! wire_record! {
//!     #[derive(Debug, Clone, PartialEq, Default)]
//!     pub struct Listing {
//!         pub id: u64 => required,
//!         pub title: String => required,
//!         pub note: Option<String> => optional,
//!         pub cached_score: u32 => skip,
//!     }
//! }
//!
//! assert_eq!(Listing::SCHEMA[2].mode, FieldMode::Optional);
//! let bytes = codec::encode(&Listing { id: 1, title: "a".into(), ..Default::default() }).unwrap();
//! // id (8) + title (4 + 1) + presence byte (1); `cached_score` is not on the wire.
//! assert_eq!(bytes.len(), 14);
//! ```

use super::{CodecError, Decode, Encode, Reader};

/// How a record field participates in the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Always encoded.
    Required,
    /// Encoded behind a presence byte. The field type must be `Option<T>`.
    Optional,
    /// Not on the wire. Decoding fills it with `Default::default()`.
    Skipped,
}

/// One entry of a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub mode: FieldMode,
}

/// A type whose wire layout is described by a static field schema.
pub trait Record {
    const SCHEMA: &'static [FieldSpec];

    /// Names of the fields that appear on the wire, in order.
    fn wire_fields() -> Vec<&'static str> {
        Self::SCHEMA
            .iter()
            .filter(|f| f.mode != FieldMode::Skipped)
            .map(|f| f.name)
            .collect()
    }
}

/// Encodes an optional record field: presence byte, then the payload if any.
pub fn encode_optional<T: Encode>(value: &Option<T>, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match value {
        None => {
            out.push(0);
            Ok(())
        }
        Some(inner) => {
            out.push(1);
            inner.encode_to(out)
        }
    }
}

/// Decodes an optional record field written by [`encode_optional`].
pub fn decode_optional<T: Decode>(reader: &mut Reader<'_>) -> Result<Option<T>, CodecError> {
    if reader.read_presence()? {
        T::decode_from(reader).map(Some)
    } else {
        Ok(None)
    }
}

/// Declares a struct together with its wire schema.
///
/// Each field is written `name: Type => mode`, where `mode` is one of
/// `required`, `optional` (type must be `Option<T>`) or `skip` (type must be
/// `Default`). Generates the struct, a [`Record`] impl exposing the schema,
/// and [`Encode`]/[`Decode`] impls that walk the fields in order.
#[macro_export]
macro_rules! wire_record {
    (@mode required) => { $crate::codec::FieldMode::Required };
    (@mode optional) => { $crate::codec::FieldMode::Optional };
    (@mode skip) => { $crate::codec::FieldMode::Skipped };

    (@encode required, $value:expr, $out:ident) => {
        $crate::codec::Encode::encode_to($value, $out)?
    };
    (@encode optional, $value:expr, $out:ident) => {
        $crate::codec::encode_optional($value, $out)?
    };
    (@encode skip, $value:expr, $out:ident) => {
        let _ = $value;
    };

    (@decode required, $ty:ty, $reader:ident) => {
        <$ty as $crate::codec::Decode>::decode_from($reader)?
    };
    (@decode optional, $ty:ty, $reader:ident) => {
        $crate::codec::decode_optional($reader)?
    };
    (@decode skip, $ty:ty, $reader:ident) => {
        <$ty as ::core::default::Default>::default()
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $mode:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::codec::Record for $name {
            const SCHEMA: &'static [$crate::codec::FieldSpec] = &[
                $(
                    $crate::codec::FieldSpec {
                        name: stringify!($field),
                        mode: $crate::wire_record!(@mode $mode),
                    },
                )*
            ];
        }

        impl $crate::codec::Encode for $name {
            fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), $crate::codec::CodecError> {
                $( $crate::wire_record!(@encode $mode, &self.$field, out); )*
                Ok(())
            }
        }

        impl $crate::codec::Decode for $name {
            fn decode_from(
                reader: &mut $crate::codec::Reader<'_>,
            ) -> Result<Self, $crate::codec::CodecError> {
                $( let $field: $ty = $crate::wire_record!(@decode $mode, $ty, reader); )*
                Ok(Self { $( $field ),* })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use std::collections::BTreeMap;
    use std::time::Duration;

    crate::wire_record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Inner {
            flag: bool => required,
            weight: Option<u16> => optional,
        }
    }

    crate::wire_record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Outer {
            id: u32 => required,
            label: Option<String> => optional,
            local_only: String => skip,
            children: Vec<Inner> => required,
            tags: BTreeMap<String, u8> => required,
            timeout: Duration => required,
        }
    }

    #[test]
    fn schema_lists_fields_in_order() {
        let names: Vec<_> = Outer::SCHEMA.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["id", "label", "local_only", "children", "tags", "timeout"]
        );
        assert_eq!(Outer::SCHEMA[1].mode, FieldMode::Optional);
        assert_eq!(Outer::SCHEMA[2].mode, FieldMode::Skipped);
        assert!(!Outer::wire_fields().contains(&"local_only"));
    }

    #[test]
    fn absent_optional_field_is_one_zero_byte() {
        let inner = Inner {
            flag: true,
            weight: None,
        };
        assert_eq!(encode(&inner).unwrap(), vec![1, 0]);

        let inner = Inner {
            flag: false,
            weight: Some(0x0102),
        };
        assert_eq!(encode(&inner).unwrap(), vec![0, 1, 0x02, 0x01]);
    }

    #[test]
    fn skipped_field_is_not_encoded_and_decodes_to_default() {
        let value = Outer {
            id: 7,
            label: Some("x".into()),
            local_only: "never on the wire".into(),
            children: vec![],
            tags: BTreeMap::new(),
            timeout: Duration::from_millis(5),
        };
        let bytes = encode(&value).unwrap();
        // id 4 + presence 1 + "x" 5 + children 4 + tags 4 + timeout 8
        assert_eq!(bytes.len(), 26);

        let decoded: Outer = decode(&bytes).unwrap();
        assert_eq!(decoded.local_only, "");
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.label.as_deref(), Some("x"));
    }

    #[test]
    fn nested_record_roundtrip() {
        let mut tags = BTreeMap::new();
        tags.insert("a".to_string(), 1);
        tags.insert("b".to_string(), 2);
        let value = Outer {
            id: u32::MAX,
            label: None,
            local_only: String::new(),
            children: vec![
                Inner {
                    flag: true,
                    weight: Some(3),
                },
                Inner {
                    flag: false,
                    weight: None,
                },
            ],
            tags,
            timeout: Duration::from_secs(600),
        };
        let bytes = encode(&value).unwrap();
        assert_eq!(decode::<Outer>(&bytes).unwrap(), value);
        assert_eq!(value.encoded_len().unwrap(), bytes.len());
    }

    #[test]
    fn truncated_record_fails_cleanly() {
        let value = Inner {
            flag: true,
            weight: Some(9),
        };
        let bytes = encode(&value).unwrap();
        let err = decode::<Inner>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CodecError::InsufficientBytes { .. }));
    }
}
