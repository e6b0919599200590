//! Dynamically typed wire values.
//!
//! Contract parameters often arrive without a Rust type: as JSON from a
//! caller, or as a list assembled at runtime. [`Value`] covers every kind the
//! wire format knows, and [`Shape`] is the type description a decoder needs
//! to read one back.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{encode_element, write_len, CodecError, Decode, Encode, Reader};

/// A wire value whose type is only known at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    String(String),
    /// Length-prefixed byte sequence.
    Bytes(Vec<u8>),
    /// Fixed-size raw bytes (addresses, hashes). No length prefix.
    Fixed(Vec<u8>),
    /// Homogeneous sequence.
    List(Vec<Value>),
    /// Key/value entries. Encoded in canonical key order.
    Map(Vec<(Value, Value)>),
    Option(Option<Box<Value>>),
    /// Nested record: fields in order, no framing of its own.
    Record(Vec<Value>),
    Timestamp(DateTime<Utc>),
    Duration(Duration),
}

/// Type description used to decode a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    String,
    Bytes,
    Fixed(usize),
    List(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Option(Box<Shape>),
    Record(Vec<Shape>),
    Timestamp,
    Duration,
}

impl Value {
    /// Convenience for `Value::Option(Some(..))`.
    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }
}

// ---------------------------------------------------------------------------
// Homogeneity
// ---------------------------------------------------------------------------

/// The shape a value pins down. Empty collections and absent options leave
/// parts of it open.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outline {
    Open,
    Leaf(Shape),
    List(Box<Outline>),
    Map(Box<Outline>, Box<Outline>),
    Option(Box<Outline>),
    Record(Vec<Outline>),
}

impl Outline {
    fn of(value: &Value) -> Result<Outline, CodecError> {
        Ok(match value {
            Value::Bool(_) => Outline::Leaf(Shape::Bool),
            Value::U8(_) => Outline::Leaf(Shape::U8),
            Value::U16(_) => Outline::Leaf(Shape::U16),
            Value::U32(_) => Outline::Leaf(Shape::U32),
            Value::U64(_) => Outline::Leaf(Shape::U64),
            Value::I8(_) => Outline::Leaf(Shape::I8),
            Value::I16(_) => Outline::Leaf(Shape::I16),
            Value::I32(_) => Outline::Leaf(Shape::I32),
            Value::I64(_) => Outline::Leaf(Shape::I64),
            Value::String(_) => Outline::Leaf(Shape::String),
            Value::Bytes(_) => Outline::Leaf(Shape::Bytes),
            Value::Fixed(bytes) => Outline::Leaf(Shape::Fixed(bytes.len())),
            Value::Timestamp(_) => Outline::Leaf(Shape::Timestamp),
            Value::Duration(_) => Outline::Leaf(Shape::Duration),
            Value::List(items) => Outline::List(Box::new(common_outline("list", items.iter())?)),
            Value::Map(entries) => Outline::Map(
                Box::new(common_outline("map keys", entries.iter().map(|(k, _)| k))?),
                Box::new(common_outline("map values", entries.iter().map(|(_, v)| v))?),
            ),
            Value::Option(None) => Outline::Option(Box::new(Outline::Open)),
            Value::Option(Some(inner)) => Outline::Option(Box::new(Outline::of(inner)?)),
            Value::Record(fields) => {
                Outline::Record(fields.iter().map(Outline::of).collect::<Result<_, _>>()?)
            }
        })
    }

    /// Combines two outlines, filling open parts of one from the other.
    /// `None` when they disagree anywhere.
    fn merge(self, other: Outline) -> Option<Outline> {
        Some(match (self, other) {
            (Outline::Open, o) | (o, Outline::Open) => o,
            (Outline::Leaf(a), Outline::Leaf(b)) if a == b => Outline::Leaf(a),
            (Outline::List(a), Outline::List(b)) => Outline::List(Box::new(a.merge(*b)?)),
            (Outline::Map(ak, av), Outline::Map(bk, bv)) => {
                Outline::Map(Box::new(ak.merge(*bk)?), Box::new(av.merge(*bv)?))
            }
            (Outline::Option(a), Outline::Option(b)) => Outline::Option(Box::new(a.merge(*b)?)),
            (Outline::Record(a), Outline::Record(b)) if a.len() == b.len() => Outline::Record(
                a.into_iter()
                    .zip(b)
                    .map(|(x, y)| x.merge(y))
                    .collect::<Option<_>>()?,
            ),
            _ => return None,
        })
    }

    fn describe(&self) -> String {
        match self {
            Outline::Open => "_".to_string(),
            Outline::Leaf(Shape::Fixed(n)) => format!("fixed[{}]", n),
            Outline::Leaf(shape) => format!("{:?}", shape).to_lowercase(),
            Outline::List(item) => format!("list<{}>", item.describe()),
            Outline::Map(k, v) => format!("map<{}, {}>", k.describe(), v.describe()),
            Outline::Option(inner) => format!("option<{}>", inner.describe()),
            Outline::Record(fields) => format!(
                "record({})",
                fields.iter().map(Outline::describe).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// Checks that every item fits one shape, all the way down, and returns it.
fn common_outline<'a>(
    what: &str,
    items: impl Iterator<Item = &'a Value>,
) -> Result<Outline, CodecError> {
    let mut common = Outline::Open;
    for item in items {
        let outline = Outline::of(item)?;
        let described = outline.describe();
        common = match common.clone().merge(outline) {
            Some(merged) => merged,
            None => {
                return Err(CodecError::UnsupportedKind(format!(
                    "heterogeneous {}: {} mixed with {}",
                    what,
                    common.describe(),
                    described
                )))
            }
        };
    }
    Ok(common)
}

impl Encode for Value {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            Value::Bool(v) => v.encode_to(out),
            Value::U8(v) => v.encode_to(out),
            Value::U16(v) => v.encode_to(out),
            Value::U32(v) => v.encode_to(out),
            Value::U64(v) => v.encode_to(out),
            Value::I8(v) => v.encode_to(out),
            Value::I16(v) => v.encode_to(out),
            Value::I32(v) => v.encode_to(out),
            Value::I64(v) => v.encode_to(out),
            Value::String(v) => v.encode_to(out),
            Value::Bytes(v) => v.encode_to(out),
            Value::Fixed(v) => {
                out.extend_from_slice(v);
                Ok(())
            }
            Value::List(items) => {
                common_outline("list", items.iter())?;
                items.encode_to(out)
            }
            Value::Map(entries) => {
                common_outline("map keys", entries.iter().map(|(k, _)| k))?;
                common_outline("map values", entries.iter().map(|(_, v)| v))?;
                let mut encoded = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    encoded.push((super::encode(k)?, super::encode(v)?));
                }
                encoded.sort_by(|a, b| a.0.cmp(&b.0));
                if encoded.windows(2).any(|w| w[0].0 == w[1].0) {
                    return Err(CodecError::DuplicateMapKey);
                }
                write_len(out, encoded.len())?;
                for (k, v) in encoded {
                    encode_element(out, |out| {
                        out.extend_from_slice(&k);
                        out.extend_from_slice(&v);
                        Ok(())
                    })?;
                }
                Ok(())
            }
            Value::Option(inner) => match inner {
                None => {
                    out.push(0);
                    Ok(())
                }
                Some(v) => {
                    out.push(1);
                    v.encode_to(out)
                }
            },
            Value::Record(fields) => {
                for field in fields {
                    field.encode_to(out)?;
                }
                Ok(())
            }
            Value::Timestamp(v) => v.encode_to(out),
            Value::Duration(v) => v.encode_to(out),
        }
    }
}

impl Shape {
    /// Reads one value of this shape from the reader.
    pub fn read(&self, reader: &mut Reader<'_>) -> Result<Value, CodecError> {
        Ok(match self {
            Shape::Bool => Value::Bool(bool::decode_from(reader)?),
            Shape::U8 => Value::U8(u8::decode_from(reader)?),
            Shape::U16 => Value::U16(u16::decode_from(reader)?),
            Shape::U32 => Value::U32(u32::decode_from(reader)?),
            Shape::U64 => Value::U64(u64::decode_from(reader)?),
            Shape::I8 => Value::I8(i8::decode_from(reader)?),
            Shape::I16 => Value::I16(i16::decode_from(reader)?),
            Shape::I32 => Value::I32(i32::decode_from(reader)?),
            Shape::I64 => Value::I64(i64::decode_from(reader)?),
            Shape::String => Value::String(String::decode_from(reader)?),
            Shape::Bytes => Value::Bytes(Vec::<u8>::decode_from(reader)?),
            Shape::Fixed(n) => Value::Fixed(reader.read_bytes(*n)?.to_vec()),
            Shape::List(item) => {
                let count = reader.read_count()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(reader.read_element(|r| item.read(r))?);
                }
                Value::List(items)
            }
            Shape::Map(key, value) => {
                let count = reader.read_count()?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    entries.push(reader.read_element(|r| Ok((key.read(r)?, value.read(r)?)))?);
                }
                Value::Map(entries)
            }
            Shape::Option(inner) => {
                if reader.read_presence()? {
                    Value::some(inner.read(reader)?)
                } else {
                    Value::Option(None)
                }
            }
            Shape::Record(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push(field.read(reader)?);
                }
                Value::Record(values)
            }
            Shape::Timestamp => Value::Timestamp(DateTime::<Utc>::decode_from(reader)?),
            Shape::Duration => Value::Duration(Duration::decode_from(reader)?),
        })
    }
}

/// Decodes one value of `shape` from the front of `bytes`, returning it with
/// the number of bytes consumed.
pub fn decode_value_prefix(bytes: &[u8], shape: &Shape) -> Result<(Value, usize), CodecError> {
    let mut reader = Reader::new(bytes);
    let value = shape.read(&mut reader)?;
    Ok((value, reader.position()))
}

/// Decodes exactly one value of `shape`; leftover input is an error.
pub fn decode_value(bytes: &[u8], shape: &Shape) -> Result<Value, CodecError> {
    let mut reader = Reader::new(bytes);
    let value = shape.read(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )*};
}

impl_value_from!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    String => String,
    Vec<u8> => Bytes,
    DateTime<Utc> => Timestamp,
    Duration => Duration,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// JSON input maps onto the wire kinds as follows:
///
/// - integers become `I64`, or `U64` above `i64::MAX` (both encode to the
///   same 8 bytes for non-negative values);
/// - `null` is an absent option, and an array holding `null` wraps its other
///   items in present options;
/// - arrays become lists;
/// - objects become records, fields in ascending key order.
///
/// Fractional numbers have no wire encoding and are rejected. Key/value maps
/// have no JSON form here; build them with [`Value::Map`].
impl TryFrom<serde_json::Value> for Value {
    type Error = CodecError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        Ok(match json {
            Json::Null => Value::Option(None),
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else {
                    return Err(CodecError::UnsupportedKind(format!(
                        "non-integer number {}",
                        n
                    )));
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => {
                let nullable = items.iter().any(serde_json::Value::is_null);
                let items = items
                    .into_iter()
                    .map(|item| match (nullable, item.is_null()) {
                        (true, false) => Value::try_from(item).map(Value::some),
                        _ => Value::try_from(item),
                    })
                    .collect::<Result<_, _>>()?;
                Value::List(items)
            }
            Json::Object(map) => {
                let mut fields: Vec<_> = map.into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                Value::Record(
                    fields
                        .into_iter()
                        .map(|(_, v)| Value::try_from(v))
                        .collect::<Result<_, _>>()?,
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use chrono::TimeZone;
    use serde_json::json;

    fn roundtrip(value: Value, shape: Shape) {
        let bytes = encode(&value).unwrap();
        let decoded = decode_value(&bytes, &shape).unwrap();
        assert_eq!(decoded, value, "roundtrip mismatch for {:?}", shape);
    }

    #[test]
    fn every_kind_roundtrips() {
        roundtrip(Value::Bool(true), Shape::Bool);
        roundtrip(Value::U8(200), Shape::U8);
        roundtrip(Value::U16(60_000), Shape::U16);
        roundtrip(Value::U32(4_000_000_000), Shape::U32);
        roundtrip(Value::U64(u64::MAX), Shape::U64);
        roundtrip(Value::I8(-5), Shape::I8);
        roundtrip(Value::I16(-300), Shape::I16);
        roundtrip(Value::I32(i32::MIN), Shape::I32);
        roundtrip(Value::I64(-1), Shape::I64);
        roundtrip(Value::from("héllo"), Shape::String);
        roundtrip(Value::Bytes(vec![1, 2, 3]), Shape::Bytes);
        roundtrip(Value::Fixed(vec![9; 32]), Shape::Fixed(32));
        roundtrip(
            Value::List(vec![Value::U16(1), Value::U16(2)]),
            Shape::List(Box::new(Shape::U16)),
        );
        roundtrip(
            Value::Map(vec![(Value::U8(1), Value::from("a"))]),
            Shape::Map(Box::new(Shape::U8), Box::new(Shape::String)),
        );
        roundtrip(Value::Option(None), Shape::Option(Box::new(Shape::U8)));
        roundtrip(Value::some(Value::U8(4)), Shape::Option(Box::new(Shape::U8)));
        roundtrip(
            Value::Record(vec![Value::Bool(false), Value::I32(7)]),
            Shape::Record(vec![Shape::Bool, Shape::I32]),
        );
        roundtrip(
            Value::Timestamp(Utc.timestamp_millis_opt(1_000).unwrap()),
            Shape::Timestamp,
        );
        roundtrip(Value::Duration(Duration::from_millis(42)), Shape::Duration);
    }

    #[test]
    fn dynamic_and_static_encodings_agree() {
        let dynamic = Value::List(vec![Value::from("a"), Value::from("bc")]);
        let typed = vec!["a".to_string(), "bc".to_string()];
        assert_eq!(encode(&dynamic).unwrap(), encode(&typed).unwrap());
    }

    #[test]
    fn map_entries_are_sorted_by_key_bytes() {
        let unsorted = Value::Map(vec![
            (Value::U8(3), Value::Bool(true)),
            (Value::U8(1), Value::Bool(false)),
        ]);
        let sorted = Value::Map(vec![
            (Value::U8(1), Value::Bool(false)),
            (Value::U8(3), Value::Bool(true)),
        ]);
        assert_eq!(encode(&unsorted).unwrap(), encode(&sorted).unwrap());
        assert_eq!(encode(&sorted).unwrap(), vec![2, 0, 0, 0, 1, 0, 3, 1]);
    }

    #[test]
    fn duplicate_dynamic_keys_are_rejected() {
        let value = Value::Map(vec![
            (Value::U8(1), Value::Bool(true)),
            (Value::U8(1), Value::Bool(false)),
        ]);
        assert!(matches!(encode(&value), Err(CodecError::DuplicateMapKey)));
    }

    #[test]
    fn heterogeneous_list_is_unsupported() {
        let value = Value::List(vec![Value::U8(1), Value::from("x")]);
        assert!(matches!(
            encode(&value),
            Err(CodecError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn lists_must_agree_below_the_top_level() {
        let fixed = Value::List(vec![Value::Fixed(vec![1]), Value::Fixed(vec![1, 2])]);
        match encode(&fixed) {
            Err(CodecError::UnsupportedKind(msg)) => {
                assert_eq!(msg, "heterogeneous list: fixed[1] mixed with fixed[2]")
            }
            other => panic!("expected unsupported kind, got {:?}", other),
        }

        let nested = Value::List(vec![
            Value::List(vec![Value::U8(1)]),
            Value::List(vec![Value::from("a")]),
        ]);
        assert!(matches!(encode(&nested), Err(CodecError::UnsupportedKind(_))));

        let records = Value::List(vec![
            Value::Record(vec![Value::U8(1)]),
            Value::Record(vec![Value::U8(1), Value::U8(2)]),
        ]);
        assert!(matches!(encode(&records), Err(CodecError::UnsupportedKind(_))));

        let map_values = Value::Map(vec![
            (Value::U8(1), Value::some(Value::U8(1))),
            (Value::U8(2), Value::some(Value::U16(1))),
        ]);
        assert!(matches!(
            encode(&map_values),
            Err(CodecError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn open_parts_take_the_shape_of_their_siblings() {
        let value = Value::List(vec![
            Value::Option(None),
            Value::some(Value::List(vec![])),
            Value::some(Value::List(vec![Value::U16(3)])),
        ]);
        roundtrip(
            value,
            Shape::List(Box::new(Shape::Option(Box::new(Shape::List(Box::new(
                Shape::U16,
            )))))),
        );

        // Each None is compatible with both, but the two present values are not.
        let value = Value::List(vec![
            Value::Option(None),
            Value::some(Value::U8(1)),
            Value::some(Value::from("a")),
        ]);
        assert!(matches!(encode(&value), Err(CodecError::UnsupportedKind(_))));
    }

    #[test]
    fn zero_width_shapes_cannot_inflate_a_count() {
        let empty_record = Shape::List(Box::new(Shape::Record(vec![])));
        assert!(matches!(
            decode_value(&[0, 0, 0, 1], &empty_record),
            Err(CodecError::InsufficientBytes { .. })
        ));
        assert!(matches!(
            decode_value(&[1, 0, 0, 0, 0], &Shape::List(Box::new(Shape::Fixed(0)))),
            Err(CodecError::UnsupportedKind(_))
        ));
        assert!(matches!(
            decode_value(
                &[0xFF, 0xFF, 0xFF, 0xFF],
                &Shape::Map(Box::new(Shape::Fixed(0)), Box::new(Shape::Fixed(0)))
            ),
            Err(CodecError::InsufficientBytes { .. })
        ));
        assert!(matches!(
            encode(&Value::List(vec![Value::Record(vec![])])),
            Err(CodecError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn shape_mismatch_surfaces_as_codec_error() {
        // Two bytes cannot hold a u32.
        let err = decode_value(&[1, 2], &Shape::U32).unwrap_err();
        assert!(matches!(err, CodecError::InsufficientBytes { .. }));

        // A u8 read from two bytes leaves one behind.
        let err = decode_value(&[1, 2], &Shape::U8).unwrap_err();
        assert!(matches!(err, CodecError::TrailingBytes { remaining: 1 }));
    }

    #[test]
    fn prefix_decode_composes() {
        let mut bytes = encode(&Value::from("ab")).unwrap();
        bytes.extend(encode(&Value::U16(7)).unwrap());

        let (first, used) = decode_value_prefix(&bytes, &Shape::String).unwrap();
        assert_eq!(first, Value::from("ab"));
        assert_eq!(used, 6);
        let second = decode_value(&bytes[used..], &Shape::U16).unwrap();
        assert_eq!(second, Value::U16(7));
    }

    #[test]
    fn json_conversion() {
        assert_eq!(Value::try_from(json!(-3)).unwrap(), Value::I64(-3));
        assert_eq!(Value::try_from(json!(3)).unwrap(), Value::I64(3));
        assert_eq!(
            Value::try_from(json!(u64::MAX)).unwrap(),
            Value::U64(u64::MAX)
        );
        assert_eq!(
            Value::try_from(json!({"b": [1, 2], "a": null})).unwrap(),
            Value::Record(vec![
                Value::Option(None),
                Value::List(vec![Value::I64(1), Value::I64(2)]),
            ])
        );
    }

    #[test]
    fn json_with_signed_and_unsigned_integers_encodes() {
        let bytes = encode(&Value::try_from(json!([1, -1])).unwrap()).unwrap();
        let mut expected = vec![2, 0, 0, 0];
        expected.extend(1i64.to_le_bytes());
        expected.extend((-1i64).to_le_bytes());
        assert_eq!(bytes, expected);

        let nested = Value::try_from(json!([[1], [-1], []])).unwrap();
        assert!(encode(&nested).is_ok());
    }

    #[test]
    fn json_object_encodes_as_record() {
        let value = Value::try_from(json!({"memo": "x", "amount": 5})).unwrap();
        let mut expected = 5i64.to_le_bytes().to_vec();
        expected.extend([1, 0, 0, 0, b'x']);
        assert_eq!(encode(&value).unwrap(), expected);

        let shape = Shape::Record(vec![Shape::I64, Shape::String]);
        assert_eq!(decode_value(&expected, &shape).unwrap(), value);
    }

    #[test]
    fn json_nulls_make_their_array_optional() {
        let value = Value::try_from(json!([null, 4])).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Option(None), Value::some(Value::I64(4))])
        );
        let bytes = encode(&value).unwrap();
        let mut expected = vec![2, 0, 0, 0, 0, 1];
        expected.extend(4i64.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn json_that_has_no_common_kind_is_rejected_at_encode() {
        let mixed = Value::try_from(json!([1, "x"])).unwrap();
        assert!(matches!(encode(&mixed), Err(CodecError::UnsupportedKind(_))));

        let out_of_range = Value::try_from(json!([u64::MAX, -1])).unwrap();
        assert!(matches!(
            encode(&out_of_range),
            Err(CodecError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn json_float_is_unsupported() {
        assert!(matches!(
            Value::try_from(json!(1.5)),
            Err(CodecError::UnsupportedKind(_))
        ));
    }
}
