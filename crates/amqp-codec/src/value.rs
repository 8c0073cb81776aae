//! The dynamically typed AMQP value.

use std::hash::{Hash, Hasher};

use amqp_buffers::{Reader, Writer};
use bytes::Bytes;

use crate::codec::{Decode, Encode};
use crate::composite::{array, Described, List, Map};
use crate::constants::*;
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};
use crate::format::PrefixWidth;
use crate::primitive::{Primitive, Symbol, Timestamp, Uuid};

/// Any value of the AMQP type system.
///
/// Decoding an `AmqpValue` recovers its type from the format code alone.
/// Lists and maps come back buffered and decode their elements on first
/// read; arrays are decoded eagerly.
#[derive(Debug, Clone, Default)]
pub enum AmqpValue {
    #[default]
    Null,
    Boolean(bool),
    Ubyte(u8),
    Ushort(u16),
    Uint(u32),
    Ulong(u64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Timestamp(Timestamp),
    Uuid(Uuid),
    Binary(Bytes),
    String(String),
    Symbol(Symbol),
    List(List),
    Map(Map),
    Array(Vec<AmqpValue>),
    Described(Box<Described>),
}

/// Evaluates `$body` with `$p` bound to the inner value of any primitive
/// variant, `$other` otherwise.
macro_rules! with_primitive {
    ($value:expr, |$p:ident| $body:expr, _ => $other:expr) => {
        match $value {
            AmqpValue::Boolean($p) => $body,
            AmqpValue::Ubyte($p) => $body,
            AmqpValue::Ushort($p) => $body,
            AmqpValue::Uint($p) => $body,
            AmqpValue::Ulong($p) => $body,
            AmqpValue::Byte($p) => $body,
            AmqpValue::Short($p) => $body,
            AmqpValue::Int($p) => $body,
            AmqpValue::Long($p) => $body,
            AmqpValue::Float($p) => $body,
            AmqpValue::Double($p) => $body,
            AmqpValue::Char($p) => $body,
            AmqpValue::Timestamp($p) => $body,
            AmqpValue::Uuid($p) => $body,
            AmqpValue::Binary($p) => $body,
            AmqpValue::String($p) => $body,
            AmqpValue::Symbol($p) => $body,
            _ => $other,
        }
    };
}

fn width_of(code: u8) -> PrefixWidth {
    match code {
        LIST8 | MAP8 | ARRAY8 => PrefixWidth::One,
        _ => PrefixWidth::Four,
    }
}

impl AmqpValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AmqpValue::Null)
    }

    /// Protocol name of the value's type.
    pub fn type_name(&self) -> &'static str {
        with_primitive!(self, |p| primitive_name(p), _ => match self {
            AmqpValue::Null => "null",
            AmqpValue::List(_) => "list",
            AmqpValue::Map(_) => "map",
            AmqpValue::Array(_) => "array",
            _ => "described",
        })
    }

    /// A mutable copy: composites are forked, primitives cloned.
    pub fn copy(&self) -> Result<Self> {
        Ok(match self {
            AmqpValue::List(list) => AmqpValue::List(list.copy()?),
            AmqpValue::Map(map) => AmqpValue::Map(map.copy()?),
            AmqpValue::Described(described) => AmqpValue::Described(Box::new(described.copy()?)),
            AmqpValue::Array(elements) => AmqpValue::Array(
                elements
                    .iter()
                    .map(AmqpValue::copy)
                    .collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Narrowest constructor this value needs as an array element.
    pub(crate) fn element_code(&self) -> Result<u8> {
        with_primitive!(self, |p| Ok(p.element_code()), _ => match self {
            AmqpValue::List(list) => Ok(match list.width()? {
                PrefixWidth::One => LIST8,
                PrefixWidth::Four => LIST32,
            }),
            AmqpValue::Map(map) => Ok(match map.width()? {
                PrefixWidth::One => MAP8,
                PrefixWidth::Four => MAP32,
            }),
            AmqpValue::Array(elements) => Ok(match array::width(elements)? {
                PrefixWidth::One => ARRAY8,
                PrefixWidth::Four => ARRAY32,
            }),
            AmqpValue::Null => Err(AmqpError::malformed("array", "null elements")),
            _ => Err(AmqpError::malformed("array", "described elements are not supported")),
        })
    }

    /// Bytes written after the constructor `code`.
    pub(crate) fn body_size(&self, code: u8) -> Result<u32> {
        with_primitive!(self, |p| p.body_size(code), _ => match self {
            AmqpValue::List(list) => list.body_size(width_of(code)),
            AmqpValue::Map(map) => map.body_size(width_of(code)),
            AmqpValue::Array(elements) => array::body_size(width_of(code), elements),
            _ => Ok(0),
        })
    }

    pub(crate) fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        with_primitive!(self, |p| p.write_body(code, writer), _ => match self {
            AmqpValue::List(list) => list.write_body(width_of(code), writer),
            AmqpValue::Map(map) => map.write_body(width_of(code), writer),
            AmqpValue::Array(elements) => array::write_body(width_of(code), elements, writer),
            _ => Ok(()),
        })
    }

    /// Reads a fixed- or variable-width value whose format code has already
    /// been consumed.
    pub(crate) fn read_primitive(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        Ok(match code {
            NULL => AmqpValue::Null,
            TRUE | FALSE | BOOLEAN => AmqpValue::Boolean(bool::read_body(code, reader)?),
            UBYTE => AmqpValue::Ubyte(u8::read_body(code, reader)?),
            USHORT => AmqpValue::Ushort(u16::read_body(code, reader)?),
            UINT0 | SMALLUINT | UINT => AmqpValue::Uint(u32::read_body(code, reader)?),
            ULONG0 | SMALLULONG | ULONG => AmqpValue::Ulong(u64::read_body(code, reader)?),
            BYTE => AmqpValue::Byte(i8::read_body(code, reader)?),
            SHORT => AmqpValue::Short(i16::read_body(code, reader)?),
            SMALLINT | INT => AmqpValue::Int(i32::read_body(code, reader)?),
            SMALLLONG | LONG => AmqpValue::Long(i64::read_body(code, reader)?),
            FLOAT => AmqpValue::Float(f32::read_body(code, reader)?),
            DOUBLE => AmqpValue::Double(f64::read_body(code, reader)?),
            CHAR => AmqpValue::Char(char::read_body(code, reader)?),
            TIMESTAMP => AmqpValue::Timestamp(Timestamp::read_body(code, reader)?),
            UUID => AmqpValue::Uuid(Uuid::read_body(code, reader)?),
            VBIN8 | VBIN32 => AmqpValue::Binary(Bytes::read_body(code, reader)?),
            STR8 | STR32 => AmqpValue::String(String::read_body(code, reader)?),
            SYM8 | SYM32 => AmqpValue::Symbol(Symbol::read_body(code, reader)?),
            _ => {
                return Err(AmqpError::malformed(
                    "value",
                    format!("unassigned format code {code:#04x}"),
                ))
            }
        })
    }
}

fn primitive_name<P: Primitive>(_: &P) -> &'static str {
    P::NAME
}

impl Encode for AmqpValue {
    fn format_code(&self) -> u8 {
        with_primitive!(self, |p| p.code(), _ => match self {
            AmqpValue::Null => NULL,
            AmqpValue::List(list) => list.format_code(),
            AmqpValue::Map(map) => map.format_code(),
            AmqpValue::Array(elements) => array::format_code(elements),
            _ => DESCRIBED,
        })
    }

    fn encoded_size(&self) -> Result<u32> {
        with_primitive!(self, |p| Ok(1 + p.body_size(p.code())?), _ => match self {
            AmqpValue::Null => Ok(1),
            AmqpValue::List(list) => list.encoded_size(),
            AmqpValue::Map(map) => map.encoded_size(),
            AmqpValue::Array(elements) => array::encoded_size(elements),
            AmqpValue::Described(described) => described.encoded_size(),
            _ => Ok(1),
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        with_primitive!(self, |p| {
            let code = p.code();
            writer.u8(code);
            p.write_body(code, writer)
        }, _ => match self {
            AmqpValue::List(list) => list.write(writer),
            AmqpValue::Map(map) => map.write(writer),
            AmqpValue::Array(elements) => array::write(elements, writer),
            AmqpValue::Described(described) => described.write(writer),
            _ => {
                writer.u8(NULL);
                Ok(())
            }
        })
    }

    /// Composite values return (and freeze) their cached snapshot.
    fn to_bytes(&self) -> Result<Bytes> {
        match self {
            AmqpValue::List(list) => list.to_bytes(),
            AmqpValue::Map(map) => map.to_bytes(),
            AmqpValue::Described(described) => described.to_bytes(),
            _ => {
                let mut writer = Writer::with_capacity(self.encoded_size()? as usize);
                self.write(&mut writer)?;
                Ok(Bytes::from(writer.flush()))
            }
        }
    }
}

impl Decode for AmqpValue {
    fn decode(encoded: &Encoded) -> Result<Self> {
        match encoded.format_code() {
            LIST0 | LIST8 | LIST32 => Ok(AmqpValue::List(List::from_encoded(encoded.clone())?)),
            MAP8 | MAP32 => Ok(AmqpValue::Map(Map::from_encoded(encoded.clone())?)),
            ARRAY8 | ARRAY32 => Ok(AmqpValue::Array(array::decode(encoded)?)),
            DESCRIBED => Ok(AmqpValue::Described(Box::new(Described::decode(encoded)?))),
            VBIN8 | VBIN32 => Ok(AmqpValue::Binary(encoded.payload())),
            code => {
                let mut reader = Reader::from_slice(encoded.as_bytes(), 1, encoded.len());
                Self::read_primitive(code, &mut reader)
            }
        }
    }
}

impl PartialEq for AmqpValue {
    /// Floats compare by bit pattern so that equality stays reflexive.
    fn eq(&self, other: &Self) -> bool {
        use AmqpValue as V;
        match (self, other) {
            (V::Null, V::Null) => true,
            (V::Boolean(a), V::Boolean(b)) => a == b,
            (V::Ubyte(a), V::Ubyte(b)) => a == b,
            (V::Ushort(a), V::Ushort(b)) => a == b,
            (V::Uint(a), V::Uint(b)) => a == b,
            (V::Ulong(a), V::Ulong(b)) => a == b,
            (V::Byte(a), V::Byte(b)) => a == b,
            (V::Short(a), V::Short(b)) => a == b,
            (V::Int(a), V::Int(b)) => a == b,
            (V::Long(a), V::Long(b)) => a == b,
            (V::Float(a), V::Float(b)) => a.to_bits() == b.to_bits(),
            (V::Double(a), V::Double(b)) => a.to_bits() == b.to_bits(),
            (V::Char(a), V::Char(b)) => a == b,
            (V::Timestamp(a), V::Timestamp(b)) => a == b,
            (V::Uuid(a), V::Uuid(b)) => a == b,
            (V::Binary(a), V::Binary(b)) => a == b,
            (V::String(a), V::String(b)) => a == b,
            (V::Symbol(a), V::Symbol(b)) => a == b,
            (V::List(a), V::List(b)) => a == b,
            (V::Map(a), V::Map(b)) => a == b,
            (V::Array(a), V::Array(b)) => a == b,
            (V::Described(a), V::Described(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AmqpValue {}

impl Hash for AmqpValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AmqpValue::Null => {}
            AmqpValue::Boolean(v) => v.hash(state),
            AmqpValue::Ubyte(v) => v.hash(state),
            AmqpValue::Ushort(v) => v.hash(state),
            AmqpValue::Uint(v) => v.hash(state),
            AmqpValue::Ulong(v) => v.hash(state),
            AmqpValue::Byte(v) => v.hash(state),
            AmqpValue::Short(v) => v.hash(state),
            AmqpValue::Int(v) => v.hash(state),
            AmqpValue::Long(v) => v.hash(state),
            AmqpValue::Float(v) => v.to_bits().hash(state),
            AmqpValue::Double(v) => v.to_bits().hash(state),
            AmqpValue::Char(v) => v.hash(state),
            AmqpValue::Timestamp(v) => v.hash(state),
            AmqpValue::Uuid(v) => v.hash(state),
            AmqpValue::Binary(v) => v.hash(state),
            AmqpValue::String(v) => v.hash(state),
            AmqpValue::Symbol(v) => v.hash(state),
            AmqpValue::List(v) => v.hash(state),
            AmqpValue::Map(v) => v.hash(state),
            AmqpValue::Array(v) => v.hash(state),
            AmqpValue::Described(v) => v.hash(state),
        }
    }
}

macro_rules! from_impls {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AmqpValue {
                fn from(value: $ty) -> Self {
                    AmqpValue::$variant(value)
                }
            }
        )*
    };
}

from_impls! {
    bool => Boolean,
    u8 => Ubyte,
    u16 => Ushort,
    u32 => Uint,
    u64 => Ulong,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    Timestamp => Timestamp,
    Uuid => Uuid,
    Bytes => Binary,
    String => String,
    Symbol => Symbol,
    List => List,
    Map => Map,
}

impl From<&str> for AmqpValue {
    fn from(value: &str) -> Self {
        AmqpValue::String(value.to_owned())
    }
}

impl From<Described> for AmqpValue {
    fn from(value: Described) -> Self {
        AmqpValue::Described(Box::new(value))
    }
}

impl<T: Into<AmqpValue>> From<Option<T>> for AmqpValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AmqpValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_is_recovered_from_format_code() {
        let cases = [
            (vec![0x40], AmqpValue::Null),
            (vec![0x41], AmqpValue::Boolean(true)),
            (vec![0x43], AmqpValue::Uint(0)),
            (vec![0x53, 9], AmqpValue::Ulong(9)),
            (vec![0x51, 0xff], AmqpValue::Byte(-1)),
            (vec![0x83, 0, 0, 0, 0, 0, 0, 0, 5], AmqpValue::Timestamp(Timestamp(5))),
            (vec![0xa3, 1, b'x'], AmqpValue::Symbol(Symbol::from_static("x"))),
            (vec![0xa1, 1, b'x'], AmqpValue::String("x".into())),
        ];
        for (bytes, expected) in cases {
            assert_eq!(AmqpValue::decode_slice(&bytes).unwrap(), expected);
        }
    }

    #[test]
    fn float_equality_is_reflexive() {
        let nan = AmqpValue::Double(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(AmqpValue::Float(0.0), AmqpValue::Float(-0.0));
    }

    #[test]
    fn unassigned_code_is_malformed() {
        assert!(matches!(
            AmqpValue::decode_slice(&[0x4f]),
            Err(AmqpError::Malformed { .. })
        ));
    }

    #[test]
    fn values_of_different_types_differ() {
        assert_ne!(AmqpValue::Uint(1), AmqpValue::Ulong(1));
        assert_ne!(AmqpValue::String("a".into()), AmqpValue::Symbol(Symbol::from_static("a")));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(AmqpValue::from(None::<u32>), AmqpValue::Null);
        assert_eq!(AmqpValue::from(Some(3u32)), AmqpValue::Uint(3));
    }
}
