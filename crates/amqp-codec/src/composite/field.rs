use bytes::Bytes;

use super::{Described, List, Map};
use crate::codec::Encode;
use crate::error::{AmqpError, Result};
use crate::primitive::{Symbol, Timestamp, Uuid};
use crate::value::AmqpValue;

/// Conversion between a typed field and the [`AmqpValue`] stored in its slot.
///
/// `from_value` is never called with [`AmqpValue::Null`]: an absent field is
/// handled by the caller and reads as `None`.
pub trait FieldValue: Sized {
    /// Protocol name of the field type, used in error messages.
    const TYPE_NAME: &'static str;

    fn into_value(self) -> AmqpValue;

    fn from_value(value: &AmqpValue) -> Result<Self>;
}

fn mismatch<T: FieldValue>(value: &AmqpValue) -> AmqpError {
    AmqpError::unexpected(T::TYPE_NAME, value.format_code())
}

macro_rules! field_value {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FieldValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn into_value(self) -> AmqpValue {
                    AmqpValue::$variant(self)
                }

                fn from_value(value: &AmqpValue) -> Result<Self> {
                    match value {
                        AmqpValue::$variant(inner) => Ok(inner.clone()),
                        other => Err(mismatch::<Self>(other)),
                    }
                }
            }
        )*
    };
}

field_value! {
    bool => Boolean, "boolean";
    u8 => Ubyte, "ubyte";
    u16 => Ushort, "ushort";
    u32 => Uint, "uint";
    u64 => Ulong, "ulong";
    i8 => Byte, "byte";
    i16 => Short, "short";
    i32 => Int, "int";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
    char => Char, "char";
    Timestamp => Timestamp, "timestamp";
    Uuid => Uuid, "uuid";
    Bytes => Binary, "binary";
    String => String, "string";
    Symbol => Symbol, "symbol";
    List => List, "list";
    Map => Map, "map";
}

impl FieldValue for Described {
    const TYPE_NAME: &'static str = "described";

    fn into_value(self) -> AmqpValue {
        AmqpValue::Described(Box::new(self))
    }

    fn from_value(value: &AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Described(described) => Ok((**described).clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

/// Fields of type `*` accept any value.
impl FieldValue for AmqpValue {
    const TYPE_NAME: &'static str = "*";

    fn into_value(self) -> AmqpValue {
        self
    }

    fn from_value(value: &AmqpValue) -> Result<Self> {
        Ok(value.clone())
    }
}

/// Multiple symbols: written as an array, read from an array or a single
/// symbol.
impl FieldValue for Vec<Symbol> {
    const TYPE_NAME: &'static str = "symbol[]";

    fn into_value(self) -> AmqpValue {
        AmqpValue::Array(self.into_iter().map(AmqpValue::Symbol).collect())
    }

    fn from_value(value: &AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Symbol(symbol) => Ok(vec![symbol.clone()]),
            AmqpValue::Array(elements) => elements.iter().map(Symbol::from_value).collect(),
            other => Err(mismatch::<Self>(other)),
        }
    }
}
