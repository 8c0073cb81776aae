//! Primitive codecs.
//!
//! Each primitive picks the narrowest encoding that can hold its value.
//! Decoding never chooses: the format code already in the input selects the
//! variant, and a code from a different family is an
//! [`AmqpError::UnexpectedType`](crate::AmqpError::UnexpectedType).

mod fixed;
mod variable;

use std::fmt;

use amqp_buffers::{Reader, Writer};

use crate::error::{AmqpError, Result};

/// Body-level codec shared by standalone values and array elements.
///
/// The body is everything after the format code, including any length
/// prefix. Arrays write one constructor and then only bodies, so the body
/// writer must honour whatever `code` it is given from the value's family.
pub(crate) trait Primitive: Sized {
    const NAME: &'static str;

    /// Narrowest code for this value, possibly a zero-width compact code.
    fn code(&self) -> u8;

    /// Narrowest code usable as an array element constructor.
    fn element_code(&self) -> u8 {
        self.code()
    }

    fn body_size(&self, code: u8) -> Result<u32>;

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()>;

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self>;
}

/// Implements [`Encode`](crate::Encode) and, unless told otherwise,
/// [`Decode`](crate::Decode) in terms of [`Primitive`].
macro_rules! primitive_codec {
    (@encode $ty:ty) => {
        impl $crate::codec::Encode for $ty {
            fn format_code(&self) -> u8 {
                $crate::primitive::Primitive::code(self)
            }

            fn encoded_size(&self) -> $crate::error::Result<u32> {
                let code = $crate::primitive::Primitive::code(self);
                Ok(1 + $crate::primitive::Primitive::body_size(self, code)?)
            }

            fn write(&self, writer: &mut amqp_buffers::Writer) -> $crate::error::Result<()> {
                let code = $crate::primitive::Primitive::code(self);
                writer.u8(code);
                $crate::primitive::Primitive::write_body(self, code, writer)
            }
        }
    };
    ($($ty:ty),* $(,)?) => {
        $(
            primitive_codec!(@encode $ty);

            impl $crate::codec::Decode for $ty {
                fn decode(encoded: &$crate::encoded::Encoded) -> $crate::error::Result<Self> {
                    let mut reader =
                        amqp_buffers::Reader::from_slice(encoded.as_bytes(), 1, encoded.len());
                    <$ty as $crate::primitive::Primitive>::read_body(encoded.format_code(), &mut reader)
                }
            }
        )*
    };
}

pub(crate) use primitive_codec;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

/// A 16-byte universally unique identifier in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A symbolic value: 7-bit ASCII, compared by content.
///
/// ```
/// use amqp_codec::Symbol;
///
/// let symbol = Symbol::new("amqp:error:list").unwrap();
/// assert_eq!(symbol.as_str(), "amqp:error:list");
/// assert!(Symbol::new("naïve").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !value.is_ascii() {
            return Err(AmqpError::malformed("symbol", "non-ASCII character"));
        }
        Ok(Self(value))
    }

    /// Builds a symbol from a literal.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not ASCII.
    pub fn from_static(value: &'static str) -> Self {
        assert!(value.is_ascii(), "symbol {value:?} is not ASCII");
        Self(value.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Symbol {
    type Error = AmqpError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = AmqpError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
