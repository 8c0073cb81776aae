use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use amqp_buffers::Writer;
use bytes::Bytes;
use tracing::trace;

use crate::codec::{Decode, Encode};
use crate::constants::{DESCRIBED, SMALLULONG, SYM32, SYM8, ULONG, ULONG0};
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};
use crate::primitive::Symbol;
use crate::value::AmqpValue;

/// Identifies the structure a described value carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Symbol(Symbol),
    Code(u64),
}

impl Descriptor {
    /// Returns `true` if this is either form of the given descriptor.
    pub fn matches(&self, symbol: &str, code: u64) -> bool {
        match self {
            Descriptor::Symbol(s) => s.as_str() == symbol,
            Descriptor::Code(c) => *c == code,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Symbol(symbol) => f.write_str(symbol.as_str()),
            Descriptor::Code(code) => write!(f, "{:#010x}:{:#010x}", code >> 32, code & 0xffff_ffff),
        }
    }
}

impl Encode for Descriptor {
    fn format_code(&self) -> u8 {
        match self {
            Descriptor::Symbol(symbol) => symbol.format_code(),
            Descriptor::Code(code) => code.format_code(),
        }
    }

    fn encoded_size(&self) -> Result<u32> {
        match self {
            Descriptor::Symbol(symbol) => symbol.encoded_size(),
            Descriptor::Code(code) => code.encoded_size(),
        }
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        match self {
            Descriptor::Symbol(symbol) => symbol.write(writer),
            Descriptor::Code(code) => code.write(writer),
        }
    }
}

impl Decode for Descriptor {
    fn decode(encoded: &Encoded) -> Result<Self> {
        match encoded.format_code() {
            SYM8 | SYM32 => Ok(Descriptor::Symbol(Symbol::decode(encoded)?)),
            ULONG0 | SMALLULONG | ULONG => Ok(Descriptor::Code(u64::decode(encoded)?)),
            code => Err(AmqpError::InvalidDescriptor {
                expected: "symbol or ulong descriptor",
                found: format!("format code {code:#04x}"),
            }),
        }
    }
}

impl From<Symbol> for Descriptor {
    fn from(symbol: Symbol) -> Self {
        Descriptor::Symbol(symbol)
    }
}

impl From<u64> for Descriptor {
    fn from(code: u64) -> Self {
        Descriptor::Code(code)
    }
}

/// A value tagged with a [`Descriptor`].
///
/// Like lists and maps, a described value freezes once its encoding has
/// been produced, and decoded described values start frozen.
#[derive(Debug, Clone)]
pub struct Described {
    descriptor: Descriptor,
    value: AmqpValue,
    snapshot: OnceLock<Bytes>,
}

impl Described {
    pub fn new(descriptor: impl Into<Descriptor>, value: impl Into<AmqpValue>) -> Self {
        Self {
            descriptor: descriptor.into(),
            value: value.into(),
            snapshot: OnceLock::new(),
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn value(&self) -> &AmqpValue {
        &self.value
    }

    pub fn into_parts(self) -> (Descriptor, AmqpValue) {
        (self.descriptor, self.value)
    }

    /// Replaces the described value.
    ///
    /// # Panics
    ///
    /// Panics if the value is frozen.
    pub fn set_value(&mut self, value: impl Into<AmqpValue>) {
        assert!(
            !self.is_frozen(),
            "described value is frozen once encoded or decoded; call copy() to get a mutable value"
        );
        self.value = value.into();
    }

    pub fn is_frozen(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// A mutable copy; the described value is copied as well.
    pub fn copy(&self) -> Result<Self> {
        Ok(Self::new(self.descriptor.clone(), self.value.copy()?))
    }
}

impl Encode for Described {
    fn format_code(&self) -> u8 {
        DESCRIBED
    }

    fn encoded_size(&self) -> Result<u32> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.len() as u32);
        }
        let size = 1 + self.descriptor.encoded_size()? as u64 + self.value.encoded_size()? as u64;
        u32::try_from(size).map_err(|_| AmqpError::TooLarge {
            context: "described value",
            size,
            limit: u32::MAX as u64,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        if let Some(bytes) = self.snapshot.get() {
            writer.buf(bytes);
            return Ok(());
        }
        writer.u8(DESCRIBED);
        self.descriptor.write(writer)?;
        self.value.write(writer)
    }

    /// Returns the encoding and freezes the value.
    fn to_bytes(&self) -> Result<Bytes> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.clone());
        }
        let mut writer = Writer::with_capacity(self.encoded_size()? as usize);
        self.write(&mut writer)?;
        let bytes = Bytes::from(writer.flush());
        trace!(descriptor = %self.descriptor, len = bytes.len(), "froze described value");
        Ok(self.snapshot.get_or_init(|| bytes).clone())
    }
}

impl Decode for Described {
    fn decode(encoded: &Encoded) -> Result<Self> {
        let (descriptor, value) = encoded.described_parts()?;
        let descriptor = Descriptor::decode(&descriptor)?;
        trace!(%descriptor, "decoding described value");
        Ok(Self {
            descriptor,
            value: AmqpValue::decode(&value)?,
            snapshot: OnceLock::from(encoded.as_bytes().clone()),
        })
    }
}

impl PartialEq for Described {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.value == other.value
    }
}

impl Eq for Described {}

impl Hash for Described {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
        self.value.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::List;

    #[test]
    fn numeric_descriptor_is_compact() {
        let described = Described::new(0x1du64, List::new());
        assert_eq!(described.to_bytes().unwrap().as_ref(), &[0x00, 0x53, 0x1d, 0x45]);
    }

    #[test]
    fn different_descriptors_are_not_equal() {
        let a = Described::new(0x26u64, AmqpValue::Uint(1));
        let b = Described::new(0x27u64, AmqpValue::Uint(1));
        assert_ne!(a, b);
        let decoded_a = Described::decode_from(&a.to_bytes().unwrap(), 0).unwrap();
        let decoded_b = Described::decode_from(&b.to_bytes().unwrap(), 0).unwrap();
        assert_ne!(decoded_a, decoded_b);
        assert_eq!(decoded_a, a);
    }

    #[test]
    fn symbolic_descriptor_round_trip() {
        let symbol = Symbol::from_static("amqp:released:map");
        let described = Described::new(symbol.clone(), AmqpValue::Null);
        let decoded = Described::decode_from(&described.to_bytes().unwrap(), 0).unwrap();
        assert_eq!(decoded.descriptor(), &Descriptor::Symbol(symbol));
        assert!(decoded.descriptor().matches("amqp:released:map", 0x26));
    }

    #[test]
    fn string_descriptor_is_rejected() {
        let err = Described::decode_slice(&[0x00, 0xa1, 1, b'x', 0x40]).unwrap_err();
        assert!(matches!(err, AmqpError::InvalidDescriptor { .. }));
    }

    #[test]
    #[should_panic(expected = "call copy()")]
    fn frozen_described_rejects_set() {
        let mut described = Described::new(1u64, AmqpValue::Null);
        described.to_bytes().unwrap();
        described.set_value(AmqpValue::Uint(1));
    }

    #[test]
    fn descriptor_display() {
        assert_eq!(Descriptor::Code(0x1d).to_string(), "0x00000000:0x0000001d");
    }
}
