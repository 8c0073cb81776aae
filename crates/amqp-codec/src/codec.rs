//! Encode/decode contracts and top-level entry points.

use std::io::Read;

use amqp_buffers::Writer;
use bytes::Bytes;
use tracing::debug;

use crate::config::CodecConfig;
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};

/// A value that can be written in the AMQP type system.
///
/// For lists, maps, described values and typed structures, [`to_bytes`]
/// is the snapshot point: it caches the encoding and freezes the value.
/// [`write`] and [`write_at`] reuse a cached snapshot when there is one but
/// never take one, so the value stays mutable.
///
/// [`to_bytes`]: Encode::to_bytes
/// [`write`]: Encode::write
/// [`write_at`]: Encode::write_at
pub trait Encode {
    /// The format code that would be written if the value were encoded now.
    fn format_code(&self) -> u8;

    /// Total encoded length, including the format code and any prefixes.
    fn encoded_size(&self) -> Result<u32>;

    /// Appends the encoding to `writer`. Does not freeze.
    fn write(&self, writer: &mut Writer) -> Result<()>;

    /// Writes the encoding into a caller-owned region at `offset` and returns
    /// the number of bytes written.
    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let size = self.encoded_size()? as usize;
        let available = buf.len().saturating_sub(offset);
        if size > available {
            return Err(AmqpError::Truncated {
                context: "output buffer",
                needed: size,
                available,
            });
        }
        let mut writer = Writer::with_capacity(size);
        self.write(&mut writer)?;
        buf[offset..offset + size].copy_from_slice(writer.as_slice());
        Ok(size)
    }

    /// Encodes into a fresh shared buffer.
    fn to_bytes(&self) -> Result<Bytes> {
        let mut writer = Writer::with_capacity(self.encoded_size()? as usize);
        self.write(&mut writer)?;
        Ok(Bytes::from(writer.flush()))
    }
}

/// A value that can be read back from its encoding.
///
/// Only [`Decode::decode`] is required; the other entry points cover random
/// access buffers, borrowed slices and sequential streams.
pub trait Decode: Sized {
    fn decode(encoded: &Encoded) -> Result<Self>;

    fn decode_from(bytes: &Bytes, offset: usize) -> Result<Self> {
        Self::decode(&Encoded::parse(bytes, offset)?)
    }

    fn decode_slice(buf: &[u8]) -> Result<Self> {
        Self::decode(&Encoded::from_slice(buf)?)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Self::decode(&Encoded::read_from(reader)?)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(encoded: &Encoded) -> Result<Self> {
        if encoded.is_null() {
            return Ok(None);
        }
        T::decode(encoded).map(Some)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn format_code(&self) -> u8 {
        match self {
            Some(value) => value.format_code(),
            None => crate::constants::NULL,
        }
    }

    fn encoded_size(&self) -> Result<u32> {
        match self {
            Some(value) => value.encoded_size(),
            None => Ok(1),
        }
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        match self {
            Some(value) => value.write(writer),
            None => {
                writer.u8(crate::constants::NULL);
                Ok(())
            }
        }
    }
}

/// Encodes `value` into a fresh buffer.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Bytes> {
    let bytes = value.to_bytes()?;
    debug!(
        code = value.format_code(),
        len = bytes.len(),
        "encoded value"
    );
    Ok(bytes)
}

/// Decodes the value at `offset` of `bytes`.
pub fn decode<T: Decode>(bytes: &Bytes, offset: usize) -> Result<T> {
    decode_with_config(bytes, offset, &CodecConfig::default())
}

pub fn decode_with_config<T: Decode>(bytes: &Bytes, offset: usize, config: &CodecConfig) -> Result<T> {
    let encoded = Encoded::parse_with_config(bytes, offset, config)?;
    debug!(
        code = encoded.format_code(),
        offset,
        len = encoded.len(),
        "decoding value"
    );
    T::decode(&encoded)
}

/// Reads and decodes one value from a byte stream.
pub fn read<T: Decode, R: Read>(reader: &mut R) -> Result<T> {
    read_with_config(reader, &CodecConfig::default())
}

pub fn read_with_config<T: Decode, R: Read>(reader: &mut R, config: &CodecConfig) -> Result<T> {
    let encoded = Encoded::read_from_with_config(reader, config)?;
    debug!(
        code = encoded.format_code(),
        len = encoded.len(),
        "read value from stream"
    );
    T::decode(&encoded)
}
