//! Variable-width primitives: binary, string and symbol.
//!
//! Each has an 8-bit and a 32-bit length variant; encoders always pick the
//! 8-bit one when the payload fits in 255 bytes.

use amqp_buffers::{Reader, Writer};
use bytes::Bytes;

use super::{primitive_codec, Primitive, Symbol};
use crate::codec::Decode;
use crate::constants::*;
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};

fn narrowest(len: usize, narrow: u8, wide: u8) -> u8 {
    if len <= MAX_NARROW {
        narrow
    } else {
        wide
    }
}

fn body_size(context: &'static str, len: usize, code: u8, narrow: u8) -> Result<u32> {
    let prefix = if code == narrow { 1 } else { 4 };
    if code == narrow && len > MAX_NARROW {
        return Err(AmqpError::TooLarge {
            context,
            size: len as u64,
            limit: MAX_NARROW as u64,
        });
    }
    if len > MAX_WIDE - 4 {
        return Err(AmqpError::TooLarge {
            context,
            size: len as u64,
            limit: MAX_WIDE as u64,
        });
    }
    Ok(prefix + len as u32)
}

fn write_prefixed(
    context: &'static str,
    payload: &[u8],
    code: u8,
    narrow: u8,
    writer: &mut Writer,
) -> Result<()> {
    body_size(context, payload.len(), code, narrow)?;
    if code == narrow {
        writer.u8(payload.len() as u8);
    } else {
        writer.u32(payload.len() as u32);
    }
    writer.buf(payload);
    Ok(())
}

fn read_prefixed<'a>(
    context: &'static str,
    code: u8,
    narrow: u8,
    wide: u8,
    reader: &mut Reader<'a>,
) -> Result<&'a [u8]> {
    let len = match code {
        c if c == narrow => reader.u8()? as usize,
        c if c == wide => reader.u32()? as usize,
        _ => return Err(AmqpError::unexpected(context, code)),
    };
    Ok(reader.buf(len)?)
}

impl Primitive for Bytes {
    const NAME: &'static str = "binary";

    fn code(&self) -> u8 {
        narrowest(self.len(), VBIN8, VBIN32)
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        body_size(Self::NAME, self.len(), code, VBIN8)
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        write_prefixed(Self::NAME, self, code, VBIN8, writer)
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        let payload = read_prefixed(Self::NAME, code, VBIN8, VBIN32, reader)?;
        Ok(Bytes::copy_from_slice(payload))
    }
}

impl Primitive for String {
    const NAME: &'static str = "string";

    fn code(&self) -> u8 {
        narrowest(self.len(), STR8, STR32)
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        body_size(Self::NAME, self.len(), code, STR8)
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        write_prefixed(Self::NAME, self.as_bytes(), code, STR8, writer)
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        let payload = read_prefixed(Self::NAME, code, STR8, STR32, reader)?;
        std::str::from_utf8(payload)
            .map(str::to_owned)
            .map_err(|_| AmqpError::malformed("string", "invalid UTF-8 sequence"))
    }
}

impl Primitive for Symbol {
    const NAME: &'static str = "symbol";

    fn code(&self) -> u8 {
        narrowest(self.len(), SYM8, SYM32)
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        body_size(Self::NAME, self.len(), code, SYM8)
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        write_prefixed(Self::NAME, self.as_str().as_bytes(), code, SYM8, writer)
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        let payload = read_prefixed(Self::NAME, code, SYM8, SYM32, reader)?;
        if !payload.is_ascii() {
            return Err(AmqpError::malformed("symbol", "non-ASCII character"));
        }
        // ASCII is valid UTF-8.
        Symbol::new(String::from_utf8_lossy(payload).into_owned())
    }
}

primitive_codec!(String, Symbol);
primitive_codec!(@encode Bytes);

impl Decode for Bytes {
    /// Returns a zero-copy slice of the input.
    fn decode(encoded: &Encoded) -> Result<Self> {
        match encoded.format_code() {
            VBIN8 | VBIN32 => Ok(encoded.payload()),
            code => Err(AmqpError::unexpected("binary", code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encode;

    #[test]
    fn symbol_boundaries() {
        for (len, code) in [(0, SYM8), (1, SYM8), (255, SYM8), (256, SYM32)] {
            let symbol = Symbol::new("s".repeat(len)).unwrap();
            let bytes = symbol.to_bytes().unwrap();
            assert_eq!(bytes[0], code, "len {len}");
            assert_eq!(Symbol::decode_from(&bytes, 0).unwrap(), symbol);
        }
    }

    #[test]
    fn string_header_is_byte_length() {
        let text = "€".to_owned();
        assert_eq!(text.to_bytes().unwrap().as_ref(), &[0xa1, 3, 0xe2, 0x82, 0xac]);
    }

    #[test]
    fn binary_decode_is_zero_copy() {
        let bytes = Bytes::from_static(&[0xa0, 2, 9, 8]);
        let decoded = Bytes::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.as_ref(), &[9, 8]);
        assert_eq!(decoded.as_ptr(), bytes[2..].as_ptr());
    }

    #[test]
    fn wrong_family_is_unexpected_type() {
        let err = Symbol::decode_slice(&[0xa1, 1, b'x']).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnexpectedType);
    }

    #[test]
    fn symbol_payload_must_be_ascii() {
        assert!(Symbol::decode_slice(&[0xa3, 2, 0xc3, 0xa9]).is_err());
    }

    #[test]
    fn wide_variant_decodes_short_payloads() {
        let decoded = String::decode_slice(&[0xb1, 0, 0, 0, 2, b'h', b'i']).unwrap();
        assert_eq!(decoded, "hi");
    }
}
