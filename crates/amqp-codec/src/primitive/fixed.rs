//! Fixed-width primitives: booleans, integers, floats, char, timestamp, uuid.

use amqp_buffers::{Reader, Writer};

use super::{primitive_codec, Primitive, Timestamp, Uuid};
use crate::constants::*;
use crate::error::{AmqpError, Result};

/// A primitive whose only encoding is one fixed-width code.
macro_rules! single_code {
    ($ty:ty, $name:literal, $code:ident, $size:literal, $write:ident, $read:ident) => {
        impl Primitive for $ty {
            const NAME: &'static str = $name;

            fn code(&self) -> u8 {
                $code
            }

            fn body_size(&self, _code: u8) -> Result<u32> {
                Ok($size)
            }

            fn write_body(&self, _code: u8, writer: &mut Writer) -> Result<()> {
                writer.$write(*self);
                Ok(())
            }

            fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
                match code {
                    $code => Ok(reader.$read()?),
                    _ => Err(AmqpError::unexpected($name, code)),
                }
            }
        }
    };
}

single_code!(u8, "ubyte", UBYTE, 1, u8, u8);
single_code!(i8, "byte", BYTE, 1, i8, i8);
single_code!(u16, "ushort", USHORT, 2, u16, u16);
single_code!(i16, "short", SHORT, 2, i16, i16);
single_code!(f32, "float", FLOAT, 4, f32, f32);
single_code!(f64, "double", DOUBLE, 8, f64, f64);

impl Primitive for bool {
    const NAME: &'static str = "boolean";

    fn code(&self) -> u8 {
        if *self {
            TRUE
        } else {
            FALSE
        }
    }

    fn element_code(&self) -> u8 {
        BOOLEAN
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        Ok(if code == BOOLEAN { 1 } else { 0 })
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        if code == BOOLEAN {
            writer.u8(*self as u8);
        }
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            TRUE => Ok(true),
            FALSE => Ok(false),
            BOOLEAN => match reader.u8()? {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(AmqpError::malformed(
                    "boolean",
                    format!("byte {other:#04x} is neither 0 nor 1"),
                )),
            },
            _ => Err(AmqpError::unexpected("boolean", code)),
        }
    }
}

impl Primitive for u32 {
    const NAME: &'static str = "uint";

    fn code(&self) -> u8 {
        match *self {
            0 => UINT0,
            1..=0xff => SMALLUINT,
            _ => UINT,
        }
    }

    fn element_code(&self) -> u8 {
        if *self <= 0xff {
            SMALLUINT
        } else {
            UINT
        }
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        Ok(match code {
            UINT0 => 0,
            SMALLUINT => 1,
            _ => 4,
        })
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        match code {
            UINT0 => {}
            SMALLUINT => writer.u8(*self as u8),
            _ => writer.u32(*self),
        }
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            UINT0 => Ok(0),
            SMALLUINT => Ok(reader.u8()? as u32),
            UINT => Ok(reader.u32()?),
            _ => Err(AmqpError::unexpected("uint", code)),
        }
    }
}

impl Primitive for u64 {
    const NAME: &'static str = "ulong";

    fn code(&self) -> u8 {
        match *self {
            0 => ULONG0,
            1..=0xff => SMALLULONG,
            _ => ULONG,
        }
    }

    fn element_code(&self) -> u8 {
        if *self <= 0xff {
            SMALLULONG
        } else {
            ULONG
        }
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        Ok(match code {
            ULONG0 => 0,
            SMALLULONG => 1,
            _ => 8,
        })
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        match code {
            ULONG0 => {}
            SMALLULONG => writer.u8(*self as u8),
            _ => writer.u64(*self),
        }
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            ULONG0 => Ok(0),
            SMALLULONG => Ok(reader.u8()? as u64),
            ULONG => Ok(reader.u64()?),
            _ => Err(AmqpError::unexpected("ulong", code)),
        }
    }
}

impl Primitive for i32 {
    const NAME: &'static str = "int";

    fn code(&self) -> u8 {
        if i8::try_from(*self).is_ok() {
            SMALLINT
        } else {
            INT
        }
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        Ok(if code == SMALLINT { 1 } else { 4 })
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        if code == SMALLINT {
            writer.i8(*self as i8);
        } else {
            writer.i32(*self);
        }
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            SMALLINT => Ok(reader.i8()? as i32),
            INT => Ok(reader.i32()?),
            _ => Err(AmqpError::unexpected("int", code)),
        }
    }
}

impl Primitive for i64 {
    const NAME: &'static str = "long";

    fn code(&self) -> u8 {
        if i8::try_from(*self).is_ok() {
            SMALLLONG
        } else {
            LONG
        }
    }

    fn body_size(&self, code: u8) -> Result<u32> {
        Ok(if code == SMALLLONG { 1 } else { 8 })
    }

    fn write_body(&self, code: u8, writer: &mut Writer) -> Result<()> {
        if code == SMALLLONG {
            writer.i8(*self as i8);
        } else {
            writer.i64(*self);
        }
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            SMALLLONG => Ok(reader.i8()? as i64),
            LONG => Ok(reader.i64()?),
            _ => Err(AmqpError::unexpected("long", code)),
        }
    }
}

impl Primitive for char {
    const NAME: &'static str = "char";

    fn code(&self) -> u8 {
        CHAR
    }

    fn body_size(&self, _code: u8) -> Result<u32> {
        Ok(4)
    }

    fn write_body(&self, _code: u8, writer: &mut Writer) -> Result<()> {
        writer.u32(*self as u32);
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        if code != CHAR {
            return Err(AmqpError::unexpected("char", code));
        }
        let scalar = reader.u32()?;
        char::from_u32(scalar).ok_or_else(|| {
            AmqpError::malformed("char", format!("{scalar:#x} is not a Unicode scalar value"))
        })
    }
}

impl Primitive for Timestamp {
    const NAME: &'static str = "timestamp";

    fn code(&self) -> u8 {
        TIMESTAMP
    }

    fn body_size(&self, _code: u8) -> Result<u32> {
        Ok(8)
    }

    fn write_body(&self, _code: u8, writer: &mut Writer) -> Result<()> {
        writer.i64(self.0);
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            TIMESTAMP => Ok(Timestamp(reader.i64()?)),
            _ => Err(AmqpError::unexpected("timestamp", code)),
        }
    }
}

impl Primitive for Uuid {
    const NAME: &'static str = "uuid";

    fn code(&self) -> u8 {
        UUID
    }

    fn body_size(&self, _code: u8) -> Result<u32> {
        Ok(16)
    }

    fn write_body(&self, _code: u8, writer: &mut Writer) -> Result<()> {
        writer.buf(&self.0);
        Ok(())
    }

    fn read_body(code: u8, reader: &mut Reader<'_>) -> Result<Self> {
        match code {
            UUID => Ok(Uuid(reader.bytes16()?)),
            _ => Err(AmqpError::unexpected("uuid", code)),
        }
    }
}

primitive_codec!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, char, Timestamp, Uuid);

#[cfg(test)]
mod tests {
    use crate::codec::{Decode, Encode};

    fn bytes_of<T: Encode>(value: T) -> Vec<u8> {
        value.to_bytes().unwrap().to_vec()
    }

    #[test]
    fn uint_uses_narrowest_form() {
        assert_eq!(bytes_of(0u32), vec![0x43]);
        assert_eq!(bytes_of(1u32), vec![0x52, 1]);
        assert_eq!(bytes_of(255u32), vec![0x52, 0xff]);
        assert_eq!(bytes_of(256u32), vec![0x70, 0, 0, 1, 0]);
    }

    #[test]
    fn ulong_uses_narrowest_form() {
        assert_eq!(bytes_of(0u64), vec![0x44]);
        assert_eq!(bytes_of(0x10u64), vec![0x53, 0x10]);
        assert_eq!(bytes_of(0x100u64), vec![0x80, 0, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn signed_compact_range() {
        assert_eq!(bytes_of(-128i32), vec![0x54, 0x80]);
        assert_eq!(bytes_of(127i64), vec![0x55, 0x7f]);
        assert_eq!(bytes_of(128i32), vec![0x71, 0, 0, 0, 0x80]);
        assert_eq!(bytes_of(-129i64)[0], 0x81);
    }

    #[test]
    fn booleans() {
        assert_eq!(bytes_of(true), vec![0x41]);
        assert_eq!(bytes_of(false), vec![0x42]);
        assert!(bool::decode_slice(&[0x56, 0x01]).unwrap());
        assert!(!bool::decode_slice(&[0x56, 0x00]).unwrap());
        assert!(bool::decode_slice(&[0x56, 0x02]).is_err());
    }

    #[test]
    fn wide_forms_decode_to_same_value() {
        assert_eq!(u32::decode_slice(&[0x70, 0, 0, 0, 7]).unwrap(), 7);
        assert_eq!(u64::decode_slice(&[0x52, 7]).unwrap_err().kind(), crate::ErrorKind::UnexpectedType);
        assert_eq!(i64::decode_slice(&[0x81, 0, 0, 0, 0, 0, 0, 0, 3]).unwrap(), 3);
    }

    #[test]
    fn null_is_not_a_number() {
        let err = u32::decode_slice(&[0x40]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnexpectedType);
        assert_eq!(Option::<u32>::decode_slice(&[0x40]).unwrap(), None);
    }

    #[test]
    fn char_rejects_surrogates() {
        assert_eq!(char::decode_slice(&[0x73, 0, 0, 0, 0x41]).unwrap(), 'A');
        assert!(char::decode_slice(&[0x73, 0, 0, 0xd8, 0]).is_err());
    }

    #[test]
    fn encoded_size_matches_output() {
        for value in [0u32, 9, 300, u32::MAX] {
            assert_eq!(value.encoded_size().unwrap() as usize, bytes_of(value).len());
        }
    }
}
