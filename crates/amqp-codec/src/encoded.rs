//! Buffer views over encoded values.
//!
//! An [`Encoded`] is the exact byte extent of one value, starting at its
//! format code, plus the offsets needed to reach its payload. Building one
//! walks only the prefixes: compound payloads are bounds-checked but their
//! elements are not parsed until somebody asks for them.

use std::hash::{Hash, Hasher};
use std::io::Read;

use amqp_buffers::Reader;
use bytes::Bytes;
use tracing::trace;

use crate::config::{CodecConfig, DEFAULT_MAX_DEPTH};
use crate::constants::{LIST0, NULL};
use crate::error::{AmqpError, Result};
use crate::format::{category_of, encoding_of, Category, Encoding, PrefixWidth};

static NULL_ENCODED: [u8; 1] = [NULL];

/// An immutable view of one encoded value.
///
/// Views are cheap to clone: they share the underlying [`Bytes`] region, and
/// nested values are sub-slices of their parent's region.
///
/// A view remembers how deep it sits below the value the caller parsed and
/// the caller's [`CodecConfig::max_depth`]. Every list, map, array or
/// described level adds one; element views past the limit are `Malformed`.
/// Equality and hashing look at the bytes only.
#[derive(Clone)]
pub struct Encoded {
    bytes: Bytes,
    data_offset: usize,
    count: u32,
    depth: usize,
    max_depth: usize,
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    len: usize,
    data_offset: usize,
    count: u32,
}

fn read_prefix(reader: &mut Reader<'_>, width: PrefixWidth) -> Result<u32> {
    Ok(match width {
        PrefixWidth::One => reader.u8()? as u32,
        PrefixWidth::Four => reader.u32()?,
    })
}

fn check_limit(context: &'static str, size: u32, config: &CodecConfig) -> Result<()> {
    if size > config.max_value_size {
        return Err(AmqpError::TooLarge {
            context,
            size: size as u64,
            limit: config.max_value_size as u64,
        });
    }
    Ok(())
}

fn too_deep(context: &'static str, max_depth: usize) -> AmqpError {
    AmqpError::malformed(context, format!("nesting deeper than {max_depth}"))
}

fn measure(buf: &[u8], offset: usize, config: &CodecConfig, depth: usize) -> Result<Extent> {
    let mut reader = Reader::from_slice(buf, offset, buf.len());
    let code = reader.u8()?;
    match category_of(code) {
        Category::Described => {
            if depth >= config.max_depth {
                return Err(too_deep("described", config.max_depth));
            }
            let descriptor = measure(buf, offset + 1, config, depth + 1)?;
            let value = measure(buf, offset + 1 + descriptor.len, config, depth + 1)?;
            Ok(Extent {
                len: 1 + descriptor.len + value.len,
                data_offset: 1,
                count: 0,
            })
        }
        Category::Fixed(width) => {
            reader.skip(width as usize)?;
            Ok(Extent {
                len: 1 + width as usize,
                data_offset: 1,
                count: 0,
            })
        }
        Category::Variable(width) => {
            let size = read_prefix(&mut reader, width)?;
            check_limit("variable-width value", size, config)?;
            reader.skip(size as usize)?;
            Ok(Extent {
                len: 1 + width.bytes() + size as usize,
                data_offset: 1 + width.bytes(),
                count: 0,
            })
        }
        category @ (Category::Compound(width) | Category::Array(width)) => {
            let context = if matches!(category, Category::Array(_)) {
                "array"
            } else {
                "compound value"
            };
            let size = read_prefix(&mut reader, width)?;
            check_limit(context, size, config)?;
            if (size as usize) < width.bytes() {
                return Err(AmqpError::malformed(
                    context,
                    format!("size {size} cannot hold the element count"),
                ));
            }
            reader.ensure(size as usize)?;
            let count = read_prefix(&mut reader, width)?;
            let data = size as usize - width.bytes();
            // Every element of a list or map takes at least its format code.
            if matches!(category, Category::Compound(_)) && count as usize > data {
                return Err(AmqpError::malformed(
                    context,
                    format!("{count} elements cannot fit in {data} bytes"),
                ));
            }
            Ok(Extent {
                len: 1 + width.bytes() + size as usize,
                data_offset: 1 + 2 * width.bytes(),
                count,
            })
        }
        Category::Unknown => Err(AmqpError::malformed(
            "value",
            format!("unknown format code {code:#04x}"),
        )),
    }
}

fn read_exact<R: Read>(reader: &mut R, out: &mut Vec<u8>, n: usize) -> Result<()> {
    let start = out.len();
    out.resize(start + n, 0);
    reader
        .read_exact(&mut out[start..])
        .map_err(|err| AmqpError::io("value", err))
}

fn read_prefix_from<R: Read>(reader: &mut R, out: &mut Vec<u8>, width: PrefixWidth) -> Result<u32> {
    let start = out.len();
    read_exact(reader, out, width.bytes())?;
    let prefix = &out[start..];
    Ok(match width {
        PrefixWidth::One => prefix[0] as u32,
        PrefixWidth::Four => u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]),
    })
}

fn read_extent<R: Read>(
    reader: &mut R,
    out: &mut Vec<u8>,
    config: &CodecConfig,
    depth: usize,
) -> Result<()> {
    read_exact(reader, out, 1)?;
    let code = out[out.len() - 1];
    match category_of(code) {
        Category::Described => {
            if depth >= config.max_depth {
                return Err(too_deep("described", config.max_depth));
            }
            read_extent(reader, out, config, depth + 1)?;
            read_extent(reader, out, config, depth + 1)
        }
        Category::Fixed(width) => read_exact(reader, out, width as usize),
        Category::Variable(width) | Category::Compound(width) | Category::Array(width) => {
            let size = read_prefix_from(reader, out, width)?;
            check_limit("value", size, config)?;
            read_exact(reader, out, size as usize)
        }
        Category::Unknown => Err(AmqpError::malformed(
            "value",
            format!("unknown format code {code:#04x}"),
        )),
    }
}

impl Encoded {
    /// Measures the value starting at `offset` and returns a view sharing
    /// `bytes`.
    ///
    /// ```
    /// use amqp_codec::Encoded;
    /// use bytes::Bytes;
    ///
    /// let bytes = Bytes::from_static(&[0xff, 0xa3, 0x02, b'h', b'i', 0x40]);
    /// let view = Encoded::parse(&bytes, 1).unwrap();
    /// assert_eq!(view.format_code(), 0xa3);
    /// assert_eq!(view.len(), 4);
    /// assert_eq!(&view.payload()[..], b"hi");
    /// ```
    pub fn parse(bytes: &Bytes, offset: usize) -> Result<Self> {
        Self::parse_with_config(bytes, offset, &CodecConfig::default())
    }

    pub fn parse_with_config(bytes: &Bytes, offset: usize, config: &CodecConfig) -> Result<Self> {
        let encoded = Self::parse_at(bytes, offset, config, 0)?;
        trace!(
            code = encoded.format_code(),
            offset,
            len = encoded.len(),
            "measured encoded value"
        );
        Ok(encoded)
    }

    fn parse_at(bytes: &Bytes, offset: usize, config: &CodecConfig, depth: usize) -> Result<Self> {
        let extent = measure(bytes, offset, config, depth)?;
        Ok(Self {
            bytes: bytes.slice(offset..offset + extent.len),
            data_offset: extent.data_offset,
            count: extent.count,
            depth,
            max_depth: config.max_depth,
        })
    }

    /// Measures a value nested `depth` levels below the parsed root.
    ///
    /// The enclosing value was already checked against the size limit, so
    /// only the depth limit applies.
    pub(crate) fn parse_nested(
        bytes: &Bytes,
        offset: usize,
        depth: usize,
        max_depth: usize,
        context: &'static str,
    ) -> Result<Self> {
        if depth > max_depth {
            return Err(too_deep(context, max_depth));
        }
        let config = CodecConfig::new()
            .with_max_value_size(u32::MAX)
            .with_max_depth(max_depth);
        Self::parse_at(bytes, offset, &config, depth)
    }

    fn child(&self, offset: usize, context: &'static str) -> Result<Self> {
        Self::parse_nested(&self.bytes, offset, self.depth + 1, self.max_depth, context)
    }

    /// Measures the value at the start of `buf` and copies exactly its extent.
    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        Self::from_slice_with_config(buf, &CodecConfig::default())
    }

    pub fn from_slice_with_config(buf: &[u8], config: &CodecConfig) -> Result<Self> {
        let extent = measure(buf, 0, config, 0)?;
        Ok(Self {
            bytes: Bytes::copy_from_slice(&buf[..extent.len]),
            data_offset: extent.data_offset,
            count: extent.count,
            depth: 0,
            max_depth: config.max_depth,
        })
    }

    /// Reads exactly one value from a byte stream.
    ///
    /// Declared sizes are checked against the configured limit before the
    /// payload is read, so a hostile prefix cannot force a large allocation.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Self::read_from_with_config(reader, &CodecConfig::default())
    }

    pub fn read_from_with_config<R: Read>(reader: &mut R, config: &CodecConfig) -> Result<Self> {
        let mut out = Vec::new();
        read_extent(reader, &mut out, config, 0)?;
        Self::parse_with_config(&Bytes::from(out), 0, config)
    }

    /// The shared null encoding. Does not allocate.
    pub fn null() -> Self {
        Self {
            bytes: Bytes::from_static(&NULL_ENCODED),
            data_offset: 1,
            count: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn format_code(&self) -> u8 {
        self.bytes[0]
    }

    pub fn category(&self) -> Category {
        category_of(self.format_code())
    }

    pub fn encoding(&self) -> Option<Encoding> {
        encoding_of(self.format_code())
    }

    pub fn is_null(&self) -> bool {
        self.format_code() == NULL
    }

    pub fn is_described(&self) -> bool {
        self.category() == Category::Described
    }

    /// Total length including the format code and prefixes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn encoded_size(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Element count of a compound or array value, zero otherwise.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Levels of list, map, array or described nesting above this value.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The full extent, starting at the format code.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// The bytes after the format code and any size/count prefixes.
    pub fn payload(&self) -> Bytes {
        self.bytes.slice(self.data_offset..)
    }

    /// A reader positioned at the first payload byte.
    pub fn reader(&self) -> Reader<'_> {
        Reader::from_slice(&self.bytes, self.data_offset, self.bytes.len())
    }

    /// Splits a described value into its descriptor and described value.
    pub fn described_parts(&self) -> Result<(Encoded, Encoded)> {
        if !self.is_described() {
            return Err(AmqpError::unexpected("described", self.format_code()));
        }
        let descriptor = self.child(1, "described")?;
        let value = self.child(1 + descriptor.len(), "described")?;
        Ok((descriptor, value))
    }

    /// Splits a list or map payload into its element views in one pass.
    ///
    /// Elements are measured, not decoded.
    pub fn elements(&self, context: &'static str) -> Result<Vec<Encoded>> {
        if self.format_code() == LIST0 {
            return Ok(Vec::new());
        }
        if !matches!(self.category(), Category::Compound(_)) {
            return Err(AmqpError::unexpected(context, self.format_code()));
        }
        let mut elements = Vec::with_capacity(self.count as usize);
        let mut offset = self.data_offset;
        for _ in 0..self.count {
            let element = self.child(offset, context)?;
            offset += element.len();
            elements.push(element);
        }
        if offset != self.bytes.len() {
            return Err(AmqpError::malformed(
                context,
                format!(
                    "{} bytes left after {} elements",
                    self.bytes.len() - offset,
                    self.count
                ),
            ));
        }
        Ok(elements)
    }
}

impl PartialEq for Encoded {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Encoded {}

impl Hash for Encoded {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl std::fmt::Debug for Encoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoded")
            .field("format_code", &format_args!("{:#04x}", self.format_code()))
            .field("len", &self.bytes.len())
            .field("count", &self.count)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_shared_and_one_byte() {
        let null = Encoded::null();
        assert!(null.is_null());
        assert_eq!(null.len(), 1);
        assert_eq!(null.as_bytes().as_ptr(), Encoded::null().as_bytes().as_ptr());
    }

    #[test]
    fn measures_fixed_widths() {
        let bytes = Bytes::from_static(&[0x70, 0, 0, 1, 0, 0x98]);
        let view = Encoded::parse(&bytes, 0).unwrap();
        assert_eq!(view.len(), 5);
        assert!(Encoded::parse(&bytes, 5).unwrap_err().is_truncated());
    }

    #[test]
    fn measures_list_without_decoding_elements() {
        // list8 { size 5, count 2, uint0, str8 "a" }
        let bytes = Bytes::from_static(&[0xc0, 5, 2, 0x43, 0xa1, 1, b'a']);
        let view = Encoded::parse(&bytes, 0).unwrap();
        assert_eq!(view.count(), 2);
        let elements = view.elements("list").unwrap();
        assert_eq!(elements[0].format_code(), 0x43);
        assert_eq!(elements[1].format_code(), 0xa1);
    }

    #[test]
    fn rejects_inconsistent_compound_sizes() {
        let too_many = Bytes::from_static(&[0xc0, 2, 5, 0x40]);
        assert!(matches!(
            Encoded::parse(&too_many, 0),
            Err(AmqpError::Malformed { .. })
        ));
        let no_count = Bytes::from_static(&[0xc0, 0]);
        assert!(matches!(
            Encoded::parse(&no_count, 0),
            Err(AmqpError::Malformed { .. })
        ));
        let trailing = Bytes::from_static(&[0xc0, 3, 1, 0x40, 0x40]);
        let view = Encoded::parse(&trailing, 0).unwrap();
        assert!(matches!(
            view.elements("list"),
            Err(AmqpError::Malformed { .. })
        ));
    }

    #[test]
    fn declared_size_is_limited_before_reading() {
        let bytes = Bytes::from_static(&[0xb0, 0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(
            Encoded::parse(&bytes, 0),
            Err(AmqpError::TooLarge { .. })
        ));
        let small = CodecConfig::new().with_max_value_size(2);
        let bytes = Bytes::from_static(&[0xa1, 3, b'a', b'b', b'c']);
        assert!(matches!(
            Encoded::parse_with_config(&bytes, 0, &small),
            Err(AmqpError::TooLarge { .. })
        ));
    }

    #[test]
    fn unknown_codes_are_malformed() {
        let bytes = Bytes::from_static(&[0x23]);
        assert!(matches!(
            Encoded::parse(&bytes, 0),
            Err(AmqpError::Malformed { .. })
        ));
    }

    #[test]
    fn described_parts_and_depth_limit() {
        let bytes = Bytes::from_static(&[0x00, 0x53, 0x1d, 0x45]);
        let view = Encoded::parse(&bytes, 0).unwrap();
        let (descriptor, value) = view.described_parts().unwrap();
        assert_eq!(descriptor.format_code(), 0x53);
        assert_eq!(value.format_code(), 0x45);

        let nested = Bytes::from_static(&[0x00, 0x00, 0x00, 0x40, 0x40, 0x40, 0x40]);
        let shallow = CodecConfig::new().with_max_depth(2);
        assert!(Encoded::parse_with_config(&nested, 0, &shallow).is_err());
        assert!(Encoded::parse(&nested, 0).is_ok());
    }

    #[test]
    fn element_views_carry_depth() {
        // list8 { list8 { null } }
        let bytes = Bytes::from_static(&[0xc0, 0x05, 0x01, 0xc0, 0x02, 0x01, 0x40]);
        let outer = Encoded::parse(&bytes, 0).unwrap();
        let inner = outer.elements("list").unwrap().remove(0);
        assert_eq!(inner.depth(), 1);
        assert_eq!(inner.elements("list").unwrap()[0].depth(), 2);

        let shallow = CodecConfig::new().with_max_depth(1);
        let outer = Encoded::parse_with_config(&bytes, 0, &shallow).unwrap();
        let inner = outer.elements("list").unwrap().remove(0);
        assert!(matches!(
            inner.elements("list"),
            Err(AmqpError::Malformed { .. })
        ));
    }

    #[test]
    fn equality_ignores_depth() {
        let bytes = Bytes::from_static(&[0xc0, 0x02, 0x01, 0x40]);
        let outer = Encoded::parse(&bytes, 0).unwrap();
        let nested = outer.elements("list").unwrap().remove(0);
        assert_eq!(nested, Encoded::null());
    }

    #[test]
    fn reads_from_stream() {
        let data = [0xa3, 2, b'o', b'k', 0x41];
        let mut cursor = std::io::Cursor::new(&data[..]);
        let first = Encoded::read_from(&mut cursor).unwrap();
        assert_eq!(first.len(), 4);
        let second = Encoded::read_from(&mut cursor).unwrap();
        assert_eq!(second.format_code(), 0x41);
        assert!(Encoded::read_from(&mut cursor).unwrap_err().is_truncated());
    }

    #[test]
    fn from_slice_copies_only_the_extent() {
        let view = Encoded::from_slice(&[0x50, 7, 0xff, 0xff]).unwrap();
        assert_eq!(view.as_bytes().as_ref(), &[0x50, 7]);
    }
}
