//! Composite values: lists, maps, arrays and described values.
//!
//! Lists, maps and described values share one representation discipline
//! (see [`repr`]): they are either logical (live values) or buffered (a
//! measured [`Encoded`](crate::Encoded) view decoded slot by slot on first
//! read). Producing the encoded bytes of a logical value freezes it; frozen
//! values reject mutation and must be [`copy`](List::copy)-ed first.

pub(crate) mod array;
mod described;
mod field;
mod list;
mod map;
mod repr;

pub use described::{Described, Descriptor};
pub use field::FieldValue;
pub use list::List;
pub use map::Map;

use amqp_buffers::{Reader, Writer};

use crate::constants::MAX_NARROW;
use crate::error::{AmqpError, Result};
use crate::format::PrefixWidth;

/// Picks the size/count prefix width for a compound body of `body` bytes
/// holding `count` elements.
pub(crate) fn compound_width(count: usize, body: u64) -> PrefixWidth {
    if count <= MAX_NARROW && body + 1 <= MAX_NARROW as u64 {
        PrefixWidth::One
    } else {
        PrefixWidth::Four
    }
}

/// Size of the prefixes plus `body`, excluding the format code.
pub(crate) fn compound_body_size(
    context: &'static str,
    width: PrefixWidth,
    count: usize,
    body: u64,
) -> Result<u32> {
    let total = 2 * width.bytes() as u64 + body;
    if total + 1 > u32::MAX as u64 || count > u32::MAX as usize {
        return Err(AmqpError::TooLarge {
            context,
            size: total,
            limit: u32::MAX as u64,
        });
    }
    Ok(total as u32)
}

/// Writes the size and count prefixes of a compound or array body.
pub(crate) fn write_compound_prefix(writer: &mut Writer, width: PrefixWidth, count: usize, body: u64) {
    match width {
        PrefixWidth::One => {
            writer.u8((body + 1) as u8);
            writer.u8(count as u8);
        }
        PrefixWidth::Four => {
            writer.u32((body + 4) as u32);
            writer.u32(count as u32);
        }
    }
}

pub(crate) fn read_prefix(reader: &mut Reader<'_>, width: PrefixWidth) -> Result<usize> {
    Ok(match width {
        PrefixWidth::One => reader.u8()? as usize,
        PrefixWidth::Four => reader.u32()? as usize,
    })
}

/// Sums encoded sizes without overflowing.
pub(crate) fn sum_sizes<I>(sizes: I) -> Result<u64>
where
    I: IntoIterator<Item = Result<u32>>,
{
    sizes
        .into_iter()
        .try_fold(0u64, |acc, size| Ok(acc + size? as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_prefix_boundary() {
        assert_eq!(compound_width(2, 254), PrefixWidth::One);
        assert_eq!(compound_width(2, 255), PrefixWidth::Four);
        assert_eq!(compound_width(256, 10), PrefixWidth::Four);
    }

    #[test]
    fn prefix_size_counts_the_count_field() {
        let mut writer = Writer::new();
        write_compound_prefix(&mut writer, PrefixWidth::One, 3, 10);
        assert_eq!(writer.flush(), vec![11, 3]);
        write_compound_prefix(&mut writer, PrefixWidth::Four, 3, 10);
        assert_eq!(writer.flush(), vec![0, 0, 0, 14, 0, 0, 0, 3]);
    }
}
