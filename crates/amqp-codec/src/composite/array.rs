//! Arrays: one element constructor shared by every element.
//!
//! The constructor is the narrowest code that can hold every element (a
//! single 300-byte symbol makes the whole array `sym32`). Zero-width compact
//! codes such as `uint0` or `true` are never used as constructors because
//! they cannot carry per-element values.

use std::mem;

use amqp_buffers::{Reader, Writer};
use bytes::Bytes;

use super::{compound_body_size, compound_width, read_prefix, write_compound_prefix, List, Map};
use crate::codec::Decode;
use crate::constants::{ARRAY32, ARRAY8, LIST32, LIST8, MAP32, MAP8, NULL};
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};
use crate::format::{category_of, Category, PrefixWidth};
use crate::value::AmqpValue;

/// Constructor code for `elements`; `NULL` for an empty array.
pub(crate) fn constructor(elements: &[AmqpValue]) -> Result<u8> {
    let Some(first) = elements.first() else {
        return Ok(NULL);
    };
    let kind = mem::discriminant(first);
    let mut code = 0;
    for element in elements {
        if mem::discriminant(element) != kind {
            return Err(AmqpError::malformed(
                "array",
                format!(
                    "mixed element types {} and {}",
                    first.type_name(),
                    element.type_name()
                ),
            ));
        }
        // Within one kind a wider code is numerically larger.
        code = code.max(element.element_code()?);
    }
    Ok(code)
}

fn elements_size(code: u8, elements: &[AmqpValue]) -> Result<u64> {
    elements
        .iter()
        .try_fold(1u64, |acc, element| Ok(acc + element.body_size(code)? as u64))
}

pub(crate) fn width(elements: &[AmqpValue]) -> Result<PrefixWidth> {
    let code = constructor(elements)?;
    Ok(compound_width(elements.len(), elements_size(code, elements)?))
}

pub(crate) fn format_code(elements: &[AmqpValue]) -> u8 {
    match width(elements) {
        Ok(PrefixWidth::One) => ARRAY8,
        _ => ARRAY32,
    }
}

/// Size and count prefixes, constructor and element bodies.
pub(crate) fn body_size(width: PrefixWidth, elements: &[AmqpValue]) -> Result<u32> {
    let code = constructor(elements)?;
    compound_body_size("array", width, elements.len(), elements_size(code, elements)?)
}

pub(crate) fn write_body(width: PrefixWidth, elements: &[AmqpValue], writer: &mut Writer) -> Result<()> {
    let code = constructor(elements)?;
    let body = elements_size(code, elements)?;
    write_compound_prefix(writer, width, elements.len(), body);
    writer.u8(code);
    for element in elements {
        element.write_body(code, writer)?;
    }
    Ok(())
}

pub(crate) fn encoded_size(elements: &[AmqpValue]) -> Result<u32> {
    Ok(1 + body_size(width(elements)?, elements)?)
}

pub(crate) fn write(elements: &[AmqpValue], writer: &mut Writer) -> Result<()> {
    let width = width(elements)?;
    writer.u8(match width {
        PrefixWidth::One => ARRAY8,
        PrefixWidth::Four => ARRAY32,
    });
    write_body(width, elements, writer)
}

/// Decodes every element of an array eagerly.
pub(crate) fn decode(encoded: &Encoded) -> Result<Vec<AmqpValue>> {
    let code = encoded.format_code();
    if code != ARRAY8 && code != ARRAY32 {
        return Err(AmqpError::unexpected("array", code));
    }
    let bytes = encoded.as_bytes();
    let mut reader = Reader::new(bytes);
    reader.skip(1)?;
    let elements = read_body(
        code,
        bytes,
        &mut reader,
        encoded.depth(),
        encoded.max_depth(),
    )?;
    if !reader.is_empty() {
        return Err(AmqpError::malformed("array", "trailing bytes after elements"));
    }
    Ok(elements)
}

fn prefix_width(code: u8) -> PrefixWidth {
    match category_of(code) {
        Category::Compound(width) | Category::Array(width) => width,
        _ => PrefixWidth::Four,
    }
}

/// Reads the body (after its format code) of an array sitting `depth`
/// levels below the parsed root: prefixes, constructor and elements.
pub(crate) fn read_body(
    code: u8,
    bytes: &Bytes,
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<AmqpValue>> {
    let width = prefix_width(code);
    let size = read_prefix(reader, width)?;
    if size < width.bytes() {
        return Err(AmqpError::malformed(
            "array",
            format!("size {size} cannot hold the element count"),
        ));
    }
    let mut body = reader.cut(size)?;
    let count = read_prefix(&mut body, width)?;
    let constructor = body.u8()?;
    if count == 0 {
        return Ok(Vec::new());
    }
    match category_of(constructor) {
        Category::Fixed(0) => {
            return Err(AmqpError::malformed(
                "array",
                format!("zero-width element constructor {constructor:#04x}"),
            ))
        }
        Category::Described => {
            return Err(AmqpError::malformed(
                "array",
                "described element constructors are not supported",
            ))
        }
        Category::Unknown => {
            return Err(AmqpError::malformed(
                "array",
                format!("unknown element constructor {constructor:#04x}"),
            ))
        }
        _ => {}
    }
    if count > body.size() {
        return Err(AmqpError::malformed(
            "array",
            format!("{count} elements cannot fit in {} bytes", body.size()),
        ));
    }
    if depth >= max_depth {
        return Err(AmqpError::malformed(
            "array",
            format!("nesting deeper than {max_depth}"),
        ));
    }
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(read_element(constructor, bytes, &mut body, depth + 1, max_depth)?);
    }
    if !body.is_empty() {
        return Err(AmqpError::malformed("array", "trailing bytes after elements"));
    }
    Ok(elements)
}

fn read_element(
    code: u8,
    bytes: &Bytes,
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<AmqpValue> {
    match code {
        LIST8 | LIST32 => Ok(AmqpValue::List(List::from(read_compound(
            code, bytes, reader, depth, max_depth,
        )?))),
        MAP8 | MAP32 => {
            let values = read_compound(code, bytes, reader, depth, max_depth)?;
            if values.len() % 2 != 0 {
                return Err(AmqpError::malformed(
                    "map",
                    format!("odd element count {}", values.len()),
                ));
            }
            let mut map = Map::new();
            let mut values = values.into_iter();
            while let (Some(key), Some(value)) = (values.next(), values.next()) {
                if map.insert(key.clone(), value).is_some() {
                    return Err(AmqpError::malformed(
                        "map",
                        format!("duplicate key {key}"),
                    ));
                }
            }
            Ok(AmqpValue::Map(map))
        }
        ARRAY8 | ARRAY32 => Ok(AmqpValue::Array(read_body(
            code, bytes, reader, depth, max_depth,
        )?)),
        _ => AmqpValue::read_primitive(code, reader),
    }
}

/// Reads the prefixes and full element values of a list or map body.
fn read_compound(
    code: u8,
    bytes: &Bytes,
    reader: &mut Reader<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<AmqpValue>> {
    let width = prefix_width(code);
    let size = read_prefix(reader, width)?;
    if size < width.bytes() {
        return Err(AmqpError::malformed(
            "compound value",
            format!("size {size} cannot hold the element count"),
        ));
    }
    let mut body = reader.cut(size)?;
    let count = read_prefix(&mut body, width)?;
    if count > body.size() {
        return Err(AmqpError::malformed(
            "compound value",
            format!("{count} elements cannot fit in {} bytes", body.size()),
        ));
    }
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let element =
            Encoded::parse_nested(bytes, body.x, depth + 1, max_depth, "compound value")?;
        body.skip(element.len())?;
        values.push(AmqpValue::decode(&element)?);
    }
    if !body.is_empty() {
        return Err(AmqpError::malformed(
            "compound value",
            "trailing bytes after elements",
        ));
    }
    Ok(values)
}
