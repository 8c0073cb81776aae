use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use amqp_buffers::Writer;
use bytes::Bytes;

use super::repr::Repr;
use super::{compound_body_size, compound_width, sum_sizes, write_compound_prefix};
use crate::codec::{Decode, Encode};
use crate::constants::{LIST0, LIST32, LIST8};
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};
use crate::format::PrefixWidth;
use crate::value::AmqpValue;

/// Element views of a decoded list; each slot is decoded on first read.
#[derive(Debug, Clone)]
pub(crate) struct ListView {
    encoded: Encoded,
    elements: Vec<Encoded>,
    slots: Vec<OnceLock<AmqpValue>>,
}

impl ListView {
    fn new(encoded: Encoded) -> Result<Self> {
        let elements = encoded.elements("list")?;
        let slots = elements.iter().map(|_| OnceLock::new()).collect();
        Ok(Self {
            encoded,
            elements,
            slots,
        })
    }

    fn get(&self, index: usize) -> Result<&AmqpValue> {
        let slot = &self.slots[index];
        if let Some(value) = slot.get() {
            return Ok(value);
        }
        let value = AmqpValue::decode(&self.elements[index])?;
        Ok(slot.get_or_init(|| value))
    }

    fn materialized(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }
}

/// An ordered sequence of values.
///
/// ```
/// use amqp_codec::{AmqpValue, Decode, Encode, List};
///
/// let list: List = vec![AmqpValue::Uint(1), AmqpValue::Null].into();
/// let bytes = list.to_bytes().unwrap();
/// assert_eq!(bytes.as_ref(), &[0xc0, 0x04, 0x02, 0x52, 0x01, 0x40]);
///
/// let decoded = List::decode_from(&bytes, 0).unwrap();
/// assert_eq!(decoded.get(0).unwrap(), Some(&AmqpValue::Uint(1)));
/// assert_eq!(decoded, list);
/// ```
#[derive(Clone)]
pub struct List {
    repr: Repr<Vec<AmqpValue>, ListView>,
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl List {
    pub fn new() -> Self {
        Self {
            repr: Repr::logical(Vec::new()),
        }
    }

    /// Wraps a decoded list view without decoding any element.
    pub fn from_encoded(encoded: Encoded) -> Result<Self> {
        match encoded.format_code() {
            LIST0 | LIST8 | LIST32 => Ok(Self {
                repr: Repr::Buffered(ListView::new(encoded)?),
            }),
            code => Err(AmqpError::unexpected("list", code)),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Logical(logical) => logical.get().len(),
            Repr::Buffered(view) => view.elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns element `index`, decoding only that element if the list is
    /// buffered. `Ok(None)` past the end.
    pub fn get(&self, index: usize) -> Result<Option<&AmqpValue>> {
        if index >= self.len() {
            return Ok(None);
        }
        self.element(index).map(Some)
    }

    fn element(&self, index: usize) -> Result<&AmqpValue> {
        match &self.repr {
            Repr::Logical(logical) => Ok(&logical.get()[index]),
            Repr::Buffered(view) => view.get(index),
        }
    }

    /// Replaces element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the list is frozen.
    pub fn set(&mut self, index: usize, value: impl Into<AmqpValue>) {
        let len = self.len();
        assert!(index < len, "list position {index} out of range for length {len}");
        self.repr.make_mut("list")[index] = value.into();
    }

    /// Appends an element.
    ///
    /// # Panics
    ///
    /// Panics if the list is frozen.
    pub fn push(&mut self, value: impl Into<AmqpValue>) {
        self.repr.make_mut("list").push(value.into());
    }

    /// Grows the list with nulls (or truncates it) to `len` elements.
    ///
    /// # Panics
    ///
    /// Panics if the list is frozen.
    pub fn resize(&mut self, len: usize) {
        self.repr.make_mut("list").resize(len, AmqpValue::Null);
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<&AmqpValue>> + '_ {
        (0..self.len()).map(move |index| self.element(index))
    }

    pub fn to_vec(&self) -> Result<Vec<AmqpValue>> {
        self.iter().map(|value| value.cloned()).collect()
    }

    /// A mutable copy. Logical lists share their elements until either
    /// side is mutated; buffered lists are materialized.
    pub fn copy(&self) -> Result<Self> {
        let repr = match &self.repr {
            Repr::Logical(logical) => Repr::Logical(logical.fork()),
            Repr::Buffered(_) => Repr::logical(self.to_vec()?),
        };
        Ok(Self { repr })
    }

    pub fn is_frozen(&self) -> bool {
        self.repr.is_frozen()
    }

    pub fn is_buffered(&self) -> bool {
        self.repr.is_buffered()
    }

    /// Number of slots decoded so far, `None` for a logical list.
    pub fn materialized_slots(&self) -> Option<usize> {
        match &self.repr {
            Repr::Logical(_) => None,
            Repr::Buffered(view) => Some(view.materialized()),
        }
    }

    /// Encoded length of the elements, excluding format code and prefixes.
    pub(crate) fn elements_size(&self) -> Result<u64> {
        match &self.repr {
            Repr::Logical(logical) => sum_sizes(logical.get().iter().map(Encode::encoded_size)),
            Repr::Buffered(view) => Ok(view.encoded.payload().len() as u64),
        }
    }

    pub(crate) fn write_elements(&self, writer: &mut Writer) -> Result<()> {
        match &self.repr {
            Repr::Logical(logical) => {
                for value in logical.get() {
                    value.write(writer)?;
                }
                Ok(())
            }
            Repr::Buffered(view) => {
                writer.buf(&view.encoded.payload());
                Ok(())
            }
        }
    }

    /// Prefix width this list takes as a standalone or array element value.
    pub(crate) fn width(&self) -> Result<PrefixWidth> {
        Ok(compound_width(self.len(), self.elements_size()?))
    }

    /// Prefixes and elements written with the given width.
    pub(crate) fn write_body(&self, width: PrefixWidth, writer: &mut Writer) -> Result<()> {
        let body = self.elements_size()?;
        write_compound_prefix(writer, width, self.len(), body);
        self.write_elements(writer)
    }

    pub(crate) fn body_size(&self, width: PrefixWidth) -> Result<u32> {
        compound_body_size("list", width, self.len(), self.elements_size()?)
    }

    fn encode_logical(&self, values: &[AmqpValue]) -> Result<Bytes> {
        let mut writer = Writer::with_capacity(self.encoded_size()? as usize);
        write_logical(values, &mut writer)?;
        Ok(Bytes::from(writer.flush()))
    }
}

fn write_logical(values: &[AmqpValue], writer: &mut Writer) -> Result<()> {
    if values.is_empty() {
        writer.u8(LIST0);
        return Ok(());
    }
    let body = sum_sizes(values.iter().map(Encode::encoded_size))?;
    let width = compound_width(values.len(), body);
    writer.u8(match width {
        PrefixWidth::One => LIST8,
        PrefixWidth::Four => LIST32,
    });
    write_compound_prefix(writer, width, values.len(), body);
    for value in values {
        value.write(writer)?;
    }
    Ok(())
}

impl Encode for List {
    fn format_code(&self) -> u8 {
        match &self.repr {
            Repr::Buffered(view) => view.encoded.format_code(),
            Repr::Logical(_) if self.is_empty() => LIST0,
            Repr::Logical(_) => match self.width() {
                Ok(PrefixWidth::One) => LIST8,
                _ => LIST32,
            },
        }
    }

    fn encoded_size(&self) -> Result<u32> {
        match &self.repr {
            Repr::Buffered(view) => Ok(view.encoded.encoded_size()),
            Repr::Logical(logical) => logical.size(|values| {
                if values.is_empty() {
                    return Ok(1);
                }
                let body = sum_sizes(values.iter().map(Encode::encoded_size))?;
                let width = compound_width(values.len(), body);
                Ok(1 + compound_body_size("list", width, values.len(), body)?)
            }),
        }
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        match &self.repr {
            Repr::Buffered(view) => writer.buf(view.encoded.as_bytes()),
            Repr::Logical(logical) => match logical.cached_snapshot() {
                Some(bytes) => writer.buf(bytes),
                None => return write_logical(logical.get(), writer),
            },
        }
        Ok(())
    }

    /// Returns the encoding and freezes the list.
    fn to_bytes(&self) -> Result<Bytes> {
        match &self.repr {
            Repr::Buffered(view) => Ok(view.encoded.as_bytes().clone()),
            Repr::Logical(logical) => logical.snapshot(|values| self.encode_logical(values)),
        }
    }
}

impl Decode for List {
    fn decode(encoded: &Encoded) -> Result<Self> {
        Self::from_encoded(encoded.clone())
    }
}

impl From<Vec<AmqpValue>> for List {
    fn from(values: Vec<AmqpValue>) -> Self {
        Self {
            repr: Repr::logical(values),
        }
    }
}

impl FromIterator<AmqpValue> for List {
    fn from_iter<I: IntoIterator<Item = AmqpValue>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

fn same_bytes(a: &List, b: &List) -> bool {
    let bytes = |list: &List| match &list.repr {
        Repr::Buffered(view) => Some(view.encoded.as_bytes().clone()),
        Repr::Logical(logical) => logical.cached_snapshot().cloned(),
    };
    matches!((bytes(a), bytes(b)), (Some(x), Some(y)) if x == y)
}

impl PartialEq for List {
    /// Element-wise equality. Elements that fail to decode are unequal to
    /// everything, unless both lists carry identical bytes.
    fn eq(&self, other: &Self) -> bool {
        if same_bytes(self, other) {
            return true;
        }
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| matches!((a, b), (Ok(a), Ok(b)) if a == b))
    }
}

impl Eq for List {}

impl Hash for List {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self.iter() {
            match value {
                Ok(value) => value.hash(state),
                Err(_) => state.write_u8(0xff),
            }
        }
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for value in self.iter() {
            match value {
                Ok(value) => list.entry(value),
                Err(err) => list.entry(&format_args!("<{err}>")),
            };
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> List {
        vec![
            AmqpValue::Uint(1),
            AmqpValue::String("two".into()),
            AmqpValue::Boolean(true),
        ]
        .into()
    }

    #[test]
    fn empty_list_is_list0() {
        let list = List::new();
        assert_eq!(list.format_code(), LIST0);
        assert_eq!(list.to_bytes().unwrap().as_ref(), &[LIST0]);
        let decoded = List::decode_slice(&[LIST0]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn decoding_touches_only_requested_slot() {
        let bytes = sample().to_bytes().unwrap();
        let decoded = List::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.materialized_slots(), Some(0));
        assert_eq!(decoded.get(1).unwrap(), Some(&AmqpValue::String("two".into())));
        assert_eq!(decoded.materialized_slots(), Some(1));
        assert_eq!(decoded.get(3).unwrap(), None);
    }

    #[test]
    fn to_bytes_freezes_and_copy_thaws() {
        let list = sample();
        let before = list.to_bytes().unwrap();
        assert!(list.is_frozen());
        let mut copy = list.copy().unwrap();
        assert!(!copy.is_frozen());
        copy.set(0, AmqpValue::Uint(9));
        assert_eq!(list.to_bytes().unwrap(), before);
        assert_ne!(copy.to_bytes().unwrap(), before);
        assert_eq!(list.get(0).unwrap(), Some(&AmqpValue::Uint(1)));
    }

    #[test]
    #[should_panic(expected = "call copy()")]
    fn frozen_list_rejects_set() {
        let mut list = sample();
        list.to_bytes().unwrap();
        list.set(0, AmqpValue::Null);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_out_of_range_panics() {
        let mut list = sample();
        list.set(3, AmqpValue::Null);
    }

    #[test]
    fn buffered_list_copies_into_logical() {
        let bytes = sample().to_bytes().unwrap();
        let decoded = List::decode_from(&bytes, 0).unwrap();
        assert!(decoded.is_frozen());
        let mut copy = decoded.copy().unwrap();
        copy.push(AmqpValue::Null);
        assert_eq!(copy.len(), 4);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn wide_list_past_255_bytes() {
        let list: List = vec![AmqpValue::Binary(Bytes::from(vec![0u8; 252]))].into();
        // 1 (count) + 2 (vbin8 prefix) + 252 = 255 size bytes: still list8
        assert_eq!(list.format_code(), LIST8);
        let list: List = vec![AmqpValue::Binary(Bytes::from(vec![0u8; 253]))].into();
        assert_eq!(list.format_code(), LIST32);
        let bytes = list.to_bytes().unwrap();
        assert_eq!(bytes.len() as u32, list.encoded_size().unwrap());
    }

    #[test]
    fn write_at_offset() {
        let list = sample();
        let size = list.encoded_size().unwrap() as usize;
        let mut buf = vec![0u8; size + 2];
        assert_eq!(list.write_at(&mut buf, 2).unwrap(), size);
        assert_eq!(&buf[2..], list.to_bytes().unwrap().as_ref());
        assert!(list.write_at(&mut buf, 3).is_err());
    }
}
