use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use amqp_buffers::Writer;
use bytes::Bytes;
use indexmap::IndexMap;

use super::repr::Repr;
use super::{compound_body_size, compound_width, sum_sizes, write_compound_prefix};
use crate::codec::{Decode, Encode};
use crate::constants::{MAP32, MAP8};
use crate::encoded::Encoded;
use crate::error::{AmqpError, Result};
use crate::format::PrefixWidth;
use crate::primitive::Symbol;
use crate::value::AmqpValue;

type Entries = IndexMap<AmqpValue, AmqpValue>;

/// Key and value views of a decoded map, each decoded on first read.
#[derive(Debug, Clone)]
pub(crate) struct MapView {
    encoded: Encoded,
    entries: Vec<(Encoded, Encoded)>,
    keys: Vec<OnceLock<AmqpValue>>,
    values: Vec<OnceLock<AmqpValue>>,
}

fn decode_slot<'a>(slot: &'a OnceLock<AmqpValue>, encoded: &Encoded) -> Result<&'a AmqpValue> {
    if let Some(value) = slot.get() {
        return Ok(value);
    }
    let value = AmqpValue::decode(encoded)?;
    Ok(slot.get_or_init(|| value))
}

impl MapView {
    fn new(encoded: Encoded) -> Result<Self> {
        let elements = encoded.elements("map")?;
        if elements.len() % 2 != 0 {
            return Err(AmqpError::malformed(
                "map",
                format!("odd element count {}", elements.len()),
            ));
        }
        let mut entries = Vec::with_capacity(elements.len() / 2);
        let mut elements = elements.into_iter();
        while let (Some(key), Some(value)) = (elements.next(), elements.next()) {
            entries.push((key, value));
        }
        let keys = entries.iter().map(|_| OnceLock::new()).collect();
        let values = entries.iter().map(|_| OnceLock::new()).collect();
        Ok(Self {
            encoded,
            entries,
            keys,
            values,
        })
    }

    fn key(&self, index: usize) -> Result<&AmqpValue> {
        decode_slot(&self.keys[index], &self.entries[index].0)
    }

    fn value(&self, index: usize) -> Result<&AmqpValue> {
        decode_slot(&self.values[index], &self.entries[index].1)
    }

    fn materialized(&self) -> usize {
        self.keys
            .iter()
            .chain(self.values.iter())
            .filter(|slot| slot.get().is_some())
            .count()
    }
}

/// A key/value mapping with value-based key equality.
///
/// Entries keep wire (or insertion) order. Lookups on a decoded map decode
/// keys one by one until the first match and then only that entry's value.
///
/// ```
/// use amqp_codec::{AmqpValue, Map, Symbol};
///
/// let mut map = Map::new();
/// map.insert(Symbol::from_static("ttl"), AmqpValue::Uint(30));
/// map.insert(Symbol::from_static("nothing"), AmqpValue::Null);
///
/// assert_eq!(map.get_symbol("ttl").unwrap(), Some(&AmqpValue::Uint(30)));
/// assert_eq!(map.get_symbol("nothing").unwrap(), Some(&AmqpValue::Null));
/// assert_eq!(map.get_symbol("absent").unwrap(), None);
/// ```
#[derive(Clone)]
pub struct Map {
    repr: Repr<Entries, MapView>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Self {
            repr: Repr::logical(IndexMap::new()),
        }
    }

    /// Wraps a decoded map view without decoding any key or value.
    ///
    /// Duplicate keys are only detected when the map is materialized (see
    /// [`Map::to_index_map`]); lookups return the first match.
    pub fn from_encoded(encoded: Encoded) -> Result<Self> {
        match encoded.format_code() {
            MAP8 | MAP32 => Ok(Self {
                repr: Repr::Buffered(MapView::new(encoded)?),
            }),
            code => Err(AmqpError::unexpected("map", code)),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Logical(logical) => logical.get().len(),
            Repr::Buffered(view) => view.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `key`. `Ok(None)` means absent, `Ok(Some(&AmqpValue::Null))`
    /// means present with a null value.
    pub fn get(&self, key: &AmqpValue) -> Result<Option<&AmqpValue>> {
        match &self.repr {
            Repr::Logical(logical) => Ok(logical.get().get(key)),
            Repr::Buffered(view) => {
                for index in 0..view.entries.len() {
                    if view.key(index)? == key {
                        return view.value(index).map(Some);
                    }
                }
                Ok(None)
            }
        }
    }

    pub fn get_symbol(&self, key: &str) -> Result<Option<&AmqpValue>> {
        self.get(&AmqpValue::Symbol(Symbol::new(key)?))
    }

    pub fn contains_key(&self, key: &AmqpValue) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Inserts an entry, returning the previous value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the map is frozen.
    pub fn insert(&mut self, key: impl Into<AmqpValue>, value: impl Into<AmqpValue>) -> Option<AmqpValue> {
        self.repr.make_mut("map").insert(key.into(), value.into())
    }

    /// Removes `key`, keeping the order of the remaining entries.
    ///
    /// # Panics
    ///
    /// Panics if the map is frozen.
    pub fn remove(&mut self, key: &AmqpValue) -> Option<AmqpValue> {
        self.repr.make_mut("map").shift_remove(key)
    }

    /// Entry `index` in wire order.
    pub fn entry(&self, index: usize) -> Result<Option<(&AmqpValue, &AmqpValue)>> {
        match &self.repr {
            Repr::Logical(logical) => Ok(logical.get().get_index(index)),
            Repr::Buffered(view) if index < view.entries.len() => {
                Ok(Some((view.key(index)?, view.value(index)?)))
            }
            Repr::Buffered(_) => Ok(None),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<(&AmqpValue, &AmqpValue)>> + '_ {
        (0..self.len()).filter_map(move |index| self.entry(index).transpose())
    }

    /// Materializes every entry. Fails on duplicate keys.
    pub fn to_index_map(&self) -> Result<IndexMap<AmqpValue, AmqpValue>> {
        if let Repr::Logical(logical) = &self.repr {
            return Ok(logical.get().clone());
        }
        let mut entries = IndexMap::with_capacity(self.len());
        for entry in self.iter() {
            let (key, value) = entry?;
            if entries.insert(key.clone(), value.clone()).is_some() {
                return Err(AmqpError::malformed(
                    "map",
                    format!("duplicate key {key}"),
                ));
            }
        }
        Ok(entries)
    }

    /// A mutable copy sharing entries with `self` until either is mutated.
    pub fn copy(&self) -> Result<Self> {
        let repr = match &self.repr {
            Repr::Logical(logical) => Repr::Logical(logical.fork()),
            Repr::Buffered(_) => Repr::logical(self.to_index_map()?),
        };
        Ok(Self { repr })
    }

    pub fn is_frozen(&self) -> bool {
        self.repr.is_frozen()
    }

    pub fn is_buffered(&self) -> bool {
        self.repr.is_buffered()
    }

    /// Number of keys and values decoded so far, `None` for a logical map.
    pub fn materialized_slots(&self) -> Option<usize> {
        match &self.repr {
            Repr::Logical(_) => None,
            Repr::Buffered(view) => Some(view.materialized()),
        }
    }

    fn count(&self) -> usize {
        2 * self.len()
    }

    pub(crate) fn elements_size(&self) -> Result<u64> {
        match &self.repr {
            Repr::Logical(logical) => entries_size(logical.get()),
            Repr::Buffered(view) => Ok(view.encoded.payload().len() as u64),
        }
    }

    pub(crate) fn width(&self) -> Result<PrefixWidth> {
        Ok(compound_width(self.count(), self.elements_size()?))
    }

    pub(crate) fn body_size(&self, width: PrefixWidth) -> Result<u32> {
        compound_body_size("map", width, self.count(), self.elements_size()?)
    }

    pub(crate) fn write_body(&self, width: PrefixWidth, writer: &mut Writer) -> Result<()> {
        let body = self.elements_size()?;
        write_compound_prefix(writer, width, self.count(), body);
        match &self.repr {
            Repr::Logical(logical) => write_entries(logical.get(), writer),
            Repr::Buffered(view) => {
                writer.buf(&view.encoded.payload());
                Ok(())
            }
        }
    }
}

fn entries_size(entries: &Entries) -> Result<u64> {
    sum_sizes(
        entries
            .iter()
            .flat_map(|(key, value)| [key.encoded_size(), value.encoded_size()]),
    )
}

fn write_entries(entries: &Entries, writer: &mut Writer) -> Result<()> {
    for (key, value) in entries {
        key.write(writer)?;
        value.write(writer)?;
    }
    Ok(())
}

fn write_logical(entries: &Entries, writer: &mut Writer) -> Result<()> {
    let body = entries_size(entries)?;
    let width = compound_width(2 * entries.len(), body);
    writer.u8(match width {
        PrefixWidth::One => MAP8,
        PrefixWidth::Four => MAP32,
    });
    write_compound_prefix(writer, width, 2 * entries.len(), body);
    write_entries(entries, writer)
}

impl Encode for Map {
    fn format_code(&self) -> u8 {
        match &self.repr {
            Repr::Buffered(view) => view.encoded.format_code(),
            Repr::Logical(_) => match self.width() {
                Ok(PrefixWidth::One) => MAP8,
                _ => MAP32,
            },
        }
    }

    fn encoded_size(&self) -> Result<u32> {
        match &self.repr {
            Repr::Buffered(view) => Ok(view.encoded.encoded_size()),
            Repr::Logical(logical) => logical.size(|entries| {
                let body = entries_size(entries)?;
                let width = compound_width(2 * entries.len(), body);
                Ok(1 + compound_body_size("map", width, 2 * entries.len(), body)?)
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

    /// Returns the encoding and freezes the map.
    fn to_bytes(&self) -> Result<Bytes> {
        match &self.repr {
            Repr::Buffered(view) => Ok(view.encoded.as_bytes().clone()),
            Repr::Logical(logical) => logical.snapshot(|entries| {
                let mut writer = Writer::with_capacity(self.encoded_size()? as usize);
                write_logical(entries, &mut writer)?;
                Ok(Bytes::from(writer.flush()))
            }),
        }
    }
}

impl Decode for Map {
    fn decode(encoded: &Encoded) -> Result<Self> {
        Self::from_encoded(encoded.clone())
    }
}

impl From<IndexMap<AmqpValue, AmqpValue>> for Map {
    fn from(entries: IndexMap<AmqpValue, AmqpValue>) -> Self {
        Self {
            repr: Repr::logical(entries),
        }
    }
}

impl<K: Into<AmqpValue>, V: Into<AmqpValue>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<Entries>()
            .into()
    }
}

impl PartialEq for Map {
    /// Order-independent key/value equality.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|entry| match entry {
            Ok((key, value)) => matches!(other.get(key), Ok(Some(found)) if found == value),
            Err(_) => false,
        })
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Sum of per-entry hashes, so entry order does not matter.
        let mut sum = 0u64;
        for entry in self.iter() {
            let mut hasher = DefaultHasher::new();
            match entry {
                Ok(entry) => entry.hash(&mut hasher),
                Err(_) => hasher.write_u8(0xff),
            }
            sum = sum.wrapping_add(hasher.finish());
        }
        self.len().hash(state);
        sum.hash(state);
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in self.iter() {
            match entry {
                Ok((key, value)) => map.entry(key, value),
                Err(err) => map.entry(&"<error>", &format_args!("{err}")),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &'static str) -> AmqpValue {
        AmqpValue::Symbol(Symbol::from_static(s))
    }

    fn sample() -> Map {
        [
            (sym("a"), AmqpValue::Uint(1)),
            (sym("b"), AmqpValue::Null),
            (sym("c"), AmqpValue::String("x".into())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn absent_and_null_are_distinct_after_decode() {
        let bytes = sample().to_bytes().unwrap();
        let decoded = Map::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.get(&sym("b")).unwrap(), Some(&AmqpValue::Null));
        assert_eq!(decoded.get(&sym("z")).unwrap(), None);
    }

    #[test]
    fn lookup_decodes_lazily() {
        let bytes = sample().to_bytes().unwrap();
        let decoded = Map::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.materialized_slots(), Some(0));
        decoded.get(&sym("a")).unwrap();
        // one key and its value
        assert_eq!(decoded.materialized_slots(), Some(2));
    }

    #[test]
    fn odd_count_is_malformed() {
        let err = Map::decode_slice(&[0xc1, 0x02, 0x01, 0x40]).unwrap_err();
        assert!(matches!(err, AmqpError::Malformed { .. }));
    }

    #[test]
    fn duplicate_keys_fail_on_materialize() {
        // map8 { "a": 1, "a": 2 }
        let bytes = [0xc1, 0x0b, 0x04, 0xa3, 1, b'a', 0x52, 1, 0xa3, 1, b'a', 0x52, 2];
        let decoded = Map::decode_slice(&bytes).unwrap();
        assert_eq!(decoded.get(&sym("a")).unwrap(), Some(&AmqpValue::Uint(1)));
        assert!(matches!(
            decoded.to_index_map(),
            Err(AmqpError::Malformed { .. })
        ));
        assert!(decoded.copy().is_err());
    }

    #[test]
    fn equality_ignores_order() {
        let forward: Map = [(sym("a"), AmqpValue::Uint(1)), (sym("b"), AmqpValue::Uint(2))]
            .into_iter()
            .collect();
        let backward: Map = [(sym("b"), AmqpValue::Uint(2)), (sym("a"), AmqpValue::Uint(1))]
            .into_iter()
            .collect();
        assert_eq!(forward, backward);
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        forward.hash(&mut h1);
        backward.hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn insert_remove_keep_order() {
        let mut map = sample();
        map.remove(&sym("a"));
        map.insert(sym("a"), AmqpValue::Uint(5));
        let keys: Vec<_> = map.iter().map(|entry| entry.unwrap().0.clone()).collect();
        assert_eq!(keys, vec![sym("b"), sym("c"), sym("a")]);
    }

    #[test]
    #[should_panic(expected = "call copy()")]
    fn decoded_map_is_frozen() {
        let bytes = sample().to_bytes().unwrap();
        let mut decoded = Map::decode_from(&bytes, 0).unwrap();
        decoded.insert(sym("d"), AmqpValue::Null);
    }
}
