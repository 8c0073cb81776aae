//! Described lists and maps with a fixed schema.
//!
//! Every protocol structure is a described compound: a descriptor naming the
//! structure followed by a list (fields addressed by position) or a map
//! (fields addressed by symbolic key). [`DescribedList`] and
//! [`DescribedMap`] hold the fields in the codec's lazily decoded [`List`]
//! and [`Map`], so a decoded structure only decodes the fields that are read.

use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

use amqp_buffers::Writer;
use amqp_codec::constants::DESCRIBED;
use amqp_codec::{
    AmqpError, AmqpValue, Bytes, Decode, Described, Descriptor, Encode, Encoded, FieldValue, List,
    Map, Result, Symbol,
};
use tracing::{debug, trace};

/// One position of a list schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Protocol name, e.g. `container-id`.
    pub name: &'static str,
    pub mandatory: bool,
}

/// Static description of a described list.
pub trait ListSchema: 'static {
    /// Short name used in errors and logs.
    const NAME: &'static str;
    const SYMBOL: &'static str;
    const CODE: u64;
    /// Fields in position order.
    const FIELDS: &'static [FieldSpec];
}

/// Static description of a described map.
pub trait MapSchema: 'static {
    const NAME: &'static str;
    const SYMBOL: &'static str;
    const CODE: u64;
    /// Keys with typed accessors. Other symbolic keys are carried as is.
    const KEYS: &'static [&'static str];
}

static NULL: AmqpValue = AmqpValue::Null;

fn unexpected(name: &'static str, value: &AmqpValue) -> AmqpError {
    AmqpError::UnexpectedType {
        expected: name,
        code: value.format_code(),
    }
}

fn check_descriptor(
    descriptor: &Descriptor,
    name: &'static str,
    symbol: &'static str,
    code: u64,
) -> Result<()> {
    if descriptor.matches(symbol, code) {
        Ok(())
    } else {
        Err(AmqpError::InvalidDescriptor {
            expected: name,
            found: descriptor.to_string(),
        })
    }
}

fn described_bytes(code: u64, body: &Bytes) -> Result<Bytes> {
    let descriptor = Descriptor::Code(code);
    let mut bytes = Vec::with_capacity(1 + descriptor.encoded_size()? as usize + body.len());
    bytes.push(DESCRIBED);
    bytes.extend_from_slice(&descriptor.to_bytes()?);
    bytes.extend_from_slice(body);
    Ok(Bytes::from(bytes))
}

fn frozen_panic(name: &str) -> ! {
    panic!("{name} is frozen once encoded or decoded; call copy() to get a mutable value")
}

// ---------------------------------------------------------------------------
// Described lists
// ---------------------------------------------------------------------------

/// A described list whose positions follow the schema `S`.
///
/// A new structure has every field absent. Encoding writes all
/// `FIELD_COUNT` positions, absent fields as null; `to_bytes` also freezes
/// the structure, and decoded structures start frozen. Use [`copy`](Self::copy) to
/// get a mutable structure from a frozen one.
pub struct DescribedList<S: ListSchema> {
    fields: List,
    snapshot: OnceLock<Bytes>,
    schema: PhantomData<fn() -> S>,
}

impl<S: ListSchema> DescribedList<S> {
    pub const FIELD_COUNT: usize = S::FIELDS.len();

    pub fn new() -> Self {
        Self::from_fields(vec![AmqpValue::Null; Self::FIELD_COUNT].into())
    }

    fn from_fields(fields: List) -> Self {
        Self {
            fields,
            snapshot: OnceLock::new(),
            schema: PhantomData,
        }
    }

    fn check_position(position: usize) {
        assert!(
            position < Self::FIELD_COUNT,
            "position {position} out of range for {} with {} fields",
            S::NAME,
            Self::FIELD_COUNT
        );
    }

    /// The raw value at `position`; absent fields read as null.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not below `FIELD_COUNT`.
    pub fn get(&self, position: usize) -> Result<&AmqpValue> {
        Self::check_position(position);
        Ok(self.fields.get(position)?.unwrap_or(&NULL))
    }

    /// Replaces the raw value at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not below `FIELD_COUNT` or the structure is
    /// frozen.
    pub fn set(&mut self, position: usize, value: impl Into<AmqpValue>) {
        Self::check_position(position);
        if self.is_frozen() {
            frozen_panic(S::NAME);
        }
        self.fields.set(position, value);
    }

    /// The typed value at `position`, `None` if absent.
    pub fn field<T: FieldValue>(&self, position: usize) -> Result<Option<T>> {
        match self.get(position)? {
            AmqpValue::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }

    /// Sets or clears the typed value at `position`.
    ///
    /// # Panics
    ///
    /// As [`set`](Self::set).
    pub fn set_field<T: FieldValue>(&mut self, position: usize, value: Option<T>) {
        self.set(position, value.map_or(AmqpValue::Null, T::into_value));
    }

    pub fn clear(&mut self, position: usize) {
        self.set(position, AmqpValue::Null);
    }

    pub fn is_frozen(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// A mutable copy with every position present.
    pub fn copy(&self) -> Result<Self> {
        let mut fields = self.fields.copy()?;
        if fields.len() < Self::FIELD_COUNT {
            fields.resize(Self::FIELD_COUNT);
        }
        Ok(Self::from_fields(fields))
    }

    /// Fails with [`AmqpError::MissingField`] for the first absent mandatory
    /// field.
    pub fn validate(&self) -> Result<()> {
        for (position, spec) in S::FIELDS.iter().enumerate() {
            if spec.mandatory && self.get(position)?.is_null() {
                return Err(AmqpError::MissingField {
                    structure: S::NAME,
                    field: spec.name,
                });
            }
        }
        Ok(())
    }

    /// Decodes from a described value, accepting the symbolic or numeric
    /// descriptor. The result is a mutable copy.
    pub fn from_described(described: &Described) -> Result<Self> {
        check_descriptor(described.descriptor(), S::NAME, S::SYMBOL, S::CODE)?;
        let fields = match described.value() {
            AmqpValue::List(list) => list,
            other => return Err(unexpected(S::NAME, other)),
        };
        Self::check_len(fields.len())?;
        let mut fields = fields.copy()?;
        fields.resize(Self::FIELD_COUNT);
        Ok(Self::from_fields(fields))
    }

    /// Wraps the fields in a [`Described`] with the numeric descriptor.
    pub fn into_described(self) -> Described {
        Described::new(S::CODE, self.fields)
    }

    fn check_len(len: usize) -> Result<()> {
        if len > Self::FIELD_COUNT {
            return Err(AmqpError::Malformed {
                context: S::NAME,
                reason: format!("{len} fields, at most {} expected", Self::FIELD_COUNT),
            });
        }
        Ok(())
    }

    fn encode_snapshot(&self) -> Result<Bytes> {
        self.validate()?;
        let body = self.fields.to_bytes()?;
        described_bytes(S::CODE, &body)
    }
}

impl<S: ListSchema> Default for DescribedList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ListSchema> Clone for DescribedList<S> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            snapshot: self.snapshot.clone(),
            schema: PhantomData,
        }
    }
}

impl<S: ListSchema> Encode for DescribedList<S> {
    fn format_code(&self) -> u8 {
        DESCRIBED
    }

    fn encoded_size(&self) -> Result<u32> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.len() as u32);
        }
        Ok(1 + Descriptor::Code(S::CODE).encoded_size()? + self.fields.encoded_size()?)
    }

    /// Checks mandatory fields, then writes without freezing.
    fn write(&self, writer: &mut Writer) -> Result<()> {
        if let Some(bytes) = self.snapshot.get() {
            writer.buf(bytes);
            return Ok(());
        }
        self.validate()?;
        writer.u8(DESCRIBED);
        Descriptor::Code(S::CODE).write(writer)?;
        self.fields.write(writer)
    }

    /// Checks mandatory fields, then returns the encoding and freezes the
    /// structure.
    fn to_bytes(&self) -> Result<Bytes> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.clone());
        }
        let bytes = self.encode_snapshot()?;
        trace!(structure = S::NAME, len = bytes.len(), "froze structure");
        Ok(self.snapshot.get_or_init(|| bytes).clone())
    }
}

impl<S: ListSchema> Decode for DescribedList<S> {
    fn decode(encoded: &Encoded) -> Result<Self> {
        let (descriptor, value) = encoded.described_parts()?;
        let descriptor = Descriptor::decode(&descriptor)?;
        check_descriptor(&descriptor, S::NAME, S::SYMBOL, S::CODE)?;
        let fields = List::from_encoded(value)?;
        Self::check_len(fields.len())?;
        debug!(structure = S::NAME, %descriptor, fields = fields.len(), "decoded structure");
        Ok(Self {
            fields,
            snapshot: OnceLock::from(encoded.as_bytes().clone()),
            schema: PhantomData,
        })
    }
}

impl<S: ListSchema> FieldValue for DescribedList<S> {
    const TYPE_NAME: &'static str = S::NAME;

    fn into_value(self) -> AmqpValue {
        self.into_described().into()
    }

    fn from_value(value: &AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Described(described) => Self::from_described(described),
            other => Err(unexpected(S::NAME, other)),
        }
    }
}

impl<S: ListSchema> PartialEq for DescribedList<S> {
    fn eq(&self, other: &Self) -> bool {
        (0..Self::FIELD_COUNT).all(|position| match (self.get(position), other.get(position)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        })
    }
}

impl<S: ListSchema> fmt::Debug for DescribedList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(S::NAME);
        for (position, spec) in S::FIELDS.iter().enumerate() {
            match self.get(position) {
                Ok(AmqpValue::Null) => {}
                Ok(value) => {
                    debug.field(spec.name, value);
                }
                Err(err) => {
                    debug.field(spec.name, &format_args!("<{err}>"));
                }
            }
        }
        debug.finish()
    }
}

// ---------------------------------------------------------------------------
// Described maps
// ---------------------------------------------------------------------------

/// A described map keyed by symbols, following the schema `S`.
///
/// Absent keys read as `None`; clearing a field removes its key. Freezing
/// follows [`DescribedList`].
pub struct DescribedMap<S: MapSchema> {
    entries: Map,
    snapshot: OnceLock<Bytes>,
    schema: PhantomData<fn() -> S>,
}

impl<S: MapSchema> DescribedMap<S> {
    pub fn new() -> Self {
        Self::from_entries(Map::new())
    }

    fn from_entries(entries: Map) -> Self {
        Self {
            entries,
            snapshot: OnceLock::new(),
            schema: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw value under `key`, `None` if the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<&AmqpValue>> {
        self.entries.get_symbol(key)
    }

    /// Inserts a raw value under a symbolic key.
    ///
    /// # Panics
    ///
    /// Panics if the structure is frozen.
    pub fn insert(&mut self, key: Symbol, value: impl Into<AmqpValue>) -> Option<AmqpValue> {
        if self.is_frozen() {
            frozen_panic(S::NAME);
        }
        self.entries.insert(key, value)
    }

    /// # Panics
    ///
    /// Panics if the structure is frozen.
    pub fn remove(&mut self, key: &str) -> Option<AmqpValue> {
        if self.is_frozen() {
            frozen_panic(S::NAME);
        }
        let key = Symbol::new(key).ok()?;
        self.entries.remove(&AmqpValue::Symbol(key))
    }

    /// The typed value under `key`; absent and null both read as `None`.
    pub fn field<T: FieldValue>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            None | Some(AmqpValue::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some),
        }
    }

    /// Sets the typed value under `key`, or removes the key for `None`.
    ///
    /// # Panics
    ///
    /// Panics if the structure is frozen.
    pub fn set_field<T: FieldValue>(&mut self, key: &'static str, value: Option<T>) {
        match value {
            Some(value) => {
                self.insert(Symbol::from_static(key), value.into_value());
            }
            None => {
                self.remove(key);
            }
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.snapshot.get().is_some()
    }

    pub fn copy(&self) -> Result<Self> {
        Ok(Self::from_entries(self.entries.copy()?))
    }

    pub fn from_described(described: &Described) -> Result<Self> {
        check_descriptor(described.descriptor(), S::NAME, S::SYMBOL, S::CODE)?;
        match described.value() {
            AmqpValue::Map(map) => Ok(Self::from_entries(map.copy()?)),
            other => Err(unexpected(S::NAME, other)),
        }
    }

    pub fn into_described(self) -> Described {
        Described::new(S::CODE, self.entries)
    }
}

impl<S: MapSchema> Default for DescribedMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MapSchema> Clone for DescribedMap<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            snapshot: self.snapshot.clone(),
            schema: PhantomData,
        }
    }
}

impl<S: MapSchema> Encode for DescribedMap<S> {
    fn format_code(&self) -> u8 {
        DESCRIBED
    }

    fn encoded_size(&self) -> Result<u32> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.len() as u32);
        }
        Ok(1 + Descriptor::Code(S::CODE).encoded_size()? + self.entries.encoded_size()?)
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        if let Some(bytes) = self.snapshot.get() {
            writer.buf(bytes);
            return Ok(());
        }
        writer.u8(DESCRIBED);
        Descriptor::Code(S::CODE).write(writer)?;
        self.entries.write(writer)
    }

    fn to_bytes(&self) -> Result<Bytes> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.clone());
        }
        let bytes = described_bytes(S::CODE, &self.entries.to_bytes()?)?;
        trace!(structure = S::NAME, len = bytes.len(), "froze structure");
        Ok(self.snapshot.get_or_init(|| bytes).clone())
    }
}

impl<S: MapSchema> Decode for DescribedMap<S> {
    fn decode(encoded: &Encoded) -> Result<Self> {
        let (descriptor, value) = encoded.described_parts()?;
        let descriptor = Descriptor::decode(&descriptor)?;
        check_descriptor(&descriptor, S::NAME, S::SYMBOL, S::CODE)?;
        let entries = Map::from_encoded(value)?;
        debug!(structure = S::NAME, %descriptor, entries = entries.len(), "decoded structure");
        Ok(Self {
            entries,
            snapshot: OnceLock::from(encoded.as_bytes().clone()),
            schema: PhantomData,
        })
    }
}

impl<S: MapSchema> FieldValue for DescribedMap<S> {
    const TYPE_NAME: &'static str = S::NAME;

    fn into_value(self) -> AmqpValue {
        self.into_described().into()
    }

    fn from_value(value: &AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Described(described) => Self::from_described(described),
            other => Err(unexpected(S::NAME, other)),
        }
    }
}

impl<S: MapSchema> PartialEq for DescribedMap<S> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<S: MapSchema> fmt::Debug for DescribedMap<S> {
    /// Schema keys first, in schema order, then any other entries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(S::NAME);
        for key in S::KEYS {
            match self.get(key) {
                Ok(None) => {}
                Ok(Some(value)) => {
                    debug.field(key, value);
                }
                Err(err) => {
                    debug.field(key, &format_args!("<{err}>"));
                }
            }
        }
        for entry in self.entries.iter() {
            match entry {
                Ok((AmqpValue::Symbol(key), _)) if S::KEYS.iter().any(|k| *k == key.as_str()) => {}
                Ok((key, value)) => {
                    debug.field(&key.to_string(), value);
                }
                Err(err) => {
                    debug.field("<entry>", &format_args!("<{err}>"));
                }
            }
        }
        debug.finish()
    }
}
