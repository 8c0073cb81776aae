//! Self-describing AMQP 1.0 type encoding.
//!
//! Every value on the wire starts with a one-byte format code that fixes how
//! many bytes follow. This crate classifies those codes, measures values
//! without parsing them, encodes each value in its narrowest legal form and
//! decodes composites lazily, one slot at a time.
//!
//! # Overview
//!
//! - [`category_of`] / [`encoding_of`] - the format-code registry
//! - [`Encoded`] - a measured, immutable view of one encoded value
//! - [`AmqpValue`] - any AMQP value, primitive or composite
//! - [`List`], [`Map`], [`Described`] - lazily decoded, copy-on-write composites
//! - [`FieldValue`] - typed access to composite slots
//! - [`StreamingDecoder`] - values out of chunked input
//!
//! # Example
//!
//! ```
//! use amqp_codec::{AmqpValue, Decode, Encode, List, Symbol};
//!
//! let mut list = List::new();
//! list.push(Symbol::from_static("amqp:not-found"));
//! list.push(AmqpValue::Null);
//!
//! let bytes = list.to_bytes().unwrap();
//! assert_eq!(&bytes[..3], &[0xc0, 0x12, 0x02]);
//! assert!(list.is_frozen());
//!
//! let decoded = List::decode_from(&bytes, 0).unwrap();
//! assert_eq!(decoded, list);
//! assert_eq!(decoded.get(1).unwrap(), Some(&AmqpValue::Null));
//! ```

mod codec;
mod composite;
mod config;
mod encoded;
mod error;
mod json;
mod primitive;
mod stream;
mod value;

pub mod constants;
pub mod format;

pub use codec::{decode, decode_with_config, encode, read, read_with_config, Decode, Encode};
pub use composite::{Described, Descriptor, FieldValue, List, Map};
pub use config::{CodecConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_MAX_VALUE_SIZE};
pub use encoded::Encoded;
pub use error::{AmqpError, ErrorKind, Result};
pub use format::{category_of, encoding_of, is_described_type, Category, Encoding, PrefixWidth};
pub use primitive::{Symbol, Timestamp, Uuid};
pub use stream::StreamingDecoder;
pub use value::AmqpValue;

// Shared buffer type of every encoded view.
pub use bytes::Bytes;
