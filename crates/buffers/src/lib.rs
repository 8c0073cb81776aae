//! Binary buffer utilities for the AMQP type codec.
//!
//! This crate provides the two cursors the codec is built on: a bounds-checked
//! reader over a borrowed byte slice and an auto-growing writer.
//!
//! # Overview
//!
//! - [`Reader`] - Reads big-endian binary data from a byte slice with cursor tracking
//! - [`Writer`] - Writes big-endian binary data to an auto-growing buffer
//!
//! All multi-byte integers on the AMQP wire are network byte order, so every
//! read and write here is big-endian.
//!
//! # Example
//!
//! ```
//! use amqp_buffers::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0xa1);
//! writer.u8(5);
//! writer.utf8("hello");
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8().unwrap(), 0xa1);
//! let len = reader.u8().unwrap() as usize;
//! assert_eq!(reader.utf8(len).unwrap(), "hello");
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left before the end of the readable window.
        available: usize,
    },
    /// Invalid UTF-8 sequence.
    InvalidUtf8,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { needed, available } => write!(
                f,
                "end of buffer: needed {needed} bytes, {available} available"
            ),
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
        }
    }
}

impl std::error::Error for BufferError {}
