//! Incremental decoding of values from chunked input.

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::encoded::Encoded;
use crate::error::Result;

/// Buffers pushed chunks and yields one whole [`Encoded`] value at a time.
///
/// ```
/// use amqp_codec::StreamingDecoder;
///
/// let mut decoder = StreamingDecoder::new();
/// decoder.push(&[0xa1, 0x03, b'a']);
/// assert!(decoder.next().unwrap().is_none());
/// decoder.push(&[b'b', b'c', 0x41]);
/// assert_eq!(decoder.next().unwrap().unwrap().len(), 5);
/// assert_eq!(decoder.next().unwrap().unwrap().format_code(), 0x41);
/// assert!(decoder.next().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct StreamingDecoder {
    buffer: BytesMut,
    config: CodecConfig,
}

impl Default for StreamingDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingDecoder {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.initial_capacity),
            config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        trace!(pushed = data.len(), buffered = self.buffer.len(), "buffered input");
    }

    /// Bytes pushed but not yet returned as a value.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the next complete value, or `Ok(None)` until enough bytes have
    /// been pushed. Oversized or malformed prefixes fail immediately.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Encoded>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let len = match Encoded::from_slice_with_config(&self.buffer, &self.config) {
            Ok(encoded) => encoded.len(),
            Err(err) if err.is_truncated() => return Ok(None),
            Err(err) => return Err(err),
        };
        let bytes = self.buffer.split_to(len).freeze();
        debug!(
            consumed = len,
            remaining = self.buffer.remaining(),
            "decoded value from stream"
        );
        Encoded::parse_with_config(&bytes, 0, &self.config).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AmqpError;

    #[test]
    fn byte_at_a_time() {
        let input = [0xc0, 0x04, 0x02, 0x52, 0x07, 0x40, 0x43];
        let mut decoder = StreamingDecoder::new();
        let mut values = Vec::new();
        for byte in input {
            decoder.push(&[byte]);
            while let Some(value) = decoder.next().unwrap() {
                values.push(value);
            }
        }
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].count(), 2);
        assert_eq!(values[1].format_code(), 0x43);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn oversized_prefix_fails_fast() {
        let mut decoder =
            StreamingDecoder::with_config(CodecConfig::new().with_max_value_size(1024));
        decoder.push(&[0xb0, 0x00, 0x10, 0x00, 0x00]);
        assert!(matches!(decoder.next(), Err(AmqpError::TooLarge { .. })));
    }

    #[test]
    fn unknown_code_is_an_error() {
        let mut decoder = StreamingDecoder::new();
        decoder.push(&[0x01]);
        assert!(decoder.next().is_err());
    }
}
