//! Auto-growing binary writer.

/// A binary buffer writer that appends big-endian data to a growing buffer.
///
/// The writer keeps everything written since the last [`Writer::reset`] or
/// [`Writer::flush`] in `uint8`. Encoders size their output up front when they
/// can (see [`Writer::with_capacity`]) so a single value is written without
/// reallocation.
///
/// # Example
///
/// ```
/// use amqp_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8u32(0x70, 0x0102_0304);
/// assert_eq!(writer.flush(), vec![0x70, 0x01, 0x02, 0x03, 0x04]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Writer {
    /// The bytes written so far.
    pub uint8: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self { uint8: Vec::new() }
    }

    /// Creates an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Discards the written bytes, keeping the allocation.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Makes sure at least `capacity` more bytes fit without reallocating.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.uint8.reserve(capacity);
    }

    /// Returns the written bytes and leaves the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Returns the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.uint8
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.uint8.push(val as u8);
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a format byte followed by an 8-bit value.
    #[inline]
    pub fn u8u8(&mut self, code: u8, val: u8) {
        self.uint8.extend_from_slice(&[code, val]);
    }

    /// Writes a format byte followed by a 32-bit value.
    #[inline]
    pub fn u8u32(&mut self, code: u8, val: u32) {
        self.u8(code);
        self.u32(val);
    }

    /// Writes a format byte followed by a 64-bit value.
    #[inline]
    pub fn u8u64(&mut self, code: u8, val: u64) {
        self.u8(code);
        self.u64(val);
    }

    /// Appends raw bytes.
    #[inline]
    pub fn buf(&mut self, buf: &[u8]) {
        self.uint8.extend_from_slice(buf);
    }

    /// Appends the UTF-8 bytes of `s` (no length prefix).
    #[inline]
    pub fn utf8(&mut self, s: &str) {
        self.uint8.extend_from_slice(s.as_bytes());
    }
}
