/// Limits and allocation hints applied by the decode entry points.
///
/// ```
/// use amqp_codec::CodecConfig;
///
/// let config = CodecConfig::new().with_max_value_size(64 * 1024).with_max_depth(8);
/// assert_eq!(config.max_value_size, 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Largest declared size or length accepted before any allocation.
    pub max_value_size: u32,
    /// Deepest nesting of lists, maps, arrays and described values below the
    /// decoded value. Deeper input is `Malformed`.
    pub max_depth: usize,
    /// Initial buffer allocation of the streaming decoder.
    pub initial_capacity: usize,
}

pub const DEFAULT_MAX_VALUE_SIZE: u32 = 16 * 1024 * 1024;
pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecConfig {
    pub const fn new() -> Self {
        Self {
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    pub const fn with_max_value_size(mut self, max_value_size: u32) -> Self {
        self.max_value_size = max_value_size;
        self
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
