//! Codec error type.

use amqp_buffers::BufferError;
use thiserror::Error;

/// Errors raised while encoding or decoding AMQP values.
///
/// Every variant except [`AmqpError::UnexpectedType`] is an encoding error in
/// the sense of [`ErrorKind::Encoding`]. Misuse of the API (positions out of
/// range, mutating a frozen value) is not reported here: it panics.
#[derive(Debug, Error)]
pub enum AmqpError {
    #[error("truncated {context}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("{context} too large: {size} bytes exceeds limit of {limit}")]
    TooLarge {
        context: &'static str,
        size: u64,
        limit: u64,
    },
    #[error("malformed {context}: {reason}")]
    Malformed {
        context: &'static str,
        reason: String,
    },
    #[error("missing mandatory field `{field}` of {structure}")]
    MissingField {
        structure: &'static str,
        field: &'static str,
    },
    #[error("invalid descriptor for {expected}: found {found}")]
    InvalidDescriptor {
        expected: &'static str,
        found: String,
    },
    #[error("unexpected format code {code:#04x} while decoding {expected}")]
    UnexpectedType { expected: &'static str, code: u8 },
    #[error("i/o error while reading {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// The two error kinds callers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrepresentable value, truncated or malformed input, missing field.
    Encoding,
    /// A format code outside the category the caller expected.
    UnexpectedType,
}

impl AmqpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmqpError::UnexpectedType { .. } => ErrorKind::UnexpectedType,
            _ => ErrorKind::Encoding,
        }
    }

    pub(crate) fn malformed(context: &'static str, reason: impl Into<String>) -> Self {
        AmqpError::Malformed {
            context,
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected(expected: &'static str, code: u8) -> Self {
        AmqpError::UnexpectedType { expected, code }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            return AmqpError::Truncated {
                context,
                needed: 1,
                available: 0,
            };
        }
        AmqpError::Io { context, source }
    }

    /// Returns `true` if more input could turn this error into a success.
    pub fn is_truncated(&self) -> bool {
        matches!(self, AmqpError::Truncated { .. })
    }
}

impl From<BufferError> for AmqpError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { needed, available } => AmqpError::Truncated {
                context: "value",
                needed,
                available,
            },
            BufferError::InvalidUtf8 => AmqpError::malformed("string", "invalid UTF-8 sequence"),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmqpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            AmqpError::unexpected("symbol", 0x70).kind(),
            ErrorKind::UnexpectedType
        );
        assert_eq!(
            AmqpError::malformed("list", "odd").kind(),
            ErrorKind::Encoding
        );
        let missing = AmqpError::MissingField {
            structure: "open",
            field: "container-id",
        };
        assert_eq!(missing.kind(), ErrorKind::Encoding);
        assert_eq!(
            missing.to_string(),
            "missing mandatory field `container-id` of open"
        );
    }

    #[test]
    fn buffer_errors_convert() {
        let err: AmqpError = BufferError::EndOfBuffer {
            needed: 4,
            available: 1,
        }
        .into();
        assert!(err.is_truncated());
        let err: AmqpError = BufferError::InvalidUtf8.into();
        assert!(matches!(err, AmqpError::Malformed { .. }));
    }

    #[test]
    fn eof_is_truncation() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(AmqpError::io("value", eof).is_truncated());
        let other = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(matches!(AmqpError::io("value", other), AmqpError::Io { .. }));
    }

    #[test]
    fn unexpected_type_message() {
        assert_eq!(
            AmqpError::unexpected("symbol", 0x70).to_string(),
            "unexpected format code 0x70 while decoding symbol"
        );
    }
}
