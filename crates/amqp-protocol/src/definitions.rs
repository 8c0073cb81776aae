//! Shared definitions: the error structure and common condition symbols.

use amqp_codec::{Map, Symbol};

use crate::schema::described_list;

described_list! {
    /// Details of an error, carried by `detach`, `end` and `close`.
    ///
    /// ```
    /// use amqp_codec::{Encode, Symbol};
    /// use amqp_protocol::{condition, ErrorInfo};
    ///
    /// let mut error = ErrorInfo::new();
    /// error.set_condition(Symbol::from_static(condition::NOT_FOUND));
    /// error.set_description("no such node".to_owned());
    /// let bytes = error.to_bytes().unwrap();
    /// assert_eq!(&bytes[..3], &[0x00, 0x53, 0x1d]);
    /// ```
    pub struct ErrorInfo {
        schema: ErrorInfoSchema,
        fields: ErrorInfoField,
        name: "error",
        descriptor: ("amqp:error:list", 0x1d),
    }
    /// Symbolic error condition.
    0 Condition "condition" => condition, set_condition: Symbol, mandatory;
    /// Human readable description of the condition.
    1 Description "description" => description, set_description: String;
    2 Info "info" => info, set_info: Map;
}

impl ErrorInfo {
    /// An error with only its condition set.
    pub fn with_condition(condition: Symbol) -> Self {
        let mut error = Self::new();
        error.set_condition(condition);
        error
    }
}

/// Error conditions defined by the transport and messaging layers.
pub mod condition {
    pub const INTERNAL_ERROR: &str = "amqp:internal-error";
    pub const NOT_FOUND: &str = "amqp:not-found";
    pub const UNAUTHORIZED_ACCESS: &str = "amqp:unauthorized-access";
    pub const DECODE_ERROR: &str = "amqp:decode-error";
    pub const RESOURCE_LIMIT_EXCEEDED: &str = "amqp:resource-limit-exceeded";
    pub const NOT_ALLOWED: &str = "amqp:not-allowed";
    pub const INVALID_FIELD: &str = "amqp:invalid-field";
    pub const NOT_IMPLEMENTED: &str = "amqp:not-implemented";
    pub const FRAMING_ERROR: &str = "amqp:connection:framing-error";
    pub const CONNECTION_FORCED: &str = "amqp:connection:forced";
    pub const WINDOW_VIOLATION: &str = "amqp:session:window-violation";
    pub const DETACH_FORCED: &str = "amqp:link:detach-forced";
}

#[cfg(test)]
mod tests {
    use super::*;
    use amqp_codec::{AmqpError, Decode, Encode};

    #[test]
    fn condition_is_mandatory() {
        let mut error = ErrorInfo::new();
        error.set_description("no condition".to_owned());
        let err = error.to_bytes().unwrap_err();
        assert!(matches!(
            err,
            AmqpError::MissingField {
                structure: "error",
                field: "condition"
            }
        ));
        assert!(!error.is_frozen());
    }

    #[test]
    fn roundtrip_keeps_fields() {
        let mut info = Map::new();
        info.insert(Symbol::from_static("retry"), 3u32);
        let mut error = ErrorInfo::with_condition(Symbol::from_static(condition::NOT_ALLOWED));
        error.set_info(info.clone());

        let bytes = error.to_bytes().unwrap();
        let decoded = ErrorInfo::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.condition().unwrap().unwrap(), condition::NOT_ALLOWED);
        assert_eq!(decoded.description().unwrap(), None);
        assert_eq!(decoded.info().unwrap(), Some(info));
        assert_eq!(decoded, error);
    }

    #[test]
    fn field_enum_matches_schema_order() {
        for (position, field) in ErrorInfoField::ALL.iter().enumerate() {
            assert_eq!(field.position(), position);
            assert_eq!(ErrorInfoField::from_position(position), Some(*field));
            assert_eq!(ErrorInfoField::from_name(field.name()), Some(*field));
        }
        assert_eq!(ErrorInfo::FIELD_COUNT, 3);
    }
}
