//! Delivery outcomes.

use amqp_codec::Map;

use crate::schema::described_map;

described_map! {
    /// The message was not and will not be acted upon.
    pub struct Released {
        schema: ReleasedSchema,
        name: "released",
        descriptor: ("amqp:released:map", 0x26),
    }
    "truncate" => truncate, set_truncate: bool;
    /// Count the release as a failed delivery attempt.
    "delivery-failed" => delivery_failed, set_delivery_failed: bool;
    /// Do not redeliver to the same link endpoint.
    "deliver-elsewhere" => deliver_elsewhere, set_deliver_elsewhere: bool;
    "message-attrs" => message_attrs, set_message_attrs: Map;
    "delivery-attrs" => delivery_attrs, set_delivery_attrs: Map;
}

#[cfg(test)]
mod tests {
    use super::*;
    use amqp_codec::{AmqpError, Decode, Encode, Symbol};

    #[test]
    fn absent_keys_are_not_written() {
        let mut released = Released::new();
        released.set_delivery_failed(true);
        let bytes = released.to_bytes().unwrap();
        // described, smallulong 0x26, map8 with one entry
        assert_eq!(&bytes[..6], &[0x00, 0x53, 0x26, 0xc1, 0x13, 0x02]);

        let decoded = Released::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.delivery_failed().unwrap(), Some(true));
        assert_eq!(decoded.truncate().unwrap(), None);
        assert_eq!(decoded, released);
    }

    #[test]
    fn clearing_removes_the_key() {
        let mut released = Released::new();
        released.set_truncate(true);
        released.set_truncate(None);
        assert!(released.is_empty());
    }

    #[test]
    fn unknown_keys_are_carried() {
        let mut released = Released::new();
        released.insert(Symbol::from_static("x-opt-reason"), "shutdown");
        let bytes = released.to_bytes().unwrap();
        let decoded = Released::decode_from(&bytes, 0).unwrap();
        assert_eq!(decoded.field::<String>("x-opt-reason").unwrap().as_deref(), Some("shutdown"));
    }

    #[test]
    fn debug_lists_schema_keys_before_other_entries() {
        let mut released = Released::new();
        released.insert(Symbol::from_static("x-opt-reason"), "shutdown");
        released.set_deliver_elsewhere(true);
        released.set_truncate(false);
        let debug = format!("{released:?}");
        assert!(debug.starts_with("released {"), "{debug}");
        let truncate = debug.find("truncate").unwrap();
        let elsewhere = debug.find("deliver-elsewhere").unwrap();
        let reason = debug.find("x-opt-reason").unwrap();
        assert!(truncate < elsewhere && elsewhere < reason, "{debug}");
        assert!(!debug.contains("delivery-failed"));
    }

    #[test]
    fn list_body_is_rejected() {
        // amqp:released:map descriptor over a list
        let err = Released::decode_slice(&[0x00, 0x53, 0x26, 0x45]).unwrap_err();
        assert!(matches!(err, AmqpError::UnexpectedType { code: 0x45, .. }));
    }
}
