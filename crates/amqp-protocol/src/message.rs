//! Message sections.

use amqp_codec::{Map, Timestamp};

use crate::schema::described_list;

described_list! {
    /// Transport headers of a message.
    ///
    /// ```
    /// use amqp_codec::Encode;
    /// use amqp_protocol::Header;
    ///
    /// let mut header = Header::new();
    /// header.set_durable(true);
    /// header.set_priority(4u8);
    /// let bytes = header.to_bytes().unwrap();
    /// // described, smallulong 0x70, list8 with all nine fields
    /// assert_eq!(&bytes[..6], &[0x00, 0x53, 0x70, 0xc0, 0x0b, 0x09]);
    /// ```
    pub struct Header {
        schema: HeaderSchema,
        fields: HeaderField,
        name: "header",
        descriptor: ("amqp:header:list", 0x70),
    }
    0 Durable "durable" => durable, set_durable: bool;
    1 Priority "priority" => priority, set_priority: u8;
    /// When the message was handed to the transport.
    2 TransmitTime "transmit-time" => transmit_time, set_transmit_time: Timestamp;
    /// Time to live in milliseconds.
    3 Ttl "ttl" => ttl, set_ttl: u64;
    4 FormerAcquirers "former-acquirers" => former_acquirers, set_former_acquirers: u32;
    5 DeliveryFailures "delivery-failures" => delivery_failures, set_delivery_failures: u32;
    6 FormatCode "format-code" => message_format, set_message_format: u32;
    7 MessageAttrs "message-attrs" => message_attrs, set_message_attrs: Map;
    8 DeliveryAttrs "delivery-attrs" => delivery_attrs, set_delivery_attrs: Map;
}

#[cfg(test)]
mod tests {
    use super::*;
    use amqp_codec::{Decode, Encode};

    #[test]
    fn transmit_time_roundtrip() {
        let mut header = Header::new();
        header.set_transmit_time(Timestamp::from_millis(1_700_000_000_000));
        header.set_ttl(60_000u64);
        let decoded = Header::decode_from(&header.to_bytes().unwrap(), 0).unwrap();
        assert_eq!(
            decoded.transmit_time().unwrap(),
            Some(Timestamp(1_700_000_000_000))
        );
        assert_eq!(decoded.ttl().unwrap(), Some(60_000));
        assert_eq!(decoded.durable().unwrap(), None);
    }

    #[test]
    fn field_names_follow_positions() {
        assert_eq!(HeaderField::FormatCode.name(), "format-code");
        assert_eq!(HeaderField::from_name("ttl"), Some(HeaderField::Ttl));
        assert_eq!(HeaderField::from_position(9), None);
    }
}
