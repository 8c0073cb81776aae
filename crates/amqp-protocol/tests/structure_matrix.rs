use amqp_codec::{AmqpError, AmqpValue, Bytes, Decode, Described, Encode, Symbol};
use amqp_protocol::{
    condition, Close, Detach, End, ErrorInfo, Header, HeaderField, Open, OpenField, Released,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Header: two of nine fields set
// ---------------------------------------------------------------------------

#[test]
fn header_with_two_fields_set() {
    let mut header = Header::new();
    header.set_durable(true);
    header.set_delivery_failures(2u32);

    let bytes = header.to_bytes().unwrap();
    assert_eq!(bytes[0], 0x00, "described format code");
    assert_eq!(&bytes[1..3], &[0x53, 0x70], "numeric descriptor");
    assert_eq!(bytes[3], 0xc0, "list8");
    assert_eq!(bytes[5], 9, "count covers every field");

    let decoded = Header::decode_from(&bytes, 0).unwrap();
    for field in HeaderField::ALL {
        let value = decoded.get(field.position()).unwrap();
        match field {
            HeaderField::Durable => assert_eq!(value, &AmqpValue::Boolean(true)),
            HeaderField::DeliveryFailures => assert_eq!(value, &AmqpValue::Uint(2)),
            _ => assert!(value.is_null(), "{} should be absent", field.name()),
        }
    }
    assert_eq!(decoded.durable().unwrap(), Some(true));
    assert_eq!(decoded.delivery_failures().unwrap(), Some(2));
    assert_eq!(decoded.priority().unwrap(), None);
    assert_eq!(decoded, header);
}

#[test]
fn lazy_field_access_decodes_one_slot() {
    let mut open = Open::new();
    open.set_container_id("c".to_owned());
    open.set_hostname("h".to_owned());
    let bytes = open.to_bytes().unwrap();

    let decoded = Open::decode_from(&bytes, 0).unwrap();
    let described = Described::decode_from(&bytes, 0).unwrap();
    let AmqpValue::List(fields) = described.value() else {
        panic!("open body is a list");
    };
    assert_eq!(fields.materialized_slots(), Some(0));
    assert_eq!(fields.get(OpenField::Hostname.position()).unwrap(), Some(&AmqpValue::from("h")));
    assert_eq!(fields.materialized_slots(), Some(1));
    assert_eq!(decoded.hostname().unwrap().as_deref(), Some("h"));
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

#[test]
fn equal_bodies_with_different_descriptors_are_distinct() {
    let end = End::new().to_bytes().unwrap();
    let close = Close::new().to_bytes().unwrap();
    assert_eq!(&end[3..], &close[3..], "identical list bodies");

    assert!(End::decode_from(&end, 0).is_ok());
    assert!(matches!(
        End::decode_from(&close, 0),
        Err(AmqpError::InvalidDescriptor { .. })
    ));
    assert_ne!(
        AmqpValue::decode_from(&end, 0).unwrap(),
        AmqpValue::decode_from(&close, 0).unwrap()
    );
}

#[test]
fn plain_list_is_not_a_structure() {
    let err = Header::decode_slice(&[0xc0, 0x01, 0x00]).unwrap_err();
    assert!(matches!(err, AmqpError::UnexpectedType { code: 0xc0, .. }));
}

// ---------------------------------------------------------------------------
// Mandatory fields
// ---------------------------------------------------------------------------

#[test]
fn missing_mandatory_field_names_the_field() {
    let mut detach = Detach::new();
    detach.set_closed(true);
    let err = detach.to_bytes().unwrap_err();
    assert_eq!(err.to_string(), "missing mandatory field `handle` of detach");
    assert!(!detach.is_frozen());

    detach.set_handle(0u32);
    assert!(detach.to_bytes().is_ok());
}

// ---------------------------------------------------------------------------
// Copy-on-write
// ---------------------------------------------------------------------------

#[test]
fn snapshot_is_unchanged_by_mutating_a_copy() {
    let mut header = Header::new();
    header.set_priority(1u8);
    let snapshot = header.to_bytes().unwrap();

    let mut copy = header.copy().unwrap();
    copy.set_priority(9u8);
    copy.set_ttl(1_000u64);

    assert_eq!(header.to_bytes().unwrap(), snapshot);
    assert_eq!(header.priority().unwrap(), Some(1));
    assert_eq!(copy.priority().unwrap(), Some(9));
    assert_ne!(copy.to_bytes().unwrap(), snapshot);
}

#[test]
fn decoded_structure_copies_are_mutable() {
    let mut close = Close::new();
    close.set_error(ErrorInfo::with_condition(Symbol::from_static(
        condition::CONNECTION_FORCED,
    )));
    let bytes = close.to_bytes().unwrap();

    let decoded = Close::decode_from(&bytes, 0).unwrap();
    assert!(decoded.is_frozen());
    let mut copy = decoded.copy().unwrap();
    copy.set_error(None);
    assert_eq!(copy.error().unwrap(), None);
    assert!(decoded.error().unwrap().is_some());
}

#[test]
fn write_matches_to_bytes_without_freezing() {
    let mut header = Header::new();
    header.set_priority(3u8);
    let size = header.encoded_size().unwrap() as usize;
    let mut buf = vec![0u8; size];
    assert_eq!(header.write_at(&mut buf, 0).unwrap(), size);
    assert!(!header.is_frozen());

    header.set_ttl(5u64);
    let mut released = Released::new();
    released.set_truncate(true);
    let mut map_buf = vec![0u8; released.encoded_size().unwrap() as usize];
    released.write_at(&mut map_buf, 0).unwrap();
    assert!(!released.is_frozen());
    assert_eq!(map_buf, released.to_bytes().unwrap().as_ref());
    assert!(released.is_frozen());

    let bytes = header.to_bytes().unwrap();
    assert!(header.is_frozen());
    let mut again = vec![0u8; bytes.len()];
    header.write_at(&mut again, 0).unwrap();
    assert_eq!(again, bytes.as_ref());
}

#[test]
fn write_checks_mandatory_fields() {
    let detach = Detach::new();
    let mut buf = vec![0u8; detach.encoded_size().unwrap() as usize];
    let err = detach.write_at(&mut buf, 0).unwrap_err();
    assert!(matches!(err, AmqpError::MissingField { field: "handle", .. }));
}

#[test]
#[should_panic(expected = "header is frozen")]
fn setter_after_encode_panics() {
    let mut header = Header::new();
    header.to_bytes().unwrap();
    header.set_durable(false);
}

#[test]
#[should_panic(expected = "out of range")]
fn position_past_the_schema_panics() {
    let header = Header::new();
    let _ = header.get(Header::FIELD_COUNT);
}

#[test]
fn released_map_roundtrip() {
    let mut released = Released::new();
    released.set_deliver_elsewhere(true);
    released.set_truncate(false);
    let bytes = released.to_bytes().unwrap();
    let decoded = Released::decode_from(&bytes, 0).unwrap();
    assert_eq!(decoded.deliver_elsewhere().unwrap(), Some(true));
    assert_eq!(decoded.truncate().unwrap(), Some(false));
    assert_eq!(decoded.delivery_failed().unwrap(), None);
    assert_eq!(decoded, released);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn header_roundtrips(
        durable in proptest::option::of(any::<bool>()),
        priority in proptest::option::of(any::<u8>()),
        ttl in proptest::option::of(any::<u64>()),
        failures in proptest::option::of(any::<u32>()),
        format in proptest::option::of(any::<u32>()),
    ) {
        let mut header = Header::new();
        header.set_durable(durable);
        header.set_priority(priority);
        header.set_ttl(ttl);
        header.set_delivery_failures(failures);
        header.set_message_format(format);

        let bytes = header.to_bytes().unwrap();
        prop_assert_eq!(bytes[5], 9);
        let decoded = Header::decode_from(&bytes, 0).unwrap();
        prop_assert_eq!(decoded.durable().unwrap(), durable);
        prop_assert_eq!(decoded.priority().unwrap(), priority);
        prop_assert_eq!(decoded.ttl().unwrap(), ttl);
        prop_assert_eq!(decoded.delivery_failures().unwrap(), failures);
        prop_assert_eq!(decoded.message_format().unwrap(), format);
        prop_assert_eq!(decoded.transmit_time().unwrap(), None);
    }

    #[test]
    fn error_descriptions_roundtrip(description in ".{0,300}") {
        let mut error = ErrorInfo::with_condition(Symbol::from_static(condition::INTERNAL_ERROR));
        error.set_description(description.clone());
        let bytes: Bytes = error.to_bytes().unwrap();
        let decoded = ErrorInfo::decode_from(&bytes, 0).unwrap();
        prop_assert_eq!(decoded.description().unwrap(), Some(description));
    }
}
