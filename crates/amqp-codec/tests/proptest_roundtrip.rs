use amqp_codec::{AmqpValue, Bytes, Decode, Described, Encode, List, Map, StreamingDecoder, Symbol, Timestamp, Uuid};
use proptest::prelude::*;

fn symbol() -> impl Strategy<Value = Symbol> {
    "[a-z:.-]{0,300}".prop_map(|s| Symbol::new(s).expect("ascii symbol"))
}

fn primitive() -> impl Strategy<Value = AmqpValue> {
    prop_oneof![
        Just(AmqpValue::Null),
        any::<bool>().prop_map(AmqpValue::Boolean),
        any::<u8>().prop_map(AmqpValue::Ubyte),
        any::<u16>().prop_map(AmqpValue::Ushort),
        any::<u32>().prop_map(AmqpValue::Uint),
        any::<u64>().prop_map(AmqpValue::Ulong),
        any::<i8>().prop_map(AmqpValue::Byte),
        any::<i16>().prop_map(AmqpValue::Short),
        any::<i32>().prop_map(AmqpValue::Int),
        any::<i64>().prop_map(AmqpValue::Long),
        any::<f64>().prop_map(AmqpValue::Double),
        any::<char>().prop_map(AmqpValue::Char),
        any::<i64>().prop_map(|ms| AmqpValue::Timestamp(Timestamp(ms))),
        any::<[u8; 16]>().prop_map(|b| AmqpValue::Uuid(Uuid(b))),
        proptest::collection::vec(any::<u8>(), 0..300)
            .prop_map(|b| AmqpValue::Binary(Bytes::from(b))),
        ".{0,80}".prop_map(AmqpValue::String),
        symbol().prop_map(AmqpValue::Symbol),
    ]
}

fn value() -> impl Strategy<Value = AmqpValue> {
    primitive().prop_recursive(3, 48, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8)
                .prop_map(|values| AmqpValue::List(values.into())),
            proptest::collection::vec((any::<u32>(), inner.clone()), 0..6)
                .prop_map(|entries| AmqpValue::Map(entries.into_iter().collect::<Map>())),
            proptest::collection::vec(any::<u32>(), 0..8)
                .prop_map(|values| AmqpValue::Array(values.into_iter().map(AmqpValue::Uint).collect())),
            (any::<u64>(), inner).prop_map(|(code, value)| Described::new(code, value).into()),
        ]
    })
}

proptest! {
    #[test]
    fn values_roundtrip(value in value()) {
        let bytes = value.to_bytes().unwrap();
        prop_assert_eq!(bytes.len() as u32, value.encoded_size().unwrap());
        let decoded = AmqpValue::decode_from(&bytes, 0).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn strings_use_the_narrowest_prefix(len in 0usize..600) {
        let bytes = AmqpValue::String("x".repeat(len)).to_bytes().unwrap();
        prop_assert_eq!(bytes[0], if len <= 255 { 0xa1 } else { 0xb1 });
    }

    #[test]
    fn lists_use_the_narrowest_prefix(lens in proptest::collection::vec(0usize..120, 0..6)) {
        let list: List = lens.iter().map(|len| AmqpValue::Binary(Bytes::from(vec![0; *len]))).collect();
        let body: usize = lens.iter().map(|len| 2 + len).sum();
        let bytes = list.to_bytes().unwrap();
        let expected = match (lens.len(), body < 255) {
            (0, _) => 0x45,
            (_, true) => 0xc0,
            (_, false) => 0xd0,
        };
        prop_assert_eq!(bytes[0], expected);
    }

    #[test]
    fn stream_chunking_is_transparent(values in proptest::collection::vec(value(), 1..6), chunk in 1usize..16) {
        let mut input = Vec::new();
        for value in &values {
            input.extend_from_slice(&value.to_bytes().unwrap());
        }
        let mut decoder = StreamingDecoder::new();
        let mut decoded = Vec::new();
        for piece in input.chunks(chunk) {
            decoder.push(piece);
            while let Some(encoded) = decoder.next().unwrap() {
                decoded.push(AmqpValue::decode(&encoded).unwrap());
            }
        }
        prop_assert_eq!(decoded, values);
        prop_assert_eq!(decoder.buffered(), 0);
    }
}
