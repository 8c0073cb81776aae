//! Writer/Reader roundtrip matrix for the buffers crate.

use amqp_buffers::{BufferError, Reader, Writer};

// ---------------------------------------------------------------------------
// Writer/Reader roundtrip matrix
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_u8_i8() {
    let mut w = Writer::new();
    w.u8(0x00);
    w.u8(0xFF);
    w.i8(i8::MIN);
    w.i8(-1);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u8().unwrap(), 0x00);
    assert_eq!(r.u8().unwrap(), 0xFF);
    assert_eq!(r.i8().unwrap(), i8::MIN);
    assert_eq!(r.i8().unwrap(), -1);
    assert!(r.is_empty());
}

#[test]
fn roundtrip_16_bit() {
    let mut w = Writer::new();
    w.u16(u16::MAX);
    w.i16(i16::MIN);
    w.i16(1000);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u16().unwrap(), u16::MAX);
    assert_eq!(r.i16().unwrap(), i16::MIN);
    assert_eq!(r.i16().unwrap(), 1000);
}

#[test]
fn roundtrip_32_bit() {
    let mut w = Writer::new();
    w.u32(0x0102_0304);
    w.i32(i32::MIN);
    w.f32(1.5);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u32().unwrap(), 0x0102_0304);
    assert_eq!(r.i32().unwrap(), i32::MIN);
    assert_eq!(r.f32().unwrap(), 1.5);
}

#[test]
fn roundtrip_64_bit() {
    let mut w = Writer::new();
    w.u64(u64::MAX);
    w.i64(-1_234_567_890_123);
    w.f64(-0.25);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u64().unwrap(), u64::MAX);
    assert_eq!(r.i64().unwrap(), -1_234_567_890_123);
    assert_eq!(r.f64().unwrap(), -0.25);
}

#[test]
fn roundtrip_prefixed_helpers() {
    let mut w = Writer::new();
    w.u8u8(0x52, 7);
    w.u8u32(0x70, 70_000);
    w.u8u64(0x80, 1 << 40);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u8().unwrap(), 0x52);
    assert_eq!(r.u8().unwrap(), 7);
    assert_eq!(r.u8().unwrap(), 0x70);
    assert_eq!(r.u32().unwrap(), 70_000);
    assert_eq!(r.u8().unwrap(), 0x80);
    assert_eq!(r.u64().unwrap(), 1 << 40);
}

#[test]
fn roundtrip_strings_and_raw_bytes() {
    let mut w = Writer::new();
    w.utf8("h\u{e9}llo");
    w.buf(&[1, 2, 3]);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.utf8(6).unwrap(), "h\u{e9}llo");
    assert_eq!(r.buf(3).unwrap(), &[1, 2, 3]);
}

#[test]
fn uuid_bytes_roundtrip() {
    let id: [u8; 16] = core::array::from_fn(|i| i as u8);
    let mut w = Writer::new();
    w.buf(&id);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.bytes16().unwrap(), id);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn window_end_is_clamped_to_slice() {
    let data = [1u8, 2, 3];
    let r = Reader::from_slice(&data, 1, 100);
    assert_eq!(r.size(), 2);
}

#[test]
fn reads_past_window_report_needed_and_available() {
    let data = [0u8; 10];
    let mut r = Reader::from_slice(&data, 8, 10);
    assert_eq!(
        r.u64(),
        Err(BufferError::EndOfBuffer {
            needed: 8,
            available: 2
        })
    );
    assert_eq!(
        r.buf(3).unwrap_err().to_string(),
        "end of buffer: needed 3 bytes, 2 available"
    );
}
