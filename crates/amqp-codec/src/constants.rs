//! AMQP 1.0 format codes.
//!
//! The high nibble of a format code selects its category (see
//! [`crate::format`]); the low nibble selects the variant within it.

/// Marks a described type: a descriptor value followed by the described value.
pub const DESCRIBED: u8 = 0x00;

// Fixed width, no payload
pub const NULL: u8 = 0x40;
pub const TRUE: u8 = 0x41;
pub const FALSE: u8 = 0x42;
pub const UINT0: u8 = 0x43;
pub const ULONG0: u8 = 0x44;
pub const LIST0: u8 = 0x45;

// Fixed width, 1 byte
pub const UBYTE: u8 = 0x50;
pub const BYTE: u8 = 0x51;
pub const SMALLUINT: u8 = 0x52;
pub const SMALLULONG: u8 = 0x53;
pub const SMALLINT: u8 = 0x54;
pub const SMALLLONG: u8 = 0x55;
pub const BOOLEAN: u8 = 0x56;

// Fixed width, 2 bytes
pub const USHORT: u8 = 0x60;
pub const SHORT: u8 = 0x61;

// Fixed width, 4 bytes
pub const UINT: u8 = 0x70;
pub const INT: u8 = 0x71;
pub const FLOAT: u8 = 0x72;
pub const CHAR: u8 = 0x73;

// Fixed width, 8 bytes
pub const ULONG: u8 = 0x80;
pub const LONG: u8 = 0x81;
pub const DOUBLE: u8 = 0x82;
pub const TIMESTAMP: u8 = 0x83;

// Fixed width, 16 bytes
pub const UUID: u8 = 0x98;

// Variable width, 1 byte length
pub const VBIN8: u8 = 0xa0;
pub const STR8: u8 = 0xa1;
pub const SYM8: u8 = 0xa3;

// Variable width, 4 byte length
pub const VBIN32: u8 = 0xb0;
pub const STR32: u8 = 0xb1;
pub const SYM32: u8 = 0xb3;

// Compound, 1 byte size and count
pub const LIST8: u8 = 0xc0;
pub const MAP8: u8 = 0xc1;

// Compound, 4 byte size and count
pub const LIST32: u8 = 0xd0;
pub const MAP32: u8 = 0xd1;

// Array, 1 byte size and count
pub const ARRAY8: u8 = 0xe0;

// Array, 4 byte size and count
pub const ARRAY32: u8 = 0xf0;

/// Largest payload (in bytes) an 8-bit length or size prefix can describe.
pub const MAX_NARROW: usize = u8::MAX as usize;

/// Largest payload (in bytes) a 32-bit length or size prefix can describe.
pub const MAX_WIDE: usize = u32::MAX as usize;
