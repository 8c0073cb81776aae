//! Format-code registry.
//!
//! Classifies a format byte into the shape of the bytes that follow it
//! ([`Category`]) and, when the code is assigned, into the specific encoding
//! variant ([`Encoding`]). Classification never fails: codes outside every
//! known range map to [`Category::Unknown`]. Whether a code is acceptable for a
//! particular field is decided by the caller.

use crate::constants::*;

/// Width of a length, size or count prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixWidth {
    /// 8-bit prefix.
    One,
    /// 32-bit prefix.
    Four,
}

impl PrefixWidth {
    /// Number of bytes a single prefix field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            PrefixWidth::One => 1,
            PrefixWidth::Four => 4,
        }
    }
}

/// Shape of an encoded value, derived from the high nibble of its format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `0x00`: a descriptor value followed by the described value.
    Described,
    /// Fixed-width payload of the given number of bytes (0, 1, 2, 4, 8 or 16).
    Fixed(u8),
    /// Length-prefixed payload (binary, string, symbol).
    Variable(PrefixWidth),
    /// Size and count prefixed sequence of full values (list, map).
    Compound(PrefixWidth),
    /// Size and count prefixed sequence sharing one element constructor.
    Array(PrefixWidth),
    /// Not a format code of any known range.
    Unknown,
}

impl Category {
    /// Bytes between the format code and the first payload byte.
    ///
    /// Compound and array values carry two prefix fields (size, then count).
    pub const fn prefix_len(self) -> usize {
        match self {
            Category::Described | Category::Fixed(_) | Category::Unknown => 0,
            Category::Variable(w) => w.bytes(),
            Category::Compound(w) | Category::Array(w) => 2 * w.bytes(),
        }
    }
}

/// Returns the category of `code`. Total over all 256 byte values.
pub const fn category_of(code: u8) -> Category {
    match code >> 4 {
        0x0 if code == DESCRIBED => Category::Described,
        0x4 => Category::Fixed(0),
        0x5 => Category::Fixed(1),
        0x6 => Category::Fixed(2),
        0x7 => Category::Fixed(4),
        0x8 => Category::Fixed(8),
        0x9 => Category::Fixed(16),
        0xa => Category::Variable(PrefixWidth::One),
        0xb => Category::Variable(PrefixWidth::Four),
        0xc => Category::Compound(PrefixWidth::One),
        0xd => Category::Compound(PrefixWidth::Four),
        0xe => Category::Array(PrefixWidth::One),
        0xf => Category::Array(PrefixWidth::Four),
        _ => Category::Unknown,
    }
}

/// Returns `true` if `code` introduces a described type.
pub const fn is_described_type(code: u8) -> bool {
    code == DESCRIBED
}

/// An assigned AMQP 1.0 encoding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Described,
    Null,
    True,
    False,
    Uint0,
    Ulong0,
    List0,
    Ubyte,
    Byte,
    SmallUint,
    SmallUlong,
    SmallInt,
    SmallLong,
    Boolean,
    Ushort,
    Short,
    Uint,
    Int,
    Float,
    Char,
    Ulong,
    Long,
    Double,
    Timestamp,
    Uuid,
    Vbin8,
    Str8,
    Sym8,
    Vbin32,
    Str32,
    Sym32,
    List8,
    Map8,
    List32,
    Map32,
    Array8,
    Array32,
}

/// Returns the encoding variant assigned to `code`, if any.
pub const fn encoding_of(code: u8) -> Option<Encoding> {
    let encoding = match code {
        DESCRIBED => Encoding::Described,
        NULL => Encoding::Null,
        TRUE => Encoding::True,
        FALSE => Encoding::False,
        UINT0 => Encoding::Uint0,
        ULONG0 => Encoding::Ulong0,
        LIST0 => Encoding::List0,
        UBYTE => Encoding::Ubyte,
        BYTE => Encoding::Byte,
        SMALLUINT => Encoding::SmallUint,
        SMALLULONG => Encoding::SmallUlong,
        SMALLINT => Encoding::SmallInt,
        SMALLLONG => Encoding::SmallLong,
        BOOLEAN => Encoding::Boolean,
        USHORT => Encoding::Ushort,
        SHORT => Encoding::Short,
        UINT => Encoding::Uint,
        INT => Encoding::Int,
        FLOAT => Encoding::Float,
        CHAR => Encoding::Char,
        ULONG => Encoding::Ulong,
        LONG => Encoding::Long,
        DOUBLE => Encoding::Double,
        TIMESTAMP => Encoding::Timestamp,
        UUID => Encoding::Uuid,
        VBIN8 => Encoding::Vbin8,
        STR8 => Encoding::Str8,
        SYM8 => Encoding::Sym8,
        VBIN32 => Encoding::Vbin32,
        STR32 => Encoding::Str32,
        SYM32 => Encoding::Sym32,
        LIST8 => Encoding::List8,
        MAP8 => Encoding::Map8,
        LIST32 => Encoding::List32,
        MAP32 => Encoding::Map32,
        ARRAY8 => Encoding::Array8,
        ARRAY32 => Encoding::Array32,
        _ => return None,
    };
    Some(encoding)
}

impl Encoding {
    /// The format code of this variant.
    pub const fn code(self) -> u8 {
        match self {
            Encoding::Described => DESCRIBED,
            Encoding::Null => NULL,
            Encoding::True => TRUE,
            Encoding::False => FALSE,
            Encoding::Uint0 => UINT0,
            Encoding::Ulong0 => ULONG0,
            Encoding::List0 => LIST0,
            Encoding::Ubyte => UBYTE,
            Encoding::Byte => BYTE,
            Encoding::SmallUint => SMALLUINT,
            Encoding::SmallUlong => SMALLULONG,
            Encoding::SmallInt => SMALLINT,
            Encoding::SmallLong => SMALLLONG,
            Encoding::Boolean => BOOLEAN,
            Encoding::Ushort => USHORT,
            Encoding::Short => SHORT,
            Encoding::Uint => UINT,
            Encoding::Int => INT,
            Encoding::Float => FLOAT,
            Encoding::Char => CHAR,
            Encoding::Ulong => ULONG,
            Encoding::Long => LONG,
            Encoding::Double => DOUBLE,
            Encoding::Timestamp => TIMESTAMP,
            Encoding::Uuid => UUID,
            Encoding::Vbin8 => VBIN8,
            Encoding::Str8 => STR8,
            Encoding::Sym8 => SYM8,
            Encoding::Vbin32 => VBIN32,
            Encoding::Str32 => STR32,
            Encoding::Sym32 => SYM32,
            Encoding::List8 => LIST8,
            Encoding::Map8 => MAP8,
            Encoding::List32 => LIST32,
            Encoding::Map32 => MAP32,
            Encoding::Array8 => ARRAY8,
            Encoding::Array32 => ARRAY32,
        }
    }

    /// The category this variant belongs to.
    pub const fn category(self) -> Category {
        category_of(self.code())
    }

    /// Protocol name of the logical type this variant encodes.
    pub const fn type_name(self) -> &'static str {
        match self {
            Encoding::Described => "described",
            Encoding::Null => "null",
            Encoding::True | Encoding::False | Encoding::Boolean => "boolean",
            Encoding::Uint0 | Encoding::SmallUint | Encoding::Uint => "uint",
            Encoding::Ulong0 | Encoding::SmallUlong | Encoding::Ulong => "ulong",
            Encoding::Ubyte => "ubyte",
            Encoding::Byte => "byte",
            Encoding::SmallInt | Encoding::Int => "int",
            Encoding::SmallLong | Encoding::Long => "long",
            Encoding::Ushort => "ushort",
            Encoding::Short => "short",
            Encoding::Float => "float",
            Encoding::Char => "char",
            Encoding::Double => "double",
            Encoding::Timestamp => "timestamp",
            Encoding::Uuid => "uuid",
            Encoding::Vbin8 | Encoding::Vbin32 => "binary",
            Encoding::Str8 | Encoding::Str32 => "string",
            Encoding::Sym8 | Encoding::Sym32 => "symbol",
            Encoding::List0 | Encoding::List8 | Encoding::List32 => "list",
            Encoding::Map8 | Encoding::Map32 => "map",
            Encoding::Array8 | Encoding::Array32 => "array",
        }
    }
}
