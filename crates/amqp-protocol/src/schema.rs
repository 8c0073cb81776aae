//! Declarative schema tables for described structures.
//!
//! `described_list!` turns a table of `(position, field enum variant,
//! protocol name, accessors, type)` rows into a [`ListSchema`] marker type,
//! a field enum mapping names to positions, a type alias over
//! [`DescribedList`] and typed accessors. `described_map!` does the same for
//! symbol-keyed maps.
//!
//! [`ListSchema`]: crate::structure::ListSchema
//! [`DescribedList`]: crate::structure::DescribedList

macro_rules! described_list {
    (@mandatory) => {
        false
    };
    (@mandatory mandatory) => {
        true
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            schema: $schema:ident,
            fields: $field:ident,
            name: $label:literal,
            descriptor: ($symbol:literal, $code:literal),
        }
        $(
            $(#[$fmeta:meta])*
            $pos:literal $variant:ident $fname:literal => $getter:ident, $setter:ident: $ty:ty $(, $mandatory:ident)?;
        )+
    ) => {
        #[doc = concat!("Schema of [`", stringify!($name), "`] (`", $symbol, "`).")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $schema;

        impl $crate::structure::ListSchema for $schema {
            const NAME: &'static str = $label;
            const SYMBOL: &'static str = $symbol;
            const CODE: u64 = $code;
            const FIELDS: &'static [$crate::structure::FieldSpec] = &[
                $(
                    $crate::structure::FieldSpec {
                        name: $fname,
                        mandatory: described_list!(@mandatory $($mandatory)?),
                    },
                )+
            ];
        }

        #[doc = concat!("Fields of [`", stringify!($name), "`] by position.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $field {
            $($variant,)+
        }

        impl $field {
            pub const ALL: &'static [$field] = &[$($field::$variant,)+];

            pub const fn position(self) -> usize {
                match self {
                    $($field::$variant => $pos,)+
                }
            }

            /// Protocol name of the field.
            pub const fn name(self) -> &'static str {
                match self {
                    $($field::$variant => $fname,)+
                }
            }

            pub fn from_position(position: usize) -> Option<Self> {
                match position {
                    $($pos => Some($field::$variant),)+
                    _ => None,
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|field| field.name() == name)
            }
        }

        $(#[$meta])*
        pub type $name = $crate::structure::DescribedList<$schema>;

        impl $crate::structure::DescribedList<$schema> {
            $(
                $(#[$fmeta])*
                pub fn $getter(&self) -> amqp_codec::Result<Option<$ty>> {
                    self.field($pos)
                }

                pub fn $setter(&mut self, value: impl Into<Option<$ty>>) {
                    self.set_field($pos, value.into());
                }
            )+
        }
    };
}

macro_rules! described_map {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            schema: $schema:ident,
            name: $label:literal,
            descriptor: ($symbol:literal, $code:literal),
        }
        $(
            $(#[$fmeta:meta])*
            $key:literal => $getter:ident, $setter:ident: $ty:ty;
        )+
    ) => {
        #[doc = concat!("Schema of [`", stringify!($name), "`] (`", $symbol, "`).")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $schema;

        impl $crate::structure::MapSchema for $schema {
            const NAME: &'static str = $label;
            const SYMBOL: &'static str = $symbol;
            const CODE: u64 = $code;
            const KEYS: &'static [&'static str] = &[$($key,)+];
        }

        $(#[$meta])*
        pub type $name = $crate::structure::DescribedMap<$schema>;

        impl $crate::structure::DescribedMap<$schema> {
            $(
                $(#[$fmeta])*
                pub fn $getter(&self) -> amqp_codec::Result<Option<$ty>> {
                    self.field($key)
                }

                pub fn $setter(&mut self, value: impl Into<Option<$ty>>) {
                    self.set_field($key, value.into());
                }
            )+
        }
    };
}

pub(crate) use {described_list, described_map};
