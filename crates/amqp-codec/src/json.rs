//! Lossy JSON view of AMQP values, for logs and test diagnostics.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map as JsonMap, Value};

use crate::composite::{Described, Descriptor, List, Map};
use crate::value::AmqpValue;

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn error(err: impl fmt::Display) -> Value {
    let mut object = JsonMap::new();
    object.insert("error".to_owned(), Value::String(err.to_string()));
    Value::Object(object)
}

impl Descriptor {
    pub fn to_json(&self) -> Value {
        match self {
            Descriptor::Symbol(symbol) => Value::String(symbol.to_string()),
            Descriptor::Code(code) => json!(code),
        }
    }
}

impl List {
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.iter()
                .map(|value| value.map_or_else(error, AmqpValue::to_json))
                .collect(),
        )
    }
}

impl Map {
    /// Entries as `[key, value]` pairs; keys need not be strings.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.iter()
                .map(|entry| match entry {
                    Ok((key, value)) => json!([key.to_json(), value.to_json()]),
                    Err(err) => error(err),
                })
                .collect(),
        )
    }
}

impl Described {
    pub fn to_json(&self) -> Value {
        json!({
            "descriptor": self.descriptor().to_json(),
            "value": self.value().to_json(),
        })
    }
}

impl AmqpValue {
    /// Renders the value as JSON. Binaries become base64 strings, timestamps
    /// milliseconds, and non-finite floats strings.
    ///
    /// ```
    /// use amqp_codec::{AmqpValue, Symbol};
    /// use serde_json::json;
    ///
    /// let value = AmqpValue::Array(vec![
    ///     AmqpValue::Symbol(Symbol::from_static("a")),
    ///     AmqpValue::Symbol(Symbol::from_static("b")),
    /// ]);
    /// assert_eq!(value.to_json(), json!(["a", "b"]));
    /// ```
    pub fn to_json(&self) -> Value {
        match self {
            AmqpValue::Null => Value::Null,
            AmqpValue::Boolean(v) => json!(v),
            AmqpValue::Ubyte(v) => json!(v),
            AmqpValue::Ushort(v) => json!(v),
            AmqpValue::Uint(v) => json!(v),
            AmqpValue::Ulong(v) => json!(v),
            AmqpValue::Byte(v) => json!(v),
            AmqpValue::Short(v) => json!(v),
            AmqpValue::Int(v) => json!(v),
            AmqpValue::Long(v) => json!(v),
            AmqpValue::Float(v) => number(*v as f64),
            AmqpValue::Double(v) => number(*v),
            AmqpValue::Char(v) => Value::String(v.to_string()),
            AmqpValue::Timestamp(v) => json!(v.as_millis()),
            AmqpValue::Uuid(v) => Value::String(v.to_string()),
            AmqpValue::Binary(v) => Value::String(STANDARD.encode(v)),
            AmqpValue::String(v) => Value::String(v.clone()),
            AmqpValue::Symbol(v) => Value::String(v.to_string()),
            AmqpValue::List(list) => list.to_json(),
            AmqpValue::Map(map) => map.to_json(),
            AmqpValue::Array(elements) => Value::Array(elements.iter().map(AmqpValue::to_json).collect()),
            AmqpValue::Described(described) => described.to_json(),
        }
    }
}

impl fmt::Display for AmqpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl fmt::Display for Described {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
