use super::{Object, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

impl Value {
    /// Deterministic, idempotent rendering of this Value.
    ///
    /// A root-level String renders unquoted; everything else renders as
    /// compact JSON, where nested strings are quoted and escaped. Null
    /// renders as the empty object `{}`, floats are widened to f64 before
    /// rendering, and integer-valued doubles keep a trailing `.0`.
    pub fn stringify(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            // Rendering an owned tree into a String cannot fail.
            _ => serde_json::to_string(self).unwrap(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_map(Some(0))?.end(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Signed(n) => serializer.serialize_i64(*n),
            Value::Unsigned(n) => serializer.serialize_u64(*n),
            // Widen rather than serialize_f32: the wire carries the exact f32
            // bit pattern, and its rendering must be the f64 reading of it.
            Value::Float(n) => serializer.serialize_f64(*n as f64),
            Value::Double(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.name().is_empty() {
            serializer.collect_map(self.iter().map(|f| (f.key.as_str(), &f.value)))
        } else {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(self.name(), &Entries(self))?;
            map.end()
        }
    }
}

struct Entries<'a>(&'a Object);

impl<'a> Serialize for Entries<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|f| (f.key.as_str(), &f.value)))
    }
}
