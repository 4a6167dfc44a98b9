use std::fmt;

/// Tag names the variant of a [`Value`]. `Unknown` never appears in a live
/// tree: it is the reserved wire tag, and within a `Diff` it marks a
/// destination whose tag agrees with the source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Unknown = 0,
    Null = 1,
    Bool = 2,
    Signed = 3,
    Unsigned = 4,
    Float = 5,
    Double = 6,
    String = 7,
    Array = 8,
    Object = 9,
}

impl Tag {
    /// Signed, Unsigned, Float and Double form one numeric family for
    /// comparison purposes.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Tag::Signed | Tag::Unsigned | Tag::Float | Tag::Double)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Unknown => "unknown",
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::Signed => "signed",
            Tag::Unsigned => "unsigned",
            Tag::Float => "float",
            Tag::Double => "double",
            Tag::String => "string",
            Tag::Array => "array",
            Tag::Object => "object",
        })
    }
}

/// Value is a closed tagged tree describing any captured datum.
/// User-defined types are never new variants: they lower into Object and
/// Array nodes through [`crate::ToValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Signed(_) => Tag::Signed,
            Value::Unsigned(_) => Tag::Unsigned,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::String(_) => Tag::String,
            Value::Array(_) => Tag::Array,
            Value::Object(_) => Tag::Object,
        }
    }

    /// The numeric variants widened to f64, and None for everything else.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Signed(n) => Some(*n as f64),
            Value::Unsigned(n) => Some(*n as f64),
            Value::Float(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// True for every variant except Array and Object.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Compare this value (the source) against `dst`, producing a Diff.
    pub fn compare(&self, dst: &Value) -> crate::Diff {
        crate::compare(self, dst)
    }
}

/// Object is a named, insertion-ordered mapping of keys to child Values.
/// The name may be empty; it identifies the lowered user type on the wire
/// and is ignored by comparison and flattening.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    name: String,
    fields: Vec<Field>,
}

/// A single key/value entry of an [`Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Object {
        Object {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a field. Re-inserting an existing key overwrites its value in
    /// place, preserving the original insertion position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { key, value }),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Object {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Value {
        Value::Object(obj)
    }
}

#[cfg(test)]
mod test {
    use super::{Object, Tag, Value};

    #[test]
    fn test_tags() {
        assert_eq!(Value::Null.tag(), Tag::Null);
        assert_eq!(Value::Bool(true).tag(), Tag::Bool);
        assert_eq!(Value::Signed(-1).tag(), Tag::Signed);
        assert_eq!(Value::Unsigned(1).tag(), Tag::Unsigned);
        assert_eq!(Value::Float(1.0).tag(), Tag::Float);
        assert_eq!(Value::Double(1.0).tag(), Tag::Double);
        assert_eq!(Value::String("".to_string()).tag(), Tag::String);
        assert_eq!(Value::Array(Vec::new()).tag(), Tag::Array);
        assert_eq!(Value::Object(Object::new("")).tag(), Tag::Object);

        assert!(Tag::Signed.is_numeric());
        assert!(Tag::Unsigned.is_numeric());
        assert!(Tag::Float.is_numeric());
        assert!(Tag::Double.is_numeric());
        assert!(!Tag::Bool.is_numeric());
        assert!(!Tag::Unknown.is_numeric());
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut obj = Object::new("creature");
        obj.insert("heads", Value::Unsigned(1));
        obj.insert("tails", Value::Unsigned(0));
        obj.insert("heads", Value::Unsigned(3));

        let entries: Vec<_> = obj.iter().map(|f| (f.key.as_str(), &f.value)).collect();
        assert_eq!(
            entries,
            vec![
                ("heads", &Value::Unsigned(3)),
                ("tails", &Value::Unsigned(0)),
            ]
        );
        assert_eq!(obj.len(), 2);
        assert_eq!(obj.get("tails"), Some(&Value::Unsigned(0)));
        assert_eq!(obj.get("absent"), None);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::Signed(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::Unsigned(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Double(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }
}
