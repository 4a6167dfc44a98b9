use super::Value;
use std::collections::BTreeMap;

impl Value {
    /// flatten indexes every primitive leaf of this tree by a dotted path.
    ///
    /// Primitives flatten to the empty map. Array elements contribute `[i]`
    /// segments with no joiner, and object entries join the accumulated
    /// prefix with `.` unless they follow an array segment. Object names
    /// never appear in paths. Typical keys: `first_head.eyes`, `[2]eyes`,
    /// `k[0]first`.
    pub fn flatten(&self) -> BTreeMap<String, &Value> {
        let mut out = BTreeMap::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into<'v>(&'v self, prefix: &str, out: &mut BTreeMap<String, &'v Value>) {
        match self {
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    let path = format!("{prefix}[{i}]");
                    if child.is_primitive() {
                        out.insert(path, child);
                    } else {
                        child.flatten_into(&path, out);
                    }
                }
            }
            Value::Object(obj) => {
                let joiner = if prefix.is_empty() || prefix.ends_with(']') {
                    ""
                } else {
                    "."
                };
                for field in obj.iter() {
                    let path = format!("{prefix}{joiner}{}", field.key);
                    if field.value.is_primitive() {
                        out.insert(path, &field.value);
                    } else {
                        field.value.flatten_into(&path, out);
                    }
                }
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::{Object, Value};

    #[test]
    fn test_primitives_flatten_to_nothing() {
        assert!(Value::Null.flatten().is_empty());
        assert!(Value::Bool(true).flatten().is_empty());
        assert!(Value::Signed(42).flatten().is_empty());
        assert!(Value::Double(1.0).flatten().is_empty());
        assert!(Value::String("some_value".to_string()).flatten().is_empty());
    }

    #[test]
    fn test_array_indexes() {
        let value = Value::Array(vec![
            Value::Bool(false),
            Value::Signed(1),
            Value::String("x".to_string()),
        ]);
        let flat = value.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.get("[0]"), Some(&&Value::Bool(false)));
        assert_eq!(flat.get("[1]"), Some(&&Value::Signed(1)));
        assert_eq!(flat.get("[2]"), Some(&&Value::String("x".to_string())));
    }

    #[test]
    fn test_object_keys_skip_the_name() {
        let head = Object::new("head").with("eyes", Value::Unsigned(2));
        let creature = Value::Object(
            Object::new("creature")
                .with("first_head", head.into())
                .with("tails", Value::Unsigned(0)),
        );
        let flat = creature.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("first_head.eyes"), Some(&&Value::Unsigned(2)));
        assert_eq!(flat.get("tails"), Some(&&Value::Unsigned(0)));
    }

    #[test]
    fn test_objects_under_arrays_join_without_a_dot() {
        let heads: Vec<Value> = [1u64, 3, 4]
            .iter()
            .map(|eyes| Object::new("head").with("eyes", Value::Unsigned(*eyes)).into())
            .collect();
        let flat_owner = Value::Array(heads);
        let flat = flat_owner.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.get("[2]eyes"), Some(&&Value::Unsigned(4)));
        assert_eq!(flat.get("[2]eyes").map(|v| v.stringify()).as_deref(), Some("4"));
    }

    #[test]
    fn test_arrays_under_object_keys() {
        let pair = |a: u64, b: bool| -> Value {
            Object::new("std::pair")
                .with("first", Value::Unsigned(a))
                .with("second", Value::Bool(b))
                .into()
        };
        let value = Value::Object(
            Object::new("").with("k", Value::Array(vec![pair(1, true), pair(2, false)])),
        );
        let flat = value.flatten();
        assert_eq!(flat.len(), 4);
        assert!(flat.contains_key("k[0]first"));
        assert!(flat.contains_key("k[0]second"));
        assert!(flat.contains_key("k[1]first"));
        assert!(flat.contains_key("k[1]second"));
    }

    #[test]
    fn test_empty_aggregates_contribute_nothing() {
        let value = Value::Array(vec![
            Value::Array(Vec::new()),
            Value::Object(Object::new("o")),
        ]);
        assert!(value.flatten().is_empty());
    }
}
