use super::{Object, Value};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

/// ToValue lowers a user type into the closed [`Value`] model.
///
/// This trait is the serializer registry of the SDK: resolution happens at
/// compile time, so capturing a type without a lowering is a build error
/// rather than a runtime one. Implementations must be pure and deterministic,
/// and must not retain references to the source beyond the call.
///
/// Aggregate lowerings use the canonical cross-SDK type names ("std::pair",
/// "std::shared_ptr"), which are part of the wire contract shared with
/// clients in other languages.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_signed {
    ($($t:ty)*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Signed(*self as i64)
            }
        }
    )*};
}
impl_signed!(i8 i16 i32 i64 isize);

macro_rules! impl_unsigned {
    ($($t:ty)*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Unsigned(*self as u64)
            }
        }
    )*};
}
impl_unsigned!(u8 u16 u32 u64 usize);

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl<A: ToValue, B: ToValue> ToValue for (A, B) {
    fn to_value(&self) -> Value {
        Object::new("std::pair")
            .with("first", self.0.to_value())
            .with("second", self.1.to_value())
            .into()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

// Maps lower as an array of pairs, in the container's own iteration order.
impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(|(k, v)| pair(k, v)).collect())
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(|(k, v)| pair(k, v)).collect())
    }
}

fn pair(first: &impl ToValue, second: &impl ToValue) -> Value {
    Object::new("std::pair")
        .with("first", first.to_value())
        .with("second", second.to_value())
        .into()
}

// A nullable handle lowers as a named object which is empty when unset.
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        let mut obj = Object::new("std::shared_ptr");
        if let Some(inner) = self {
            obj.insert("v", inner.to_value());
        }
        obj.into()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}
