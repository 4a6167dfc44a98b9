use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use record::{MatchType, Object, Value};

/// A Value wrapper with a bounded-depth Arbitrary instance.
#[derive(Debug, Clone)]
struct ArbValue(Value);

impl Arbitrary for ArbValue {
    fn arbitrary(g: &mut Gen) -> ArbValue {
        ArbValue(arbitrary_value(g, 3))
    }
}

fn arbitrary_value(g: &mut Gen, depth: usize) -> Value {
    let variants = if depth == 0 { 7 } else { 9 };
    match u8::arbitrary(g) % variants {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(g)),
        2 => Value::Signed(i64::arbitrary(g)),
        3 => Value::Unsigned(u64::arbitrary(g)),
        4 => Value::Float(f32::arbitrary(g)),
        5 => Value::Double(f64::arbitrary(g)),
        6 => Value::String(String::arbitrary(g)),
        7 => Value::Array(
            (0..usize::arbitrary(g) % 4)
                .map(|_| arbitrary_value(g, depth - 1))
                .collect(),
        ),
        _ => {
            let mut obj = Object::new(String::arbitrary(g));
            for i in 0..usize::arbitrary(g) % 4 {
                obj.insert(format!("k{i}"), arbitrary_value(g, depth - 1));
            }
            obj.into()
        }
    }
}

#[quickcheck]
fn self_comparison_is_perfect(value: ArbValue) -> bool {
    let cmp = value.0.compare(&value.0);
    cmp.match_type == MatchType::Perfect
        && cmp.score == 1.0
        && cmp.desc.is_empty()
        && cmp.dst_value.is_empty()
}

#[quickcheck]
fn match_class_is_symmetric(a: ArbValue, b: ArbValue) -> bool {
    a.0.compare(&b.0).match_type == b.0.compare(&a.0).match_type
}

#[quickcheck]
fn stringify_is_deterministic(value: ArbValue) -> bool {
    value.0.stringify() == value.0.stringify()
}

#[quickcheck]
fn flatten_of_primitives_is_empty(value: ArbValue) -> bool {
    !value.0.is_primitive() || value.0.flatten().is_empty()
}

#[quickcheck]
fn flatten_of_a_primitive_array_has_one_key_per_element(bits: Vec<bool>) -> bool {
    let value = Value::Array(bits.iter().map(|b| Value::Bool(*b)).collect());
    let flat = value.flatten();
    flat.len() == bits.len() && (0..bits.len()).all(|i| flat.contains_key(&format!("[{i}]")))
}
