use super::{Object, Tag, Value};
use std::collections::BTreeSet;

/// MatchType classifies the outcome of a comparison.
#[derive(Debug, Copy, Clone, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Perfect,
    None,
}

/// Diff is the structured result of comparing a source Value against a
/// destination Value: a match class, a score in [0, 1], the stringified
/// sides, and a set of localized difference descriptions.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Diff {
    pub src_tag: Tag,
    /// Unknown when the destination tag agrees with the source; otherwise
    /// the destination's actual tag, numeric-family mismatches included.
    pub dst_tag: Tag,
    pub src_value: String,
    /// Empty exactly when the match is perfect.
    pub dst_value: String,
    #[serde(rename = "match")]
    pub match_type: MatchType,
    pub score: f64,
    pub desc: BTreeSet<String>,
}

/// Compare `src` against `dst`.
///
/// Tags must agree up to the numeric family; mismatched numerics compare
/// through the numeric branch and keep their distinct tags in the Diff.
/// Aggregates compare structurally: arrays pairwise by index, objects over
/// the union of their keys with names ignored. A comparison is perfect only
/// when the score is 1.0 and no description was produced.
pub fn compare(src: &Value, dst: &Value) -> Diff {
    let outcome = compare_inner(src, dst);
    let (src_tag, dst_tag) = (src.tag(), dst.tag());
    Diff {
        src_tag,
        dst_tag: if dst_tag == src_tag { Tag::Unknown } else { dst_tag },
        src_value: src.stringify(),
        dst_value: if outcome.perfect {
            String::new()
        } else {
            dst.stringify()
        },
        match_type: if outcome.perfect {
            MatchType::Perfect
        } else {
            MatchType::None
        },
        score: outcome.score,
        desc: outcome.notes.iter().map(Note::render).collect(),
    }
}

struct Outcome {
    score: f64,
    perfect: bool,
    notes: Vec<Note>,
}

impl Outcome {
    fn perfect() -> Outcome {
        Outcome {
            score: 1.0,
            perfect: true,
            notes: Vec::new(),
        }
    }

    fn mismatch(score: f64, notes: Vec<Note>) -> Outcome {
        Outcome {
            score,
            perfect: false,
            notes,
        }
    }

    fn equality(eq: bool) -> Outcome {
        if eq {
            Outcome::perfect()
        } else {
            Outcome::mismatch(0.0, Vec::new())
        }
    }
}

/// A path segment of a localized description.
enum Seg {
    Key(String),
    Index(usize),
}

/// A difference message plus the path of the node it describes.
struct Note {
    path: Vec<Seg>,
    text: String,
}

impl Note {
    fn root(text: impl Into<String>) -> Note {
        Note {
            path: Vec::new(),
            text: text.into(),
        }
    }

    fn nest(mut self, seg: Seg) -> Note {
        self.path.insert(0, seg);
        self
    }

    /// Paths render exactly as flatten keys do. The separator before the
    /// message is ": " after a named key and ":" after an index; a root
    /// note is the bare message.
    fn render(&self) -> String {
        let mut out = String::new();
        for seg in &self.path {
            match seg {
                Seg::Key(key) => {
                    if !out.is_empty() && !out.ends_with(']') {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                Seg::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        match self.path.last() {
            None => self.text.clone(),
            Some(Seg::Key(_)) => format!("{out}: {}", self.text),
            Some(Seg::Index(_)) => format!("{out}:{}", self.text),
        }
    }
}

fn compare_inner(src: &Value, dst: &Value) -> Outcome {
    if let (Some(a), Some(b)) = (src.as_f64(), dst.as_f64()) {
        return compare_numbers(src, dst, a, b);
    }
    match (src, dst) {
        (Value::Null, Value::Null) => Outcome::perfect(),
        (Value::Bool(a), Value::Bool(b)) => Outcome::equality(a == b),
        (Value::String(a), Value::String(b)) => Outcome::equality(a == b),
        (Value::Array(a), Value::Array(b)) => compare_arrays(a, b),
        (Value::Object(a), Value::Object(b)) => compare_objects(a, b),
        _ => Outcome::mismatch(0.0, vec![Note::root("result types are different")]),
    }
}

fn compare_numbers(src: &Value, dst: &Value, a: f64, b: f64) -> Outcome {
    if src.stringify() == dst.stringify() {
        return Outcome::perfect();
    }
    let diff = a - b;
    let ratio = if b == 0.0 { 0.0 } else { (diff / b).abs() };
    let direction = if diff > 0.0 { "larger" } else { "smaller" };

    // Differences within 20% of the destination read as a percentage and
    // score proportionally; anything else reads as an absolute delta and
    // scores zero.
    let within = ratio.is_finite() && ratio > 0.0 && ratio <= 0.2;
    let text = if within {
        format!("value is {direction} by {:.6} percent", ratio * 100.0)
    } else {
        format!("value is {direction} by {:.6}", diff.abs())
    };
    let score = if within && ratio < 0.2 { 1.0 - ratio } else { 0.0 };
    Outcome::mismatch(score, vec![Note::root(text)])
}

fn compare_arrays(src: &[Value], dst: &[Value]) -> Outcome {
    if src.len() != dst.len() {
        let delta = src.len().abs_diff(dst.len());
        let text = if src.len() < dst.len() {
            format!("array size shrunk by {delta} elements")
        } else {
            format!("array size grown by {delta} elements")
        };
        return Outcome::mismatch(0.0, vec![Note::root(text)]);
    }
    if src.is_empty() {
        return Outcome::perfect();
    }

    let mut perfect_count = 0usize;
    let mut notes = Vec::new();
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let child = compare_inner(s, d);
        if child.perfect {
            perfect_count += 1;
        }
        notes.extend(child.notes.into_iter().map(|n| n.nest(Seg::Index(i))));
    }
    Outcome {
        score: perfect_count as f64 / src.len() as f64,
        perfect: perfect_count == src.len(),
        notes,
    }
}

fn compare_objects(src: &Object, dst: &Object) -> Outcome {
    let max_len = src.len().max(dst.len());
    if max_len == 0 {
        return Outcome::perfect();
    }

    let mut score_sum = 0.0;
    let mut all_perfect = true;
    let mut notes = Vec::new();
    for field in src.iter() {
        match dst.get(&field.key) {
            Some(other) => {
                let child = compare_inner(&field.value, other);
                score_sum += child.score;
                all_perfect &= child.perfect;
                notes.extend(
                    child
                        .notes
                        .into_iter()
                        .map(|n| n.nest(Seg::Key(field.key.clone()))),
                );
            }
            None => {
                all_perfect = false;
                notes.push(Note::root("unexpected").nest(Seg::Key(field.key.clone())));
            }
        }
    }
    for field in dst.iter() {
        if src.get(&field.key).is_none() {
            all_perfect = false;
            notes.push(Note::root("missing").nest(Seg::Key(field.key.clone())));
        }
    }
    Outcome {
        score: score_sum / max_len as f64,
        perfect: all_perfect,
        notes,
    }
}
