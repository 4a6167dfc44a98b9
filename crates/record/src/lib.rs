// Value is the uniform, self-describing representation of a captured result.
// Client code lowers arbitrary values of the software under test into Value
// trees, which are then stringified, flattened into leaf indexes, encoded to
// the wire, and structurally compared against prior captures.
mod value;
pub use value::{Field, Object, Tag, Value};

// ToValue is the lowering seam: user-defined aggregates become Object/Array
// nodes, so the Value enum itself stays closed.
mod lower;
pub use lower::ToValue;

// We provide serde::Serialize over Value, which also backs stringify().
mod ser;

// flatten() reduces a Value tree to a dotted-path index of primitive leaves.
mod flatten;

// Comparison of two Values, producing a scored, localized Diff.
mod compare;
pub use compare::{compare, Diff, MatchType};
