//! Blankness and boolean coercion.
//!
//! Two independent predicates over [`OptionValue`]. They look alike but answer
//! different questions and deliberately disagree on `false`, `0` and `"0"`:
//!
//! | Value        | `is_blank` | `boolean_coerce` |
//! |--------------|------------|------------------|
//! | `Nil`        | true       | false            |
//! | `""`, `"  "` | true       | false            |
//! | `false`      | false      | false            |
//! | `0`, `"0"`   | false      | false            |
//! | `"false"`    | false      | false            |
//! | `1`, `"pie"` | false      | true             |
//!
//! [`is_blank`] decides whether an option takes part in a search run.
//! [`boolean_coerce`] backs the generated `is(option)` boolean query.
//! Keep them separate.

use crate::value::OptionValue;

/// True iff the value is `Nil` or a string that is empty or whitespace-only.
pub fn is_blank(value: &OptionValue) -> bool {
    match value {
        OptionValue::Nil => true,
        OptionValue::Str(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce an arbitrary option value to a boolean.
///
/// False for `Nil`, `false`, numeric zero, and strings that are blank, `"0"`,
/// or `"false"` in any case (surrounding whitespace ignored). True otherwise.
pub fn boolean_coerce(value: &OptionValue) -> bool {
    match value {
        OptionValue::Nil => false,
        OptionValue::Bool(b) => *b,
        OptionValue::Int(n) => *n != 0,
        OptionValue::Float(n) => *n != 0.0,
        OptionValue::Str(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        OptionValue::List(_) | OptionValue::Map(_) => true,
    }
}
