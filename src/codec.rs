//! Record Codec - total conversion of caller values into the JSON wire format
//!
//! Training scripts hand this crate whatever their framework produced:
//! numpy-style scalars, paths, config objects. Rather than reject a run
//! because one value cannot be encoded, the codec degrades that value to
//! its debug-string form and keeps the record. Non-finite floats get a
//! dedicated path because `serde_json` silently collapses them to null.

use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

/// Encode any serializable value, substituting its debug-string form when
/// JSON encoding fails.
///
/// Encoding fails for values such as maps with non-string-like keys,
/// `u128` beyond the JSON number range, or custom `Serialize` impls that
/// error. The substitution makes record construction total: a bad value
/// degrades to a string, never to a lost run.
///
/// A bare non-finite float never reaches the error path (`serde_json`
/// encodes it as null without erroring), so it is caught separately and
/// kept as its display string the way [`safe_f64`] keeps it. Non-finite
/// floats nested inside an encoded structure still come out as null.
///
/// # Examples
///
/// ```
/// use bitacora::codec::safe_value;
/// use serde_json::json;
///
/// assert_eq!(safe_value(&42_u32), json!(42));
/// assert_eq!(safe_value(&"adam"), json!("adam"));
/// assert_eq!(safe_value(&vec![1, 2, 3]), json!([1, 2, 3]));
/// assert_eq!(safe_value(&f64::NAN), json!("NaN"));
/// ```
#[must_use]
pub fn safe_value<T>(value: &T) -> Value
where
    T: Serialize + fmt::Debug,
{
    match serde_json::to_value(value) {
        // serde_json writes a non-finite float as null instead of erroring
        Ok(Value::Null) => {
            let debug_form = format!("{value:?}");
            if matches!(debug_form.as_str(), "NaN" | "inf" | "-inf") {
                Value::String(debug_form)
            } else {
                Value::Null
            }
        }
        Ok(encoded) => encoded,
        Err(err) => {
            debug!(%err, "value not JSON-encodable, storing debug form");
            Value::String(format!("{value:?}"))
        }
    }
}

/// Encode an `f64`, preserving non-finite values as display strings.
///
/// `serde_json` maps NaN and the infinities to null, which silently loses
/// the information that a run diverged. Storing `"NaN"` / `"inf"` /
/// `"-inf"` keeps the record loadable and the divergence visible.
///
/// # Examples
///
/// ```
/// use bitacora::codec::safe_f64;
/// use serde_json::json;
///
/// assert_eq!(safe_f64(3.25), json!(3.25));
/// assert_eq!(safe_f64(f64::NAN), json!("NaN"));
/// assert_eq!(safe_f64(f64::NEG_INFINITY), json!("-inf"));
/// ```
#[must_use]
pub fn safe_f64(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::String(value.to_string()), Value::Number)
}
