//! Lenient integer conversion for loosely-typed field values.
//!
//! [`leading_int`] follows the classic `parseInt(s, 10)` contract: skip
//! leading whitespace, accept one optional sign, take the longest run of
//! ASCII digits, ignore whatever follows. No digits means no value.
//!
//! JSON numbers get the matching treatment in [`truncated_number`]: a
//! fractional part is dropped toward zero, so `2.5` and `"2.5"` agree.
//! Every conversion here saturates at the `i64` bounds instead of failing.

use serde_json::Value;

/// Parse the leading base-10 integer of `s`.
///
/// Digit runs too long for `i64` saturate at `i64::MAX` / `i64::MIN`.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let run = digits.bytes().take_while(u8::is_ascii_digit);
    let mut seen = false;
    let mut acc: i64 = 0;
    for b in run {
        seen = true;
        let d = i64::from(b - b'0');
        acc = if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        };
    }

    seen.then_some(acc)
}

/// Clamp a finite float with no fractional part into `i64`.
fn saturate(f: f64) -> i64 {
    if f >= i64::MAX as f64 {
        i64::MAX
    } else if f <= i64::MIN as f64 {
        i64::MIN
    } else {
        f as i64
    }
}

/// An integral JSON number as `i64`.
///
/// Floats are accepted only when they have no fractional part. Integral
/// values beyond the `i64` range saturate.
pub fn integral_number(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    let f = n.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then(|| saturate(f))
}

/// Any JSON number as `i64`, truncated toward zero and saturating.
pub fn truncated_number(value: &Value) -> Option<i64> {
    if let Some(i) = integral_number(value) {
        return Some(i);
    }
    let f = value.as_f64()?;
    f.is_finite().then(|| saturate(f.trunc()))
}

/// Numbers through [`truncated_number`], strings through [`leading_int`],
/// everything else nothing.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) => truncated_number(value),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_digits() {
        assert_eq!(leading_int("1987"), Some(1987));
    }

    #[test]
    fn trailing_garbage_ignored() {
        assert_eq!(leading_int("1987abc"), Some(1987));
        assert_eq!(leading_int("42 stores"), Some(42));
        assert_eq!(leading_int("12.9"), Some(12));
    }

    #[test]
    fn leading_whitespace_and_sign() {
        assert_eq!(leading_int("  \t 7"), Some(7));
        assert_eq!(leading_int("+15"), Some(15));
        assert_eq!(leading_int("-15"), Some(-15));
        assert_eq!(leading_int(" -0"), Some(0));
    }

    #[test]
    fn byte_order_mark_skipped() {
        assert_eq!(leading_int("\u{FEFF}1987"), Some(1987));
        assert_eq!(leading_int(" \u{FEFF} 42 stores"), Some(42));
    }

    #[test]
    fn no_digits_is_none() {
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int("+ 5"), None);
        assert_eq!(leading_int("about 40"), None);
    }

    #[test]
    fn sign_must_precede_digits_directly() {
        assert_eq!(leading_int("--5"), None);
    }

    #[test]
    fn overflow_saturates() {
        assert_eq!(leading_int("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(leading_int("-99999999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn integral_numbers_only() {
        assert_eq!(integral_number(&json!(12)), Some(12));
        assert_eq!(integral_number(&json!(12.0)), Some(12));
        assert_eq!(integral_number(&json!(12.5)), None);
        assert_eq!(integral_number(&json!("12")), None);
    }

    #[test]
    fn huge_integral_numbers_saturate() {
        assert_eq!(integral_number(&json!(u64::MAX)), Some(i64::MAX));
        assert_eq!(integral_number(&json!(1e19)), Some(i64::MAX));
        assert_eq!(integral_number(&json!(-1e19)), Some(i64::MIN));
    }

    #[test]
    fn fractions_truncate_toward_zero() {
        assert_eq!(truncated_number(&json!(2.5)), Some(2));
        assert_eq!(truncated_number(&json!(-2.5)), Some(-2));
        assert_eq!(truncated_number(&json!(1987.9)), Some(1987));
        assert_eq!(truncated_number(&json!(7)), Some(7));
        assert_eq!(truncated_number(&json!(1e300)), Some(i64::MAX));
        assert_eq!(truncated_number(&json!("2.5")), None);
    }

    #[test]
    fn lenient_covers_both_forms() {
        assert_eq!(lenient_int(&json!(3)), Some(3));
        assert_eq!(lenient_int(&json!("3 shops")), Some(3));
        assert_eq!(lenient_int(&json!(2.5)), lenient_int(&json!("2.5")));
        assert_eq!(lenient_int(&json!(true)), None);
        assert_eq!(lenient_int(&Value::Null), None);
    }
}
