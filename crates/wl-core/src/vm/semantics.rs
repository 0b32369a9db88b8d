//! Value Semantics
//!
//! Boolean and numeric coercion, stringification, addition and three-way
//! comparison. Shared by the arithmetic, comparison and output instructions.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::{ErrorKind, WlResult};
use super::value::Value;

/// Nesting bound used when no configuration is at hand
pub const DEFAULT_MAX_NESTING: usize = 256;

/// Truthiness. NaN is never falsy.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Absent => false,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(_) => true,
    }
}

/// Numeric coercion used by `- * / %`, indices and counts.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Absent => 0.0,
        Value::String(s) => parse_number(s),
        Value::Array(items) => {
            let items = items.borrow();
            match items.as_slice() {
                [] => 0.0,
                [single] if !matches!(single, Value::Array(_)) => to_number(single),
                _ => f64::NAN,
            }
        }
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    match trimmed {
        "" => 0.0,
        "Inf" | "+Inf" | "Infinity" | "+Infinity" => f64::INFINITY,
        "-Inf" | "-Infinity" => f64::NEG_INFINITY,
        "NaN" => f64::NAN,
        // decimal notation only; `str::parse` would also take `inf` or `nan`
        _ if trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')) =>
        {
            trimmed.parse::<f64>().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Stringify a value. Strings pass through unchanged.
pub fn to_string(value: &Value) -> String {
    render(value, DEFAULT_MAX_NESTING)
}

/// Stringify a value. An array that contains itself, or that nests deeper
/// than `max_nesting`, renders as `[...]` at the point of repetition.
pub fn render(value: &Value, max_nesting: usize) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => {
            let mut out = String::new();
            render_into(&mut out, value, &mut Vec::new(), max_nesting);
            out
        }
    }
}

/// `path` holds the arrays currently being rendered, outermost first.
fn render_into(
    out: &mut String,
    value: &Value,
    path: &mut Vec<*const RefCell<Vec<Value>>>,
    max_nesting: usize,
) {
    match value {
        Value::String(s) => out.push_str(&format!("{:?}", s)),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Absent => out.push_str("undef"),
        Value::Array(items) => {
            let id = Rc::as_ptr(items);
            if path.len() >= max_nesting || path.contains(&id) {
                out.push_str("[...]");
                return;
            }
            path.push(id);
            out.push('[');
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_into(out, item, path, max_nesting);
            }
            out.push(']');
            path.pop();
        }
    }
}

/// Shortest round-trip decimal text, switching to exponent form outside
/// `1e-7 .. 1e21` the way ECMAScript does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // position of the decimal point relative to the digit string
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if point - 1 < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (point - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (point - 1).abs())
        }
    };

    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// `+`: numeric sum, array concatenation, or string concatenation.
pub fn add(a: &Value, b: &Value, max_nesting: usize) -> Value {
    match (a, b) {
        _ if a.is_numeric() && b.is_numeric() => Value::Number(to_number(a) + to_number(b)),
        (Value::Array(left), Value::Array(right)) => {
            let mut items = left.borrow().clone();
            items.extend(right.borrow().iter().cloned());
            Value::array(items)
        }
        (Value::Array(left), scalar) => {
            let mut items = left.borrow().clone();
            items.push(scalar.clone());
            Value::array(items)
        }
        (scalar, Value::Array(right)) => {
            let mut items = Vec::with_capacity(right.borrow().len() + 1);
            items.push(scalar.clone());
            items.extend(right.borrow().iter().cloned());
            Value::array(items)
        }
        _ => Value::String(render(a, max_nesting) + &render(b, max_nesting)),
    }
}

/// Three-way comparison. `None` means unordered (a NaN was involved).
///
/// Arrays compare element-wise, then by length. Fails with
/// [`ErrorKind::Nesting`] when arrays nest deeper than `max_nesting`.
pub fn compare(a: &Value, b: &Value, max_nesting: usize) -> WlResult<Option<Ordering>> {
    compare_within(a, b, max_nesting, max_nesting)
}

fn compare_within(
    a: &Value,
    b: &Value,
    budget: usize,
    max_nesting: usize,
) -> WlResult<Option<Ordering>> {
    if a.is_numeric() && b.is_numeric() {
        return Ok(to_number(a).partial_cmp(&to_number(b)));
    }

    match (a, b) {
        (Value::Array(left), Value::Array(right)) => {
            if Rc::ptr_eq(left, right) {
                return Ok(Some(Ordering::Equal));
            }
            if budget == 0 {
                return Err(ErrorKind::Nesting(max_nesting).into());
            }
            let (left, right) = (left.borrow(), right.borrow());
            for (x, y) in left.iter().zip(right.iter()) {
                let cmp = compare_within(x, y, budget - 1, max_nesting)?;
                if cmp != Some(Ordering::Equal) {
                    return Ok(cmp);
                }
            }
            Ok(Some(left.len().cmp(&right.len())))
        }
        _ => Ok(Some(render(a, max_nesting).cmp(&render(b, max_nesting)))),
    }
}

/// Binary numeric operators `- * / %`.
pub fn arithmetic(op: char, a: &Value, b: &Value) -> Option<f64> {
    let (x, y) = (to_number(a), to_number(b));
    match op {
        '-' => Some(x - y),
        '*' => Some(x * y),
        '/' => Some(x / y),
        '%' => Some(x % y),
        _ => None,
    }
}

/// Numeric encoding of an ordering as pushed by `?`.
pub fn ordering_to_number(ordering: Option<Ordering>) -> f64 {
    match ordering {
        Some(Ordering::Less) => -1.0,
        Some(Ordering::Equal) => 0.0,
        Some(Ordering::Greater) => 1.0,
        None => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[f64]) -> Value {
        Value::array(values.iter().map(|n| Value::Number(*n)).collect())
    }

    fn cmp(a: &Value, b: &Value) -> Option<Ordering> {
        compare(a, b, DEFAULT_MAX_NESTING).expect("compare failed")
    }

    #[test]
    fn truthiness() {
        assert!(!to_boolean(&Value::Absent));
        assert!(!to_boolean(&Value::Number(0.0)));
        assert!(!to_boolean(&Value::from("")));
        assert!(to_boolean(&Value::Number(f64::NAN)));
        assert!(to_boolean(&Value::from("0")));
        assert!(to_boolean(&Value::array(vec![])));
    }

    #[test]
    fn numbers_render_like_shortest_round_trip() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-10), "1.5e-10");
        assert_eq!(format_number(f64::INFINITY), "Inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn strings_and_arrays_render() {
        assert_eq!(to_string(&Value::from("plain")), "plain");
        assert_eq!(to_string(&Value::Absent), "undef");
        let nested = Value::array(vec![
            Value::Number(1.0),
            Value::from("a\n"),
            nums(&[2.0]),
            Value::Absent,
        ]);
        assert_eq!(to_string(&nested), "[1, \"a\\n\", [2], undef]");
    }

    #[test]
    fn cyclic_arrays_render_without_failing() {
        let outer = nums(&[1.0]);
        if let Some(items) = outer.as_array() {
            items.borrow_mut().push(outer.clone());
        }
        assert_eq!(render(&outer, 8), "[1, [...]]");
        if let Some(items) = outer.as_array() {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn self_referencing_pair_renders_once() {
        let pair = nums(&[]);
        if let Some(items) = pair.as_array() {
            items.borrow_mut().push(pair.clone());
            items.borrow_mut().push(pair.clone());
        }
        assert_eq!(to_string(&pair), "[[...], [...]]");
        if let Some(items) = pair.as_array() {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn shared_but_acyclic_arrays_render_in_full() {
        let leaf = nums(&[1.0]);
        let tree = Value::array(vec![leaf.clone(), leaf]);
        assert_eq!(to_string(&tree), "[[1], [1]]");
    }

    #[test]
    fn deep_nesting_is_cut_off() {
        let deep = Value::array(vec![Value::array(vec![nums(&[1.0])])]);
        assert_eq!(render(&deep, 2), "[[[...]]]");
    }

    #[test]
    fn add_concatenates_arrays() {
        let n = DEFAULT_MAX_NESTING;
        assert_eq!(add(&nums(&[1.0, 2.0]), &nums(&[3.0]), n), nums(&[1.0, 2.0, 3.0]));
        assert_eq!(add(&nums(&[1.0]), &Value::Number(2.0), n), nums(&[1.0, 2.0]));
        assert_eq!(add(&Value::Number(2.0), &nums(&[1.0]), n), nums(&[2.0, 1.0]));
    }

    #[test]
    fn add_result_is_independent_of_inputs() {
        let left = nums(&[1.0]);
        let sum = add(&left, &left, DEFAULT_MAX_NESTING);
        if let Some(items) = left.as_array() {
            items.borrow_mut().clear();
        }
        assert_eq!(sum, nums(&[1.0, 1.0]));
    }

    #[test]
    fn add_numbers_and_strings() {
        let n = DEFAULT_MAX_NESTING;
        assert_eq!(add(&Value::Number(2.0), &Value::Absent, n), Value::Number(2.0));
        assert_eq!(add(&Value::from("a"), &Value::Number(1.0), n), Value::from("a1"));
        assert_eq!(add(&Value::Absent, &Value::from("x"), n), Value::from("undefx"));
    }

    #[test]
    fn numeric_comparison_is_antisymmetric() {
        let samples = [
            Value::Number(-1.5),
            Value::Number(0.0),
            Value::Absent,
            Value::Number(7.0),
            Value::Number(f64::INFINITY),
        ];
        for a in &samples {
            for b in &samples {
                let forward = cmp(a, b).map(Ordering::reverse);
                assert_eq!(forward, cmp(b, a), "{:?} vs {:?}", a, b);
            }
        }
        assert_eq!(cmp(&Value::Number(f64::NAN), &Value::Number(1.0)), None);
    }

    #[test]
    fn array_comparison() {
        let a = nums(&[1.0, 2.0]);
        assert_eq!(cmp(&a, &a), Some(Ordering::Equal));
        assert_eq!(cmp(&a, &nums(&[1.0, 2.0])), Some(Ordering::Equal));
        assert_eq!(cmp(&a, &nums(&[1.0, 3.0])), Some(Ordering::Less));
        assert_eq!(cmp(&a, &nums(&[1.0])), Some(Ordering::Greater));
        assert_eq!(cmp(&nums(&[]), &a), Some(Ordering::Less));
    }

    #[test]
    fn mixed_values_compare_as_strings() {
        assert_eq!(cmp(&Value::from("b"), &Value::from("a")), Some(Ordering::Greater));
        assert_eq!(cmp(&Value::Number(10.0), &Value::from("9")), Some(Ordering::Less));
    }

    #[test]
    fn deep_comparison_fails_instead_of_overflowing() {
        let a = nums(&[1.0]);
        let b = nums(&[1.0]);
        for arr in [&a, &b] {
            if let Some(items) = arr.as_array() {
                items.borrow_mut().insert(0, arr.clone());
            }
        }
        let err = compare(&a, &b, 8).expect_err("nesting error expected");
        assert!(matches!(err.kind(), ErrorKind::Nesting(8)));
        for arr in [&a, &b] {
            if let Some(items) = arr.as_array() {
                items.borrow_mut().clear();
            }
        }
    }

    #[test]
    fn coercion_to_number() {
        assert_eq!(to_number(&Value::from(" 42 ")), 42.0);
        assert_eq!(to_number(&Value::from("")), 0.0);
        assert!(to_number(&Value::from("abc")).is_nan());
        assert_eq!(to_number(&Value::from("-Inf")), f64::NEG_INFINITY);
        assert_eq!(to_number(&nums(&[])), 0.0);
        assert_eq!(to_number(&nums(&[5.0])), 5.0);
        assert!(to_number(&nums(&[1.0, 2.0])).is_nan());
    }

    #[test]
    fn only_listed_infinity_spellings_parse() {
        assert_eq!(to_number(&Value::from("Infinity")), f64::INFINITY);
        assert_eq!(to_number(&Value::from("+Inf")), f64::INFINITY);
        assert_eq!(to_number(&Value::from("1e3")), 1000.0);
        assert_eq!(to_number(&Value::from("-.5")), -0.5);
        for text in ["inf", "infinity", "nan", "-inf", "INF", "0x10"] {
            assert!(to_number(&Value::from(text)).is_nan(), "{}", text);
        }
    }
}
