//! Value coercions.
//!
//! The conversions in this module follow the abstract operations of the
//! ECMAScript specification (`ToNumber`, `ToInt32`, `ToUint32`, `ToBoolean`
//! and `ToString`), which is what script code observes when it passes a value
//! of the wrong primitive type to a WebGL method. They never fail.
//!
//! Vector arguments are accepted either as a typed array, which is viewed in
//! place, or as a generic array, which is converted element by element into a
//! temporary vector. Both forms reach the native engine as the same slice.

use crate::value::{Element, Value};

const TWO_POW_32: f64 = 4294967296.0;

/// `ToUint32` applied to a number.
pub fn number_to_uint32(number: f64) -> u32 {
    if !number.is_finite() {
        return 0;
    }
    number.trunc().rem_euclid(TWO_POW_32) as u32
}

/// `ToInt32` applied to a number.
///
/// This gives the same bit pattern as [`number_to_uint32`].
pub fn number_to_int32(number: f64) -> i32 {
    number_to_uint32(number) as i32
}

/// Parses a string with the `StringToNumber` grammar.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    let (sign, unsigned) = match s.as_bytes()[0] {
        b'+' => (1.0, &s[1..]),
        b'-' => (-1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    let radix = match unsigned.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        // Prefixed literals do not take a sign.
        if unsigned.len() != s.len() || unsigned.len() == 2 {
            return f64::NAN;
        }
        return unsigned[2..].chars().try_fold(0.0, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN);
    }
    let decimal = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal || unsigned.starts_with(['e', 'E']) || unsigned == "." {
        return f64::NAN;
    }
    unsigned
        .parse::<f64>()
        .map(|n| sign * n)
        .unwrap_or(f64::NAN)
}

/// `ToString` applied to a number.
pub fn number_to_string(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if number == 0.0 {
        "0".to_string()
    } else if number.fract() == 0.0 && number.abs() < 1e21 {
        format!("{number:.0}")
    } else {
        format!("{number}")
    }
}

impl Value {
    /// `ToNumber`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) | Value::TypedArray(_) => string_to_number(&self.to_js_string()),
            Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// `ToInt32`, as in the `Int32Value` engine call.
    pub fn to_int32(&self) -> i32 {
        match self {
            Value::Number(n) => number_to_int32(*n),
            _ => number_to_int32(self.to_number()),
        }
    }

    /// `ToUint32`, as in the `Uint32Value` engine call.
    pub fn to_uint32(&self) -> u32 {
        match self {
            Value::Number(n) => number_to_uint32(*n),
            _ => number_to_uint32(self.to_number()),
        }
    }

    /// Integer conversion, as in the `IntegerValue` engine call.
    ///
    /// The number is truncated towards zero and saturated to the range of
    /// `i64`. `NaN` gives zero.
    pub fn to_integer(&self) -> i64 {
        self.to_number() as i64
    }

    /// `ToBoolean`.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::TypedArray(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Returns the boolean if the value is a boolean primitive.
    ///
    /// Optional flags use this instead of [`Value::to_boolean`]: a value that
    /// is not a boolean leaves the default of the flag untouched.
    pub fn optional_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// `ToString`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.to_string(),
            Value::Array(array) => array
                .elements()
                .iter()
                .map(|element| match element {
                    None | Some(Value::Undefined) | Some(Value::Null) => String::new(),
                    Some(value) => value.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::TypedArray(array) => (0..array.len())
                .filter_map(|index| array.get(index))
                .map(number_to_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(function) => format!("function {}() {{ [native code] }}", function.name()),
        }
    }
}

/// Element type of a vector argument.
///
/// This gives the conversion applied to each element of a generic array, and
/// the value used for holes.
pub trait VectorElement: Element {
    /// Converts one element of a generic array. Holes are passed as `None`.
    fn from_element(element: Option<&Value>) -> Self;
}

impl VectorElement for f32 {
    fn from_element(element: Option<&Value>) -> f32 {
        element.map_or(f32::NAN, |value| value.to_number() as f32)
    }
}

impl VectorElement for i32 {
    fn from_element(element: Option<&Value>) -> i32 {
        element.map_or(0, Value::to_int32)
    }
}

impl VectorElement for u32 {
    fn from_element(element: Option<&Value>) -> u32 {
        element.map_or(0, Value::to_uint32)
    }
}

impl VectorElement for u8 {
    fn from_element(element: Option<&Value>) -> u8 {
        element.map_or(0, |value| value.to_uint32() as u8)
    }
}

/// Runs `f` with the elements of a vector argument.
///
/// Typed arrays are accepted only if their element type is `T`, and are
/// viewed without copying. Generic arrays are converted with
/// [`VectorElement::from_element`]. Returns `None` without calling `f` for any
/// other value.
pub fn with_vector<T: VectorElement, R>(value: &Value, f: impl FnOnce(&[T]) -> R) -> Option<R> {
    match value {
        Value::TypedArray(array) => array.with_slice(f),
        Value::Array(array) => {
            let elements: Vec<T> = array
                .elements()
                .iter()
                .map(|element| T::from_element(element.as_ref()))
                .collect();
            Some(f(&elements))
        }
        _ => None,
    }
}

/// Runs `f` with the bytes of a byte source argument.
///
/// Any typed array is accepted and gives the bytes covered by the view,
/// skipping the first `element_offset` elements. Generic arrays are
/// converted to bytes with `ToUint32` modulo 256. Returns `None` for any other
/// value, or if the offset is past the end of the source.
pub fn with_bytes<R>(value: &Value, element_offset: usize, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
    match value {
        Value::TypedArray(array) => {
            let start = element_offset.checked_mul(array.kind().size())?;
            if start > array.byte_length() {
                return None;
            }
            Some(array.with_bytes(|bytes| f(&bytes[start..])))
        }
        Value::Array(_) => with_vector::<u8, _>(value, |bytes| {
            bytes.get(element_offset..).map(f)
        })
        .flatten(),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::{Array, Object, TypedArray};

    #[test]
    fn int32_wraparound() {
        assert_eq!(number_to_int32(4294967295.0), -1);
        assert_eq!(number_to_int32(2147483648.0), i32::MIN);
        assert_eq!(number_to_int32(-1.5), -1);
        assert_eq!(number_to_int32(f64::NAN), 0);
        assert_eq!(number_to_int32(f64::INFINITY), 0);
        assert_eq!(number_to_int32(4294967296.0 * 3.0 + 5.0), 5);
    }

    #[test]
    fn uint32_wraparound() {
        assert_eq!(number_to_uint32(-1.0), u32::MAX);
        assert_eq!(number_to_uint32(-4294967297.0), u32::MAX);
        assert_eq!(number_to_uint32(3.99), 3);
        assert_eq!(number_to_uint32(-0.5), 0);
    }

    #[test]
    fn signed_and_unsigned_paths_agree() {
        for n in [0.0, 1.0, -1.0, 4294967295.0, 2147483647.0, 2147483648.0, -2147483649.0, 1e12] {
            let value = Value::from(n);
            assert_eq!(value.to_uint32(), value.to_int32() as u32, "{n}");
            assert_eq!(value.to_int32(), value.to_uint32() as i32, "{n}");
        }
    }

    #[test]
    fn to_number_of_primitives() {
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert_eq!(Value::from("  42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("0x8C2F").to_number(), 35887.0);
        assert_eq!(Value::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::from("1e3").to_number(), 1000.0);
        assert!(Value::from("-0x10").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::from("12px").to_number().is_nan());
        assert!(Value::from(Object::new()).to_number().is_nan());
    }

    #[test]
    fn to_number_of_arrays() {
        assert_eq!(Value::array([]).to_number(), 0.0);
        assert_eq!(Value::array([Value::from("7")]).to_number(), 7.0);
        assert!(Value::array([Value::from(1), Value::from(2)]).to_number().is_nan());
        assert_eq!(Value::from(TypedArray::from_slice(&[9u8])).to_number(), 9.0);
    }

    #[test]
    fn integer_value_saturates() {
        assert_eq!(Value::from(1e300).to_integer(), i64::MAX);
        assert_eq!(Value::from(-2.7).to_integer(), -2);
        assert_eq!(Value::Undefined.to_integer(), 0);
    }

    #[test]
    fn boolean_coercions() {
        assert!(Value::from("x").to_boolean());
        assert!(!Value::from(f64::NAN).to_boolean());
        assert!(Value::from(Object::new()).to_boolean());
        assert_eq!(Value::from(1).optional_bool(), None);
        assert_eq!(Value::from("true").optional_bool(), None);
        assert_eq!(Value::from(false).optional_bool(), Some(false));
    }

    #[test]
    fn number_strings() {
        assert_eq!(number_to_string(3.0), "3");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(Value::array([Value::from(1), Value::Null, Value::from("a")]).to_js_string(), "1,,a");
    }

    #[test]
    fn float_vector_holes_are_nan() {
        let array = Value::Array(Array::new(vec![Some(Value::from(1.5)), None, Some(Value::from("2"))]));
        let elements = with_vector::<f32, _>(&array, |s| s.to_vec()).unwrap();
        assert_eq!(elements[0], 1.5);
        assert!(elements[1].is_nan());
        assert_eq!(elements[2], 2.0);
    }

    #[test]
    fn int_vector_holes_are_zero() {
        let array = Value::Array(Array::new(vec![None, Some(Value::from(-1))]));
        assert_eq!(with_vector::<i32, _>(&array, |s| s.to_vec()), Some(vec![0, -1]));
        assert_eq!(with_vector::<u32, _>(&array, |s| s.to_vec()), Some(vec![0, u32::MAX]));
    }

    #[test]
    fn vector_forms_agree() {
        let generic = Value::array([Value::from(0x8CE0), Value::from(0x8CE1)]);
        let typed = Value::from(TypedArray::from_slice(&[0x8CE0u32, 0x8CE1]));
        let a = with_vector::<u32, _>(&generic, |s| s.to_vec());
        let b = with_vector::<u32, _>(&typed, |s| s.to_vec());
        assert_eq!(a, b);
        assert_eq!(with_vector::<u32, _>(&Value::from(TypedArray::from_slice(&[1i32])), |s| s.len()), None);
        assert_eq!(with_vector::<u32, _>(&Value::from(3), |s| s.len()), None);
    }

    #[test]
    fn byte_sources() {
        let typed = Value::from(TypedArray::from_slice(&[1u16, 2, 3]));
        assert_eq!(with_bytes(&typed, 1, |b| b.len()), Some(4));
        assert_eq!(with_bytes(&typed, 4, |b| b.len()), None);
        let generic = Value::array([Value::from(256 + 7), Value::from(-1)]);
        assert_eq!(with_bytes(&generic, 0, |b| b.to_vec()), Some(vec![7, 255]));
        assert_eq!(with_bytes(&Value::Null, 0, |b| b.len()), None);
    }
}
