use std::{cmp::Ordering, fmt::Display};

use crate::sql::schema::TEXT_CAPACITY;

/// Supported column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl DataType {
    /// Resolves a type name from a column definition (case-insensitive)
    pub fn from_name(name: &str) -> Option<DataType> {
        Some(match name.to_uppercase().as_ref() {
            "INT" | "INTEGER" => DataType::Integer,
            "FLOAT" | "DOUBLE" | "REAL" => DataType::Float,
            "TEXT" | "VARCHAR" | "STRING" => DataType::Text,
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            _ => return None,
        })
    }

    /// Canonical name, as shown by DESCRIBE
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "INT",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOL",
        }
    }

    /// Tag used in the snapshot file
    pub fn tag(&self) -> u8 {
        match self {
            DataType::Integer => 1,
            DataType::Float => 2,
            DataType::Text => 3,
            DataType::Boolean => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<DataType> {
        Some(match tag {
            1 => DataType::Integer,
            2 => DataType::Float,
            3 => DataType::Text,
            4 => DataType::Boolean,
            _ => return None,
        })
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored cell value. Nullability lives in the row slot, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Converts a literal into a value of the given type.
    ///
    /// Never fails: non-numeric input becomes 0 / 0.0, text is cut at
    /// `TEXT_CAPACITY` bytes, and only `true` (any case) or `1` are true.
    pub fn coerce(literal: &str, datatype: DataType) -> Self {
        match datatype {
            DataType::Integer => Value::Integer(parse_int_prefix(literal)),
            DataType::Float => Value::Float(parse_float_prefix(literal)),
            DataType::Text => Value::Text(truncate_text(literal).to_string()),
            DataType::Boolean => {
                Value::Boolean(literal.eq_ignore_ascii_case("true") || literal == "1")
            }
        }
    }

    pub fn datatype(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Three-way comparison using the column's native ordering.
    ///
    /// Text compares case-insensitively, booleans as 0/1, and NaN compares
    /// equal to everything. Values of different types are never compared by
    /// the engine since operands are coerced to the column type first.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) => a.datatype().tag().cmp(&b.datatype().tag()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => f.write_str(&format_general(*v)),
            Value::Text(v) => f.write_str(v),
            Value::Boolean(true) => f.write_str("true"),
            Value::Boolean(false) => f.write_str("false"),
        }
    }
}

/// Cuts text to at most `TEXT_CAPACITY` bytes
pub fn truncate_text(s: &str) -> &str {
    clip(s, TEXT_CAPACITY)
}

/// Cuts a string to at most `max` bytes, backing off to a char boundary
pub fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Base-10 integer from the longest valid prefix; saturates on overflow
fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(|b| b.is_ascii_digit()) {
        let digit = (b - b'0') as i64;
        value = match value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
        {
            Some(v) => v,
            None if negative => return i64::MIN,
            None => return i64::MAX,
        };
    }
    value
}

/// Decimal float from the longest valid prefix, `inf`, `infinity` and `nan`
/// included (any case)
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let word = bytes[end..].get(..3).unwrap_or_default();
    if word.eq_ignore_ascii_case(b"inf") {
        return if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if word.eq_ignore_ascii_case(b"nan") {
        return if bytes[0] == b'-' { -f64::NAN } else { f64::NAN };
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Formats a float like printf's `%.6g`: six significant digits, trailing zeros
/// removed, exponent form outside `1e-4 <= |v| < 1e6`.
pub fn format_general(v: f64) -> String {
    const PRECISION: i32 = 6;

    if v.is_nan() {
        return if v.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to six digits first decides the exponent, e.g. 999999.5 -> 1e+06
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
