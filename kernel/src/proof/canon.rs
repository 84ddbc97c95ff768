//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! **Exactly one place** produces canonical record bytes. Every integrity
//! anchor (bundle hash, index hash, custody binding) routes through this
//! module; published PLRS hashes depend on it byte-for-byte.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (UTF-8 byte order, which is
//!    also code point order).
//! 2. No extraneous whitespace (compact form: `{"a":1,"b":2}`).
//! 3. Strings are UTF-8. Only `"`, `\` and U+0000..U+001F are escaped;
//!    non-ASCII characters pass through unescaped.
//! 4. Integers are written in plain decimal, exactly as parsed at any width
//!    (`-0` is the integer `0`).
//! 5. Floats are written in shortest round-trip form: fixed notation when the
//!    decimal exponent lies in `[-4, 16)` (always with a fractional part, so
//!    `100.0` not `100`), scientific otherwise (`1e+16`, `1.5e-07`).
//! 6. `null`, `true`, `false` are written literally.
//! 7. Output is always valid UTF-8.

use std::io::Write;

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    /// A JSON number has no finite representation (NaN, Infinity).
    #[error("non-finite number cannot be canonicalized: {raw}")]
    NonFiniteNumber { raw: String },
}

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`CanonError::NonFiniteNumber`] if a number cannot be written as a
/// finite decimal.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), CanonError> {
    match value {
        serde_json::Value::Null => {
            buf.extend_from_slice(b"null");
        }
        serde_json::Value::Bool(b) => {
            if *b {
                buf.extend_from_slice(b"true");
            } else {
                buf.extend_from_slice(b"false");
            }
        }
        serde_json::Value::Number(n) => {
            write_number(buf, n)?;
        }
        serde_json::Value::String(s) => {
            write_string(buf, s);
        }
        serde_json::Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item)?;
            }
            buf.push(b']');
        }
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(buf, key);
                buf.push(b':');
                write_value(buf, &map[*key])?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

fn write_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CanonError> {
    // `-0` parses as the integer 0.
    if let Some(i) = n.as_i64() {
        let _ = write!(buf, "{i}");
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        let _ = write!(buf, "{u}");
        return Ok(());
    }
    // Numbers keep their source text; an integer literal too wide for 64 bits
    // is written digit for digit, never widened through f64.
    let raw = n.to_string();
    if !raw.contains(['.', 'e', 'E']) {
        buf.extend_from_slice(raw.as_bytes());
        return Ok(());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            buf.extend_from_slice(format_float(f).as_bytes());
            Ok(())
        }
        _ => Err(CanonError::NonFiniteNumber { raw }),
    }
}

/// Render a finite float in the fixed PLRS layout.
///
/// `{:e}` yields the shortest round-trip digits (`1.2345e16`, `-0e0`); the
/// digits are then re-laid-out around the decimal point.
fn format_float(f: f64) -> String {
    let sci = format!("{f:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    // Position of the decimal point relative to the first digit.
    let point = exponent + 1;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if (-3..=16).contains(&point) {
        let len = i32::try_from(digits.len()).unwrap_or(i32::MAX);
        if point <= 0 {
            out.push_str("0.");
            for _ in 0..-point {
                out.push('0');
            }
            out.push_str(&digits);
        } else if point >= len {
            out.push_str(&digits);
            for _ in 0..point - len {
                out.push('0');
            }
            out.push_str(".0");
        } else {
            let split = usize::try_from(point).unwrap_or(0);
            out.push_str(&digits[..split]);
            out.push('.');
            out.push_str(&digits[split..]);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = std::fmt::Write::write_fmt(
            &mut out,
            format_args!("e{sign}{:02}", exponent.unsigned_abs()),
        );
    }
    out
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\u{0008}' => buf.extend_from_slice(b"\\b"),
            '\u{000C}' => buf.extend_from_slice(b"\\f"),
            c if c < '\u{0020}' => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut utf8_buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut utf8_buf);
                buf.extend_from_slice(encoded.as_bytes());
            }
        }
    }
    buf.push(b'"');
}
