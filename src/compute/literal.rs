//! Human-readable literals for intervals and timestamps.
//!
//! ```text
//! interval set     <[1.0, 2.0]; [3.0, 4.0]>
//! interval map     <[1.0, 2.0, 'a']; [3.0, 4.0, 'b']>
//! timestamp set    <[1.0, 2.0, 5.5]>
//! timestamp map    <[1.0, 'a']; [2.0, 'b']>
//! ```
//!
//! Both `(`/`)` and `[`/`]` are accepted, but parsed intervals are always
//! closed: `(1, 2)` reads back as `[1, 2]`. An empty collection is written
//! `<empty>`. Strings and chars may be quoted with `'` or `"`; inside quotes
//! `\` escapes the next character.

use attrstore_types::{Interval, Value, ValueType};

use crate::error::{AttrError, Result};

const EMPTY: &str = "<empty>";

pub fn parse_interval_set(input: &str) -> Result<Vec<Interval>> {
    entries(input)?
        .into_iter()
        .map(|entry| {
            let parts = bracketed(entry)?;
            match parts.as_slice() {
                [low, high] => interval(entry, low, high),
                [_, _, _] => Err(AttrError::parse(entry, "unexpected value in interval set")),
                _ => Err(AttrError::parse(entry, "expected [low, high]")),
            }
        })
        .collect()
}

/// Parses `[low, high, value]` entries; the value is mandatory.
pub fn parse_interval_map(input: &str, value_type: ValueType) -> Result<Vec<(Interval, Value)>> {
    entries(input)?
        .into_iter()
        .map(|entry| {
            let parts = bracketed(entry)?;
            match parts.as_slice() {
                [low, high, value] => Ok((interval(entry, low, high)?, parse_value(value_type, value)?)),
                [_, _] => Err(AttrError::parse(entry, "missing value")),
                _ => Err(AttrError::parse(entry, "expected [low, high, value]")),
            }
        })
        .collect()
}

pub fn parse_timestamp_set(input: &str) -> Result<Vec<f64>> {
    let mut timestamps = Vec::new();
    for entry in entries(input)? {
        for part in bracketed(entry)? {
            timestamps.push(timestamp(part)?);
        }
    }
    Ok(timestamps)
}

/// Parses `[timestamp, value]` entries; the value is mandatory.
pub fn parse_timestamp_map(input: &str, value_type: ValueType) -> Result<Vec<(f64, Value)>> {
    entries(input)?
        .into_iter()
        .map(|entry| {
            let parts = bracketed(entry)?;
            match parts.as_slice() {
                [ts, value] => Ok((timestamp(ts)?, parse_value(value_type, value)?)),
                [_] => Err(AttrError::parse(entry, "missing value")),
                _ => Err(AttrError::parse(entry, "expected [timestamp, value]")),
            }
        })
        .collect()
}

/// Parses a scalar of `value_type`. Quotes around strings and chars are optional.
pub fn parse_value(value_type: ValueType, text: &str) -> Result<Value> {
    let raw = text.trim();
    let invalid = |reason: String| AttrError::parse(raw, reason);
    let numeric = || format!("not a valid {} value", value_type);

    Ok(match value_type {
        ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(invalid(numeric())),
        },
        ValueType::Byte => Value::Byte(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Short => Value::Short(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Int => Value::Int(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Long => Value::Long(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Float => Value::Float(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Double => Value::Double(raw.parse().map_err(|_| invalid(numeric()))?),
        ValueType::Char => {
            let text = unquote(raw)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(invalid("expected a single character".into())),
            }
        }
        ValueType::String => Value::String(unquote(raw)?),
    })
}

pub fn format_interval_set(intervals: &[Interval]) -> String {
    collection(intervals.iter().map(|i| i.to_string()))
}

pub fn format_interval_map(entries: &[(Interval, Value)]) -> String {
    collection(entries.iter().map(|(interval, value)| {
        format!(
            "{}{:?}, {:?}, {}{}",
            if interval.is_low_excluded() { '(' } else { '[' },
            interval.low(),
            interval.high(),
            format_value(value),
            if interval.is_high_excluded() { ')' } else { ']' },
        )
    }))
}

pub fn format_timestamp_set(timestamps: &[f64]) -> String {
    if timestamps.is_empty() {
        return EMPTY.to_string();
    }
    let items: Vec<String> = timestamps.iter().map(|ts| format!("{:?}", ts)).collect();
    format!("<[{}]>", items.join(", "))
}

pub fn format_timestamp_map(entries: &[(f64, Value)]) -> String {
    collection(
        entries
            .iter()
            .map(|(ts, value)| format!("[{:?}, {}]", ts, format_value(value))),
    )
}

/// Scalar text as it appears inside a literal; strings and chars are quoted.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Char(c) => quote(&c.to_string()),
        other => other.to_string(),
    }
}

fn collection(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        EMPTY.to_string()
    } else {
        format!("<{}>", items.join("; "))
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn unquote(text: &str) -> Result<String> {
    let Some(quote) = text.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return Ok(text.to_string());
    };
    let body = &text[1..];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            },
            c if c == quote => {
                return if chars.as_str().trim().is_empty() {
                    Ok(out)
                } else {
                    Err(AttrError::parse(text, "text after closing quote"))
                };
            }
            c => out.push(c),
        }
    }
    Err(AttrError::parse(text, "unterminated quote"))
}

/// Splits `<a; b; c>` into its trimmed entries.
fn entries(input: &str) -> Result<Vec<&str>> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| AttrError::parse(trimmed, "expected <...>"))?
        .trim();
    if inner.is_empty() || inner.eq_ignore_ascii_case("empty") {
        return Ok(Vec::new());
    }
    split_top_level(inner, ';')
}

/// Splits `[a, b]` or `(a, b)` into its trimmed parts.
fn bracketed(entry: &str) -> Result<Vec<&str>> {
    let inner = entry
        .strip_prefix(['[', '('])
        .and_then(|s| s.strip_suffix([']', ')']))
        .ok_or_else(|| AttrError::parse(entry, "expected [...] or (...)"))?;
    if inner.trim().is_empty() {
        return Err(AttrError::parse(entry, "empty entry"));
    }
    split_top_level(inner, ',')
}

/// Splits on `separator` outside quotes and brackets.
fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AttrError::parse(text, "unbalanced brackets"))?;
            }
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(AttrError::parse(text, "unterminated quote"));
    }
    if depth != 0 {
        return Err(AttrError::parse(text, "unbalanced brackets"));
    }
    parts.push(text[start..].trim());

    if let Some(empty) = parts.iter().find(|p| p.is_empty()) {
        return Err(AttrError::parse(*empty, format!("empty element in '{}'", text)));
    }
    Ok(parts)
}

fn timestamp(text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| AttrError::parse(text, "not a number"))?;
    if value.is_nan() {
        return Err(AttrError::parse(text, "timestamp cannot be NaN"));
    }
    Ok(value)
}

fn interval(entry: &str, low: &str, high: &str) -> Result<Interval> {
    let low = timestamp(low)?;
    let high = timestamp(high)?;
    Interval::new(low, high).map_err(|e| AttrError::parse(entry, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_set() {
        let parsed = parse_interval_set("<[1, 2]; [3.5, 4]>").unwrap();
        assert_eq!(
            parsed,
            vec![Interval::new(1.0, 2.0).unwrap(), Interval::new(3.5, 4.0).unwrap()]
        );
        assert_eq!(format_interval_set(&parsed), "<[1.0, 2.0]; [3.5, 4.0]>");
    }

    #[test]
    fn test_open_bounds_normalised_to_closed() {
        let parsed = parse_interval_set("<(1, 2)>").unwrap();
        assert_eq!(parsed, vec![Interval::new(1.0, 2.0).unwrap()]);
        assert!(!parsed[0].is_low_excluded());

        let open = Interval::with_bounds(1.0, 2.0, true, true).unwrap();
        let text = format_interval_set(&[open]);
        assert_eq!(text, "<(1.0, 2.0)>");
        assert_ne!(parse_interval_set(&text).unwrap(), vec![open]);
    }

    #[test]
    fn test_interval_map_requires_value() {
        let parsed = parse_interval_map("<[1, 2, 'a']; [3, 4, \"b;c\"]>", ValueType::String).unwrap();
        assert_eq!(parsed[0].1, Value::from("a"));
        assert_eq!(parsed[1].1, Value::from("b;c"));
        assert_eq!(
            format_interval_map(&parsed),
            "<[1.0, 2.0, 'a']; [3.0, 4.0, 'b;c']>"
        );

        let err = parse_interval_map("<[1, 2, 5]; [3, 4]>", ValueType::Int).unwrap_err();
        match err {
            AttrError::Parse { input, reason } => {
                assert_eq!(input, "[3, 4]");
                assert_eq!(reason, "missing value");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_literals() {
        assert_eq!(parse_timestamp_set("<[1.0, 2.0, -3]>").unwrap(), vec![1.0, 2.0, -3.0]);
        assert_eq!(format_timestamp_set(&[1.0, 2.5]), "<[1.0, 2.5]>");

        let map = parse_timestamp_map("<[1.0, 12]; [2, -31]>", ValueType::Byte).unwrap();
        assert_eq!(map, vec![(1.0, Value::Byte(12)), (2.0, Value::Byte(-31))]);
        assert_eq!(format_timestamp_map(&map), "<[1.0, 12]; [2.0, -31]>");

        assert!(matches!(
            parse_timestamp_map("<[1.0]>", ValueType::Int),
            Err(AttrError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_collections() {
        assert!(parse_interval_set("<empty>").unwrap().is_empty());
        assert!(parse_timestamp_set("<>").unwrap().is_empty());
        assert_eq!(format_interval_set(&[]), "<empty>");
        assert_eq!(format_timestamp_set(&[]), "<empty>");
    }

    #[test]
    fn test_malformed_input() {
        for bad in ["[1, 2]", "<[1, 2>", "<[2, 1]>", "<[a, 2]>", "<[1, 2];>", "<[1, 2, 3, 4]>"] {
            assert!(
                matches!(parse_interval_set(bad), Err(AttrError::Parse { .. })),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(ValueType::Bool, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(parse_value(ValueType::Char, "'x'").unwrap(), Value::Char('x'));
        assert_eq!(parse_value(ValueType::String, "'it\\'s'").unwrap(), Value::from("it's"));
        assert_eq!(parse_value(ValueType::String, "plain").unwrap(), Value::from("plain"));
        assert!(parse_value(ValueType::Byte, "300").is_err());
        assert!(parse_value(ValueType::Char, "'xy'").is_err());
        assert_eq!(format_value(&Value::from("it's")), "'it\\'s'");
    }
}
