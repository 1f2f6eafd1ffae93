//! Text serialization, C7 — the inverse of `text::parser`, minus any
//! attempt to reproduce the exact whitespace of a hand-written save.

use crate::error::{Error, Result};
use crate::value::{Date, Value};
use std::io::Write;

/// Serializes `value` as a top-level record to `writer`. Returns
/// `Error::Serialize` if `value` is not a `Record` — every document this
/// format can express is one at the top level.
pub fn save<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Record(pairs) => {
            for (key, v) in pairs {
                write_pair(writer, key, v)?;
            }
            Ok(())
        }
        _ => Err(Error::Serialize(
            "document root must be a record".to_string(),
        )),
    }
}

/// As `save`, returning the serialized text as a `String`.
pub fn save_to_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    save(&mut buf, value)?;
    String::from_utf8(buf).map_err(|e| Error::Serialize(e.to_string()))
}

fn write_pair<W: Write>(writer: &mut W, key: &str, value: &Value) -> Result<()> {
    write!(writer, "{key}=")?;
    write_value(writer, value)?;
    Ok(())
}

fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Bool(b) => writeln!(writer, "{}", if *b { "yes" } else { "no" })?,
        Value::Number(n) => writeln!(writer, "{:.3}", n)?,
        Value::Date(d) => {
            writeln!(writer, "{}", format_date(d))?;
        }
        Value::String(s) => writeln!(writer, "\"{s}\"")?,
        Value::Hsv(h, s, v) => writeln!(writer, "hsv {{ {h} {s} {v} }}")?,
        Value::Rgb(r, g, b) => writeln!(writer, "rgb {{ {r} {g} {b} }}")?,
        Value::Array(items) => {
            write!(writer, "{{ ")?;
            for item in items {
                write_inline_value(writer, item)?;
                write!(writer, " ")?;
            }
            writeln!(writer, "}}")?;
        }
        Value::Record(pairs) => {
            writeln!(writer, "{{")?;
            for (key, v) in pairs {
                write_pair(writer, key, v)?;
            }
            write!(writer, "}}")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Writes a value with no trailing newline, for use inside an array.
fn write_inline_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Bool(b) => write!(writer, "{}", if *b { "yes" } else { "no" })?,
        Value::Number(n) => write!(writer, "{:.3}", n)?,
        Value::Date(d) => write!(writer, "{}", format_date(d))?,
        Value::String(s) => write!(writer, "\"{s}\"")?,
        Value::Hsv(h, s, v) => write!(writer, "hsv {{ {h} {s} {v} }}")?,
        Value::Rgb(r, g, b) => write!(writer, "rgb {{ {r} {g} {b} }}")?,
        Value::Array(items) => {
            write!(writer, "{{ ")?;
            for item in items {
                write_inline_value(writer, item)?;
                write!(writer, " ")?;
            }
            write!(writer, "}}")?;
        }
        Value::Record(pairs) => {
            write!(writer, "{{ ")?;
            for (key, v) in pairs {
                write!(writer, "{key}=")?;
                write_inline_value(writer, v)?;
                write!(writer, " ")?;
            }
            write!(writer, "}}")?;
        }
    }
    Ok(())
}

/// `Y.M.D` or `Y.M.D.H`, with no zero-padding on any field.
fn format_date(d: &Date) -> String {
    match d.hour {
        Some(h) => format!("{}.{}.{}.{}", d.year, d.month, d.day, h),
        None => format!("{}.{}.{}", d.year, d.month, d.day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn serializes_scalars() {
        let record = Value::Record(vec![
            (Rc::from("flag"), Value::Bool(true)),
            (Rc::from("amount"), Value::Number(1.5)),
            (Rc::from("name"), Value::string("foo")),
            (
                Rc::from("when"),
                Value::Date(Date::new(1444, 11, 11, None).unwrap()),
            ),
        ]);
        let text = save_to_string(&record).unwrap();
        assert!(text.contains("flag=yes\n"));
        assert!(text.contains("amount=1.500\n"));
        assert!(text.contains("name=\"foo\"\n"));
        assert!(text.contains("when=1444.11.11\n"));
    }

    #[test]
    fn rejects_non_record_root() {
        let err = save_to_string(&Value::Bool(true)).unwrap_err();
        assert!(matches!(err, Error::Serialize(_)));
    }

    #[test]
    fn serializes_nested_array_and_record() {
        let inner = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let record = Value::Record(vec![(Rc::from("list"), inner)]);
        let text = save_to_string(&record).unwrap();
        assert!(text.contains("list={ 1.000 2.000 }"));
    }

    #[test]
    fn hsv_and_rgb_round_trip_through_the_text_parser() {
        let record = Value::Record(vec![
            (Rc::from("color"), Value::Hsv(0.5, 1.0, 1.0)),
            (Rc::from("tint"), Value::Rgb(255, 0, 10)),
        ]);
        let text = save_to_string(&record).unwrap();
        assert!(text.contains("color=hsv { 0.5 1 1 }\n"));
        assert!(text.contains("tint=rgb { 255 0 10 }\n"));

        let reparsed = crate::text::parse_text(text.as_bytes()).unwrap();
        assert!(matches!(reparsed.get("color").unwrap(), Value::Hsv(..)));
        assert!(matches!(reparsed.get("tint").unwrap(), Value::Rgb(..)));
    }
}
