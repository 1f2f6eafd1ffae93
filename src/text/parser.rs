//! The text tokenizer/parser (spec.md §4.3): disambiguates objects from
//! arrays by look-ahead, classifies bare tokens as booleans/numbers/dates/
//! strings, and handles quoted values, HSV/RGB tuples, stray empty `{}`
//! blocks, and the optional header line.

use crate::bytes_util::{parse_date, parse_number};
use crate::error::{Error, Result};
use crate::peek::PeekReader;
use crate::text::intern::{StringCache, ValueCache};
use crate::value::Value;
use std::io::Read;
use std::rc::Rc;

const WHITESPACE: [u8; 4] = [0x09, 0x0A, 0x0D, 0x20];

fn is_ws(c: i32) -> bool {
    c >= 0 && WHITESPACE.contains(&(c as u8))
}

/// A bare token read into the 256-byte scratch area, as a stack value
/// (copy, not heap allocation) so it survives further reads that would
/// otherwise clobber a shared scratch buffer.
#[derive(Clone, Copy)]
struct Token {
    buf: [u8; 256],
    len: usize,
}

impl Token {
    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Consumes a peeking byte source and produces a `Value`.
pub struct TextParser<R> {
    source: PeekReader<R>,
    strings: StringCache,
    values: ValueCache,
    depth: usize,
    max_depth: usize,
}

impl<R: Read> TextParser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_depth(reader, 256)
    }

    pub fn with_max_depth(reader: R, max_depth: usize) -> Self {
        Self {
            source: PeekReader::new(reader),
            strings: StringCache::new(),
            values: ValueCache::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Parses the whole stream into a top-level `Record`, per spec.md §4.3.
    pub fn parse(mut self) -> Result<Value> {
        self.skip_ws();
        if self.source.peek() == -1 {
            return Ok(Value::Record(Vec::new()));
        }

        let first = self.read_bare_token();
        let next = self.source.peek();

        if next == 0x0D || next == 0x0A {
            // A solitary header line (or no header at all, if the stream
            // genuinely starts with whitespace only) precedes a sequence
            // of pairs; the already-read token is discarded.
            let mut pairs = Vec::new();
            self.parse_pairs_until(&mut pairs, None)?;
            self.strings.clear();
            self.values.clear();
            return Ok(Value::Record(pairs));
        }

        // The first token is the key of the first pair (there is no
        // separate header line in this stream).
        self.skip_ws();
        self.expect_equals()?;
        self.skip_ws();
        let first_key = self.strings.intern(first.as_bytes());
        let first_value = self.parse_value()?;
        let mut pairs = vec![(first_key, first_value)];
        self.parse_pairs_until(&mut pairs, None)?;
        self.strings.clear();
        self.values.clear();
        Ok(Value::Record(pairs))
    }

    fn skip_ws(&mut self) {
        while is_ws(self.source.peek()) {
            self.source.read();
        }
    }

    /// Consumes a required `=`.
    fn expect_equals(&mut self) -> Result<()> {
        let position = self.source.position();
        if self.source.read() != b'=' as i32 {
            return Err(Error::MissingEquals { position });
        }
        Ok(())
    }

    /// Consumes a required byte that is not `=` (braces, in practice).
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let position = self.source.position();
        let got = self.source.read();
        if got != expected as i32 {
            return Err(Error::UnexpectedToken {
                kind: format!("expected {:?}", expected as char),
                position,
            });
        }
        Ok(())
    }

    fn read_bare_token(&mut self) -> Token {
        let mut buf = [0u8; 256];
        let mut len = 0usize;
        loop {
            let c = self.source.peek();
            if c < 0 {
                break;
            }
            let b = c as u8;
            if is_ws(c) || b == b'}' {
                break;
            }
            if b == b'=' && len > 0 {
                break;
            }
            self.source.read();
            if len < buf.len() {
                buf[len] = b;
                len += 1;
            }
        }
        Token { buf, len }
    }

    /// `parse_pair`: skip ws; read key; require `=`; skip ws; parse value;
    /// skip ws.
    fn parse_pair(&mut self) -> Result<(Rc<str>, Value)> {
        self.skip_ws();
        let key_token = self.read_bare_token();
        let key = self.strings.intern(key_token.as_bytes());
        self.skip_ws();
        self.expect_equals()?;
        self.skip_ws();
        let value = self.parse_value()?;
        self.skip_ws();
        Ok((key, value))
    }

    /// Reads pairs (handling stray empty `{}` blocks) until `stop` is
    /// peeked, or until EOF if `stop` is `None`.
    fn parse_pairs_until(
        &mut self,
        pairs: &mut Vec<(Rc<str>, Value)>,
        stop: Option<u8>,
    ) -> Result<()> {
        loop {
            self.skip_ws();
            let next = self.source.peek();
            if next == -1 {
                break;
            }
            if let Some(s) = stop {
                if next == s as i32 {
                    break;
                }
            }
            if next == b'{' as i32 {
                self.skip_stray_block()?;
                continue;
            }
            pairs.push(self.parse_pair()?);
        }
        Ok(())
    }

    fn skip_stray_block(&mut self) -> Result<()> {
        self.source.read(); // consume leading '{'
        let mut depth = 1usize;
        while depth > 0 {
            match self.source.read() {
                -1 => break,
                c if c == b'{' as i32 => depth += 1,
                c if c == b'}' as i32 => depth -= 1,
                c if c == b'"' as i32 => {
                    while !matches!(self.source.read(), -1 | 0x22) {}
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `parse_value`: quote → quoted string; `{` → object/array; else →
    /// bare token narrowed.
    fn parse_value(&mut self) -> Result<Value> {
        match self.source.peek() {
            c if c == b'"' as i32 => self.parse_quoted_string(),
            c if c == b'{' as i32 => {
                self.enter_nesting()?;
                self.source.read();
                let value = self.parse_container()?;
                self.expect_closing_brace()?;
                self.depth -= 1;
                Ok(value)
            }
            _ => {
                let token = self.read_bare_token();
                self.classify(token)
            }
        }
    }

    fn enter_nesting(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.max_depth,
                position: self.source.position(),
            });
        }
        Ok(())
    }

    fn expect_closing_brace(&mut self) -> Result<()> {
        let position = self.source.position();
        if self.source.read() != b'}' as i32 {
            return Err(Error::UnexpectedToken {
                kind: "expected '}'".into(),
                position,
            });
        }
        Ok(())
    }

    fn parse_quoted_string(&mut self) -> Result<Value> {
        self.source.read(); // consume opening quote
        let mut bytes = Vec::new();
        loop {
            match self.source.read() {
                -1 => break,
                c if c == b'"' as i32 => break,
                c => bytes.push(c as u8),
            }
        }
        if let Some(date) = parse_date(&bytes, bytes.len()) {
            Ok(Value::Date(date))
        } else {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(Value::string(decoded.into_owned()))
        }
    }

    /// `parse_container`: entered immediately after the opening `{`.
    fn parse_container(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.source.peek() {
            c if c == b'}' as i32 => Ok(Value::Record(Vec::new())),
            c if c == b'"' as i32 => {
                let mut elems = Vec::new();
                loop {
                    self.skip_ws();
                    if self.source.peek() == b'}' as i32 {
                        break;
                    }
                    elems.push(self.parse_quoted_string()?);
                }
                Ok(Value::Array(elems))
            }
            c if c == b'{' as i32 => self.parse_container_nested_first(),
            _ => self.parse_container_bare_first(),
        }
    }

    /// First container element is itself a `{...}`: could be an empty
    /// record, a nested record, or a nested array (three subcases).
    fn parse_container_nested_first(&mut self) -> Result<Value> {
        self.source.read(); // consume inner '{'
        self.skip_ws();

        let first_elem = if self.source.peek() == b'}' as i32 {
            self.source.read();
            Value::Record(Vec::new())
        } else {
            let token = self.read_bare_token();
            self.skip_ws();
            if self.source.peek() == b'=' as i32 {
                self.source.read();
                self.skip_ws();
                let key = self.strings.intern(token.as_bytes());
                let value = self.parse_value()?;
                let mut pairs = vec![(key, value)];
                self.parse_pairs_until(&mut pairs, Some(b'}'))?;
                self.expect_closing_brace()?;
                Value::Record(pairs)
            } else {
                let first = self.classify(token)?;
                let mut elems = vec![first];
                self.parse_array_rest(&mut elems)?;
                self.expect_closing_brace()?;
                Value::Array(elems)
            }
        };

        let mut elems = vec![first_elem];
        self.parse_array_rest(&mut elems)?;
        Ok(Value::Array(elems))
    }

    /// First container element is a bare token: single-element array, an
    /// object keyed by it, or the first element of a plain array.
    fn parse_container_bare_first(&mut self) -> Result<Value> {
        let token = self.read_bare_token();
        self.skip_ws();
        match self.source.peek() {
            c if c == b'}' as i32 => {
                let value = self.classify(token)?;
                Ok(Value::Array(vec![value]))
            }
            c if c == b'=' as i32 => {
                self.source.read();
                self.skip_ws();
                let key = self.strings.intern(token.as_bytes());
                let value = self.parse_value()?;
                let mut pairs = vec![(key, value)];
                self.parse_pairs_until(&mut pairs, Some(b'}'))?;
                Ok(Value::Record(pairs))
            }
            _ => {
                let first = self.classify(token)?;
                let mut elems = vec![first];
                self.parse_array_rest(&mut elems)?;
                Ok(Value::Array(elems))
            }
        }
    }

    fn parse_array_rest(&mut self, elems: &mut Vec<Value>) -> Result<()> {
        loop {
            self.skip_ws();
            let next = self.source.peek();
            if next == b'}' as i32 || next == -1 {
                break;
            }
            elems.push(self.parse_value()?);
        }
        Ok(())
    }

    /// `narrow`: `hsv`/`rgb` consume a following tuple; everything else is
    /// classified by priority (bool → number → date → string).
    fn classify(&mut self, token: Token) -> Result<Value> {
        match token.as_bytes() {
            b"hsv" => self.parse_hsv(),
            b"rgb" => self.parse_rgb(),
            bytes => {
                if let Some(v) = self.values.get(bytes) {
                    return Ok(v);
                }
                let value = Self::classify_scalar(bytes);
                self.values.insert(bytes, value.clone());
                Ok(value)
            }
        }
    }

    fn classify_scalar(bytes: &[u8]) -> Value {
        match bytes {
            b"yes" => Value::Bool(true),
            b"no" => Value::Bool(false),
            _ => {
                if let Some(n) = parse_number(bytes, bytes.len()) {
                    Value::Number(n)
                } else if let Some(d) = parse_date(bytes, bytes.len()) {
                    Value::Date(d)
                } else {
                    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                    Value::string(decoded.into_owned())
                }
            }
        }
    }

    fn parse_hsv(&mut self) -> Result<Value> {
        self.skip_ws();
        self.expect_byte(b'{')?;
        self.skip_ws();
        let h = self.read_numeric_component()?;
        self.skip_ws();
        let s = self.read_numeric_component()?;
        self.skip_ws();
        let v = self.read_numeric_component()?;
        self.skip_ws();
        self.expect_byte(b'}')?;
        Ok(Value::Hsv(h, s, v))
    }

    fn parse_rgb(&mut self) -> Result<Value> {
        self.skip_ws();
        self.expect_byte(b'{')?;
        self.skip_ws();
        let r = self.read_numeric_component()?;
        self.skip_ws();
        let g = self.read_numeric_component()?;
        self.skip_ws();
        let b = self.read_numeric_component()?;
        self.skip_ws();
        self.expect_byte(b'}')?;
        Ok(Value::Rgb(r as u8, g as u8, b as u8))
    }

    fn read_numeric_component(&mut self) -> Result<f64> {
        let position = self.source.position();
        let token = self.read_bare_token();
        parse_number(token.as_bytes(), token.len).ok_or(Error::UnexpectedToken {
            kind: "expected a numeric hsv/rgb component".into(),
            position,
        })
    }
}

/// Parses raw bytes (any mix of Windows-1252 text) into a `Value`.
pub fn parse_text(bytes: &[u8]) -> Result<Value> {
    parse_text_with_max_depth(bytes, 256)
}

pub fn parse_text_with_max_depth(bytes: &[u8], max_depth: usize) -> Result<Value> {
    let cursor = std::io::Cursor::new(bytes);
    TextParser::with_max_depth(cursor, max_depth).parse()
}

/// As `parse_text`, honoring `options.max_depth()`.
pub fn parse_text_with_options(bytes: &[u8], options: &crate::options::ParserOptions) -> Result<Value> {
    parse_text_with_max_depth(bytes, options.max_depth())
}
