//! The tagged binary token-stream parser, C5.
//!
//! Structurally this is the same object/array recursive descent as
//! `text::parser`, but driven by opcodes instead of punctuation: an
//! `OpenGroup`/`EndGroup` pair replaces `{`/`}`, and the look-ahead that
//! used to be a raw byte peek is now "decode one more token and see what
//! it is".

use crate::binary::token::{Token, TokenLookup, TokenReader};
use crate::error::{Error, Result};
use crate::value::{Date, Value};
use std::rc::Rc;

const DEFAULT_MAX_DEPTH: usize = 256;

/// The smallest integer that decodes as a hidden date (year 0, day 0, hour 0).
const HIDDEN_DATE_MIN: i64 = 43_808_760;
/// One past the largest integer that decodes as a hidden date.
const HIDDEN_DATE_MAX: i64 = 131_408_760;

const DAYS_IN_MONTH: [u16; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Decodes an integer in `[HIDDEN_DATE_MIN, HIDDEN_DATE_MAX)` as a date.
///
/// The encoding is hours elapsed since a fixed epoch, using the engine's
/// own 365-day, no-leap-year calendar: `hours = n % 24`, the remaining
/// quotient splits into `days` (day of year, 0-based) and whole elapsed
/// years since the epoch; the calendar year is one past that count (see
/// DESIGN.md for the open question this resolves). In the epoch year
/// itself (`years == 0`) the day-of-year is not applied to month/day —
/// an engine quirk preserved verbatim, so every hidden date in that year
/// reads as `1.1` regardless of `day_of_year`.
fn decode_hidden_date(n: i64) -> Option<Date> {
    if !(HIDDEN_DATE_MIN..HIDDEN_DATE_MAX).contains(&n) {
        return None;
    }
    let hours = (n % 24) as u32;
    let total_days = n / 24;
    let day_of_year = (total_days % 365) as u16;
    let years = total_days / 365 - 5001;
    let year = (years + 1) as u32;

    let (month, day) = if years == 0 {
        (1u32, 1u32)
    } else {
        let mut remaining = day_of_year;
        let mut month = 1u32;
        for &len in DAYS_IN_MONTH.iter() {
            if remaining < len {
                break;
            }
            remaining -= len;
            month += 1;
        }
        (month, (remaining + 1) as u32)
    };
    let hour = if hours == 0 { None } else { Some(hours) };

    Date::new(year, month, day, hour)
}

/// Converts a raw signed 32-bit payload to a `Value`, applying the hidden
/// date heuristic before falling back to a plain number.
fn int_to_value(n: i32) -> Value {
    let widened = n as i64;
    if let Some(date) = decode_hidden_date(widened) {
        return Value::Date(date);
    }
    Value::Number(n as f64)
}

fn identifier_from_token(token: Token, position: u64) -> Result<Rc<str>> {
    match token {
        Token::Str(s) => Ok(s),
        Token::TokenName(s) => Ok(s),
        Token::Int(n) => Ok(Rc::from(n.to_string())),
        Token::Uint(n) => Ok(Rc::from(n.to_string())),
        _ => Err(Error::MissingIdentifier { position }),
    }
}

/// Parses the binary token stream, with a caller-supplied id-to-name
/// dictionary for opcodes that are not among the fixed set.
pub struct BinaryParser<'a, L> {
    reader: TokenReader<'a>,
    lookup: L,
    depth: usize,
    max_depth: usize,
    strict_tokens: bool,
}

impl<'a, L: TokenLookup> BinaryParser<'a, L> {
    pub fn new(data: &'a [u8], lookup: L) -> Self {
        Self::with_max_depth(data, lookup, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(data: &'a [u8], lookup: L, max_depth: usize) -> Self {
        Self {
            reader: TokenReader::new(data),
            lookup,
            depth: 0,
            max_depth,
            strict_tokens: false,
        }
    }

    pub fn from_options(data: &'a [u8], lookup: L, options: &crate::options::ParserOptions) -> Self {
        Self {
            reader: TokenReader::new(data),
            lookup,
            depth: 0,
            max_depth: options.max_depth(),
            strict_tokens: options.is_strict_tokens(),
        }
    }

    fn next_token(&mut self) -> Result<(Token, u64)> {
        self.reader.read_token_checked(&self.lookup, self.strict_tokens)
    }

    fn enter_nesting(&mut self, position: u64) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.max_depth,
                position,
            });
        }
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    /// Parses the whole stream as the document root.
    ///
    /// Until the stream is exhausted: read an identifier token, require
    /// `Equals`, then read and parse the value. A stray `OpenGroup`
    /// where an identifier was expected is treated as an empty group
    /// sitting between top-level pairs and skipped.
    pub fn parse_top_object(&mut self) -> Result<Value> {
        let mut pairs = Vec::new();
        while !self.reader.is_at_end() {
            let (token, position) = self.next_token()?;
            if matches!(token, Token::OpenGroup) {
                let (next, next_position) = self.next_token()?;
                if !matches!(next, Token::EndGroup) {
                    return Err(Error::UnexpectedToken {
                        kind: next.kind_name().to_string(),
                        position: next_position,
                    });
                }
                continue;
            }
            let key = identifier_from_token(token, position)?;
            self.expect_equals()?;
            let (value_token, value_position) = self.next_token()?;
            let value = self.parse_value(value_token, value_position)?;
            pairs.push((key, value));
        }
        Ok(Value::Record(pairs))
    }

    fn expect_equals(&mut self) -> Result<()> {
        let (token, position) = self.next_token()?;
        match token {
            Token::Equals => Ok(()),
            other => Err(Error::UnexpectedToken {
                kind: other.kind_name().to_string(),
                position,
            }),
        }
    }

    fn parse_value(&mut self, token: Token, position: u64) -> Result<Value> {
        match token {
            Token::Int(n) => Ok(int_to_value(n)),
            Token::Uint(n) => Ok(Value::Number(n as f64)),
            Token::Float(f) => Ok(Value::Number(f)),
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::Str(s) => Ok(Value::String(s)),
            Token::TokenName(s) => Ok(Value::String(s)),
            Token::OpenGroup => self.parse_subgroup(position),
            other => Err(Error::UnexpectedToken {
                kind: other.kind_name().to_string(),
                position,
            }),
        }
    }

    /// Parses the body of a group after its opening `OpenGroup` has been
    /// consumed. Disambiguates object-vs-array the same way the text
    /// parser does: decode the first token, then look at what follows it.
    fn parse_subgroup(&mut self, open_position: u64) -> Result<Value> {
        self.enter_nesting(open_position)?;
        let result = self.parse_subgroup_inner();
        self.exit_nesting();
        result
    }

    fn parse_subgroup_inner(&mut self) -> Result<Value> {
        let (first, first_position) = self.next_token()?;
        if matches!(first, Token::EndGroup) {
            return Ok(Value::Record(Vec::new()));
        }

        let (second, second_position) = self.next_token()?;
        if matches!(second, Token::Equals) {
            let key = identifier_from_token(first, first_position)?;
            let (value_token, value_position) = self.next_token()?;
            let value = self.parse_value(value_token, value_position)?;
            return self.parse_object(vec![(key, value)]);
        }

        let mut elements = vec![self.parse_value(first, first_position)?];
        self.parse_array_rest(second, second_position, &mut elements)?;
        Ok(Value::Array(elements))
    }

    fn parse_object(&mut self, mut pairs: Vec<(Rc<str>, Value)>) -> Result<Value> {
        loop {
            let (token, position) = self.next_token()?;
            if matches!(token, Token::EndGroup) {
                return Ok(Value::Record(pairs));
            }
            let key = identifier_from_token(token, position)?;
            self.expect_equals()?;
            let (value_token, value_position) = self.next_token()?;
            let value = self.parse_value(value_token, value_position)?;
            pairs.push((key, value));
        }
    }

    fn parse_array_rest(
        &mut self,
        mut pending: Token,
        mut pending_position: u64,
        elements: &mut Vec<Value>,
    ) -> Result<()> {
        loop {
            if matches!(pending, Token::EndGroup) {
                return Ok(());
            }
            elements.push(self.parse_value(pending, pending_position)?);
            let (next, next_position) = self.next_token()?;
            pending = next;
            pending_position = next_position;
        }
    }
}

/// Parses a binary stream as the document root with the default nesting
/// limit, using `lookup` to resolve token ids with no fixed opcode.
pub fn parse_binary(data: &[u8], lookup: impl TokenLookup) -> Result<Value> {
    BinaryParser::new(data, lookup).parse_top_object()
}

/// As `parse_binary`, with an explicit nesting limit.
pub fn parse_binary_with_max_depth(
    data: &[u8],
    lookup: impl TokenLookup,
    max_depth: usize,
) -> Result<Value> {
    BinaryParser::with_max_depth(data, lookup, max_depth).parse_top_object()
}

/// As `parse_binary`, honoring `options.max_depth()` and
/// `options.is_strict_tokens()`.
pub fn parse_binary_with_options(
    data: &[u8],
    lookup: impl TokenLookup,
    options: &crate::options::ParserOptions,
) -> Result<Value> {
    BinaryParser::from_options(data, lookup, options).parse_top_object()
}

/// As `parse_binary`, but first validates an optional expected header.
///
/// If `expected_header` is `Some`, the leading `expected_header.len()`
/// bytes of `data` must match it exactly; a mismatch is a fatal
/// `Error::InvalidHeader` rather than a parse attempt on the wrong bytes.
/// With `None`, this is identical to `parse_binary`.
pub fn load_binary(
    data: &[u8],
    lookup: impl TokenLookup,
    expected_header: Option<&[u8]>,
) -> Result<Value> {
    let remainder = match expected_header {
        Some(expected) => {
            let found_len = expected.len().min(data.len());
            if data.len() < expected.len() || &data[..expected.len()] != expected {
                return Err(Error::InvalidHeader {
                    expected: String::from_utf8_lossy(expected).into_owned(),
                    found: String::from_utf8_lossy(&data[..found_len]).into_owned(),
                });
            }
            &data[expected.len()..]
        }
        None => data,
    };
    parse_binary(remainder, lookup)
}

/// As `load_binary`, honoring `options.max_depth()` and
/// `options.is_strict_tokens()`.
pub fn load_binary_with_options(
    data: &[u8],
    lookup: impl TokenLookup,
    expected_header: Option<&[u8]>,
    options: &crate::options::ParserOptions,
) -> Result<Value> {
    let remainder = match expected_header {
        Some(expected) => {
            let found_len = expected.len().min(data.len());
            if data.len() < expected.len() || &data[..expected.len()] != expected {
                return Err(Error::InvalidHeader {
                    expected: String::from_utf8_lossy(expected).into_owned(),
                    found: String::from_utf8_lossy(&data[..found_len]).into_owned(),
                });
            }
            &data[expected.len()..]
        }
        None => data,
    };
    parse_binary_with_options(remainder, lookup, options)
}
