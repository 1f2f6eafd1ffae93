//! # clausewitz-tree
//!
//! A parser and value tree for the Clausewitz engine's text and binary
//! configuration/savegame format (EU4, CK2, HoI and related Paradox
//! titles): the human-readable `key=value` script form, the tagged
//! binary token stream used by Ironman saves, and the ZIP wrapper both
//! can arrive in.
//!
//! ## Quick start
//!
//! ```no_run
//! use clausewitz_tree::{parse_text, Value};
//!
//! fn main() -> clausewitz_tree::Result<()> {
//!     let value = parse_text(b"tag=FRA\ncapital=123\n")?;
//!     let tag = value.get("tag")?.as_str();
//!     println!("{:?}", tag);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`text`]: the text tokenizer/parser
//! - [`binary`]: the tagged binary token-stream parser
//! - [`loader`]: ZIP unwrapping and header-sniff dispatch between the two
//! - [`serializer`]: writes a [`Value`] back out in text form
//! - [`accessors`]: typed lookups over a parsed [`Value`] tree
//! - [`value`]: the shared [`Value`]/[`Date`](value::Date) model

pub mod accessors;
pub mod binary;
pub mod bytes_util;
pub mod error;
pub mod loader;
pub mod options;
pub mod peek;
pub mod serializer;
pub mod text;
pub mod value;

pub use binary::{
    load_binary, load_binary_with_options, parse_binary, parse_binary_with_max_depth,
    parse_binary_with_options, NoLookup, TokenLookup,
};
pub use error::{Error, Result};
pub use loader::{load, load_bytes, load_text_bytes};
pub use options::ParserOptions;
pub use serializer::{save, save_to_string};
pub use text::{parse_text, parse_text_with_max_depth, parse_text_with_options};
pub use value::{Date, Value};

#[cfg(feature = "serde")]
pub use value::to_json_string;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_reserializes_a_small_document() {
        let value = parse_text(b"tag=FRA\nflag=yes\n").unwrap();
        assert_eq!(value.get("tag").unwrap().as_str(), Some("FRA"));
        assert_eq!(value.get("flag").unwrap().as_bool(), Some(true));

        let text = save_to_string(&value).unwrap();
        assert!(text.contains("tag=\"FRA\"\n"));
        assert!(text.contains("flag=yes\n"));
    }

    #[test]
    fn end_to_end_zip_wrapped_text() {
        let value = load_text_bytes(b"owner=FRA\n").unwrap();
        assert!(value.is_record());
    }
}
