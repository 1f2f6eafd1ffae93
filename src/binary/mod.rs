//! The tagged binary token-stream parser, C5.

mod parser;
mod token;

pub use parser::{
    load_binary, load_binary_with_options, parse_binary, parse_binary_with_max_depth,
    parse_binary_with_options, BinaryParser,
};
pub use token::{NoLookup, Token, TokenLookup, TokenReader};
