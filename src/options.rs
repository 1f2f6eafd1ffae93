//! Parser configuration shared by the text and binary front ends.

const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables for both parsers. Consuming-builder style: each setter takes
/// and returns `Self` so callers chain from a default.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    max_depth: usize,
    strict_tokens: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_tokens: false,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps recursive-descent nesting; exceeding it is a catchable
    /// `DepthLimitExceeded` rather than a stack overflow.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// When set, an unresolved binary token id is a hard error instead of
    /// falling back to its decimal string.
    pub fn strict_tokens(mut self, strict: bool) -> Self {
        self.strict_tokens = strict;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_strict_tokens(&self) -> bool {
        self.strict_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let opts = ParserOptions::default();
        assert_eq!(opts.max_depth(), 256);
        assert!(!opts.is_strict_tokens());
    }

    #[test]
    fn builder_chains() {
        let opts = ParserOptions::new().with_max_depth(8).strict_tokens(true);
        assert_eq!(opts.max_depth(), 8);
        assert!(opts.is_strict_tokens());
    }
}
