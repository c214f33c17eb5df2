use thiserror::Error;

/// A flag token list that cannot be folded into a `Configuration`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid value `{value}` for flag {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("flag {flag} requires a value")]
    MissingValue { flag: String },
}

/// Bracketed input that does not describe a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("no tree found in input")]
    Empty,

    #[error("malformed bracketing at byte {offset}")]
    Malformed { offset: usize },

    #[error("unexpected input after tree at byte {offset}")]
    Trailing { offset: usize },
}
