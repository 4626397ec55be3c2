use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("invalid hex digit at line {line}: {char:?}")]
    InvalidHexDigit { line: usize, char: char },

    #[error("binary input requires a load address (use <file>@<address>)")]
    MissingAddress,

    #[error("address overflow: {0}")]
    AddressOverflow(String),
}
