use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("range start ({start:#X}) exceeds end ({end:#X})")]
    StartExceedsEnd { start: u64, end: u64 },
}

/// A half-open memory address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: u64,
    end: u64,
}

impl AddressRange {
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartExceedsEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}..{:#010X}", self.start, self.end)
    }
}

/// Parse an address or byte value.
///
/// Accepts `0x`/`0X` hex, `0b`/`0B` binary, a trailing `h`/`H` for hex and plain
/// decimal. Underscores may be used as digit separators.
pub fn parse_number(s: &str) -> Result<u64, RangeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(RangeError::InvalidNumber("empty string".to_string()));
    }

    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (2, bin)
    } else if let Some(hex) = s.strip_suffix('h').or_else(|| s.strip_suffix('H')) {
        (16, hex)
    } else {
        (10, s)
    };

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(RangeError::InvalidNumber(format!("no digits in '{s}'")));
    }

    u64::from_str_radix(&cleaned, radix)
        .map_err(|e| RangeError::InvalidNumber(format!("'{s}': {e}")))
}

/// Parse a single byte value, such as a pad byte.
pub fn parse_byte(s: &str) -> Result<u8, RangeError> {
    let value = parse_number(s)?;
    u8::try_from(value)
        .map_err(|_| RangeError::InvalidNumber(format!("'{s}' does not fit in a byte")))
}
