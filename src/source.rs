//! Input descriptions and the format dispatch at the edge of the merge engine.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::Chunk;
use crate::io::{ParseError, load_binary, parse_intel_hex};
use crate::range::parse_number;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unrecognized input type: {}", .0.display())]
    UnrecognizedSource(PathBuf),

    #[error("invalid load address in '{token}': {message}")]
    InvalidAddress { token: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    IntelHex,
    Binary,
}

impl SourceFormat {
    /// Infer the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "hex" | "ihex" | "ihx" => Some(Self::IntelHex),
            "bin" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// A decoder selected for one input. Binary sources always carry their
/// load address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Hex,
    Bin { load_address: u64 },
}

impl Source {
    pub fn new(format: SourceFormat, load_address: Option<u64>) -> Result<Self, ParseError> {
        match format {
            SourceFormat::IntelHex => Ok(Self::Hex),
            SourceFormat::Binary => {
                let load_address = load_address.ok_or(ParseError::MissingAddress)?;
                Ok(Self::Bin { load_address })
            }
        }
    }

    pub fn decode(&self, data: Vec<u8>) -> Result<Vec<Chunk>, ParseError> {
        match *self {
            Self::Hex => parse_intel_hex(&data),
            Self::Bin { load_address } => Ok(vec![load_binary(data, Some(load_address))?]),
        }
    }
}

/// One input as given by the caller: `path[@address]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub path: PathBuf,
    /// Overrides extension-based detection when set.
    pub format: Option<SourceFormat>,
    pub load_address: Option<u64>,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            load_address: None,
        }
    }

    pub fn with_load_address(mut self, address: u64) -> Self {
        self.load_address = Some(address);
        self
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn resolve_format(&self) -> Option<SourceFormat> {
        self.format.or_else(|| SourceFormat::from_path(&self.path))
    }
}

impl FromStr for InputSpec {
    type Err = SourceError;

    /// Splits on the last `@`, so `app.bin@0x08004000` loads `app.bin` at
    /// `0x08004000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((path, address)) = s.rsplit_once('@') else {
            return Ok(Self::new(s));
        };
        let load_address = parse_number(address).map_err(|e| SourceError::InvalidAddress {
            token: s.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(path).with_load_address(load_address))
    }
}
