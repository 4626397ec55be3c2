mod binary;
mod error;
mod intel_hex;

pub use binary::load_binary;
pub use error::ParseError;
pub use intel_hex::{HexRecords, decode_intel_hex, parse_intel_hex};
