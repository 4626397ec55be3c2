use crate::Chunk;
use crate::io::ParseError;

/// Wrap a raw binary blob as a single chunk at its load address.
///
/// Raw binaries carry no address information, so the caller must supply one.
pub fn load_binary(data: Vec<u8>, load_address: Option<u64>) -> Result<Chunk, ParseError> {
    let address = load_address.ok_or(ParseError::MissingAddress)?;

    address.checked_add(data.len() as u64).ok_or_else(|| {
        ParseError::AddressOverflow(format!("{:#X} + {} exceeds u64", address, data.len()))
    })?;

    Ok(Chunk::new(address, data))
}
