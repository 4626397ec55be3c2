use std::iter::{Enumerate, FusedIterator};
use std::str::Lines;

use super::ParseError;
use crate::Chunk;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;
const RECORD_EXTENDED_LINEAR: u8 = 0x04;

/// Hex digits in the `CCAAAATT` record header.
const HEADER_DIGITS: usize = 8;

/// A single decoded record. Only the types that affect the image are kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Record {
    Data { address: u16, payload: Vec<u8> },
    ExtendedLinear(u16),
    Eof,
    Ignored(u8),
}

/// Lazy sequence of data chunks decoded from Intel-HEX text.
///
/// Each value owns its own extended linear address register, so decoding the
/// same text again starts from a zero base. The sequence stops at the first
/// EOF record or the first malformed record.
#[derive(Debug)]
pub struct HexRecords<'a> {
    lines: Enumerate<Lines<'a>>,
    extended_address: u64,
    done: bool,
}

/// Decode Intel-HEX text into absolute-address chunks.
pub fn decode_intel_hex(text: &str) -> HexRecords<'_> {
    HexRecords {
        lines: text.lines().enumerate(),
        extended_address: 0,
        done: false,
    }
}

/// Decode a whole Intel-HEX input. Bytes that are not valid UTF-8 are replaced,
/// which only matters on lines that are not records.
pub fn parse_intel_hex(input: &[u8]) -> Result<Vec<Chunk>, ParseError> {
    let text = String::from_utf8_lossy(input);
    decode_intel_hex(&text).collect()
}

impl Iterator for HexRecords<'_> {
    type Item = Result<Chunk, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for (index, line) in self.lines.by_ref() {
            let line_num = index + 1;
            let Some(body) = line.trim().strip_prefix(':') else {
                continue;
            };

            match parse_record(body.as_bytes(), line_num) {
                Ok(Record::Data { address, payload }) => {
                    let address = self.extended_address + u64::from(address);
                    return Some(Ok(Chunk::new(address, payload)));
                }
                Ok(Record::ExtendedLinear(upper)) => {
                    self.extended_address = u64::from(upper) << 16;
                }
                Ok(Record::Eof) => break,
                Ok(Record::Ignored(record_type)) => {
                    log::trace!("line {line_num}: ignoring record type {record_type:02X}");
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        self.done = true;
        None
    }
}

impl FusedIterator for HexRecords<'_> {}

/// Parse the part of a record after the `:` marker. The trailing checksum is
/// not read.
fn parse_record(body: &[u8], line_num: usize) -> Result<Record, ParseError> {
    if body.len() < HEADER_DIGITS {
        return Err(ParseError::InvalidRecord {
            line: line_num,
            message: "record too short".to_string(),
        });
    }

    let header = parse_hex_bytes(&body[..HEADER_DIGITS], line_num)?;
    let byte_count = header[0] as usize;
    let address = u16::from_be_bytes([header[1], header[2]]);
    let record_type = header[3];

    let payload_end = HEADER_DIGITS + byte_count * 2;
    if body.len() < payload_end {
        return Err(ParseError::InvalidRecord {
            line: line_num,
            message: format!(
                "truncated payload: header says {} bytes, record has {} hex digits",
                byte_count,
                body.len() - HEADER_DIGITS,
            ),
        });
    }
    let payload = parse_hex_bytes(&body[HEADER_DIGITS..payload_end], line_num)?;

    match record_type {
        RECORD_DATA => Ok(Record::Data { address, payload }),
        RECORD_EOF => Ok(Record::Eof),
        RECORD_EXTENDED_LINEAR => {
            let [high, low] = payload[..] else {
                return Err(ParseError::InvalidRecord {
                    line: line_num,
                    message: "extended linear address must have 2 data bytes".to_string(),
                });
            };
            Ok(Record::ExtendedLinear(u16::from_be_bytes([high, low])))
        }
        other => Ok(Record::Ignored(other)),
    }
}

fn parse_hex_bytes(digits: &[u8], line_num: usize) -> Result<Vec<u8>, ParseError> {
    debug_assert!(digits.len().is_multiple_of(2));
    digits
        .chunks_exact(2)
        .map(|pair| -> Result<u8, ParseError> {
            Ok((hex_digit(pair[0], line_num)? << 4) | hex_digit(pair[1], line_num)?)
        })
        .collect()
}

fn hex_digit(b: u8, line_num: usize) -> Result<u8, ParseError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(ParseError::InvalidHexDigit {
            line: line_num,
            char: b as char,
        }),
    }
}
