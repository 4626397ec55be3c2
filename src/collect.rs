//! Reads every input through its decoder, skipping the ones that cannot be used.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::source::{InputSpec, Source, SourceError};
use crate::{Chunk, Error};

/// Where input bytes come from.
pub trait ReadProvider {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads inputs from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProvider;

impl ReadProvider for FsProvider {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Serves inputs from memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl ReadProvider for MemoryProvider {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not in memory", path.display()),
            )
        })
    }
}

/// An input left out of the image, and why.
#[derive(Debug)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: SourceError,
}

/// Chunks gathered from all usable inputs.
#[derive(Debug, Default)]
pub struct Collected {
    pub chunks: Vec<Chunk>,
    pub skipped: Vec<SkippedInput>,
}

/// Decode each input in order.
///
/// Missing files and unrecognized formats are recorded and skipped. A binary
/// without a load address, a malformed HEX record or a read failure aborts.
pub fn collect_chunks(
    inputs: &[InputSpec],
    provider: &impl ReadProvider,
) -> Result<Collected, Error> {
    let mut collected = Collected::default();

    for input in inputs {
        let path = &input.path;
        if !provider.exists(path) {
            let reason = SourceError::MissingFile(path.clone());
            log::warn!("skipping: {reason}");
            collected.skipped.push(SkippedInput {
                path: path.clone(),
                reason,
            });
            continue;
        }

        let Some(format) = input.resolve_format() else {
            let reason = SourceError::UnrecognizedSource(path.clone());
            log::warn!("skipping: {reason}");
            collected.skipped.push(SkippedInput {
                path: path.clone(),
                reason,
            });
            continue;
        };

        let source = Source::new(format, input.load_address).map_err(|source| Error::Input {
            path: path.clone(),
            source,
        })?;
        if source == Source::Hex && input.load_address.is_some() {
            log::debug!("{}: load address ignored for HEX input", path.display());
        }

        let data = provider.read(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        let chunks = source.decode(data).map_err(|source| Error::Input {
            path: path.clone(),
            source,
        })?;

        log::debug!(
            "{}: {} chunk(s), {} bytes",
            path.display(),
            chunks.len(),
            chunks.iter().map(Chunk::len).sum::<usize>()
        );
        collected.chunks.extend(chunks);
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;

    const APP_HEX: &[u8] = b":020000040800F2\n\
                             :1000100000112233445566778899AABBCCDDEEFFE8\n\
                             :00000001FF\n";

    #[test]
    fn test_collects_hex_and_binary() {
        let provider = MemoryProvider::new()
            .with_file("app.hex", APP_HEX)
            .with_file("boot.bin", vec![0x00; 16]);
        let inputs = vec![
            InputSpec::new("app.hex"),
            InputSpec::new("boot.bin").with_load_address(0x0800_0000),
        ];
        let collected = collect_chunks(&inputs, &provider).unwrap();
        assert!(collected.skipped.is_empty());
        assert_eq!(collected.chunks.len(), 2);
        assert_eq!(collected.chunks[0].address, 0x0800_0010);
        assert_eq!(collected.chunks[1].address, 0x0800_0000);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let provider = MemoryProvider::new().with_file("app.hex", APP_HEX);
        let inputs = vec![InputSpec::new("gone.hex"), InputSpec::new("app.hex")];
        let collected = collect_chunks(&inputs, &provider).unwrap();
        assert_eq!(collected.chunks.len(), 1);
        assert_eq!(collected.skipped.len(), 1);
        assert!(matches!(
            collected.skipped[0].reason,
            SourceError::MissingFile(_)
        ));
    }

    #[test]
    fn test_unknown_extension_is_skipped() {
        let provider = MemoryProvider::new().with_file("notes.txt", b"hello".to_vec());
        let collected = collect_chunks(&[InputSpec::new("notes.txt")], &provider).unwrap();
        assert!(collected.chunks.is_empty());
        assert!(matches!(
            collected.skipped[0].reason,
            SourceError::UnrecognizedSource(_)
        ));
    }

    #[test]
    fn test_binary_without_address_aborts() {
        let provider = MemoryProvider::new().with_file("boot.bin", vec![0x00; 4]);
        let result = collect_chunks(&[InputSpec::new("boot.bin")], &provider);
        assert!(matches!(
            result,
            Err(Error::Input {
                source: ParseError::MissingAddress,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_hex_aborts() {
        let provider = MemoryProvider::new().with_file("bad.hex", b":0400000000\n".to_vec());
        let result = collect_chunks(&[InputSpec::new("bad.hex")], &provider);
        assert!(matches!(
            result,
            Err(Error::Input {
                source: ParseError::InvalidRecord { line: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_format_override_reads_any_name() {
        let provider = MemoryProvider::new().with_file("blob.dat", vec![0x5A; 2]);
        let inputs = vec![
            InputSpec::new("blob.dat")
                .with_format(crate::SourceFormat::Binary)
                .with_load_address(0x20),
        ];
        let collected = collect_chunks(&inputs, &provider).unwrap();
        assert_eq!(collected.chunks, vec![Chunk::new(0x20, vec![0x5A, 0x5A])]);
    }
}
