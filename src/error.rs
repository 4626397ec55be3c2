use std::path::PathBuf;

use thiserror::Error;

use crate::ImageError;
use crate::io::ParseError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {source}", path = .path.display())]
    Input { path: PathBuf, source: ParseError },

    #[error("failed to read {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}", path = .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Image(#[from] ImageError),
}
