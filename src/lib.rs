pub mod collect;
pub mod error;
pub mod image;
pub mod io;
pub mod merge;
pub mod pipeline;
pub mod range;
pub mod segment;
pub mod source;

pub use collect::{
    Collected, FsProvider, MemoryProvider, ReadProvider, SkippedInput, collect_chunks,
};
pub use error::Error;
pub use image::{
    DEFAULT_BASE_ADDRESS, DEFAULT_PAD_BYTE, ImageError, ImageOptions, ImageOutcome, ImageReport,
    build_image, image_range, write_image,
};
pub use io::{HexRecords, ParseError, decode_intel_hex, load_binary, parse_intel_hex};
pub use merge::{MergedImage, merge_chunks, merge_spans};
pub use pipeline::{Pipeline, PipelineResult};
pub use range::{AddressRange, RangeError, parse_byte, parse_number};
pub use segment::{Chunk, Span};
pub use source::{InputSpec, Source, SourceError, SourceFormat};
