//! Lays merged spans out as one flat image, padding the gaps.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::{AddressRange, MergedImage, RangeError};

pub const DEFAULT_BASE_ADDRESS: u64 = 0x0800_0000;
pub const DEFAULT_PAD_BYTE: u8 = 0xFF;

static CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("base address {base:#X} lies beyond the end of all data ({end:#X})")]
    BaseBeyondData { base: u64, end: u64 },

    #[error("invalid image range: {0}")]
    Range(#[from] RangeError),

    #[error("image of {0} bytes does not fit in memory")]
    TooLarge(u64),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    /// The image starts here unless data lies below it.
    pub base_address: u64,
    /// Value written into gaps between spans.
    pub pad: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS,
            pad: DEFAULT_PAD_BYTE,
        }
    }
}

/// What was written, for display by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageReport {
    pub range: AddressRange,
    pub size: u64,
    /// CRC-32 (ISO-HDLC) over the whole image, padding included.
    pub crc32: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// There were no spans; nothing was written.
    Empty,
    Written(ImageReport),
}

impl ImageOutcome {
    pub fn report(&self) -> Option<&ImageReport> {
        match self {
            Self::Empty => None,
            Self::Written(report) => Some(report),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Address range the image will cover, or `None` if there is no data.
pub fn image_range(
    image: &MergedImage,
    options: &ImageOptions,
) -> Result<Option<AddressRange>, ImageError> {
    let (Some(first), Some(end)) = (image.start(), image.end()) else {
        return Ok(None);
    };
    if options.base_address > end {
        return Err(ImageError::BaseBeyondData {
            base: options.base_address,
            end,
        });
    }
    let range = AddressRange::new(first.min(options.base_address), end)?;
    Ok(Some(range))
}

/// Stream the image into `writer`. Gaps are written from a repeating source
/// so no gap-sized buffer is allocated.
pub fn write_image<W: Write>(
    image: &MergedImage,
    options: &ImageOptions,
    writer: W,
) -> Result<ImageOutcome, ImageError> {
    let Some(range) = image_range(image, options)? else {
        return Ok(ImageOutcome::Empty);
    };

    let mut out = CrcWriter::new(writer);
    let mut cursor = range.start();

    for span in image.spans() {
        if span.start() > cursor {
            write_padding(&mut out, options.pad, span.start() - cursor)?;
        }
        out.write_all(span.data())?;
        cursor = span.end();
    }
    if cursor < range.end() {
        write_padding(&mut out, options.pad, range.end() - cursor)?;
    }
    out.flush()?;

    let (written, crc32) = out.finish();
    debug_assert_eq!(written, range.length());
    Ok(ImageOutcome::Written(ImageReport {
        range,
        size: written,
        crc32,
    }))
}

/// Build the image in memory.
pub fn build_image(
    image: &MergedImage,
    options: &ImageOptions,
) -> Result<(Vec<u8>, ImageOutcome), ImageError> {
    let capacity = match image_range(image, options)? {
        Some(range) => {
            usize::try_from(range.length()).map_err(|_| ImageError::TooLarge(range.length()))?
        }
        None => 0,
    };
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| ImageError::TooLarge(capacity as u64))?;
    let outcome = write_image(image, options, &mut buffer)?;
    Ok((buffer, outcome))
}

fn write_padding<W: Write>(out: &mut W, pad: u8, len: u64) -> io::Result<()> {
    let copied = io::copy(&mut io::repeat(pad).take(len), out)?;
    debug_assert_eq!(copied, len);
    Ok(())
}

/// Counts and checksums everything passed through to the inner writer.
struct CrcWriter<'a, W> {
    inner: W,
    digest: crc::Digest<'a, u32>,
    written: u64,
}

impl<W: Write> CrcWriter<'static, W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            digest: CRC32.digest(),
            written: 0,
        }
    }
}

impl<W> CrcWriter<'_, W> {
    fn finish(self) -> (u64, u32) {
        (self.written, self.digest.finalize())
    }
}

impl<W: Write> Write for CrcWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
