/// A run of bytes at an absolute address, as produced by a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub address: u64,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(address: u64, data: Vec<u8>) -> Self {
        Self { address, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A contiguous span of image memory. The end address is exclusive and equals
/// `start + data.len()`, saturating at `u64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    start: u64,
    data: Vec<u8>,
}

impl Span {
    pub fn new(start: u64, data: Vec<u8>) -> Self {
        Self { start, data }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.data.len() as u64)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the two spans overlap or are exactly adjacent.
    pub fn touches(&self, other: &Span) -> bool {
        other.start <= self.end() && self.start <= other.end()
    }

    /// Grow backwards with the part of `other` that lies before this span.
    pub(crate) fn extend_front(&mut self, other: &Span) {
        debug_assert!(other.start < self.start && other.end() >= self.start);
        let prefix_len = (self.start - other.start) as usize;
        let mut data = Vec::with_capacity(prefix_len + self.data.len());
        data.extend_from_slice(&other.data[..prefix_len]);
        data.append(&mut self.data);
        self.start = other.start;
        self.data = data;
    }

    /// Grow forwards with the part of `other` that lies past this span's end.
    pub(crate) fn extend_back(&mut self, other: &Span) {
        debug_assert!(other.start <= self.end() && other.end() > self.end());
        let skip = (self.end() - other.start) as usize;
        self.data.extend_from_slice(&other.data[skip..]);
    }
}

impl From<Chunk> for Span {
    fn from(chunk: Chunk) -> Self {
        Span::new(chunk.address, chunk.data)
    }
}
