//! Reconciles chunks from every input into a sorted list of disjoint spans.

use crate::{Chunk, Span};

/// Address-sorted spans with no overlap and no adjacency between neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedImage {
    spans: Vec<Span>,
}

impl MergedImage {
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Lowest address holding data.
    pub fn start(&self) -> Option<u64> {
        self.spans.first().map(Span::start)
    }

    /// One past the highest address holding data.
    pub fn end(&self) -> Option<u64> {
        self.spans.last().map(Span::end)
    }

    /// Number of data bytes, not counting gaps.
    pub fn data_len(&self) -> u64 {
        self.spans.iter().map(|s| s.len() as u64).sum()
    }
}

/// Merge decoded chunks. Order across inputs does not matter except for
/// chunks sharing a start address, which keep their input order.
pub fn merge_chunks(chunks: impl IntoIterator<Item = Chunk>) -> MergedImage {
    merge_spans(chunks.into_iter().map(Span::from))
}

/// Merge spans into a [`MergedImage`].
///
/// Where spans overlap, the bytes of the span that starts first are kept and
/// only the part of the later span reaching past it is added.
pub fn merge_spans(spans: impl IntoIterator<Item = Span>) -> MergedImage {
    let mut sorted: Vec<Span> = spans.into_iter().filter(|s| !s.is_empty()).collect();
    sorted.sort_by_key(Span::start);

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if last.touches(&span) => fold_into(last, &span),
            _ => merged.push(span),
        }
    }

    MergedImage { spans: merged }
}

/// Exactly one extension applies per step: a span reaching both before and
/// after `last` only contributes its leading part. Its bytes past
/// `last.end()` are dropped, so the end stays `start + len` and never moves
/// past the data actually held.
fn fold_into(last: &mut Span, incoming: &Span) {
    if incoming.start() < last.start() {
        log::trace!(
            "extending span at {:#X} backwards to {:#X}",
            last.start(),
            incoming.start()
        );
        last.extend_front(incoming);
    } else if incoming.end() > last.end() {
        last.extend_back(incoming);
    }
}
