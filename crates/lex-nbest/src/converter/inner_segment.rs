//! Sub-word structure of multi-morpheme candidates.
//!
//! A candidate found by a single-segment search may span what a
//! multi-segment conversion would split into several segments. Each such
//! part is recorded as byte lengths so the caller can re-split the
//! candidate without another lattice search.

use serde::Serialize;

use super::lattice::Node;
use super::segmenter::Segmenter;
use super::segments::Candidate;

/// Byte lengths of one inner segment and of its leading content span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InnerSegmentBoundary {
    pub key_len: usize,
    pub value_len: usize,
    pub content_key_len: usize,
    pub content_value_len: usize,
}

/// Inner-segment records of a path together with the candidate's content
/// strings, which are the record content spans joined in order.
#[derive(Debug, Default)]
pub(crate) struct EncodedSegments {
    pub records: Vec<InnerSegmentBoundary>,
    pub content_key: String,
    pub content_value: String,
}

#[derive(Default)]
struct Builder {
    encoded: EncodedSegments,
    key: String,
    value: String,
    content_key: String,
    content_value: String,
    content_closed: bool,
}

impl Builder {
    fn start(&mut self, node: &Node, segmenter: &Segmenter) {
        self.key.clone_from(&node.key);
        self.value.clone_from(&node.value);
        self.content_key.clear();
        self.content_value.clear();
        self.content_closed = segmenter.is_functional(node);
        if !self.content_closed {
            self.content_key.push_str(&node.key);
            self.content_value.push_str(&node.value);
        }
    }

    fn extend(&mut self, lnode: &Node, rnode: &Node, segmenter: &Segmenter) {
        self.key.push_str(&rnode.key);
        self.value.push_str(&rnode.value);
        if self.content_closed {
            return;
        }
        if segmenter.is_content_head(lnode) && segmenter.is_functional(rnode) {
            self.content_closed = true;
        } else {
            self.content_key.push_str(&rnode.key);
            self.content_value.push_str(&rnode.value);
        }
    }

    /// A record with no content word keeps its whole span as content.
    fn flush(&mut self) {
        if self.content_key.is_empty() {
            self.content_key.clone_from(&self.key);
            self.content_value.clone_from(&self.value);
        }
        self.encoded.records.push(InnerSegmentBoundary {
            key_len: self.key.len(),
            value_len: self.value.len(),
            content_key_len: self.content_key.len(),
            content_value_len: self.content_value.len(),
        });
        self.encoded.content_key.push_str(&self.content_key);
        self.encoded.content_value.push_str(&self.content_value);
    }
}

/// Encode the inner segments of a candidate made of `nodes`.
///
/// A join the multi-segment classifier would split closes the current
/// record. Returns no records for an empty node list.
pub(crate) fn encode_inner_segments(nodes: &[&Node], segmenter: &Segmenter) -> EncodedSegments {
    let Some((first, rest)) = nodes.split_first() else {
        return EncodedSegments::default();
    };

    let mut builder = Builder::default();
    builder.start(first, segmenter);
    let mut lnode = *first;
    for &rnode in rest {
        if segmenter.is_boundary(lnode, rnode, false) {
            builder.flush();
            builder.start(rnode, segmenter);
        } else {
            builder.extend(lnode, rnode, segmenter);
        }
        lnode = rnode;
    }
    builder.flush();
    builder.encoded
}

/// One inner segment of a candidate, borrowed from its key and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerSegment<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub content_key: &'a str,
    pub content_value: &'a str,
}

/// Iterator over the inner segments of a [`Candidate`].
pub struct InnerSegmentIterator<'a> {
    candidate: &'a Candidate,
    index: usize,
    key_offset: usize,
    value_offset: usize,
    done: bool,
}

impl<'a> InnerSegmentIterator<'a> {
    pub fn new(candidate: &'a Candidate) -> Self {
        Self {
            candidate,
            index: 0,
            key_offset: 0,
            value_offset: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for InnerSegmentIterator<'a> {
    type Item = InnerSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let c = self.candidate;

        if c.inner_segment_boundary.is_empty() {
            self.done = true;
            return Some(InnerSegment {
                key: &c.key,
                value: &c.value,
                content_key: &c.content_key,
                content_value: &c.content_value,
            });
        }

        if self.key_offset >= c.key.len() {
            self.done = true;
            return None;
        }
        let Some(b) = c.inner_segment_boundary.get(self.index) else {
            self.done = true;
            return None;
        };

        let segment = slice_segment(c, self.key_offset, self.value_offset, b);
        if segment.is_none() {
            self.done = true;
            return None;
        }

        self.index += 1;
        self.key_offset += b.key_len;
        self.value_offset += b.value_len;
        segment
    }
}

fn slice_segment<'a>(
    c: &'a Candidate,
    k: usize,
    v: usize,
    b: &InnerSegmentBoundary,
) -> Option<InnerSegment<'a>> {
    Some(InnerSegment {
        key: c.key.get(k..k + b.key_len)?,
        value: c.value.get(v..v + b.value_len)?,
        content_key: c.key.get(k..k + b.content_key_len)?,
        content_value: c.value.get(v..v + b.content_value_len)?,
    })
}
