use std::ops::Index;

use serde::Serialize;

use super::inner_segment::{InnerSegmentBoundary, InnerSegmentIterator};

/// How a segment's boundaries were decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// Boundaries chosen by the converter.
    #[default]
    Free,
    /// Boundaries committed by the user; the value is still open.
    FixedBoundary,
    /// Boundaries and value committed; candidate 0 is the value.
    FixedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    Conversion,
    Prediction,
    Suggestion,
    PartialPrediction,
    PartialSuggestion,
}

impl RequestType {
    /// Prediction-family requests convert the whole key as one segment.
    pub fn is_single_segment(self) -> bool {
        !matches!(self, RequestType::Conversion)
    }

    /// Whether the content filter may veto candidates for this request.
    pub fn uses_content_filter(self) -> bool {
        self.is_single_segment()
    }
}

/// One materialized conversion result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Candidate {
    pub key: String,
    pub value: String,
    /// Content spans of the inner segments joined in order, functional
    /// tails trimmed.
    pub content_key: String,
    /// Same as `content_key`, over `value`.
    pub content_value: String,
    /// Path cost: word costs plus transitions, including the window edges.
    pub cost: i64,
    /// Word-cost part of `cost`.
    pub wcost: i64,
    /// Transitions between the candidate's own morphemes.
    pub structure_cost: i64,
    pub lid: u16,
    pub rid: u16,
    /// Set when `key` differs from the segment key the caller asked about.
    pub partially_key_consumed: bool,
    pub inner_segment_boundary: Vec<InnerSegmentBoundary>,
}

impl Candidate {
    /// A single-morpheme candidate whose content spans are the whole key/value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            content_key: key.clone(),
            content_value: value.clone(),
            key,
            value,
            ..Self::default()
        }
    }

    pub fn inner_segments(&self) -> InnerSegmentIterator<'_> {
        InnerSegmentIterator::new(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    key: String,
    segment_type: SegmentType,
    candidates: Vec<Candidate>,
}

impl Segment {
    pub fn new(key: impl Into<String>, segment_type: SegmentType) -> Self {
        Self {
            key: key.into(),
            segment_type,
            candidates: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, i: usize) -> Option<&Candidate> {
        self.candidates.get(i)
    }

    pub fn push_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }
}

/// A conversion request: ordered segments plus the request type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segments {
    request_type: RequestType,
    segments: Vec<Segment>,
}

impl Segments {
    pub fn new(request_type: RequestType) -> Self {
        Self {
            request_type,
            segments: Vec::new(),
        }
    }

    /// Conversion request with one candidate-less segment per `(key, type)`.
    pub fn from_keys(keys: &[(&str, SegmentType)]) -> Self {
        let mut segments = Self::new(RequestType::Conversion);
        for &(key, segment_type) in keys {
            segments.push(Segment::new(key, segment_type));
        }
        segments
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Concatenated key of every segment.
    pub fn key(&self) -> String {
        self.segments.iter().map(|s| s.key.as_str()).collect()
    }

    pub(super) fn replace(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }
}

impl Index<usize> for Segments {
    type Output = Segment;

    fn index(&self, i: usize) -> &Segment {
        &self.segments[i]
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
