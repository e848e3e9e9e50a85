//! Kana-to-kanji segment conversion via lattice construction, Viterbi and
//! n-best search.
//!
//! Builds a character-level lattice from dictionary lookups, runs Viterbi
//! to fix the best path and each node's cost to EOS, splits the best path
//! into windows at legal segment boundaries, then fills every window with
//! ranked candidates from the n-best generator.

mod cost;
mod filter;
mod inner_segment;
mod lattice;
mod nbest;
mod segmenter;
mod segments;
pub(crate) mod testutil;
mod viterbi;

#[cfg(test)]
mod tests;

use tracing::{debug, debug_span, info};

use crate::dict::Dictionary;
use crate::settings::settings;

pub use cost::{conn_cost, CostFunction, DefaultCostFunction};
pub use filter::{ContentFilter, NoFilter, SuppressionList};
pub use inner_segment::{InnerSegment, InnerSegmentBoundary, InnerSegmentIterator};
pub use lattice::{build_lattice, Lattice, LatticeError, Node, NodeId, NodeType, UNREACHABLE};
pub use nbest::{BoundaryCheckMode, Candidates, ModeError, NBestGenerator};
pub use segmenter::{
    is_segment_end_node, make_group, segment_end_node, BoundaryPolicy, RolePolicy, Segmenter,
};
pub use segments::{Candidate, RequestType, Segment, SegmentType, Segments};
pub use viterbi::viterbi;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("segment {index} has an empty key")]
    EmptySegment { index: usize },
    #[error("fixed-value segment {index} has no committed candidate")]
    MissingFixedValue { index: usize },
}

/// End-to-end conversion driver over a [`Segments`] request.
pub struct ImmutableConverter<'a> {
    dict: &'a dyn Dictionary,
    cost_fn: &'a dyn CostFunction,
    policy: &'a dyn BoundaryPolicy,
    filter: &'a dyn ContentFilter,
    candidates_per_segment: usize,
    max_trials: usize,
}

impl<'a> ImmutableConverter<'a> {
    pub fn new(
        dict: &'a dyn Dictionary,
        cost_fn: &'a dyn CostFunction,
        policy: &'a dyn BoundaryPolicy,
        filter: &'a dyn ContentFilter,
    ) -> Self {
        let s = settings();
        Self {
            dict,
            cost_fn,
            policy,
            filter,
            candidates_per_segment: s.nbest.candidates_per_segment,
            max_trials: s.nbest.max_trials,
        }
    }

    pub fn with_candidates_per_segment(mut self, n: usize) -> Self {
        self.candidates_per_segment = n;
        self
    }

    /// Replace the request's segments with converted windows.
    ///
    /// Committed boundaries are kept; free segments may be split further.
    /// An empty key or an unreachable EOS leaves no segments.
    pub fn convert(&self, segments: &mut Segments) -> Result<(), ConvertError> {
        let key = segments.key();
        let _span = debug_span!("convert", key = key.as_str()).entered();
        if key.is_empty() {
            info!("empty key, nothing to convert");
            segments.replace(Vec::new());
            return Ok(());
        }
        validate(segments)?;

        let mut lattice = build_lattice(self.dict, segments);
        let Some(total) = viterbi(&mut lattice, self.cost_fn) else {
            info!("no path to EOS, nothing to convert");
            segments.replace(Vec::new());
            return Ok(());
        };

        let windows = self.fill_windows(&lattice, segments);
        debug!(total, windows = windows.len(), "conversion done");
        segments.replace(windows);
        Ok(())
    }

    fn fill_windows(&self, lattice: &Lattice, segments: &Segments) -> Vec<Segment> {
        let request_type = segments.request_type();
        let single = request_type.is_single_segment();
        let group = make_group(segments);
        let segmenter = Segmenter::new(self.policy);
        let mut generator = NBestGenerator::new(lattice, self.cost_fn, segmenter, self.filter)
            .with_max_trials(self.max_trials);

        let mut windows = Vec::new();
        let mut begin = lattice.bos();
        loop {
            let Some(end) =
                segment_end_node(&segmenter, segments, lattice, begin, &group, single)
            else {
                break;
            };
            let start = lattice.node(begin).end;
            let window_key = lattice.key_slice(start, lattice.node(end).begin);
            let committed = &segments[group[start] as usize];

            let segment_type = committed.segment_type();
            let mode = if single {
                BoundaryCheckMode::OnlyEdge
            } else if segment_type == SegmentType::FixedBoundary {
                BoundaryCheckMode::OnlyMid
            } else {
                BoundaryCheckMode::Strict
            };

            generator.reset(begin, end, mode);
            let mut segment = Segment::new(window_key, segment_type);
            for candidate in generator
                .iter(committed.key(), request_type)
                .take(self.candidates_per_segment)
            {
                segment.push_candidate(candidate);
            }
            debug!(
                key = window_key,
                %mode,
                candidates = segment.candidates().len(),
                "window filled"
            );
            windows.push(segment);

            if end == lattice.eos() {
                break;
            }
            match lattice.node(end).prev {
                Some(last) => begin = last,
                None => break,
            }
        }
        windows
    }
}

fn validate(segments: &Segments) -> Result<(), ConvertError> {
    for (index, seg) in segments.iter().enumerate() {
        if seg.key().is_empty() {
            return Err(ConvertError::EmptySegment { index });
        }
        if seg.segment_type() == SegmentType::FixedValue && seg.candidates().is_empty() {
            return Err(ConvertError::MissingFixedValue { index });
        }
    }
    Ok(())
}
