//! Lazy enumeration of ranked paths between two best-path nodes.
//!
//! Rank 0 is the Viterbi path itself. Later ranks come from a best-first
//! search whose heuristic is each node's Viterbi cost to EOS, so complete
//! paths leave the agenda in non-decreasing cost order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, debug_span};

use crate::settings::settings;

use super::cost::CostFunction;
use super::filter::ContentFilter;
use super::inner_segment::encode_inner_segments;
use super::lattice::{Lattice, Node, NodeId, UNREACHABLE};
use super::segmenter::Segmenter;
use super::segments::{Candidate, RequestType};

/// Which boundary constraints a candidate path must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCheckMode {
    /// Both window edges split, nothing inside does.
    #[default]
    Strict,
    /// Nothing inside splits; the edges are unchecked.
    OnlyMid,
    /// Both window edges split; the inside is unchecked.
    OnlyEdge,
}

impl BoundaryCheckMode {
    pub fn name(self) -> &'static str {
        match self {
            BoundaryCheckMode::Strict => "strict",
            BoundaryCheckMode::OnlyMid => "only_mid",
            BoundaryCheckMode::OnlyEdge => "only_edge",
        }
    }

    fn allows(self, is_edge: bool, is_boundary: bool) -> bool {
        match self {
            BoundaryCheckMode::Strict => is_edge == is_boundary,
            BoundaryCheckMode::OnlyMid => is_edge || !is_boundary,
            BoundaryCheckMode::OnlyEdge => !is_edge || is_boundary,
        }
    }
}

impl fmt::Display for BoundaryCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("unknown boundary check mode: {0:?} (expected strict, only_mid or only_edge)")]
    Unknown(String),
}

impl FromStr for BoundaryCheckMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(BoundaryCheckMode::Strict),
            "only_mid" => Ok(BoundaryCheckMode::OnlyMid),
            "only_edge" => Ok(BoundaryCheckMode::OnlyEdge),
            other => Err(ModeError::Unknown(other.to_string())),
        }
    }
}

/// A partial path: its frontier node plus a link to the element it extends.
struct QueueElement {
    node: NodeId,
    prev: Option<usize>,
    /// Cost from the window's begin node through `node`.
    gx: i64,
}

#[derive(Clone, Copy)]
struct Window {
    begin: NodeId,
    end: NodeId,
    mode: BoundaryCheckMode,
    /// Cost to EOS from the start of `end`, including its word cost.
    end_rest: Option<i64>,
}

/// N-best path generator bound to one lattice.
///
/// Call [`reset`](Self::reset) for a window, then pull candidates with
/// [`next`](Self::next) until it returns `None`.
pub struct NBestGenerator<'a> {
    lattice: &'a Lattice,
    cost_fn: &'a dyn CostFunction,
    segmenter: Segmenter<'a>,
    filter: &'a dyn ContentFilter,
    max_trials: usize,

    window: Option<Window>,
    elements: Vec<QueueElement>,
    agenda: BinaryHeap<Reverse<(i64, usize)>>,
    seen: HashSet<String>,
    top_pending: bool,
    trials: usize,
}

impl<'a> NBestGenerator<'a> {
    /// The lattice must already have been through [`viterbi`](super::viterbi::viterbi).
    pub fn new(
        lattice: &'a Lattice,
        cost_fn: &'a dyn CostFunction,
        segmenter: Segmenter<'a>,
        filter: &'a dyn ContentFilter,
    ) -> Self {
        Self {
            lattice,
            cost_fn,
            segmenter,
            filter,
            max_trials: settings().nbest.max_trials,
            window: None,
            elements: Vec::new(),
            agenda: BinaryHeap::new(),
            seen: HashSet::new(),
            top_pending: false,
            trials: 0,
        }
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Start a fresh search for paths strictly between `begin` and `end`.
    pub fn reset(&mut self, begin: NodeId, end: NodeId, mode: BoundaryCheckMode) {
        self.elements.clear();
        self.agenda.clear();
        self.seen.clear();
        self.trials = 0;
        self.top_pending = true;

        let end_node = self.lattice.node(end);
        let end_rest = (end_node.cost_to_end != UNREACHABLE)
            .then(|| end_node.cost_to_end + self.cost_fn.word_cost(end_node));
        let window = Window {
            begin,
            end,
            mode,
            end_rest,
        };
        self.window = Some(window);
        debug!(begin, end, %mode, "nbest reset");

        if let Some(h) = self.heuristic(begin, &window) {
            self.elements.push(QueueElement {
                node: begin,
                prev: None,
                gx: 0,
            });
            self.agenda.push(Reverse((h, 0)));
        }
    }

    /// The next-best legal candidate, or `None` once the window is exhausted.
    ///
    /// `original_key` is the key of the segment the caller is filling; a
    /// candidate covering a different key is flagged as partially consuming it.
    pub fn next(&mut self, original_key: &str, request_type: RequestType) -> Option<Candidate> {
        let window = self.window?;
        let _span = debug_span!("nbest_next", begin = window.begin, end = window.end).entered();

        if self.top_pending {
            self.top_pending = false;
            if let Some(path) = self.best_path_between(&window) {
                let candidate = self.build_candidate(&path, &window, original_key);
                if self.accept(&candidate.value, request_type) {
                    return Some(candidate);
                }
            }
        }

        while let Some(Reverse((_, idx))) = self.agenda.pop() {
            self.trials += 1;
            if self.trials > self.max_trials {
                debug!(trials = self.max_trials, "trial budget exhausted");
                self.agenda.clear();
                return None;
            }

            if self.elements[idx].node == window.end {
                let path = self.path_of(idx);
                let candidate = self.build_candidate(&path, &window, original_key);
                if self.accept(&candidate.value, request_type) {
                    return Some(candidate);
                }
                continue;
            }
            self.expand(idx, &window);
        }
        None
    }

    /// Pull candidates lazily. Exhausting the iterator exhausts the window.
    pub fn iter<'g>(
        &'g mut self,
        original_key: &'g str,
        request_type: RequestType,
    ) -> Candidates<'g, 'a> {
        Candidates {
            generator: self,
            original_key,
            request_type,
        }
    }

    /// Dedup first, then the veto. A vetoed value stays in the seen set.
    fn accept(&mut self, value: &str, request_type: RequestType) -> bool {
        if !self.seen.insert(value.to_string()) {
            return false;
        }
        if request_type.uses_content_filter() && self.filter.is_rejected(value) {
            debug!(value, "candidate vetoed");
            return false;
        }
        true
    }

    /// Remaining-cost bound for a partial path ending at `node`; `None`
    /// when `node` cannot reach EOS at all.
    fn heuristic(&self, node: NodeId, window: &Window) -> Option<i64> {
        if node == window.end {
            return Some(0);
        }
        match window.end_rest {
            None => Some(0),
            Some(rest) => {
                let cost_to_end = self.lattice.node(node).cost_to_end;
                (cost_to_end != UNREACHABLE).then(|| cost_to_end - rest)
            }
        }
    }

    fn expand(&mut self, idx: usize, window: &Window) {
        let lattice = self.lattice;
        let (l_id, gx) = (self.elements[idx].node, self.elements[idx].gx);
        let lnode = lattice.node(l_id);
        let end_begin = lattice.node(window.end).begin;

        for &r_id in lattice.begin_nodes(lnode.end) {
            let rnode = lattice.node(r_id);
            let reaches_end = r_id == window.end;
            if !reaches_end && rnode.end > end_begin {
                continue;
            }
            if l_id == window.begin && reaches_end {
                continue;
            }

            let is_edge = l_id == window.begin || reaches_end;
            let is_boundary = self.segmenter.is_boundary(lnode, rnode, false);
            if !window.mode.allows(is_edge, is_boundary) {
                continue;
            }
            let Some(h) = self.heuristic(r_id, window) else {
                continue;
            };

            let mut g = gx + self.cost_fn.transition_cost(lnode, rnode);
            if !reaches_end {
                g += self.cost_fn.word_cost(rnode);
            }
            let elem = self.elements.len();
            self.elements.push(QueueElement {
                node: r_id,
                prev: Some(idx),
                gx: g,
            });
            self.agenda.push(Reverse((g + h, elem)));
        }
    }

    /// Interior nodes of the path ending in element `idx`.
    fn path_of(&self, idx: usize) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cur = self.elements[idx].prev;
        while let Some(i) = cur {
            let elem = &self.elements[i];
            if elem.prev.is_none() {
                break;
            }
            path.push(elem.node);
            cur = elem.prev;
        }
        path.reverse();
        path
    }

    /// Forward links from `begin` to `end`, when the best path joins them.
    fn best_path_between(&self, window: &Window) -> Option<Vec<NodeId>> {
        let end_begin = self.lattice.node(window.end).begin;
        let mut path = Vec::new();
        let mut cur = self.lattice.node(window.begin).next?;
        while cur != window.end {
            let node = self.lattice.node(cur);
            if node.is_sentinel() || node.end > end_begin {
                return None;
            }
            path.push(cur);
            cur = node.next?;
        }
        (!path.is_empty()).then_some(path)
    }

    fn build_candidate(&self, path: &[NodeId], window: &Window, original_key: &str) -> Candidate {
        let nodes: Vec<&Node> = path.iter().map(|&id| self.lattice.node(id)).collect();
        let begin = self.lattice.node(window.begin);
        let end = self.lattice.node(window.end);

        let mut candidate = Candidate::default();
        for (i, node) in nodes.iter().enumerate() {
            candidate.key.push_str(&node.key);
            candidate.value.push_str(&node.value);
            candidate.wcost += self.cost_fn.word_cost(node);
            if i > 0 {
                candidate.structure_cost += self.cost_fn.transition_cost(nodes[i - 1], node);
            }
        }

        if let (Some(first), Some(last)) = (nodes.first(), nodes.last()) {
            candidate.lid = first.left_id;
            candidate.rid = last.right_id;
            candidate.cost = self.cost_fn.transition_cost(begin, first)
                + candidate.wcost
                + candidate.structure_cost
                + self.cost_fn.transition_cost(last, end);
        }
        candidate.partially_key_consumed = !original_key.is_empty() && candidate.key != original_key;
        let encoded = encode_inner_segments(&nodes, &self.segmenter);
        candidate.content_key = encoded.content_key;
        candidate.content_value = encoded.content_value;
        candidate.inner_segment_boundary = encoded.records;
        candidate
    }
}

/// Iterator returned by [`NBestGenerator::iter`].
pub struct Candidates<'g, 'a> {
    generator: &'g mut NBestGenerator<'a>,
    original_key: &'g str,
    request_type: RequestType,
}

impl Iterator for Candidates<'_, '_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        self.generator.next(self.original_key, self.request_type)
    }
}
