use tracing::{debug, debug_span};

use crate::dict::Dictionary;
use crate::settings::settings;

use super::segments::{SegmentType, Segments};

/// Index of a node in the lattice arena.
pub type NodeId = usize;

/// Best-path cost of a node that Viterbi has not reached.
pub const UNREACHABLE: i64 = i64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Normal,
    /// One-character fallback for a position no dictionary entry covers.
    Unknown,
    /// Committed candidate of a fixed-value segment.
    Constrained,
    Bos,
    Eos,
}

/// A node in the conversion lattice.
///
/// The best-path fields (`best_cost`, `cost_to_end`, `prev`, `next`) are
/// unset until [`viterbi`](super::viterbi::viterbi) runs and are read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct Node {
    /// Start position (char index, inclusive)
    pub begin: usize,
    /// End position (char index, exclusive)
    pub end: usize,
    /// Kana substring (reading)
    pub key: String,
    /// Surface form (kanji, etc.)
    pub value: String,
    /// Word cost (lower = more preferred)
    pub cost: i16,
    /// Left boundary morpheme ID
    pub left_id: u16,
    /// Right boundary morpheme ID
    pub right_id: u16,
    pub node_type: NodeType,
    /// Best cumulative cost from BOS through this node.
    pub best_cost: i64,
    /// Best cost from this node to EOS, excluding this node's own word cost.
    pub cost_to_end: i64,
    /// Best predecessor.
    pub prev: Option<NodeId>,
    /// Best successor on the global best path.
    pub next: Option<NodeId>,
}

impl Node {
    pub fn new(
        begin: usize,
        end: usize,
        key: impl Into<String>,
        value: impl Into<String>,
        cost: i16,
        left_id: u16,
        right_id: u16,
    ) -> Self {
        Self {
            begin,
            end,
            key: key.into(),
            value: value.into(),
            cost,
            left_id,
            right_id,
            node_type: NodeType::Normal,
            best_cost: UNREACHABLE,
            cost_to_end: UNREACHABLE,
            prev: None,
            next: None,
        }
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    fn sentinel(pos: usize, node_type: NodeType) -> Self {
        Self::new(pos, pos, "", "", 0, 0, 0).with_type(node_type)
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.node_type, NodeType::Bos | NodeType::Eos)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LatticeError {
    #[error("lattice has no key")]
    NoKey,
    #[error("node range {begin}..{end} is invalid for a key of {len} chars")]
    OutOfRange { begin: usize, end: usize, len: usize },
}

/// The lattice: all candidate morphemes over a kana key.
///
/// Owns every node. Cross-node relations (buckets, best-path links) are
/// `NodeId` indices into `nodes`.
#[derive(Debug, Default)]
pub struct Lattice {
    key: String,
    /// Byte offset of each char position; `char_count + 1` entries.
    byte_offsets: Vec<usize>,
    nodes: Vec<Node>,
    /// begin_nodes[i] = nodes that start at position i, in insertion order
    begin_nodes: Vec<Vec<NodeId>>,
    /// end_nodes[i] = nodes that end at position i, in insertion order
    end_nodes: Vec<Vec<NodeId>>,
    bos: NodeId,
    eos: NodeId,
}

impl Lattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to an empty arena over `key` with the BOS/EOS sentinels installed.
    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
        self.byte_offsets = key
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(key.len()))
            .collect();
        let len = self.char_count();

        self.nodes.clear();
        self.begin_nodes = vec![Vec::new(); len + 1];
        self.end_nodes = vec![Vec::new(); len + 1];

        self.bos = self.push(Node::sentinel(0, NodeType::Bos));
        self.end_nodes[0].push(self.bos);
        self.eos = self.push(Node::sentinel(len, NodeType::Eos));
        self.begin_nodes[len].push(self.eos);
    }

    /// Drop the key and every node.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_key(&self) -> bool {
        !self.byte_offsets.is_empty()
    }

    /// Append a node to the begin/end buckets of its range.
    pub fn insert(&mut self, node: Node) -> Result<NodeId, LatticeError> {
        if !self.has_key() {
            return Err(LatticeError::NoKey);
        }
        let len = self.char_count();
        if node.begin >= node.end || node.end > len || node.is_sentinel() {
            return Err(LatticeError::OutOfRange {
                begin: node.begin,
                end: node.end,
                len,
            });
        }
        let (begin, end) = (node.begin, node.end);
        let id = self.push(node);
        self.begin_nodes[begin].push(id);
        self.end_nodes[end].push(id);
        Ok(id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of characters in the key.
    pub fn char_count(&self) -> usize {
        self.byte_offsets.len().saturating_sub(1)
    }

    /// Key substring for the char range `[begin, end)`; empty when out of range.
    pub fn key_slice(&self, begin: usize, end: usize) -> &str {
        match (self.byte_offsets.get(begin), self.byte_offsets.get(end)) {
            (Some(&b), Some(&e)) if b <= e => &self.key[b..e],
            _ => "",
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn bos(&self) -> NodeId {
        self.bos
    }

    pub fn eos(&self) -> NodeId {
        self.eos
    }

    /// Nodes starting at `pos`. This is the sibling chain of alternatives
    /// for that offset.
    pub fn begin_nodes(&self, pos: usize) -> &[NodeId] {
        self.begin_nodes.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes ending at `pos`.
    pub fn end_nodes(&self, pos: usize) -> &[NodeId] {
        self.end_nodes.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes of the global best path, BOS and EOS excluded.
    pub fn best_path(&self) -> impl Iterator<Item = NodeId> + '_ {
        let first = if self.has_key() {
            self.nodes[self.bos].next
        } else {
            None
        };
        std::iter::successors(first, move |&id| self.nodes[id].next)
            .take_while(move |&id| id != self.eos)
    }
}

/// Build a lattice for the concatenated key of `segments` using dictionary lookups.
///
/// Uses `common_prefix_search` once per starting position. Nodes never cross
/// the edge of a `FixedBoundary` or `FixedValue` segment; a fixed-value
/// segment contributes only its committed candidate. A 1-char unknown node is
/// added wherever no entry covers exactly that character, which keeps every
/// position reachable.
pub fn build_lattice(dict: &dyn Dictionary, segments: &Segments) -> Lattice {
    let key = segments.key();
    let mut lattice = Lattice::new();
    lattice.set_key(&key);
    let char_count = lattice.char_count();
    let _span = debug_span!("build_lattice", char_count).entered();

    // limit[pos] = the furthest position a node starting at pos may reach.
    let mut limit = vec![char_count; char_count + 1];
    let mut fixed_values: Vec<(usize, usize, usize)> = Vec::new();
    let mut seg_begin = 0;
    for (seg_idx, seg) in segments.iter().enumerate() {
        let seg_end = seg_begin + seg.key().chars().count();
        if seg.segment_type() != SegmentType::Free {
            for l in &mut limit[..seg_begin] {
                *l = (*l).min(seg_begin);
            }
            for l in &mut limit[seg_begin..seg_end] {
                *l = (*l).min(seg_end);
            }
        }
        if seg.segment_type() == SegmentType::FixedValue {
            fixed_values.push((seg_idx, seg_begin, seg_end));
        }
        seg_begin = seg_end;
    }

    let mut fixed_iter = fixed_values.iter().peekable();
    let mut start = 0;
    while start < char_count {
        if let Some(&&(seg_idx, b, e)) = fixed_iter.peek() {
            if b == start {
                fixed_iter.next();
                insert_fixed_value(&mut lattice, segments, seg_idx, b, e);
                start = e;
                continue;
            }
        }
        insert_dictionary_nodes(&mut lattice, dict, start, limit[start]);
        start += 1;
    }

    debug!(node_count = lattice.nodes().len());
    lattice
}

fn insert_fixed_value(
    lattice: &mut Lattice,
    segments: &Segments,
    seg_idx: usize,
    begin: usize,
    end: usize,
) {
    if begin == end {
        return;
    }
    let seg = &segments[seg_idx];
    let (value, left_id, right_id) = match seg.candidates().first() {
        Some(c) => (c.value.clone(), c.lid, c.rid),
        None => (seg.key().to_string(), 0, 0),
    };
    let node = Node::new(begin, end, seg.key(), value, 0, left_id, right_id)
        .with_type(NodeType::Constrained);
    if let Err(e) = lattice.insert(node) {
        debug!(%e, seg_idx, "fixed value node rejected");
    }
}

fn insert_dictionary_nodes(lattice: &mut Lattice, dict: &dyn Dictionary, start: usize, limit: usize) {
    let suffix = lattice.key_slice(start, limit).to_string();
    let mut has_single_char_match = false;
    let mut new_nodes = Vec::new();

    for result in dict.common_prefix_search(&suffix) {
        let end = start + result.reading.chars().count();
        for entry in &result.entries {
            new_nodes.push(Node::new(
                start,
                end,
                result.reading.clone(),
                entry.surface.clone(),
                entry.cost,
                entry.left_id,
                entry.right_id,
            ));
            if end == start + 1 {
                has_single_char_match = true;
            }
        }
    }

    if !has_single_char_match {
        let ch = lattice.key_slice(start, start + 1).to_string();
        new_nodes.push(
            Node::new(
                start,
                start + 1,
                ch.clone(),
                ch,
                settings().cost.unknown_word_cost,
                0,
                0,
            )
            .with_type(NodeType::Unknown),
        );
    }

    for node in new_nodes {
        if let Err(e) = lattice.insert(node) {
            debug!(%e, start, "dictionary node rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::segments::{Candidate, Segment};
    use crate::converter::testutil::test_dict;

    fn free(key: &str) -> Segments {
        Segments::from_keys(&[(key, SegmentType::Free)])
    }

    #[test]
    fn test_set_key_installs_sentinels() {
        let mut lattice = Lattice::new();
        lattice.set_key("きょうは");
        assert_eq!(lattice.char_count(), 4);
        let bos = lattice.node(lattice.bos());
        let eos = lattice.node(lattice.eos());
        assert_eq!((bos.begin, bos.end), (0, 0));
        assert_eq!((eos.begin, eos.end), (4, 4));
        assert_eq!(lattice.end_nodes(0), &[lattice.bos()]);
        assert_eq!(lattice.begin_nodes(4), &[lattice.eos()]);
        assert!(lattice.begin_nodes(0).is_empty());
    }

    #[test]
    fn test_set_key_resets_arena() {
        let mut lattice = Lattice::new();
        lattice.set_key("きょう");
        lattice
            .insert(Node::new(0, 3, "きょう", "今日", 3000, 1, 1))
            .unwrap();
        lattice.set_key("は");
        assert_eq!(lattice.nodes().len(), 2);
        assert_eq!(lattice.char_count(), 1);
        assert!(lattice.begin_nodes(0).is_empty());
    }

    #[test]
    fn test_keyless_lattice_is_empty() {
        let mut lattice = Lattice::new();
        assert!(!lattice.has_key());
        assert_eq!(lattice.char_count(), 0);
        assert!(lattice.begin_nodes(0).is_empty());
        assert!(lattice.end_nodes(3).is_empty());
        assert_eq!(lattice.best_path().count(), 0);
        assert_eq!(
            lattice.insert(Node::new(0, 1, "あ", "亜", 0, 0, 0)),
            Err(LatticeError::NoKey)
        );
    }

    #[test]
    fn test_insert_rejects_bad_ranges() {
        let mut lattice = Lattice::new();
        lattice.set_key("きょう");
        assert!(matches!(
            lattice.insert(Node::new(2, 4, "う", "う", 0, 0, 0)),
            Err(LatticeError::OutOfRange { len: 3, .. })
        ));
        assert!(lattice.insert(Node::new(1, 1, "", "", 0, 0, 0)).is_err());
        let id = lattice
            .insert(Node::new(1, 3, "ょう", "ょう", 0, 0, 0))
            .unwrap();
        assert_eq!(lattice.begin_nodes(1), &[id]);
        assert_eq!(lattice.end_nodes(3), &[id]);
    }

    #[test]
    fn test_key_slice() {
        let mut lattice = Lattice::new();
        lattice.set_key("きょうは");
        assert_eq!(lattice.key_slice(0, 3), "きょう");
        assert_eq!(lattice.key_slice(3, 4), "は");
        assert_eq!(lattice.key_slice(2, 9), "");
    }

    #[test]
    fn test_build_lattice_basic() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, &free("きょうは"));

        assert_eq!(lattice.char_count(), 4); // き, ょ, う, は
        let kyou_nodes: Vec<_> = lattice
            .nodes()
            .iter()
            .filter(|n| n.key == "きょう")
            .collect();
        assert_eq!(kyou_nodes.len(), 2);
        assert!(kyou_nodes.iter().any(|n| n.value == "今日"));
        assert!(kyou_nodes.iter().any(|n| n.value == "京"));
    }

    #[test]
    fn test_unknown_word_fallback() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, &free("ぬ"));

        let unknown: Vec<_> = lattice
            .nodes()
            .iter()
            .filter(|n| n.node_type == NodeType::Unknown)
            .collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].key, "ぬ");
        assert_eq!(unknown[0].value, "ぬ");
        assert_eq!(unknown[0].cost, 10000);
    }

    #[test]
    fn test_lattice_connectivity() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, &free("きょうはいいてんき"));

        for pos in 1..=lattice.char_count() {
            assert!(
                !lattice.end_nodes(pos).is_empty(),
                "no nodes end at position {pos}"
            );
        }
    }

    #[test]
    fn test_buckets_consistency() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, &free("きょうはいいてんき"));

        for (id, node) in lattice.nodes().iter().enumerate() {
            if node.is_sentinel() {
                continue;
            }
            assert!(lattice.begin_nodes(node.begin).contains(&id));
            assert!(lattice.end_nodes(node.end).contains(&id));
            assert!(node.begin < node.end && node.end <= lattice.char_count());
        }
        for pos in 0..=lattice.char_count() {
            for &id in lattice.begin_nodes(pos) {
                assert_eq!(lattice.node(id).begin, pos);
            }
            for &id in lattice.end_nodes(pos) {
                assert_eq!(lattice.node(id).end, pos);
            }
        }
    }

    #[test]
    fn test_fixed_boundary_blocks_crossing_nodes() {
        let dict = test_dict();
        // "きょう" + "は" with a committed boundary after "きょ"
        let segments = Segments::from_keys(&[
            ("きょ", SegmentType::FixedBoundary),
            ("うは", SegmentType::Free),
        ]);
        let lattice = build_lattice(&dict, &segments);
        assert!(lattice.nodes().iter().all(|n| n.key != "きょう"));
        assert!(lattice
            .nodes()
            .iter()
            .all(|n| n.is_sentinel() || n.end <= 2 || n.begin >= 2));
    }

    #[test]
    fn test_fixed_value_segment_single_node() {
        let dict = test_dict();
        let mut fixed = Segment::new("きょう", SegmentType::FixedValue);
        let mut cand = Candidate::new("きょう", "京");
        cand.lid = 101;
        cand.rid = 101;
        fixed.push_candidate(cand);
        let mut segments = Segments::from_keys(&[]);
        segments.push(fixed);
        segments.push(Segment::new("は", SegmentType::Free));

        let lattice = build_lattice(&dict, &segments);
        let in_fixed: Vec<_> = lattice
            .nodes()
            .iter()
            .filter(|n| !n.is_sentinel() && n.begin < 3)
            .collect();
        assert_eq!(in_fixed.len(), 1);
        assert_eq!(in_fixed[0].value, "京");
        assert_eq!(in_fixed[0].node_type, NodeType::Constrained);
        assert_eq!(in_fixed[0].cost, 0);
        assert!(lattice.nodes().iter().any(|n| n.value == "は"));
    }
}
