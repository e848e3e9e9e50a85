//! Segment boundary classification.
//!
//! A boundary is decided by two layers: the hard constraints the caller
//! committed (segment edges, encoded as the group vector) and the soft
//! grammatical rules of a [`BoundaryPolicy`].

use crate::dict::{PosRole, PosTable};

use super::lattice::{Lattice, Node, NodeId, NodeType};
use super::segments::{SegmentType, Segments};

/// Grammatical rule family deciding where segments may split.
pub trait BoundaryPolicy: Send + Sync {
    /// Whether a word ending in class `rid` may be followed by a new segment
    /// starting with class `lid`.
    fn is_boundary(&self, rid: u16, lid: u16) -> bool;

    /// Whether a word ending in class `rid` can head a content span.
    fn is_content_head(&self, rid: u16) -> bool;

    /// Whether a word starting with class `lid` is a functional tail.
    fn is_functional(&self, lid: u16) -> bool;
}

/// Default policy over the coarse role of each class id.
pub struct RolePolicy<'a> {
    table: &'a dyn PosTable,
}

impl<'a> RolePolicy<'a> {
    pub fn new(table: &'a dyn PosTable) -> Self {
        Self { table }
    }
}

impl BoundaryPolicy for RolePolicy<'_> {
    fn is_boundary(&self, rid: u16, lid: u16) -> bool {
        if self.table.pos_role(lid).attaches_to_previous() {
            return false;
        }
        self.table.pos_role(rid) != PosRole::Prefix
    }

    fn is_content_head(&self, rid: u16) -> bool {
        self.table.pos_role(rid).is_content_noun()
    }

    fn is_functional(&self, lid: u16) -> bool {
        self.table.pos_role(lid) == PosRole::FunctionWord
    }
}

/// Node-level boundary classifier.
#[derive(Clone, Copy)]
pub struct Segmenter<'a> {
    policy: &'a dyn BoundaryPolicy,
}

impl<'a> Segmenter<'a> {
    pub fn new(policy: &'a dyn BoundaryPolicy) -> Self {
        Self { policy }
    }

    /// Whether a segment may end between `lnode` and `rnode`.
    ///
    /// The sentinels always bound a segment. In single-segment mode nothing
    /// else does.
    pub fn is_boundary(&self, lnode: &Node, rnode: &Node, single_segment: bool) -> bool {
        if lnode.node_type == NodeType::Bos || rnode.node_type == NodeType::Eos {
            return true;
        }
        if single_segment {
            return false;
        }
        self.policy.is_boundary(lnode.right_id, rnode.left_id)
    }

    pub fn is_content_head(&self, node: &Node) -> bool {
        self.policy.is_content_head(node.right_id)
    }

    pub fn is_functional(&self, node: &Node) -> bool {
        self.policy.is_functional(node.left_id)
    }
}

/// Group id per char offset: the index of the segment covering it.
///
/// Has `key length + 1` entries; the last repeats the final segment's id.
pub fn make_group(segments: &Segments) -> Vec<u16> {
    let mut group = Vec::new();
    let mut last = 0u16;
    for (i, seg) in segments.iter().enumerate() {
        last = i as u16;
        group.extend(std::iter::repeat(last).take(seg.key().chars().count()));
    }
    group.push(last);
    group
}

/// Whether the edge `node → node.next` may end a segment.
pub fn is_segment_end_node(
    segmenter: &Segmenter,
    segments: &Segments,
    lattice: &Lattice,
    node: NodeId,
    group: &[u16],
    single_segment: bool,
) -> bool {
    let lnode = lattice.node(node);
    let Some(next) = lnode.next else {
        return true;
    };
    let rnode = lattice.node(next);
    if rnode.node_type == NodeType::Eos {
        return true;
    }

    let (Some(&lgroup), Some(&rgroup)) = (group.get(lnode.begin), group.get(rnode.begin)) else {
        return true;
    };
    if lgroup != rgroup {
        return true;
    }

    let committed = segments
        .iter()
        .nth(lgroup as usize)
        .map(|s| s.segment_type())
        .unwrap_or_default();
    if committed != SegmentType::Free {
        return false;
    }

    segmenter.is_boundary(lnode, rnode, single_segment)
}

/// First node after `begin` on the best path where a segment may end.
///
/// Returns `None` when `begin` is not linked into the best path.
pub fn segment_end_node(
    segmenter: &Segmenter,
    segments: &Segments,
    lattice: &Lattice,
    begin: NodeId,
    group: &[u16],
    single_segment: bool,
) -> Option<NodeId> {
    let mut cur = lattice.node(begin).next?;
    loop {
        let next = lattice.node(cur).next?;
        if is_segment_end_node(segmenter, segments, lattice, cur, group, single_segment) {
            return Some(next);
        }
        cur = next;
    }
}
