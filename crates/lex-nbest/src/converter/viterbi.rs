use tracing::{debug, debug_span};

use super::cost::CostFunction;
use super::lattice::{Lattice, NodeId, UNREACHABLE};

/// Run Viterbi over the lattice and record the best-path fields on every node.
///
/// Forward pass fills `best_cost`/`prev`, the EOS backtrack fills `next`
/// along the best path, and the backward pass fills `cost_to_end`.
/// Returns the best total cost, or `None` when EOS is unreachable.
pub fn viterbi(lattice: &mut Lattice, cost_fn: &dyn CostFunction) -> Option<i64> {
    let char_count = lattice.char_count();
    let _span = debug_span!("viterbi", char_count).entered();
    if !lattice.has_key() {
        return None;
    }

    forward(lattice, cost_fn);

    let eos = lattice.eos();
    let total = lattice.node(eos).best_cost;
    if total == UNREACHABLE {
        debug!("EOS unreachable");
        return None;
    }

    // Backtrack from EOS, linking each predecessor to its successor.
    let mut cur = eos;
    while let Some(prev) = lattice.node(cur).prev {
        lattice.node_mut(prev).next = Some(cur);
        cur = prev;
    }

    backward(lattice, cost_fn);

    debug!(total, "best path found");
    Some(total)
}

fn forward(lattice: &mut Lattice, cost_fn: &dyn CostFunction) {
    let bos = lattice.bos();
    lattice.node_mut(bos).best_cost = 0;

    for pos in 0..=lattice.char_count() {
        for i in 0..lattice.begin_nodes(pos).len() {
            let next_id = lattice.begin_nodes(pos)[i];
            let word = cost_fn.word_cost(lattice.node(next_id));

            let mut best: Option<(i64, NodeId)> = None;
            for &prev_id in lattice.end_nodes(pos) {
                let prev = lattice.node(prev_id);
                if prev.best_cost == UNREACHABLE {
                    continue;
                }
                let total =
                    prev.best_cost + cost_fn.transition_cost(prev, lattice.node(next_id)) + word;
                if best.map_or(true, |(c, _)| total < c) {
                    best = Some((total, prev_id));
                }
            }

            if let Some((cost, prev_id)) = best {
                let node = lattice.node_mut(next_id);
                node.best_cost = cost;
                node.prev = Some(prev_id);
            }
        }
    }
}

fn backward(lattice: &mut Lattice, cost_fn: &dyn CostFunction) {
    let eos = lattice.eos();
    lattice.node_mut(eos).cost_to_end = 0;

    for pos in (0..=lattice.char_count()).rev() {
        for i in 0..lattice.end_nodes(pos).len() {
            let prev_id = lattice.end_nodes(pos)[i];
            let prev = lattice.node(prev_id);

            let mut best = UNREACHABLE;
            for &next_id in lattice.begin_nodes(pos) {
                let next = lattice.node(next_id);
                if next.cost_to_end == UNREACHABLE {
                    continue;
                }
                let total =
                    cost_fn.transition_cost(prev, next) + cost_fn.word_cost(next) + next.cost_to_end;
                best = best.min(total);
            }
            lattice.node_mut(prev_id).cost_to_end = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::cost::DefaultCostFunction;
    use crate::converter::lattice::{build_lattice, Node};
    use crate::converter::segments::{SegmentType, Segments};
    use crate::converter::testutil::test_dict;

    fn surfaces(lattice: &Lattice) -> Vec<String> {
        lattice
            .best_path()
            .map(|id| lattice.node(id).value.clone())
            .collect()
    }

    #[test]
    fn test_viterbi_basic() {
        let dict = test_dict();
        let mut lattice =
            build_lattice(&dict, &Segments::from_keys(&[("きょうは", SegmentType::Free)]));
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);

        let total = viterbi(&mut lattice, &cost_fn).unwrap();
        assert_eq!(surfaces(&lattice), vec!["今日", "は"]);
        assert_eq!(total, 5000);
    }

    #[test]
    fn test_viterbi_longer_sentence() {
        let dict = test_dict();
        let mut lattice = build_lattice(
            &dict,
            &Segments::from_keys(&[("きょうはいいてんき", SegmentType::Free)]),
        );
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);

        viterbi(&mut lattice, &cost_fn).unwrap();
        assert_eq!(surfaces(&lattice), vec!["今日", "は", "良い", "天気"]);
    }

    #[test]
    fn test_best_path_links_are_consistent() {
        let dict = test_dict();
        let mut lattice = build_lattice(
            &dict,
            &Segments::from_keys(&[("わたしはがくせいです", SegmentType::Free)]),
        );
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);
        viterbi(&mut lattice, &cost_fn).unwrap();

        let mut cur = lattice.bos();
        while let Some(next) = lattice.node(cur).next {
            assert_eq!(lattice.node(next).prev, Some(cur));
            assert_eq!(lattice.node(cur).end, lattice.node(next).begin);
            cur = next;
        }
        assert_eq!(cur, lattice.eos());
    }

    #[test]
    fn test_cost_to_end_matches_best_cost() {
        let dict = test_dict();
        let mut lattice = build_lattice(
            &dict,
            &Segments::from_keys(&[("きょうはいいてんき", SegmentType::Free)]),
        );
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);
        let total = viterbi(&mut lattice, &cost_fn).unwrap();

        assert_eq!(lattice.node(lattice.bos()).cost_to_end, total);
        assert_eq!(lattice.node(lattice.eos()).cost_to_end, 0);
        // On the best path, forward and backward costs meet at the total.
        for id in lattice.best_path() {
            let node = lattice.node(id);
            assert_eq!(node.best_cost + node.cost_to_end, total);
        }
        // Off the path they can only be worse.
        for node in lattice.nodes() {
            if node.best_cost != UNREACHABLE && node.cost_to_end != UNREACHABLE {
                assert!(node.best_cost + node.cost_to_end >= total);
            }
        }
    }

    #[test]
    fn test_tie_keeps_first_predecessor() {
        let mut lattice = Lattice::new();
        lattice.set_key("ab");
        let first = lattice.insert(Node::new(0, 1, "a", "A1", 100, 0, 0)).unwrap();
        lattice.insert(Node::new(0, 1, "a", "A2", 100, 0, 0)).unwrap();
        lattice.insert(Node::new(1, 2, "b", "B", 100, 0, 0)).unwrap();
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);

        viterbi(&mut lattice, &cost_fn).unwrap();
        assert_eq!(lattice.best_path().next(), Some(first));
    }

    #[test]
    fn test_unreachable_eos() {
        let mut lattice = Lattice::new();
        lattice.set_key("abc");
        // Nothing covers position 1.
        lattice.insert(Node::new(0, 1, "a", "A", 100, 0, 0)).unwrap();
        lattice.insert(Node::new(2, 3, "c", "C", 100, 0, 0)).unwrap();
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);

        assert_eq!(viterbi(&mut lattice, &cost_fn), None);
        assert_eq!(lattice.best_path().count(), 0);
    }

    #[test]
    fn test_keyless_lattice() {
        let mut lattice = Lattice::new();
        let cost_fn = DefaultCostFunction::with_segment_penalty(None, 0);
        assert_eq!(viterbi(&mut lattice, &cost_fn), None);
    }
}
