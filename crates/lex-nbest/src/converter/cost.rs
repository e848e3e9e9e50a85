use crate::dict::connection::ConnectionMatrix;
use crate::settings::settings;

use super::lattice::Node;

/// Trait for scoring lattice paths during Viterbi and n-best search.
///
/// BOS and EOS are ordinary nodes with class id 0, so the BOS and EOS
/// connection costs come from `transition_cost`.
pub trait CostFunction: Send + Sync {
    fn word_cost(&self, node: &Node) -> i64;
    fn transition_cost(&self, prev: &Node, next: &Node) -> i64;
}

/// Look up connection cost between two IDs, returning 0 if no matrix is provided.
pub fn conn_cost(conn: Option<&ConnectionMatrix>, left: u16, right: u16) -> i64 {
    conn.map(|c| c.cost(left, right) as i64).unwrap_or(0)
}

/// Default cost function using word costs and optional connection matrix.
pub struct DefaultCostFunction<'a> {
    conn: Option<&'a ConnectionMatrix>,
    segment_penalty: i64,
}

impl<'a> DefaultCostFunction<'a> {
    /// Uses the segment penalty from settings.
    pub fn new(conn: Option<&'a ConnectionMatrix>) -> Self {
        Self::with_segment_penalty(conn, settings().cost.segment_penalty)
    }

    pub fn with_segment_penalty(conn: Option<&'a ConnectionMatrix>, segment_penalty: i64) -> Self {
        Self {
            conn,
            segment_penalty,
        }
    }
}

impl CostFunction for DefaultCostFunction<'_> {
    fn word_cost(&self, node: &Node) -> i64 {
        if node.is_sentinel() {
            return 0;
        }
        let is_fw = self
            .conn
            .map(|c| c.is_function_word(node.left_id))
            .unwrap_or(false);
        let penalty = if is_fw {
            self.segment_penalty / 2
        } else {
            self.segment_penalty
        };
        node.cost as i64 + penalty
    }

    fn transition_cost(&self, prev: &Node, next: &Node) -> i64 {
        conn_cost(self.conn, prev.right_id, next.left_id)
    }
}
