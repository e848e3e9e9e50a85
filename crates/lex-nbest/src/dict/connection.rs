use super::pos::{PosRole, PosTable};

/// A connection cost matrix mapping (left_id, right_id) → cost, plus the
/// per-id role table used for segment boundaries.
/// Used by the Viterbi algorithm to score morpheme transitions.
pub struct ConnectionMatrix {
    pub(super) num_ids: u16,
    pub(super) fw_min: u16,
    pub(super) fw_max: u16,
    pub(super) roles: Vec<u8>,
    pub(super) costs: Vec<i16>,
}

impl ConnectionMatrix {
    /// Look up the connection cost between two morphemes.
    /// Index: left_id * num_ids + right_id. Out-of-bounds returns 0.
    pub fn cost(&self, left_id: u16, right_id: u16) -> i16 {
        let idx = (left_id as usize)
            .saturating_mul(self.num_ids as usize)
            .saturating_add(right_id as usize);
        self.costs.get(idx).copied().unwrap_or(0)
    }

    /// Number of morpheme IDs in this matrix.
    pub fn num_ids(&self) -> u16 {
        self.num_ids
    }

    /// Function-word POS ID range (lower bound, inclusive).
    pub fn fw_min(&self) -> u16 {
        self.fw_min
    }

    /// Function-word POS ID range (upper bound, inclusive).
    pub fn fw_max(&self) -> u16 {
        self.fw_max
    }

    /// Check whether a POS ID falls in the function-word range (助詞/助動詞).
    /// Returns `false` when no range is set (both 0).
    pub fn is_function_word(&self, id: u16) -> bool {
        self.fw_min != 0 && self.fw_min <= id && id <= self.fw_max
    }

    /// Get the raw morpheme role byte for a POS ID.
    /// Returns 0 (ContentWord) for IDs beyond the roles vector.
    pub fn role(&self, id: u16) -> u8 {
        self.roles.get(id as usize).copied().unwrap_or(0)
    }

    /// Overwrite the role of a single POS ID. Out-of-range IDs are ignored.
    pub fn set_role(&mut self, id: u16, role: PosRole) {
        if let Some(slot) = self.roles.get_mut(id as usize) {
            *slot = role.as_u8();
        }
    }
}

impl PosTable for ConnectionMatrix {
    /// The function-word range takes precedence over the role byte.
    fn pos_role(&self, id: u16) -> PosRole {
        if self.is_function_word(id) {
            PosRole::FunctionWord
        } else {
            PosRole::from_u8(self.role(id))
        }
    }
}
