use crate::recon::Position;
use serde::{Deserialize, Serialize};

/// One read's base (or gap) at one position.
///
/// Field names double as the partition file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionObservation {
    pub actual_pos: i64,
    pub sequence_pos: Position,
    pub pos_value: char,
    pub ref_seq_name: String,
    pub read_start: i64,
    pub read_end: i64,
}

impl PositionObservation {
    /// Whether the read that made this observation spans `pos`.
    pub fn read_covers(&self, pos: i64) -> bool {
        self.read_start <= pos && pos <= self.read_end
    }
}
