//! Framed reads: read bases laid out along the reference.
//!
//! A framed read keeps aligned bases, inserted bases and one gap per deleted
//! reference base, each tagged with the alignment state it came from. Clipped
//! bases are dropped. Walking a framed read assigns every base a [`Position`].

use super::cigar::CigarOpExt;
use super::read::AlignedRead;
use crate::recon::observation::PositionObservation;
use crate::recon::Position;

/// Placeholder for a deleted or uncovered reference base.
pub const GAP: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignState {
    Match,
    Insertion,
    Deletion,
}

impl AlignState {
    pub fn consumes_reference(&self) -> bool {
        !matches!(self, AlignState::Insertion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramedBase {
    pub value: u8,
    pub state: AlignState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramedRead {
    /// 0-based reference position of the first framed base.
    pub start: i64,
    pub bases: Vec<FramedBase>,
}

impl FramedRead {
    pub fn from_read(read: &AlignedRead) -> FramedRead {
        let mut bases = Vec::with_capacity(read.bases.len());
        let mut cursor = 0;
        for op in &read.cigar {
            let query_len = op.get_query_len() as usize;
            match op.framed_state() {
                Some(AlignState::Deletion) => {
                    let gap = FramedBase {
                        value: GAP,
                        state: AlignState::Deletion,
                    };
                    bases.extend(std::iter::repeat(gap).take(op.get_ref_len() as usize));
                }
                Some(state) => {
                    let end = cursor + query_len;
                    if end > read.bases.len() {
                        log::debug!(
                            "{}: CIGAR runs past the read bases ({} > {})",
                            read.id,
                            end,
                            read.bases.len()
                        );
                    }
                    let stop = end.min(read.bases.len());
                    let segment = read.bases.get(cursor..stop).unwrap_or(&[]);
                    bases.extend(segment.iter().map(|&value| FramedBase { value, state }));
                    cursor = end;
                }
                None => cursor += query_len,
            }
        }
        FramedRead {
            start: read.start,
            bases,
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Last position of the read span, counted in framed bases.
    pub fn end(&self) -> i64 {
        self.start + self.bases.len() as i64 - 1
    }

    pub fn to_string_lossy(&self) -> String {
        self.bases.iter().map(|b| b.value as char).collect()
    }

    /// Assigns a position to every framed base, in order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let mut tracker = PositionTracker::new(self.start);
        self.bases.iter().map(move |base| tracker.advance(base.state))
    }

    /// One observation per framed base.
    pub fn observations<'a>(
        &'a self,
        ref_name: &'a str,
    ) -> impl Iterator<Item = PositionObservation> + 'a {
        let read_end = self.end();
        self.positions()
            .zip(self.bases.iter())
            .enumerate()
            .map(move |(offset, (sequence_pos, base))| PositionObservation {
                actual_pos: self.start + offset as i64,
                sequence_pos,
                pos_value: base.value as char,
                ref_seq_name: ref_name.to_string(),
                read_start: self.start,
                read_end,
            })
    }
}

/// Tracks the reference anchor and the depth into the current insertion.
#[derive(Debug)]
struct PositionTracker {
    last_anchor: i64,
    insertion_index: u32,
}

impl PositionTracker {
    fn new(start: i64) -> Self {
        // Bases inserted before the first aligned base anchor to `start - 1`.
        Self {
            last_anchor: start - 1,
            insertion_index: 0,
        }
    }

    fn advance(&mut self, state: AlignState) -> Position {
        if state.consumes_reference() {
            self.step_reference()
        } else {
            self.extend_insertion()
        }
    }

    fn step_reference(&mut self) -> Position {
        self.last_anchor += 1;
        self.insertion_index = 0;
        Position::aligned(self.last_anchor)
    }

    fn extend_insertion(&mut self) -> Position {
        self.insertion_index += 1;
        Position::inserted(self.last_anchor, self.insertion_index)
    }
}
