//! Codon-by-codon comparison of framed reads against the reference.
//!
//! Reads are first moved forward to the next codon boundary of the reference
//! reading frame. Each step then takes three framed bases. When an insertion
//! starts inside those three bases, the codon is completed with inserted bases,
//! the reference bases they displace are reported as a frame shift, and any
//! whole codons left in the insertion are reported at insertion positions.

use super::tally::CodonTally;
use super::translate::translate_codon;
use crate::recon::reads::{AlignState, FramedBase, FramedRead};
use crate::recon::Position;

const CODON_LEN: usize = 3;

/// Cursor over the framed bases still to be walked.
struct FrameCursor<'a> {
    bases: &'a [FramedBase],
    index: usize,
}

impl<'a> FrameCursor<'a> {
    fn remaining(&self) -> usize {
        self.bases.len() - self.index
    }

    /// Offset of the first inserted base among the next `within` bases.
    fn insertion_offset(&self, within: usize) -> Option<usize> {
        self.bases[self.index..]
            .iter()
            .take(within)
            .position(|b| b.state == AlignState::Insertion)
    }

    fn take(&mut self, n: usize) -> Option<&'a [FramedBase]> {
        if self.remaining() < n {
            return None;
        }
        Some(self.take_upto(n))
    }

    fn take_upto(&mut self, n: usize) -> &'a [FramedBase] {
        let end = (self.index + n).min(self.bases.len());
        let taken = &self.bases[self.index..end];
        self.index = end;
        taken
    }

    fn take_insertion(&mut self) -> &'a [FramedBase] {
        let len = self.bases[self.index..]
            .iter()
            .take_while(|b| b.state == AlignState::Insertion)
            .count();
        self.take_upto(len)
    }
}

fn values(bases: &[FramedBase]) -> Vec<u8> {
    bases.iter().map(|b| b.value).collect()
}

fn as_str(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub struct CodonWalker<'a> {
    reference: &'a [u8],
}

impl<'a> CodonWalker<'a> {
    pub fn new(reference: &'a [u8]) -> Self {
        Self { reference }
    }

    /// Reference codon starting at `ref_pos`, shorter near the reference end.
    fn ref_codon(&self, ref_pos: i64) -> &'a [u8] {
        let start = (ref_pos.max(0) as usize).min(self.reference.len());
        let end = (start + CODON_LEN).min(self.reference.len());
        &self.reference[start..end]
    }

    /// Skips framed bases until the read sits on a codon boundary.
    ///
    /// Returns the aligned start and the index of the first base to walk.
    /// Inserted bases passed on the way are dropped.
    fn phase_align(framed: &FramedRead) -> (i64, usize) {
        let mut start = framed.start;
        let mut index = 0;
        while start.rem_euclid(CODON_LEN as i64) != 0 && index < framed.len() {
            if framed.bases[index].state.consumes_reference() {
                start += 1;
            }
            index += 1;
        }
        (start, index)
    }

    /// Walks one read, adding its codons to `tally`. Returns the number of
    /// reference codons counted.
    pub fn walk(&self, framed: &FramedRead, tally: &mut CodonTally) -> usize {
        let (mut ref_pos, index) = Self::phase_align(framed);
        let mut cursor = FrameCursor {
            bases: &framed.bases,
            index,
        };
        let mut num_codons = 0;

        while cursor.remaining() >= CODON_LEN {
            let codon = match cursor.insertion_offset(CODON_LEN) {
                None => match cursor.take(CODON_LEN) {
                    Some(bases) => values(bases),
                    None => break,
                },
                Some(offset) => {
                    match self.codon_across_insertion(ref_pos, offset, &mut cursor, tally) {
                        Some(codon) => codon,
                        None => {
                            log::trace!("Read ends inside the codon at {}", ref_pos);
                            break;
                        }
                    }
                }
            };

            let ref_codon = self.ref_codon(ref_pos);
            tally.add_codon(
                ref_pos,
                &as_str(&codon),
                &as_str(ref_codon),
                translate_codon(ref_codon),
                translate_codon(&codon),
            );
            num_codons += 1;
            ref_pos += CODON_LEN as i64;
        }
        num_codons
    }

    /// Builds the codon at `ref_pos` when an insertion starts `offset` bases in.
    ///
    /// Codons are completed with inserted bases before following bases, so a
    /// read ending shortly after an insertion still yields its codon. Returns
    /// `None` only if fewer than three framed bases are left.
    fn codon_across_insertion(
        &self,
        ref_pos: i64,
        offset: usize,
        cursor: &mut FrameCursor,
        tally: &mut CodonTally,
    ) -> Option<Vec<u8>> {
        let mut codon = values(cursor.take(offset)?);
        let insertion = values(cursor.take_insertion());
        let mut borrowed = 0;

        if offset == 0 && insertion.len() >= CODON_LEN {
            // In-frame insertion: the codon lies past it, topped up from the
            // insertion when the read ends first.
            codon = values(cursor.take_upto(CODON_LEN));
        }
        while codon.len() < CODON_LEN {
            if borrowed < insertion.len() {
                codon.push(insertion[borrowed]);
                borrowed += 1;
            } else {
                codon.push(cursor.take(1)?[0].value);
            }
        }

        if borrowed > 0 && borrowed < CODON_LEN {
            let shifted = values(cursor.take_upto(borrowed));
            if !shifted.is_empty() {
                let shift_pos = ref_pos + (CODON_LEN - shifted.len()) as i64;
                tally.add_frame_shift(shift_pos, &as_str(&shifted));
            }
        }

        let leftover = &insertion[borrowed..];
        if leftover.len() >= CODON_LEN {
            let anchor = ref_pos + offset as i64 - 1;
            for (i, inserted) in leftover.chunks_exact(CODON_LEN).enumerate() {
                let index = (borrowed + 1 + CODON_LEN * i) as u32;
                tally.add_inserted_codon(
                    Position::inserted(anchor, index),
                    &as_str(inserted),
                    translate_codon(inserted),
                );
            }
        }

        Some(codon)
    }
}
