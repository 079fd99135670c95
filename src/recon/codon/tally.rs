//! Per-sample accumulation of codon differences and per-position depth.

use super::translate::UNKNOWN_AA;
use crate::recon::Position;
use serde::Serialize;
use std::collections::BTreeMap;

/// Amino acid recorded on both sides of a frame-shift observation.
pub const FRAME_SHIFT_AA: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SynClass {
    #[serde(rename = "S")]
    Synonymous,
    #[serde(rename = "N")]
    Nonsynonymous,
}

impl SynClass {
    pub fn classify(ref_aa: char, mutant_aa: char) -> Self {
        if ref_aa == mutant_aa {
            SynClass::Synonymous
        } else {
            SynClass::Nonsynonymous
        }
    }
}

/// Reads carrying one particular codon at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct CodonCall {
    pub ref_codon: String,
    pub ref_aa: char,
    pub mutant_aa: char,
    pub depth: u32,
    pub class: SynClass,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PositionTotals {
    pub depth: u32,
    pub synonymous: u32,
    pub nonsynonymous: u32,
}

#[derive(Debug, Default)]
pub struct CodonTally {
    calls: BTreeMap<Position, BTreeMap<String, CodonCall>>,
    totals: BTreeMap<i64, PositionTotals>,
}

impl CodonTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one read codon at reference codon start `ref_pos`.
    pub fn add_codon(
        &mut self,
        ref_pos: i64,
        codon: &str,
        ref_codon: &str,
        ref_aa: char,
        mutant_aa: char,
    ) {
        let totals = self.totals.entry(ref_pos).or_default();
        totals.depth += 1;
        if codon == ref_codon {
            return;
        }
        let class = SynClass::classify(ref_aa, mutant_aa);
        match class {
            SynClass::Synonymous => totals.synonymous += 1,
            SynClass::Nonsynonymous => totals.nonsynonymous += 1,
        }
        self.record(
            Position::aligned(ref_pos),
            codon,
            ref_codon,
            ref_aa,
            mutant_aa,
            class,
        );
    }

    /// Reference bases displaced by borrowed insertion bases.
    pub fn add_frame_shift(&mut self, ref_pos: i64, shifted: &str) {
        let ref_codon = "-".repeat(shifted.len());
        self.record(
            Position::aligned(ref_pos),
            shifted,
            &ref_codon,
            FRAME_SHIFT_AA,
            FRAME_SHIFT_AA,
            SynClass::Nonsynonymous,
        );
    }

    /// A whole codon made only of inserted bases.
    pub fn add_inserted_codon(&mut self, pos: Position, codon: &str, mutant_aa: char) {
        self.record(pos, codon, "---", UNKNOWN_AA, mutant_aa, SynClass::Nonsynonymous);
    }

    fn record(
        &mut self,
        pos: Position,
        codon: &str,
        ref_codon: &str,
        ref_aa: char,
        mutant_aa: char,
        class: SynClass,
    ) {
        let calls = self.calls.entry(pos).or_default();
        match calls.get_mut(codon) {
            Some(call) => {
                call.depth += 1;
                call.class = class;
            }
            None => {
                calls.insert(
                    codon.to_string(),
                    CodonCall {
                        ref_codon: ref_codon.to_string(),
                        ref_aa,
                        mutant_aa,
                        depth: 1,
                        class,
                    },
                );
            }
        }
    }

    /// Calls in ascending position order, codons lexically within a position.
    pub fn calls(&self) -> impl Iterator<Item = (Position, &str, &CodonCall)> {
        self.calls.iter().flat_map(|(&pos, calls)| {
            calls
                .iter()
                .map(move |(codon, call)| (pos, codon.as_str(), call))
        })
    }

    pub fn totals(&self) -> impl Iterator<Item = (i64, &PositionTotals)> {
        self.totals.iter().map(|(&pos, totals)| (pos, totals))
    }

    pub fn num_calls(&self) -> usize {
        self.calls.values().map(|calls| calls.len()).sum()
    }

    pub fn num_positions(&self) -> usize {
        self.totals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_codon_only_adds_depth() {
        let mut tally = CodonTally::new();
        tally.add_codon(9, "ATG", "ATG", 'M', 'M');
        assert_eq!(tally.num_calls(), 0);
        let totals: Vec<_> = tally.totals().collect();
        assert_eq!(
            totals,
            vec![(
                9,
                &PositionTotals {
                    depth: 1,
                    synonymous: 0,
                    nonsynonymous: 0
                }
            )]
        );
    }

    #[test]
    fn synonymous_and_nonsynonymous_are_counted() {
        let mut tally = CodonTally::new();
        tally.add_codon(3, "GCC", "GCT", 'A', 'A');
        tally.add_codon(3, "GCC", "GCT", 'A', 'A');
        tally.add_codon(3, "ACT", "GCT", 'A', 'T');
        tally.add_codon(3, "GCT", "GCT", 'A', 'A');

        let (_, totals) = tally.totals().next().unwrap();
        assert_eq!(totals.depth, 4);
        assert_eq!(totals.synonymous, 2);
        assert_eq!(totals.nonsynonymous, 1);

        let calls: Vec<_> = tally.calls().collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "ACT");
        assert_eq!(calls[0].2.class, SynClass::Nonsynonymous);
        assert_eq!(calls[1].1, "GCC");
        assert_eq!(calls[1].2.depth, 2);
        assert_eq!(calls[1].2.class, SynClass::Synonymous);
    }

    #[test]
    fn insertion_calls_sort_after_anchor() {
        let mut tally = CodonTally::new();
        tally.add_inserted_codon(Position::inserted(5, 1), "AAA", 'K');
        tally.add_codon(6, "TTT", "TTC", 'F', 'F');
        tally.add_codon(3, "CCC", "CCA", 'P', 'P');
        tally.add_frame_shift(5, "G");
        let positions: Vec<_> = tally.calls().map(|(pos, _, _)| pos).collect();
        assert_eq!(
            positions,
            vec![
                Position::aligned(3),
                Position::aligned(5),
                Position::inserted(5, 1),
                Position::aligned(6)
            ]
        );
        // Only reference codons contribute depth.
        assert_eq!(tally.num_positions(), 2);
    }
}
