//! Per-position consensus over partitioned observations.

use crate::recon::observation::PositionObservation;
use crate::recon::reads::GAP;
use crate::recon::Position;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

const GAP_CHAR: char = GAP as char;

#[derive(Debug, Clone, Copy)]
pub struct ConsensusParams {
    /// A base replaces a majority gap when its count reaches this fraction of the gap count.
    pub gap_override_ratio: f64,
    /// An insertion is kept only when its share of spanning reads exceeds this.
    pub min_insertion_support: f64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            gap_override_ratio: 0.75,
            min_insertion_support: 0.5,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConsensusStats {
    pub positions: usize,
    pub gaps_filled: usize,
    pub gap_overrides: usize,
    pub insertions_kept: usize,
    pub insertions_dropped: usize,
}

/// Builds the consensus sequence one partition at a time.
///
/// Partitions must be added in ascending key order; state carried between them
/// is limited to the last emitted reference position.
pub struct ConsensusBuilder {
    params: ConsensusParams,
    last_anchor: i64,
    sequence: String,
    stats: ConsensusStats,
}

impl ConsensusBuilder {
    pub fn new(params: ConsensusParams) -> Self {
        Self {
            params,
            last_anchor: -1,
            sequence: String::new(),
            stats: ConsensusStats::default(),
        }
    }

    pub fn add_partition(&mut self, observations: &[PositionObservation]) {
        let mut tallies: BTreeMap<Position, BTreeMap<char, usize>> = BTreeMap::new();
        // Reads observed at an anchor that also span the next reference position.
        let mut spanning: HashMap<i64, usize> = HashMap::new();
        for obs in observations {
            *tallies
                .entry(obs.sequence_pos)
                .or_default()
                .entry(obs.pos_value)
                .or_default() += 1;
            if !obs.sequence_pos.is_insertion() && obs.read_covers(obs.sequence_pos.anchor + 1) {
                *spanning.entry(obs.sequence_pos.anchor).or_default() += 1;
            }
        }

        for (pos, tally) in tallies {
            self.stats.positions += 1;
            if pos.is_insertion() {
                let support = spanning.get(&pos.anchor).copied().unwrap_or(0);
                let insertion_support: usize = tally.values().sum();
                if !self.keep_insertion(insertion_support, support) {
                    log::trace!(
                        "Dropping insertion at {} ({}/{})",
                        pos,
                        insertion_support,
                        support
                    );
                    self.stats.insertions_dropped += 1;
                    continue;
                }
                self.stats.insertions_kept += 1;
            } else {
                self.fill_gaps_before(pos.anchor);
            }
            let value = self.pick_value(&tally);
            self.sequence.push(value);
        }
    }

    fn keep_insertion(&self, insertion_support: usize, support: usize) -> bool {
        support > 0
            && insertion_support as f64 / support as f64 > self.params.min_insertion_support
    }

    fn fill_gaps_before(&mut self, anchor: i64) {
        let missing = anchor - self.last_anchor - 1;
        if missing > 0 {
            self.sequence
                .extend(std::iter::repeat(GAP_CHAR).take(missing as usize));
            self.stats.gaps_filled += missing as usize;
        }
        self.last_anchor = self.last_anchor.max(anchor);
    }

    /// Most frequent value; a close runner-up base wins over a majority gap.
    fn pick_value(&mut self, tally: &BTreeMap<char, usize>) -> char {
        // Ties go to bases over the gap, then to the lexically smallest value.
        let ranked = tally
            .iter()
            .sorted_by_key(|&(value, count)| {
                (std::cmp::Reverse(*count), *value == GAP_CHAR, *value)
            })
            .collect_vec();
        let (&top, &top_count) = ranked[0];
        if top == GAP_CHAR {
            if let Some(&(&runner_up, &runner_up_count)) = ranked.get(1) {
                if runner_up_count as f64 / top_count as f64 >= self.params.gap_override_ratio {
                    self.stats.gap_overrides += 1;
                    return runner_up;
                }
            }
        }
        top
    }

    pub fn finish(self) -> (String, ConsensusStats) {
        (self.sequence, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(pos: Position, value: char, read_start: i64, read_end: i64) -> PositionObservation {
        PositionObservation {
            actual_pos: pos.anchor,
            sequence_pos: pos,
            pos_value: value,
            ref_seq_name: "HXB2".to_string(),
            read_start,
            read_end,
        }
    }

    fn pile(pos: Position, counts: &[(char, usize)]) -> Vec<PositionObservation> {
        counts
            .iter()
            .flat_map(|&(value, count)| (0..count).map(move |_| obs(pos, value, 0, 100)))
            .collect()
    }

    fn build(observations: &[PositionObservation]) -> String {
        let mut builder = ConsensusBuilder::new(ConsensusParams::default());
        builder.add_partition(observations);
        builder.finish().0
    }

    #[test]
    fn close_base_overrides_gap() {
        let observations = pile(Position::aligned(0), &[('-', 10), ('A', 8)]);
        assert_eq!(build(&observations), "A");
    }

    #[test]
    fn distant_base_loses_to_gap() {
        let observations = pile(Position::aligned(0), &[('-', 10), ('A', 7)]);
        assert_eq!(build(&observations), "-");
    }

    #[test]
    fn ties_break_lexically_and_against_gaps() {
        let observations = pile(Position::aligned(0), &[('T', 4), ('C', 4), ('G', 2)]);
        assert_eq!(build(&observations), "C");
        let observations = pile(Position::aligned(0), &[('-', 3), ('G', 3)]);
        assert_eq!(build(&observations), "G");
    }

    fn insertion_pile(carriers: usize, total: usize) -> Vec<PositionObservation> {
        let mut observations = Vec::new();
        for read in 0..total {
            observations.push(obs(Position::aligned(0), 'A', 0, 1));
            if read < carriers {
                observations.push(obs(Position::inserted(0, 1), 'T', 0, 1));
            }
            observations.push(obs(Position::aligned(1), 'C', 0, 1));
        }
        observations
    }

    #[test]
    fn half_supported_insertion_is_dropped() {
        assert_eq!(build(&insertion_pile(5, 10)), "AC");
    }

    #[test]
    fn majority_insertion_is_kept() {
        assert_eq!(build(&insertion_pile(6, 10)), "ATC");
    }

    #[test]
    fn insertion_support_ignores_reads_ending_at_anchor() {
        let mut observations = insertion_pile(2, 3);
        // Reads stopping at the anchor do not count as spanning it.
        for _ in 0..4 {
            observations.push(obs(Position::aligned(0), 'A', 0, 0));
        }
        assert_eq!(build(&observations), "ATC");
    }

    #[test]
    fn uncovered_positions_become_gaps() {
        let observations = vec![
            obs(Position::aligned(0), 'G', 0, 0),
            obs(Position::aligned(10), 'A', 10, 10),
            obs(Position::aligned(15), 'C', 15, 15),
        ];
        let sequence = build(&observations);
        assert_eq!(sequence, "G---------A----C");
        assert_eq!(&sequence[11..15], "----");
    }

    #[test]
    fn leading_uncovered_positions_are_gapped() {
        let observations = vec![obs(Position::aligned(3), 'A', 3, 3)];
        assert_eq!(build(&observations), "---A");
    }

    #[test]
    fn gap_state_carries_across_partitions() {
        let mut builder = ConsensusBuilder::new(ConsensusParams::default());
        builder.add_partition(&[obs(Position::aligned(0), 'A', 0, 0)]);
        builder.add_partition(&[obs(Position::aligned(3), 'C', 3, 3)]);
        let (sequence, stats) = builder.finish();
        assert_eq!(sequence, "A--C");
        assert_eq!(stats.gaps_filled, 2);
    }

    #[test]
    fn gap_override_ratio_is_inclusive() {
        let params = ConsensusParams {
            gap_override_ratio: 0.07,
            min_insertion_support: 0.5,
        };
        let mut builder = ConsensusBuilder::new(params);
        builder.add_partition(&pile(Position::aligned(0), &[('-', 100), ('A', 7)]));
        builder.add_partition(&pile(Position::aligned(1), &[('-', 100), ('C', 6)]));
        assert_eq!(builder.finish().0, "A-");
    }

    #[test]
    fn thresholds_are_configurable() {
        let params = ConsensusParams {
            gap_override_ratio: 0.5,
            min_insertion_support: 0.2,
        };
        let mut builder = ConsensusBuilder::new(params);
        builder.add_partition(&pile(Position::aligned(0), &[('-', 10), ('A', 5)]));
        builder.add_partition(&insertion_pile(3, 10));
        let (sequence, stats) = builder.finish();
        assert_eq!(sequence, "AATC");
        assert_eq!(stats.gap_overrides, 1);
        assert_eq!(stats.insertions_kept, 1);
    }
}
