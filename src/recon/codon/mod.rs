mod sample;
mod tally;
mod translate;
mod walker;

pub use sample::{SampleIds, SampleLookup};
pub use tally::{CodonCall, CodonTally, PositionTotals, SynClass, FRAME_SHIFT_AA};
pub use translate::{translate_codon, UNKNOWN_AA};
pub use walker::CodonWalker;
