mod cigar;
mod flags;
mod framed;
mod read;

pub use cigar::{CigarOp, CigarOpExt};
pub use flags::{decompose_flag, is_filtered, ERROR_FLAGS, SAM_FLAGS};
pub use framed::{AlignState, FramedBase, FramedRead, GAP};
pub use read::AlignedRead;
