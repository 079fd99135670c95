use super::AlignState;

pub type CigarOp = rust_htslib::bam::record::Cigar;

pub trait CigarOpExt {
    fn get_ref_len(&self) -> i64;
    fn get_query_len(&self) -> i64;
    /// State of the framed bases this operation contributes, `None` when it
    /// contributes nothing to the framed read.
    fn framed_state(&self) -> Option<AlignState>;
}

impl CigarOpExt for CigarOp {
    fn get_ref_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::RefSkip(len)
            | CigarOp::Del(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len) => *len as i64,
            CigarOp::Ins(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    fn get_query_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len)
            | CigarOp::Ins(len)
            | CigarOp::SoftClip(len) => *len as i64,
            CigarOp::RefSkip(_) | CigarOp::Del(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    fn framed_state(&self) -> Option<AlignState> {
        match self {
            CigarOp::Match(_) | CigarOp::Equal(_) | CigarOp::Diff(_) => Some(AlignState::Match),
            CigarOp::Ins(_) => Some(AlignState::Insertion),
            CigarOp::Del(_) => Some(AlignState::Deletion),
            CigarOp::RefSkip(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => {
                None
            }
        }
    }
}
