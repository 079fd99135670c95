//! Alignment records as seen by the decoders.
//!

use super::cigar::CigarOp;
use rust_htslib::bam;

/// A single alignment record, detached from htslib.
#[derive(PartialEq, Clone)]
pub struct AlignedRead {
    /// Read name.
    pub id: String,
    /// Name of the reference sequence the read is aligned to.
    pub ref_name: String,
    /// 0-based leftmost reference position.
    pub start: i64,
    /// SAM flag bitmask.
    pub flag: u16,
    /// Bases as stored in the record, clipped bases included.
    pub bases: Vec<u8>,
    /// Alignment operations in record order.
    pub cigar: Vec<CigarOp>,
}

impl std::fmt::Debug for AlignedRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Read")
            .field("id", &self.id)
            .field("ref_name", &self.ref_name)
            .field("start", &self.start)
            .field("flag", &self.flag)
            .field("bases", &String::from_utf8_lossy(&self.bases))
            .field("cigar", &self.cigar)
            .finish()
    }
}

impl AlignedRead {
    /// Creates an `AlignedRead` from an HTSlib record.
    ///
    /// # Arguments
    /// * `rec` - A BAM record from HTSlib.
    /// * `ref_name` - Name of the target the record was fetched from.
    pub fn from_hts_rec(rec: &bam::Record, ref_name: &str) -> AlignedRead {
        AlignedRead {
            id: String::from_utf8_lossy(rec.qname()).into_owned(),
            ref_name: ref_name.to_string(),
            start: rec.pos(),
            flag: rec.flags(),
            bases: rec.seq().as_bytes(),
            cigar: rec.cigar().take().0,
        }
    }
}

#[cfg(test)]
pub(crate) fn read_for_test(start: i64, bases: &str, cigar: Vec<CigarOp>) -> AlignedRead {
    AlignedRead {
        id: format!("read_{}", start),
        ref_name: "HXB2".to_string(),
        start,
        flag: 0,
        bases: bases.as_bytes().to_vec(),
        cigar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    #[test]
    fn from_hts_rec_copies_alignment() {
        let mut rec = bam::Record::new();
        let cigar = CigarString(vec![CigarOp::Match(4), CigarOp::Ins(1), CigarOp::Match(2)]);
        rec.set(b"q1", Some(&cigar), b"ACGTTAC", &[30; 7]);
        rec.set_pos(12);
        rec.set_flags(16);

        let read = AlignedRead::from_hts_rec(&rec, "HXB2");
        assert_eq!(read.id, "q1");
        assert_eq!(read.ref_name, "HXB2");
        assert_eq!(read.start, 12);
        assert_eq!(read.flag, 16);
        assert_eq!(read.bases, b"ACGTTAC".to_vec());
        assert_eq!(read.cigar.len(), 3);
    }
}
