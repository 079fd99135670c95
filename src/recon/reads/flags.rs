//! SAM flag decomposition and the flags that exclude a record from reconstruction.

/// Every SAM flag bit, largest first.
pub const SAM_FLAGS: [u16; 12] = [2048, 1024, 512, 256, 128, 64, 32, 16, 8, 4, 2, 1];

/// Unmapped, secondary, QC-fail, duplicate and supplementary.
pub const ERROR_FLAGS: [u16; 5] = [2048, 1024, 512, 256, 4];

/// Splits a flag into its single-bit components, largest first.
///
/// A flag of 0 decomposes to `[0]`.
pub fn decompose_flag(flag: u16) -> Vec<u16> {
    if flag == 0 {
        return vec![0];
    }
    let mut remaining = flag;
    let mut bits = Vec::new();
    for &bit in SAM_FLAGS.iter() {
        if remaining >= bit {
            bits.push(bit);
            remaining -= bit;
            if remaining == 0 {
                break;
            }
        }
    }
    bits
}

pub fn is_filtered(flag: u16) -> bool {
    decompose_flag(flag)
        .iter()
        .any(|bit| ERROR_FLAGS.contains(bit))
}
