//! Standard genetic code.

/// Amino acids indexed by codon, bases ordered T, C, A, G.
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Placeholder amino acid for codons that cannot be translated.
pub const UNKNOWN_AA: char = 'X';

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// Translates a codon; stops come back as `*`, anything else untranslatable as `X`.
pub fn translate_codon(codon: &[u8]) -> char {
    if codon.len() != 3 {
        return UNKNOWN_AA;
    }
    codon
        .iter()
        .try_fold(0, |index, &base| base_index(base).map(|b| index * 4 + b))
        .map_or(UNKNOWN_AA, |index| STANDARD_CODE[index] as char)
}
