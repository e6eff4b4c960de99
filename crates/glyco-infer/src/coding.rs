//! Sequence truncation and the integer coding consumed by LectinOracle_flex.

/// Longest protein sequence passed to a model.
pub const MAX_PROTEIN_LEN: usize = 1000;

/// Residue order used by the flex coding.
pub const AMINO_ACIDS: [char; 20] = [
    'A', 'R', 'N', 'D', 'C', 'Q', 'E', 'G', 'H', 'I', 'L', 'K', 'M', 'F', 'P', 'S', 'T', 'W', 'Y',
    'V',
];

/// Code of any residue outside [`AMINO_ACIDS`].
pub const UNKNOWN_CODE: u32 = 20;
/// Code filling positions past the end of the sequence.
pub const PAD_CODE: u32 = 21;

/// First `max_len` residues of `sequence`.
pub fn truncate_sequence(sequence: &str, max_len: usize) -> &str {
    match sequence.char_indices().nth(max_len) {
        Some((end, _)) => &sequence[..end],
        None => sequence,
    }
}

pub fn aa_to_code(aa: char) -> u32 {
    AMINO_ACIDS
        .iter()
        .position(|&known| known == aa.to_ascii_uppercase())
        .map_or(UNKNOWN_CODE, |idx| idx as u32)
}

/// Codes a protein for the flex model: one value per residue of the first
/// [`MAX_PROTEIN_LEN`] residues, right-padded with [`PAD_CODE`].
///
/// Values are `f32` because the model reads the coding as a float feature.
pub fn prot_to_coded(sequence: &str) -> Vec<f32> {
    let mut coded: Vec<f32> = truncate_sequence(sequence, MAX_PROTEIN_LEN)
        .chars()
        .map(|aa| aa_to_code(aa) as f32)
        .collect();
    coded.resize(MAX_PROTEIN_LEN, PAD_CODE as f32);
    coded
}
