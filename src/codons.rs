//! Amino acid alphabet and reverse-translation table
//!
//! Each of the 20 standard amino acids maps to the codons that encode it
//! under the standard genetic code. Stop codons are never emitted.

use rand::seq::SliceRandom;
use rand::Rng;

/// Amino acid (one-letter code) to its synonymous codons
pub const CODONS: &[(u8, &[&str])] = &[
    (b'A', &["GCA", "GCC", "GCG", "GCT"]),
    (b'C', &["TGC", "TGT"]),
    (b'D', &["GAC", "GAT"]),
    (b'E', &["GAA", "GAG"]),
    (b'F', &["TTC", "TTT"]),
    (b'G', &["GGA", "GGC", "GGG", "GGT"]),
    (b'H', &["CAC", "CAT"]),
    (b'I', &["ATA", "ATC", "ATT"]),
    (b'K', &["AAA", "AAG"]),
    (b'L', &["CTA", "CTC", "CTG", "CTT", "TTA", "TTG"]),
    (b'M', &["ATG"]),
    (b'N', &["AAC", "AAT"]),
    (b'P', &["CCA", "CCC", "CCG", "CCT"]),
    (b'Q', &["CAA", "CAG"]),
    (b'R', &["AGA", "AGG", "CGA", "CGC", "CGG", "CGT"]),
    (b'S', &["AGC", "AGT", "TCA", "TCC", "TCG", "TCT"]),
    (b'T', &["ACA", "ACC", "ACG", "ACT"]),
    (b'V', &["GTA", "GTC", "GTG", "GTT"]),
    (b'W', &["TGG"]),
    (b'Y', &["TAC", "TAT"]),
];

/// All residues of the alphabet, in table order
pub fn amino_acids() -> Vec<u8> {
    CODONS.iter().map(|(aa, _)| *aa).collect()
}

/// Synonymous codons for a residue, or None if it is not in the alphabet
pub fn codons_for(aa: u8) -> Option<&'static [&'static str]> {
    CODONS
        .iter()
        .find(|(residue, _)| *residue == aa)
        .map(|(_, codons)| *codons)
}

/// Pick one synonymous codon for `aa` uniformly at random
pub fn random_codon<R: Rng + ?Sized>(aa: u8, rng: &mut R) -> Option<&'static str> {
    codons_for(aa).and_then(|codons| codons.choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_every_residue_has_a_codon() {
        assert_eq!(CODONS.len(), 20);
        for (aa, codons) in CODONS {
            assert!(!codons.is_empty(), "{} has no codons", *aa as char);
            for codon in *codons {
                assert_eq!(codon.len(), 3);
                assert!(codon.bytes().all(|b| b"ACGT".contains(&b)));
            }
        }
    }

    #[test]
    fn test_no_codon_is_shared_or_a_stop() {
        let mut seen = HashSet::new();
        for (_, codons) in CODONS {
            for codon in *codons {
                assert!(seen.insert(*codon), "{codon} listed twice");
                assert!(!["TAA", "TAG", "TGA"].contains(codon));
            }
        }
        // 64 codons minus 3 stops
        assert_eq!(seen.len(), 61);
    }

    #[test]
    fn test_random_codon_is_synonymous() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let codon = random_codon(b'L', &mut rng).unwrap();
            assert!(codons_for(b'L').unwrap().contains(&codon));
        }
        assert!(random_codon(b'*', &mut rng).is_none());
    }
}
