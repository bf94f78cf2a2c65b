//! Random protein pairs with an exact number of amino acid mismatches
//!
//! The reference is a uniform random protein. The query copies it and
//! substitutes a random subset of positions, each with a residue that is
//! guaranteed to differ. The query is then reverse-translated to DNA, one
//! randomly chosen synonymous codon per residue, because blastx expects a
//! nucleotide query.

use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::codons;

/// A reference protein and its mutated query, for a single trial
#[derive(Debug, Clone)]
pub struct TrialPair {
    /// Reference (subject) protein
    pub reference: Vec<u8>,
    /// Query protein, `mismatches` substitutions away from the reference
    pub query: Vec<u8>,
    /// Query reverse-translated to nucleotides (3 bases per residue)
    pub query_dna: Vec<u8>,
    /// Number of substituted positions
    pub mismatches: usize,
}

/// Number of positions at which two equal-length sequences differ
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Draw a residue from `alphabet` that is not `current`
///
/// Redraws uniformly until the result differs, so every other residue is
/// equally likely. The alphabet must contain at least one residue other
/// than `current`.
pub fn draw_different<R: Rng + ?Sized>(alphabet: &[u8], current: u8, rng: &mut R) -> u8 {
    assert!(
        alphabet.iter().any(|&r| r != current),
        "alphabet has no residue other than '{}'",
        current as char
    );
    loop {
        let candidate = alphabet[rng.gen_range(0..alphabet.len())];
        if candidate != current {
            return candidate;
        }
    }
}

/// Uniform random protein of `length` residues
pub fn random_protein<R: Rng + ?Sized>(alphabet: &[u8], length: usize, rng: &mut R) -> Vec<u8> {
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Copy `reference` and substitute exactly `mismatches` distinct positions
pub fn mutate<R: Rng + ?Sized>(
    alphabet: &[u8],
    reference: &[u8],
    mismatches: usize,
    rng: &mut R,
) -> Vec<u8> {
    let mut positions: Vec<usize> = (0..reference.len()).collect();
    positions.shuffle(rng);
    positions.truncate(mismatches);

    let mut query = reference.to_vec();
    for pos in positions {
        query[pos] = draw_different(alphabet, query[pos], rng);
    }
    query
}

/// Reverse-translate a protein, sampling one synonymous codon per residue
pub fn reverse_translate<R: Rng + ?Sized>(protein: &[u8], rng: &mut R) -> Result<Vec<u8>> {
    let mut dna = Vec::with_capacity(protein.len() * 3);
    for &aa in protein {
        match codons::random_codon(aa, rng) {
            Some(codon) => dna.extend_from_slice(codon.as_bytes()),
            None => bail!("No codon for residue '{}'", aa as char),
        }
    }
    Ok(dna)
}

/// Generate a reference/query pair of `length` residues differing at
/// exactly `mismatches` positions
pub fn generate_trial<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    mismatches: usize,
) -> Result<TrialPair> {
    if length == 0 {
        bail!("Sequence length must be at least 1");
    }
    if mismatches > length {
        bail!("Cannot make {mismatches} mismatches in a sequence of length {length}");
    }

    let alphabet = codons::amino_acids();
    let reference = random_protein(&alphabet, length, rng);
    let query = mutate(&alphabet, &reference, mismatches, rng);

    assert_eq!(
        hamming_distance(&reference, &query),
        mismatches,
        "generated query has the wrong number of mismatches"
    );

    let query_dna = reverse_translate(&query, rng)?;

    Ok(TrialPair {
        reference,
        query,
        query_dna,
        mismatches,
    })
}
