// Library exports for scoresweep
pub mod binary_paths;
pub mod codons;
pub mod diamond;
pub mod grid;
pub mod oracle;
pub mod platform;
pub mod plot;
pub mod sampler;
pub mod sensitivity;
pub mod sequence_gen;
