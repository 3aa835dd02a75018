//! Identity Verifier
//!
//! Qualification is binary: the entered serial either is the system serial
//! or it is not. Comparison is exact and case-sensitive with no trimming;
//! whatever normalisation applies happened when the system serial was
//! captured. Two empty strings match.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
}

pub fn verify(entered: &str, system: &str) -> Verification {
    if entered == system {
        Verification::Match
    } else {
        Verification::Mismatch
    }
}
