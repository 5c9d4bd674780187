//! The proof oracle: non-interactive Groth16 verification

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, VerifyingKey};
use ark_snark::SNARK;
use tracing::debug;

use crate::circuit::PUBLIC_INPUT_COUNT;
use crate::error::{BallotError, Result};
use crate::proof::Proof;

/// Deterministic, side-effect-free boolean verifier for a
/// (proof, public-inputs) pair.
///
/// The registry gates all state mutation on this single call. A
/// `false` result carries no detail about which check failed.
pub trait ProofOracle {
    fn verify(&self, proof: &Proof, public_inputs: &[Fr; PUBLIC_INPUT_COUNT]) -> bool;
}

/// Groth16 oracle with a prepared verification key
pub struct BallotVerifier {
    prepared_vk: PreparedVerifyingKey<Bn254>,
}

impl BallotVerifier {
    /// Prepare the verification key produced by the trusted setup
    pub fn new(verifying_key: &VerifyingKey<Bn254>) -> Result<Self> {
        let prepared_vk = Groth16::<Bn254>::process_vk(verifying_key).map_err(|e| {
            BallotError::SetupError {
                reason: e.to_string(),
            }
        })?;

        Ok(Self { prepared_vk })
    }
}

impl ProofOracle for BallotVerifier {
    fn verify(&self, proof: &Proof, public_inputs: &[Fr; PUBLIC_INPUT_COUNT]) -> bool {
        // Malformed input collapses into a plain rejection; the oracle
        // never distinguishes why verification failed
        let accepted = Groth16::<Bn254>::verify_with_processed_vk(
            &self.prepared_vk,
            public_inputs,
            &proof.inner,
        )
        .unwrap_or(false);

        debug!(accepted, "groth16 pairing check");
        accepted
    }
}
