//! Poseidon hashing over the BN254 scalar field
//!
//! The commitment scheme needs an algebraic permutation that evaluates
//! identically off-circuit (member tooling) and inside the constraint
//! system. Both sides share one `PoseidonConfig`: the native sponge
//! here, `PoseidonSpongeVar` in [`crate::circuit`].

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::PrimeField;

/// Sponge rate (two absorbed elements per permutation)
pub const POSEIDON_RATE: usize = 2;
/// Full S-box rounds
const FULL_ROUNDS: usize = 8;
/// Partial S-box rounds for width-3 BN254 Poseidon
const PARTIAL_ROUNDS: usize = 57;
/// S-box exponent
const ALPHA: u64 = 5;

/// Build the fixed BN254 Poseidon configuration shared by the native
/// hasher and the circuit gadget. Round constants and the MDS matrix
/// are derived deterministically from the field parameters.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        u64::from(Fr::MODULUS_BIT_SIZE),
        POSEIDON_RATE,
        FULL_ROUNDS as u64,
        PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, POSEIDON_RATE, 1)
}

/// Poseidon hasher implementing the commitment scheme
#[derive(Clone)]
pub struct PoseidonHasher {
    config: PoseidonConfig<Fr>,
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseidonHasher {
    /// Create a hasher with the fixed BN254 configuration
    pub fn new() -> Self {
        Self {
            config: poseidon_config(),
        }
    }

    /// The shared sponge configuration, for the circuit gadget
    pub fn config(&self) -> &PoseidonConfig<Fr> {
        &self.config
    }

    /// Hash a single field element
    pub fn hash1(&self, x: Fr) -> Fr {
        let mut sponge = PoseidonSponge::new(&self.config);
        sponge.absorb(&x);
        sponge.squeeze_native_field_elements(1)[0]
    }

    /// Hash an ordered pair of field elements
    pub fn hash2(&self, a: Fr, b: Fr) -> Fr {
        let mut sponge = PoseidonSponge::new(&self.config);
        sponge.absorb(&a);
        sponge.absorb(&b);
        sponge.squeeze_native_field_elements(1)[0]
    }

    /// Member commitment: `Poseidon(nullifier, secret)`
    pub fn commitment(&self, nullifier: Fr, secret: Fr) -> Fr {
        self.hash2(nullifier, secret)
    }

    /// Public nullifier hash: `Poseidon(nullifier)`
    pub fn nullifier_hash(&self, nullifier: Fr) -> Fr {
        self.hash1(nullifier)
    }

    /// Proposal-scoped tree leaf: `Poseidon(commitment, proposal_id)`
    ///
    /// Binding the proposal id into the leaf means an inclusion proof
    /// for one proposal cannot be replayed on another.
    pub fn vote_leaf(&self, commitment: Fr, proposal_id: Fr) -> Fr {
        self.hash2(commitment, proposal_id)
    }
}
