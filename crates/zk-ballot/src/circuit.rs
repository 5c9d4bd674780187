//! The vote constraint system
//!
//! One provable statement combining accumulator membership, commitment
//! derivation and vote validity. Public inputs, in order:
//! `[root, nullifier_hash, proposal_id, vote_value]`. Private inputs:
//! the member's `nullifier` and `secret` plus the Merkle path.
//!
//! Every derived signal below is pinned by an explicit equation; an
//! unconstrained signal would let a dishonest prover assign it freely
//! and forge membership.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::merkle::TREE_DEPTH;

/// Number of public input signals, order-significant
pub const PUBLIC_INPUT_COUNT: usize = 4;

/// The vote circuit with a full assignment.
///
/// For key generation use [`VoteCircuit::blank`]; the constraint
/// structure is independent of the assigned values.
#[derive(Clone)]
pub struct VoteCircuit {
    /// Shared Poseidon configuration (must match the native hasher)
    pub config: PoseidonConfig<Fr>,

    // Public inputs
    pub root: Fr,
    pub nullifier_hash: Fr,
    pub proposal_id: Fr,
    pub vote_value: Fr,

    // Private inputs
    pub nullifier: Fr,
    pub secret: Fr,
    pub path_elements: [Fr; TREE_DEPTH],
    pub path_indices: [u8; TREE_DEPTH],
}

impl VoteCircuit {
    /// A zero-assigned circuit for proving/verification key setup
    pub fn blank(config: PoseidonConfig<Fr>) -> Self {
        Self {
            config,
            root: Fr::zero(),
            nullifier_hash: Fr::zero(),
            proposal_id: Fr::zero(),
            vote_value: Fr::zero(),
            nullifier: Fr::zero(),
            secret: Fr::zero(),
            path_elements: [Fr::zero(); TREE_DEPTH],
            path_indices: [0u8; TREE_DEPTH],
        }
    }

    /// The public inputs in verification order
    pub fn public_inputs(&self) -> [Fr; PUBLIC_INPUT_COUNT] {
        [self.root, self.nullifier_hash, self.proposal_id, self.vote_value]
    }
}

/// In-circuit `Poseidon(a)`
fn hash1_gadget(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    a: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(a)?;
    Ok(sponge.squeeze_field_elements(1)?.remove(0))
}

/// In-circuit `Poseidon(a, b)`
fn hash2_gadget(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(a)?;
    sponge.absorb(b)?;
    Ok(sponge.squeeze_field_elements(1)?.remove(0))
}

impl ConstraintSynthesizer<Fr> for VoteCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // Public inputs, allocation order fixes the signal order
        let root = FpVar::new_input(cs.clone(), || Ok(self.root))?;
        let nullifier_hash = FpVar::new_input(cs.clone(), || Ok(self.nullifier_hash))?;
        let proposal_id = FpVar::new_input(cs.clone(), || Ok(self.proposal_id))?;
        let vote_value = FpVar::new_input(cs.clone(), || Ok(self.vote_value))?;

        // Private inputs
        let nullifier = FpVar::new_witness(cs.clone(), || Ok(self.nullifier))?;
        let secret = FpVar::new_witness(cs.clone(), || Ok(self.secret))?;

        let zero = FpVar::<Fr>::zero();
        let one = FpVar::<Fr>::one();
        let two = &one + &one;

        // vote_value in {0, 1, 2} via a single polynomial identity,
        // cheaper than a comparator sub-circuit
        let v_minus_one = &vote_value - &one;
        let v_minus_two = &vote_value - &two;
        let range = &vote_value * &v_minus_one * &v_minus_two;
        range.enforce_equal(&zero)?;

        // Zero is a degenerate element: force the zero-equality
        // indicator false for each secret input and the proposal id
        nullifier.is_eq(&zero)?.enforce_equal(&Boolean::FALSE)?;
        secret.is_eq(&zero)?.enforce_equal(&Boolean::FALSE)?;
        proposal_id.is_eq(&zero)?.enforce_equal(&Boolean::FALSE)?;

        // commitment = Poseidon(nullifier, secret), and the public
        // nullifier hash must derive from the same nullifier
        let commitment = hash2_gadget(cs.clone(), &self.config, &nullifier, &secret)?;
        let derived_nullifier_hash = hash1_gadget(cs.clone(), &self.config, &nullifier)?;
        derived_nullifier_hash.enforce_equal(&nullifier_hash)?;

        // leaf = Poseidon(commitment, proposal_id) binds the
        // membership proof to this proposal
        let leaf = hash2_gadget(cs.clone(), &self.config, &commitment, &proposal_id)?;

        // Climb the tree: each selector bit is boolean-constrained on
        // allocation, then chooses the (current, sibling) ordering
        let mut current = leaf;
        for level in 0..TREE_DEPTH {
            let sibling = FpVar::new_witness(cs.clone(), || Ok(self.path_elements[level]))?;
            let is_right_child =
                Boolean::new_witness(cs.clone(), || Ok(self.path_indices[level] == 1))?;

            let left = FpVar::conditionally_select(&is_right_child, &sibling, &current)?;
            let right = FpVar::conditionally_select(&is_right_child, &current, &sibling)?;
            current = hash2_gadget(cs.clone(), &self.config, &left, &right)?;
        }

        current.enforce_equal(&root)?;

        Ok(())
    }
}
