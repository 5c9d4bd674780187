//! Member-side witness assembly and proof generation
//!
//! The prover is the off-chain tool a member runs. It builds the
//! membership tree for a voting campaign (a fixed member set voting on
//! a declared set of proposal ids), holds the Groth16 proving key from
//! the one-time setup, and turns a member's secrets into a
//! [`VoteSubmission`] for the registry.
//!
//! Because the circuit binds `leaf = Poseidon(commitment,
//! proposal_id)`, the single fixed root must commit to every
//! (member, proposal) leaf the campaign will ever need. Leaves are
//! laid out proposal-major: the leaf for member `m` on the k-th
//! declared proposal sits at `k * member_count + m`.

use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_ff::Zero;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use tracing::{debug, info, instrument};

use crate::circuit::VoteCircuit;
use crate::error::{BallotError, Result};
use crate::member::{Member, VoteChoice};
use crate::merkle::{MerklePath, MerkleTree};
use crate::poseidon::PoseidonHasher;
use crate::proof::{Proof, VoteSubmission};

/// Off-chain prover for one voting campaign
pub struct BallotProver {
    hasher: PoseidonHasher,
    tree: MerkleTree,
    member_count: usize,
    proposal_ids: Vec<u64>,
    proving_key: ProvingKey<Bn254>,
    verifying_key: VerifyingKey<Bn254>,
}

impl BallotProver {
    /// Build the campaign tree from the agreed, ordered member
    /// commitments and the declared proposal ids, then run the
    /// circuit-specific trusted setup.
    ///
    /// The tree build is the synchronization barrier: it needs the
    /// complete member set, and any later change to that set
    /// invalidates the root and every proof.
    #[instrument(skip_all, fields(members = commitments.len(), proposals = proposal_ids.len()))]
    pub fn setup<R: RngCore + CryptoRng>(
        commitments: &[Fr],
        proposal_ids: &[u64],
        rng: &mut R,
    ) -> Result<Self> {
        for (slot, &pid) in proposal_ids.iter().enumerate() {
            if pid == 0 {
                return Err(BallotError::InvalidInput {
                    field: "proposal_ids".into(),
                    value: "0".into(),
                    expected: "non-zero proposal ids".into(),
                });
            }
            if proposal_ids[..slot].contains(&pid) {
                return Err(BallotError::InvalidInput {
                    field: "proposal_ids".into(),
                    value: pid.to_string(),
                    expected: "distinct proposal ids".into(),
                });
            }
        }

        let hasher = PoseidonHasher::new();

        let mut leaves = Vec::with_capacity(commitments.len() * proposal_ids.len());
        for &pid in proposal_ids {
            let pid_fr = Fr::from(pid);
            for &commitment in commitments {
                leaves.push(hasher.vote_leaf(commitment, pid_fr));
            }
        }
        let tree = MerkleTree::build(&hasher, leaves)?;

        let start = Instant::now();
        let blank = VoteCircuit::blank(hasher.config().clone());
        let (proving_key, verifying_key) = Groth16::<Bn254>::circuit_specific_setup(blank, rng)
            .map_err(|e| BallotError::SetupError {
                reason: e.to_string(),
            })?;
        info!(elapsed = ?start.elapsed(), root = %tree.root(), "trusted setup complete");

        Ok(Self {
            hasher,
            tree,
            member_count: commitments.len(),
            proposal_ids: proposal_ids.to_vec(),
            proving_key,
            verifying_key,
        })
    }

    /// The campaign root the registry should be constructed with
    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    /// Verification key for constructing the proof oracle
    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.verifying_key
    }

    /// The shared Poseidon hasher
    pub fn hasher(&self) -> &PoseidonHasher {
        &self.hasher
    }

    /// Inclusion proof for a member's leaf on one proposal
    pub fn merkle_path(&self, member_index: usize, proposal_id: u64) -> Result<MerklePath> {
        self.tree.prove(self.leaf_index(member_index, proposal_id)?)
    }

    /// Generate a vote submission: proof plus ordered public inputs
    /// `[root, nullifier_hash, proposal_id, vote_value]`.
    #[instrument(skip(self, member, rng), fields(member = member.index, proposal = proposal_id))]
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        member: &Member,
        proposal_id: u64,
        choice: VoteChoice,
        rng: &mut R,
    ) -> Result<VoteSubmission> {
        if member.nullifier.is_zero() || member.secret.is_zero() {
            return Err(BallotError::InvalidInput {
                field: "member".into(),
                value: "0".into(),
                expected: "non-zero secret and nullifier".into(),
            });
        }

        let index = self.leaf_index(member.index, proposal_id)?;
        let pid = Fr::from(proposal_id);
        let commitment = self.hasher.commitment(member.nullifier, member.secret);
        let leaf = self.hasher.vote_leaf(commitment, pid);

        if self.tree.leaf(index) != Some(leaf) {
            return Err(BallotError::WitnessError {
                reason: format!(
                    "commitment at member index {} is not a leaf of the campaign tree",
                    member.index
                ),
            });
        }

        let path = self.tree.prove(index)?;
        let nullifier_hash = self.hasher.nullifier_hash(member.nullifier);
        debug!(leaf_index = index, "witness assembled");

        let circuit = VoteCircuit {
            config: self.hasher.config().clone(),
            root: self.tree.root(),
            nullifier_hash,
            proposal_id: pid,
            vote_value: choice.to_field(),
            nullifier: member.nullifier,
            secret: member.secret,
            path_elements: path.elements,
            path_indices: path.indices,
        };
        let public_inputs = circuit.public_inputs();

        let start = Instant::now();
        let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, rng).map_err(|e| {
            BallotError::ProofGenerationFailed {
                reason: e.to_string(),
            }
        })?;
        info!(elapsed = ?start.elapsed(), "proof generated");

        Ok(VoteSubmission::new(Proof::new(proof), public_inputs))
    }

    /// Tree position of (member, proposal): proposal-major layout
    fn leaf_index(&self, member_index: usize, proposal_id: u64) -> Result<usize> {
        if member_index >= self.member_count {
            return Err(BallotError::LeafOutOfBounds {
                index: member_index,
                leaves: self.member_count,
            });
        }
        let slot = self
            .proposal_ids
            .iter()
            .position(|&p| p == proposal_id)
            .ok_or_else(|| BallotError::InvalidInput {
                field: "proposal_id".into(),
                value: proposal_id.to_string(),
                expected: format!("one of the campaign proposals {:?}", self.proposal_ids),
            })?;

        Ok(slot * self.member_count + member_index)
    }
}
