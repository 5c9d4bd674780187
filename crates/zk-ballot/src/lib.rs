//! # zk-ballot
//!
//! Anonymous, Sybil-resistant group voting for a fixed, pre-registered
//! member set. A member proves "I am a registered member and have not
//! yet voted on this proposal" with a Groth16 proof over BN254, without
//! revealing which member they are.
//!
//! ## Pieces
//!
//! - **Merkle accumulator**: depth-20 Poseidon tree committing to the
//!   agreed member set
//! - **Commitment scheme**: `commitment = Poseidon(nullifier, secret)`,
//!   `nullifier_hash = Poseidon(nullifier)`
//! - **Vote circuit**: membership, commitment derivation and
//!   vote-validity in one provable statement
//! - **Registry**: the ledger that verifies a proof, consumes the
//!   one-time nullifier and tallies the vote atomically
//!
//! ## Example
//!
//! ```rust,ignore
//! use zk_ballot::{BallotProver, BallotVerifier, Member, PoseidonHasher, VoteChoice, VotingRegistry};
//!
//! let hasher = PoseidonHasher::new();
//! let members: Vec<Member> = (0..4)
//!     .map(|i| Member::generate(&hasher, i, &mut rng))
//!     .collect();
//! let commitments: Vec<_> = members.iter().map(|m| m.commitment).collect();
//!
//! let prover = BallotProver::setup(&commitments, &[1], &mut rng)?;
//! let oracle = BallotVerifier::new(prover.verifying_key())?;
//! let mut registry = VotingRegistry::new(prover.root(), oracle);
//!
//! let id = registry.create_proposal("fund the treasury", 3600);
//! let submission = prover.prove(&members[2], id, VoteChoice::Yes, &mut rng)?;
//! registry.vote(id, submission.nullifier_hash(), VoteChoice::Yes.value(), &submission.proof)?;
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod circuit;
pub mod error;
pub mod field;
pub mod member;
pub mod merkle;
pub mod poseidon;
pub mod proof;
pub mod prover;
pub mod registry;
pub mod verifier;

// Re-exports
pub use circuit::{VoteCircuit, PUBLIC_INPUT_COUNT};
pub use error::{BallotError, RegistryError, Result};
pub use member::{Member, VoteChoice};
pub use merkle::{MerklePath, MerkleTree, TREE_DEPTH};
pub use poseidon::PoseidonHasher;
pub use proof::{Proof, VoteSubmission};
pub use prover::BallotProver;
pub use registry::{Clock, ManualClock, Proposal, ProposalStatus, RegistryEvent, SystemClock, VotingRegistry};
pub use verifier::{BallotVerifier, ProofOracle};
