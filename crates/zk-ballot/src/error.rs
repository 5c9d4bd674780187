//! Error types for proving, verification and the voting registry

use thiserror::Error;

/// Result type alias for prover-side operations
pub type Result<T> = std::result::Result<T, BallotError>;

/// Errors from witness assembly, proving and proof handling
#[derive(Error, Debug)]
pub enum BallotError {
    /// Invalid input value
    #[error("Invalid input: {field} = {value} (expected {expected})")]
    InvalidInput {
        field: String,
        value: String,
        expected: String,
    },

    /// Leaf index outside the built tree
    #[error("Leaf index {index} out of bounds for {leaves} leaves")]
    LeafOutOfBounds { index: usize, leaves: usize },

    /// Member set exceeds the fixed tree capacity
    #[error("Leaf set of {count} exceeds tree capacity {capacity}")]
    TreeFull { count: usize, capacity: usize },

    /// Trusted setup failed
    #[error("Setup error: {reason}")]
    SetupError { reason: String },

    /// Witness assembly failed
    #[error("Witness error: {reason}")]
    WitnessError { reason: String },

    /// Proof generation failed
    #[error("Proof generation failed: {reason}")]
    ProofGenerationFailed { reason: String },

    /// Invalid proof format
    #[error("Invalid proof format: {reason}")]
    InvalidProofFormat { reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Arkworks error
    #[error("Cryptographic error: {0}")]
    ArkError(String),
}

impl From<ark_serialize::SerializationError> for BallotError {
    fn from(e: ark_serialize::SerializationError) -> Self {
        Self::ArkError(e.to_string())
    }
}

impl From<ark_relations::r1cs::SynthesisError> for BallotError {
    fn from(e: ark_relations::r1cs::SynthesisError) -> Self {
        Self::ArkError(e.to_string())
    }
}

/// Errors from the voting registry state machine.
///
/// The first six are cheap, locally-checkable conditions validated
/// before any cryptographic work. `ProofRejected` is the single
/// expensive failure path and deliberately carries no detail about
/// which verification check failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No proposal with this id
    #[error("Proposal {0} not found")]
    ProposalNotFound(u64),

    /// Vote value outside {0, 1, 2}
    #[error("Invalid vote value {0} (expected 0 = no, 1 = yes, 2 = abstain)")]
    InvalidVoteValue(u64),

    /// Deadline has passed
    #[error("Voting on proposal {0} is closed")]
    VotingClosed(u64),

    /// Deadline has not passed yet
    #[error("Voting on proposal {0} has not yet closed")]
    VotingNotYetClosed(u64),

    /// Proposal already executed
    #[error("Proposal {0} already executed")]
    AlreadyExecuted(u64),

    /// Nullifier hash already recorded for this proposal
    #[error("Nullifier already used for proposal {0}")]
    NullifierReused(u64),

    /// The proof oracle returned false
    #[error("Proof rejected")]
    ProofRejected,
}
