//! Member credentials and the vote encoding

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_std::rand::Rng;
use ark_std::UniformRand;
use serde::{Deserialize, Serialize};

use crate::error::{BallotError, Result};
use crate::poseidon::PoseidonHasher;

/// Vote choice with its fixed numeric mapping.
///
/// The same mapping feeds both the registry tally and the circuit's
/// `v(v-1)(v-2) = 0` range identity: no = 0, yes = 1, abstain = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    No,
    Yes,
    Abstain,
}

impl VoteChoice {
    /// Numeric wire value
    pub fn value(self) -> u64 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
            Self::Abstain => 2,
        }
    }

    /// Parse a numeric wire value
    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::No),
            1 => Some(Self::Yes),
            2 => Some(Self::Abstain),
            _ => None,
        }
    }

    /// The circuit encoding of this choice
    pub fn to_field(self) -> Fr {
        Fr::from(self.value())
    }
}

/// A registered member's credentials.
///
/// `secret` and `nullifier` are private; only `commitment =
/// Poseidon(nullifier, secret)` is published as tree-leaf material.
/// `index` is the member's position in the agreed member set.
#[derive(Clone, Debug)]
pub struct Member {
    pub secret: Fr,
    pub nullifier: Fr,
    pub commitment: Fr,
    pub index: usize,
}

impl Member {
    /// Generate fresh credentials.
    ///
    /// A zero field element would produce a fixed, guessable
    /// commitment, so zero draws are resampled.
    pub fn generate<R: Rng + ?Sized>(hasher: &PoseidonHasher, index: usize, rng: &mut R) -> Self {
        let secret = Self::nonzero(rng);
        let nullifier = Self::nonzero(rng);
        let commitment = hasher.commitment(nullifier, secret);

        Self {
            secret,
            nullifier,
            commitment,
            index,
        }
    }

    /// Reconstruct a member from stored secrets, rejecting degenerate
    /// zero values
    pub fn from_secrets(
        hasher: &PoseidonHasher,
        secret: Fr,
        nullifier: Fr,
        index: usize,
    ) -> Result<Self> {
        if secret.is_zero() {
            return Err(BallotError::InvalidInput {
                field: "secret".into(),
                value: "0".into(),
                expected: "a non-zero field element".into(),
            });
        }
        if nullifier.is_zero() {
            return Err(BallotError::InvalidInput {
                field: "nullifier".into(),
                value: "0".into(),
                expected: "a non-zero field element".into(),
            });
        }

        Ok(Self {
            secret,
            nullifier,
            commitment: hasher.commitment(nullifier, secret),
            index,
        })
    }

    /// Public nullifier hash, the same across all proposals
    pub fn nullifier_hash(&self, hasher: &PoseidonHasher) -> Fr {
        hasher.nullifier_hash(self.nullifier)
    }

    fn nonzero<R: Rng + ?Sized>(rng: &mut R) -> Fr {
        loop {
            let x = Fr::rand(rng);
            if !x.is_zero() {
                return x;
            }
        }
    }
}
