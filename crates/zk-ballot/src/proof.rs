//! Proof types and serialization

use ark_bn254::{Bn254, Fq, Fr, G1Affine, G2Affine};
use ark_groth16::Proof as Groth16Proof;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use crate::circuit::PUBLIC_INPUT_COUNT;
use crate::error::{BallotError, Result};
use crate::field::fr_to_decimal;

/// A Groth16 proof for the BN254 curve: the standard succinct tuple
/// `a` (2 field elements), `b` (2x2) and `c` (2).
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    /// The underlying arkworks proof
    pub inner: Groth16Proof<Bn254>,
}

impl Proof {
    /// Wrap an arkworks proof
    pub fn new(inner: Groth16Proof<Bn254>) -> Self {
        Self { inner }
    }

    /// Affine coordinates of proof point A
    pub fn a(&self) -> [Fq; 2] {
        [self.inner.a.x, self.inner.a.y]
    }

    /// Affine coordinates of proof point B (G2, two extension limbs
    /// per coordinate)
    pub fn b(&self) -> [[Fq; 2]; 2] {
        [
            [self.inner.b.x.c0, self.inner.b.x.c1],
            [self.inner.b.y.c0, self.inner.b.y.c1],
        ]
    }

    /// Affine coordinates of proof point C
    pub fn c(&self) -> [Fq; 2] {
        [self.inner.c.x, self.inner.c.y]
    }

    /// Serialize to compressed bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.inner.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserialize from compressed bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Groth16Proof::deserialize_compressed(bytes)?;
        Ok(Self { inner })
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_bytes()?))
    }

    /// Convert from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str).map_err(|e| BallotError::InvalidProofFormat {
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Convert to JSON-serializable format (snarkjs layout)
    pub fn to_json(&self) -> ProofJson {
        ProofJson {
            pi_a: Self::g1_to_strings(&self.inner.a),
            pi_b: Self::g2_to_strings(&self.inner.b),
            pi_c: Self::g1_to_strings(&self.inner.c),
            protocol: "groth16".into(),
            curve: "bn128".into(),
        }
    }

    fn g1_to_strings(point: &G1Affine) -> Vec<String> {
        vec![point.x.to_string(), point.y.to_string(), "1".into()]
    }

    fn g2_to_strings(point: &G2Affine) -> Vec<Vec<String>> {
        vec![
            vec![point.x.c0.to_string(), point.x.c1.to_string()],
            vec![point.y.c0.to_string(), point.y.c1.to_string()],
            vec!["1".into(), "0".into()],
        ]
    }
}

/// A proof together with its ordered public inputs, ready for
/// submission to the registry
#[derive(Clone, Debug)]
pub struct VoteSubmission {
    /// The ZK proof
    pub proof: Proof,
    /// `[root, nullifier_hash, proposal_id, vote_value]`
    pub public_inputs: [Fr; PUBLIC_INPUT_COUNT],
}

impl VoteSubmission {
    pub fn new(proof: Proof, public_inputs: [Fr; PUBLIC_INPUT_COUNT]) -> Self {
        Self {
            proof,
            public_inputs,
        }
    }

    /// The membership root the proof was generated against
    pub fn root(&self) -> Fr {
        self.public_inputs[0]
    }

    /// The public nullifier hash
    pub fn nullifier_hash(&self) -> Fr {
        self.public_inputs[1]
    }

    /// The proposal id as a field element
    pub fn proposal_id(&self) -> Fr {
        self.public_inputs[2]
    }

    /// The numeric vote encoding as a field element
    pub fn vote_value(&self) -> Fr {
        self.public_inputs[3]
    }

    /// Convert to JSON
    pub fn to_json(&self) -> SubmissionJson {
        SubmissionJson {
            proof: self.proof.to_json(),
            public_inputs: self.public_inputs.iter().map(fr_to_decimal).collect(),
        }
    }
}

/// JSON-serializable proof format (snarkjs layout)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofJson {
    /// Proof point A (G1)
    pub pi_a: Vec<String>,
    /// Proof point B (G2)
    pub pi_b: Vec<Vec<String>>,
    /// Proof point C (G1)
    pub pi_c: Vec<String>,
    /// Protocol identifier
    pub protocol: String,
    /// Curve identifier
    pub curve: String,
}

/// JSON format with the ordered public inputs as decimal strings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionJson {
    /// The proof
    pub proof: ProofJson,
    /// `[root, nullifier_hash, proposal_id, vote_value]`
    pub public_inputs: Vec<String>,
}
