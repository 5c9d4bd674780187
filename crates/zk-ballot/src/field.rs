//! Decimal-string conversion for BN254 scalar-field elements
//!
//! Off-chain tooling (and snarkjs-style JSON) exchanges field elements
//! as decimal strings; these helpers bridge that representation and
//! arkworks `Fr`.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use num_bigint::BigUint;
use num_traits::Num;

use crate::error::{BallotError, Result};

/// Parse a decimal string into `Fr`, reducing mod the field order
pub fn fr_from_decimal(s: &str) -> Result<Fr> {
    let biguint = BigUint::from_str_radix(s, 10).map_err(|e| BallotError::InvalidInput {
        field: "decimal".into(),
        value: s.into(),
        expected: format!("base-10 integer ({e})"),
    })?;

    Ok(Fr::from_be_bytes_mod_order(&biguint.to_bytes_be()))
}

/// Render `Fr` as a decimal string
pub fn fr_to_decimal(f: &Fr) -> String {
    f.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_round_trip() {
        let x = Fr::from(123_456_789_012_345_678u64);
        let s = fr_to_decimal(&x);
        assert_eq!(fr_from_decimal(&s).unwrap(), x);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(fr_from_decimal("not a number").is_err());
        assert!(fr_from_decimal("").is_err());
    }

    #[test]
    fn test_reduces_mod_order() {
        // One past the BN254 scalar modulus wraps to 1
        let modulus_plus_one =
            "21888242871839275222246405745257275088548364400416034343698204186575808495618";
        assert_eq!(fr_from_decimal(modulus_plus_one).unwrap(), Fr::from(1u64));
    }
}
