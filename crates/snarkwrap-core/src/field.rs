//! Field element encodings shared by every stage.
//!
//! Two external encodings exist for BN254 field elements:
//! - decimal strings, as used by snarkjs-style JSON artifacts;
//! - 32-byte big-endian words, as used by the EVM ABI and the witness file.
//!
//! Decoding is canonical in both directions: values at or above the field
//! modulus are rejected rather than reduced, so that every element has exactly
//! one accepted encoding.

use ark_ff::PrimeField;
use num_bigint::BigUint;
use num_traits::Num;

/// Encode a field element as a 32-byte big-endian word.
pub fn to_be_bytes<F: PrimeField>(value: &F) -> [u8; 32] {
    let n: BigUint = (*value).into();
    let be_bytes = n.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - be_bytes.len()..].copy_from_slice(&be_bytes);
    out
}

/// Decode a canonical 32-byte big-endian word into a field element.
///
/// Returns `None` when the word is not strictly below the field modulus.
pub fn from_be_bytes<F: PrimeField>(bytes: &[u8; 32]) -> Option<F> {
    from_biguint(BigUint::from_bytes_be(bytes))
}

/// Encode a field element as a decimal string.
pub fn to_decimal<F: PrimeField>(value: &F) -> String {
    let n: BigUint = (*value).into();
    n.to_str_radix(10)
}

/// Decode a canonical decimal string into a field element.
pub fn from_decimal<F: PrimeField>(s: &str) -> Result<F, String> {
    let n = BigUint::from_str_radix(s, 10).map_err(|e| format!("invalid decimal: {s}: {e}"))?;
    from_biguint(n).ok_or_else(|| format!("value exceeds field modulus: {s}"))
}

fn from_biguint<F: PrimeField>(n: BigUint) -> Option<F> {
    let modulus: BigUint = F::MODULUS.into();
    if n >= modulus {
        return None;
    }
    Some(F::from(n))
}

/// Serde adapter: a field element as a decimal string.
pub mod decimal {
    use ark_ff::PrimeField;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<F: PrimeField, S: Serializer>(value: &F, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_decimal(value))
    }

    pub fn deserialize<'de, F: PrimeField, D: Deserializer<'de>>(deserializer: D) -> Result<F, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::from_decimal(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter: a list of field elements as decimal strings.
pub mod decimal_vec {
    use ark_ff::PrimeField;
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<F: PrimeField, S: Serializer>(values: &[F], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for v in values {
            seq.serialize_element(&super::to_decimal(v))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, F: PrimeField, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<F>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| super::from_decimal(s).map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fq, Fr};

    const FR_MODULUS: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn test_be_bytes_layout() {
        let bytes = to_be_bytes(&Fr::from(1771u64));
        // 1771 = 0x06EB
        assert_eq!(bytes[30], 0x06);
        assert_eq!(bytes[31], 0xEB);
        assert!(bytes[..30].iter().all(|&b| b == 0));
        assert_eq!(from_be_bytes::<Fr>(&bytes), Some(Fr::from(1771u64)));
    }

    #[test]
    fn test_from_be_bytes_rejects_modulus() {
        // p - 1 ends in a zero byte
        let mut modulus = to_be_bytes(&-Fr::from(1u64));
        modulus[31] += 1;
        assert!(from_be_bytes::<Fr>(&modulus).is_none());
        // Fr's modulus is below Fq's, so the same word is a valid base field element.
        assert!(from_be_bytes::<Fq>(&modulus).is_some());
    }

    #[test]
    fn test_from_decimal_rejects_non_canonical() {
        let err = from_decimal::<Fr>(FR_MODULUS).unwrap_err();
        assert!(err.contains("modulus"));
        assert_eq!(from_decimal::<Fr>("42").unwrap(), Fr::from(42u64));
    }

    #[test]
    fn test_decimal_of_negative_one() {
        let minus_one = -Fr::from(1u64);
        let s = to_decimal(&minus_one);
        assert!(s.ends_with("495616"));
        assert_eq!(from_decimal::<Fr>(&s).unwrap(), minus_one);
    }

    #[test]
    fn test_serde_adapters() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Sample {
            #[serde(with = "decimal")]
            one: Fr,
            #[serde(with = "decimal_vec")]
            many: Vec<Fr>,
        }
        let sample = Sample {
            one: Fr::from(7u64),
            many: vec![Fr::from(1u64), Fr::from(2u64)],
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["one"], "7");
        assert_eq!(json["many"], serde_json::json!(["1", "2"]));

        let bad = serde_json::json!({ "one": FR_MODULUS, "many": [] });
        assert!(serde_json::from_value::<Sample>(bad).is_err());
    }
}
