//! The Groth16 proof produced by the proving stage, and its snarkjs JSON form.
//!
//! `proof.json` follows the layout of `snarkjs groth16 prove`:
//! ```json
//! {
//!   "pi_a": ["x", "y", "1"],
//!   "pi_b": [["x_c0", "x_c1"], ["y_c0", "y_c1"], ["1", "0"]],
//!   "pi_c": ["x", "y", "1"],
//!   "protocol": "groth16",
//!   "curve": "bn128"
//! }
//! ```
//! and `public.json` is a list of decimal strings. Points are decoded with
//! on-curve and subgroup checks.

use std::path::Path;

use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{One, Zero};
use serde_json::{json, Value};

use crate::artifacts::{read_file, write_durable};
use crate::error::{FinalizeError, Result};
use crate::field;

/// A Groth16 proof over BN254 together with its public signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnarkProof {
    pub a: G1Affine,
    pub b: G2Affine,
    pub c: G1Affine,
    pub public_signals: Vec<Fr>,
}

impl SnarkProof {
    /// Encode the points as snarkjs `proof.json`.
    pub fn to_snarkjs_json(&self) -> Value {
        json!({
            "pi_a": g1_to_json(&self.a),
            "pi_b": g2_to_json(&self.b),
            "pi_c": g1_to_json(&self.c),
            "protocol": "groth16",
            "curve": "bn128",
        })
    }

    /// Encode the public signals as snarkjs `public.json`.
    pub fn public_json(&self) -> Value {
        signals_to_json(&self.public_signals)
    }

    /// Decode from snarkjs `proof.json` and `public.json` values.
    pub fn from_snarkjs_json(proof: &Value, public: &Value) -> Result<Self> {
        let malformed = |reason: String| FinalizeError::artifact("proof", reason);

        let point = |name: &str| {
            proof[name]
                .as_array()
                .ok_or_else(|| malformed(format!("proof.{name} must be an array")))
        };
        let pi_a = point("pi_a")?;
        let pi_b = point("pi_b")?;
        let pi_c = point("pi_c")?;

        Ok(Self {
            a: g1_from_json(pi_a).map_err(|e| malformed(format!("pi_a: {e}")))?,
            b: g2_from_json(pi_b).map_err(|e| malformed(format!("pi_b: {e}")))?,
            c: g1_from_json(pi_c).map_err(|e| malformed(format!("pi_c: {e}")))?,
            public_signals: signals_from_json(public)
                .map_err(|e| FinalizeError::artifact("public signals", e))?,
        })
    }

    /// Write `proof.json` and `public.json` durably.
    pub fn save(&self, proof_path: &Path, public_path: &Path) -> Result<()> {
        write_json(proof_path, &self.to_snarkjs_json())?;
        write_json(public_path, &self.public_json())
    }

    /// Read a proof back from `proof.json` and `public.json`.
    pub fn load(proof_path: &Path, public_path: &Path) -> Result<Self> {
        let proof = read_json(proof_path, "proof")?;
        let public = read_json(public_path, "public signals")?;
        Self::from_snarkjs_json(&proof, &public)
    }
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| FinalizeError::artifact("json", e.to_string()))?;
    write_durable(path, &bytes)
}

fn read_json(path: &Path, kind: &'static str) -> Result<Value> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|e| FinalizeError::artifact(kind, e.to_string()))
}

/// `["x", "y", "1"]`, or `["0", "1", "0"]` for the point at infinity.
pub fn g1_to_json(p: &G1Affine) -> Value {
    if p.infinity {
        return json!(["0", "1", "0"]);
    }
    json!([field::to_decimal(&p.x), field::to_decimal(&p.y), "1"])
}

/// `[[x_c0, x_c1], [y_c0, y_c1], ["1", "0"]]`, or the projective zero for infinity.
pub fn g2_to_json(p: &G2Affine) -> Value {
    if p.infinity {
        return json!([["0", "0"], ["1", "0"], ["0", "0"]]);
    }
    json!([
        [field::to_decimal(&p.x.c0), field::to_decimal(&p.x.c1)],
        [field::to_decimal(&p.y.c0), field::to_decimal(&p.y.c1)],
        ["1", "0"]
    ])
}

/// Decode a snarkjs G1 point. A `z` of `"0"` denotes the point at infinity.
pub fn g1_from_json(coords: &[Value]) -> std::result::Result<G1Affine, String> {
    if coords.len() < 2 {
        return Err("G1 point must have at least 2 coordinates".into());
    }
    if let Some(z) = coords.get(2) {
        let z: Fq = field::from_decimal(z.as_str().ok_or("G1.z must be a string")?)?;
        if z.is_zero() {
            return Ok(G1Affine::identity());
        }
        if !z.is_one() {
            return Err("G1.z must be 0 or 1".into());
        }
    }
    let x: Fq = field::from_decimal(coords[0].as_str().ok_or("G1.x must be a string")?)?;
    let y: Fq = field::from_decimal(coords[1].as_str().ok_or("G1.y must be a string")?)?;

    let p = G1Affine::new_unchecked(x, y);
    if !p.is_on_curve() {
        return Err("G1 point is not on the curve".into());
    }
    Ok(p)
}

/// Decode a snarkjs G2 point (`[c0, c1]` pairs). The subgroup is checked.
pub fn g2_from_json(coords: &[Value]) -> std::result::Result<G2Affine, String> {
    if coords.len() < 2 {
        return Err("G2 point must have at least 2 coordinate pairs".into());
    }
    if let Some(z) = coords.get(2) {
        let z = fq2_from_json(z, "G2.z")?;
        if z.is_zero() {
            return Ok(G2Affine::identity());
        }
        if !z.is_one() {
            return Err("G2.z must be 0 or 1".into());
        }
    }
    let x = fq2_from_json(&coords[0], "G2.x")?;
    let y = fq2_from_json(&coords[1], "G2.y")?;

    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() {
        return Err("G2 point is not on the curve".into());
    }
    if !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G2 point is not in the prime-order subgroup".into());
    }
    Ok(p)
}

fn fq2_from_json(value: &Value, name: &str) -> std::result::Result<Fq2, String> {
    let pair = value
        .as_array()
        .filter(|p| p.len() >= 2)
        .ok_or_else(|| format!("{name} must be an array [c0, c1]"))?;
    let c0 = pair[0].as_str().ok_or_else(|| format!("{name}.c0 must be a string"))?;
    let c1 = pair[1].as_str().ok_or_else(|| format!("{name}.c1 must be a string"))?;
    Ok(Fq2::new(field::from_decimal(c0)?, field::from_decimal(c1)?))
}

/// Encode public signals as a JSON array of decimal strings.
pub fn signals_to_json(signals: &[Fr]) -> Value {
    Value::Array(signals.iter().map(|s| Value::String(field::to_decimal(s))).collect())
}

/// Decode a JSON array of decimal strings into canonical scalars.
pub fn signals_from_json(value: &Value) -> std::result::Result<Vec<Fr>, String> {
    let arr = value.as_array().ok_or("public signals must be an array")?;
    arr.iter()
        .enumerate()
        .map(|(i, v)| {
            let s = v
                .as_str()
                .ok_or_else(|| format!("public_signal[{i}] must be a string"))?;
            field::from_decimal(s)
        })
        .collect()
}
