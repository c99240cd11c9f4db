//! A pairing-friendly elliptic-curve library core: fixed-precision
//! big integers, Montgomery-form prime fields, the `Fp2/Fp6/Fp12` tower,
//! Jacobian-coordinate Weierstrass curves over `GFp` and `Fp2`, Barreto-
//! Naehrig curve parameter derivation, the optimal ate pairing, and an
//! auxiliary SHA-256 digest.

pub mod bigint;
pub mod curve;
pub mod digest;
pub mod error;
pub mod factory;
pub mod fields;
pub mod pairing;
pub mod rng;

pub use error::{Error, Result};
