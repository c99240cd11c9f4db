//! Auxiliary fixed-output digests, independent of the field/curve/pairing
//! tower above.

pub mod sha256;

pub use sha256::Sha256;
