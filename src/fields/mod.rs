//! Montgomery prime field and its degree 2/6/12 tower extensions.

pub mod fp12;
pub mod fp2;
pub mod fp6;
pub mod gfp;

pub use fp12::{Fp12Element, Fp12Field};
pub use fp2::{Fp2Element, Fp2Field};
pub use fp6::{Fp6Element, Fp6Field};
pub use gfp::{GfpElement, GfpField};

/// Legendre-symbol-style residuosity result, shared by every level of the
/// tower that exposes a square root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legendre {
    Zero,
    Residue,
    NonResidue,
}
