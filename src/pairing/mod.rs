//! The optimal ate pairing and its Miller-loop/final-exponentiation halves.

pub mod bn;
