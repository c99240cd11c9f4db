//! Pluggable randomness collaborator.
//!
//! The core never generates randomness on its own; callers supply an
//! implementation of [`Rng`]. An adapter over any `rand::RngCore` is provided
//! for callers already holding one.

use crate::error::Error;

pub trait Rng {
    /// Fills `buf` with random bytes, returning the number of bytes written.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
}

/// Adapts any `rand::RngCore` to the crate's [`Rng`] collaborator interface.
pub struct RandAdapter<'a, R: rand::RngCore>(pub &'a mut R);

impl<'a, R: rand::RngCore> Rng for RandAdapter<'a, R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.0.fill_bytes(buf);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn adapter_fills_requested_length() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let mut adapter = RandAdapter(&mut rng);
        let mut buf = [0u8; 17];
        let n = adapter.fill(&mut buf).unwrap();
        assert_eq!(n, 17);
    }
}
