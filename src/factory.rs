//! The crate's public construction entry points: one factory per named
//! curve family, each returning ready-to-use curve(s) and generator(s)
//! rather than exposing field/curve construction directly.

use crate::curve::bn::{hash_to_g1, hash_to_g2, BnCurveId, BnGroup};
use crate::curve::named::{curve_factory as named_curve_factory, CurveId, GfpCurve};
use crate::curve::Point;
use crate::error::Result;
use crate::fields::{Fp12Element, Fp2Element, GfpElement};
use crate::pairing::bn::pair;

/// `curve_factory(curve_id) -> (curve, generator)` for the two published,
/// non-pairing-friendly curves.
pub fn curve_factory(id: CurveId) -> Result<(GfpCurve, Point<GfpElement>)> {
    named_curve_factory(id)
}

fn generator_seed(tag: u8) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[0] = tag;
    buf
}

/// `bn_curve_factory(curve_id) -> (e1, e1_gen, e2, e2_gen)`. Generators are
/// hash-to-curve of the 32-byte buffer `01 00 .. 00`.
pub fn bn_curve_factory(
    id: BnCurveId,
) -> Result<(BnGroup, Point<GfpElement>, Point<Fp2Element>)> {
    let group = BnGroup::new(id)?;
    let seed = generator_seed(1);
    let g1 = hash_to_g1(&seed, &group.e1)?;
    let g2 = hash_to_g2(&seed, &group.e2, &group.gfp, &group.e1.sqrt_neg3)?;
    Ok((group, g1, g2))
}

/// Everything needed to evaluate the optimal ate pairing for one named
/// curve, plus its own pair of generators hashed from `02 00 .. 00`
/// (distinct from [`bn_curve_factory`]'s, per the external generator
/// convention).
pub struct BnPairing {
    pub group: BnGroup,
}

impl BnPairing {
    pub fn pair(&self, p: &Point<GfpElement>, q: &Point<Fp2Element>) -> Result<Fp12Element> {
        pair(&self.group, p, q)
    }
}

/// `bn_pairing_factory(curve_id) -> (pairing, g1_gen, g2_gen)`.
pub fn bn_pairing_factory(
    id: BnCurveId,
) -> Result<(BnPairing, Point<GfpElement>, Point<Fp2Element>)> {
    let group = BnGroup::new(id)?;
    let seed = generator_seed(2);
    let g1 = hash_to_g1(&seed, &group.e1)?;
    let g2 = hash_to_g2(&seed, &group.e2, &group.gfp, &group.e1.sqrt_neg3)?;
    Ok((BnPairing { group }, g1, g2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bn_curve_factory_generators_lie_on_their_curves() {
        let (group, g1, g2) = bn_curve_factory(BnCurveId::Beuchat254).unwrap();
        assert!(g1.is_valid(&group.e1.coeffs, true, &group.e1.r));
        assert!(g2.is_valid(&group.e2.coeffs, true, &group.e2.r));
    }

    #[test]
    fn bn_pairing_factory_round_trips_a_nondegenerate_pairing() {
        let (pairing, g1, g2) = bn_pairing_factory(BnCurveId::Aranha254).unwrap();
        let f = pairing.pair(&g1, &g2).unwrap();
        assert!(!f.is_one());
    }

    #[test]
    fn curve_factory_returns_a_valid_generator() {
        let (curve, generator) = curve_factory(CurveId::AnssiFrp256v1).unwrap();
        assert!(generator.is_valid(&curve.coeffs, true, &curve.r));
    }
}
