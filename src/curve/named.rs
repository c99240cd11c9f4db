//! Published-parameter prime-field curves (non-pairing), for the plain
//! elliptic-curve half of the external interface.

use std::rc::Rc;

use crate::curve::{CurveCoeffs, Point};
use crate::error::Result;
use crate::fields::{GfpElement, GfpField};

/// One of the two named, non-pairing-friendly curves this crate ships
/// parameters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveId {
    NistP256,
    AnssiFrp256v1,
}

struct CurveDef {
    p_hex: &'static str,
    a_hex: &'static str,
    b_hex: &'static str,
    r_hex: &'static str,
    gx_hex: &'static str,
    gy_hex: &'static str,
}

fn curve_def(id: CurveId) -> CurveDef {
    match id {
        CurveId::NistP256 => CurveDef {
            p_hex: "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF",
            a_hex: "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFC",
            b_hex: "5AC635D8AA3A93E7B3EBBD55769886BC651D06B0CC53B0F63BCE3C3E27D2604B",
            r_hex: "FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
            gx_hex: "6B17D1F2E12C4247F8BCE6E563A440F277037D812DEB33A0F4A13945D898C296",
            gy_hex: "4FE342E2FE1A7F9B8EE7EB4A7C0F9E162BCE33576B315ECECBB6406837BF51F5",
        },
        CurveId::AnssiFrp256v1 => CurveDef {
            p_hex: "F1FD178C0B3AD58F10126DE8CE42435B3961ADBCABC8CA6DE8FCF353D86E9C03",
            a_hex: "F1FD178C0B3AD58F10126DE8CE42435B3961ADBCABC8CA6DE8FCF353D86E9C00",
            b_hex: "EE353FCA5428A9300D4ABA754A44C00FDFEC0C9AE4B1A1803075ED967B7BB73F",
            r_hex: "F1FD178C0B3AD58F10126DE8CE42435B53DC67E140D2BF941FFAE46320B7B7FB",
            gx_hex: "B6B3D4C356C139EB31183D4749D423958C27D2DCAF98B70164C97A2DD98F5CFF",
            gy_hex: "6142E0F7C8B204911F9271F0F3ECEF8C2701C307E8E4C9E183115A1554062CFB",
        },
    }
}

/// `E/GFp: y^2 = x^3 + a*x + b`, parameterized by published constants rather
/// than derived from a BN trace. Both named curves publish `a = p-3`, so
/// `coeffs.a_is_zero` is `false` and `coeffs.a_is_m3` is `true` for each.
pub struct GfpCurve {
    pub field: Rc<GfpField>,
    pub coeffs: CurveCoeffs<GfpElement>,
    pub r: crate::bigint::U256,
}

/// Builds the named curve and its published generator.
pub fn curve_factory(id: CurveId) -> Result<(GfpCurve, Point<GfpElement>)> {
    let def = curve_def(id);
    let field = GfpField::new(def.p_hex)?;
    let a = GfpElement::from_hex(def.a_hex, &field)?;
    let b = GfpElement::from_hex(def.b_hex, &field)?;
    let (r, _) = crate::bigint::U256::from_hex(def.r_hex)?;

    let curve = GfpCurve {
        field: field.clone(),
        coeffs: CurveCoeffs {
            a,
            b,
            a_is_zero: false,
            a_is_m3: true,
        },
        r,
    };

    let gx = GfpElement::from_hex(def.gx_hex, &field)?;
    let gy = GfpElement::from_hex(def.gy_hex, &field)?;
    let generator = Point::from_affine(gx, gy);

    Ok((curve, generator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_generators_satisfy_the_curve_equation() {
        for id in [CurveId::NistP256, CurveId::AnssiFrp256v1] {
            let (curve, generator) = curve_factory(id).unwrap();
            assert!(generator.is_valid(&curve.coeffs, false, &curve.r));
        }
    }

    #[test]
    fn generator_order_annihilates_the_point() {
        for id in [CurveId::NistP256, CurveId::AnssiFrp256v1] {
            let (curve, generator) = curve_factory(id).unwrap();
            assert!(generator.is_valid(&curve.coeffs, true, &curve.r));
        }
    }

    #[test]
    fn sliding_window_and_montgomery_ladder_agree() {
        let (curve, generator) = curve_factory(CurveId::NistP256).unwrap();
        let k = crate::bigint::U256::from_u64(123_456_789);
        let via_sw = generator.mul_sw(&k, &curve.coeffs);
        let via_ml = generator.mul_ml(&k, &curve.coeffs);
        assert!(via_sw.eq(&via_ml));
    }
}
