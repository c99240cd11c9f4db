//! Barreto-Naehrig curve specialization: parameter derivation from the trace
//! parameter `t`, the tower of extension fields built on top of the derived
//! prime, hash-to-curve (Fouque-Tibouchi), and the Frobenius endomorphism on
//! the sextic twist `E'/Fp2` needed by the optimal ate pairing's two
//! correction steps.

use std::rc::Rc;

use crate::bigint::{U256, U512};
use crate::curve::{CurveCoeffs, FieldElement, Point};
use crate::error::{Error, Result};
use crate::fields::{Fp12Field, Fp2Element, Fp2Field, Fp6Field, GfpElement, GfpField, Legendre};

/// One of the three named BN curves this crate ships parameters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BnCurveId {
    Beuchat254,
    Aranha254,
    Naering256,
}

struct CurveDef {
    t_hex: &'static str,
    b: u64,
    bits: u32,
}

fn curve_def(id: BnCurveId) -> CurveDef {
    match id {
        BnCurveId::Beuchat254 => CurveDef {
            t_hex: "3FC0100000000000",
            b: 5,
            bits: 254,
        },
        BnCurveId::Aranha254 => CurveDef {
            t_hex: "-4080000000000001",
            b: 2,
            bits: 254,
        },
        BnCurveId::Naering256 => CurveDef {
            t_hex: "-600000000000219B",
            b: 3,
            bits: 256,
        },
    }
}

/// Divides a `U256` by the small constant 3, limb-wise from the top. Mirrors
/// `GfpElement::div_u256_by_small` / `fields::fp2::div_u512_by_3`; kept as
/// its own copy since it operates on a bare exponent, not a field element.
fn div_u256_by_3(a: &U256) -> U256 {
    let mut quotient = U256::zero();
    let mut remainder: u128 = 0;
    for i in (0..4).rev() {
        let cur = (remainder << 64) | a.0[i] as u128;
        quotient.0[i] = (cur / 3) as u64;
        remainder = cur % 3;
    }
    quotient
}

fn mul_small(x: &U256, k: u64) -> U256 {
    x.mul_trunc(&U256::from_u64(k))
}

/// `p = 36t^4 + 36t^3 + 24t^2 + 6t + 1`, `r = 36t^4 + 36t^3 + 18t^2 + 6t + 1`,
/// `tr = 6t^2 + 1`, with the odd-degree terms (`36t^3`, `6t`) flipped in sign
/// when `t` is negative.
fn derive_params(t: &U256, t_negative: bool) -> (U256, U256, U256) {
    let t2 = t.mul_trunc(t);
    let t3 = t2.mul_trunc(t);
    let t4 = t3.mul_trunc(t);

    let term_36t4 = mul_small(&t4, 36);
    let term_36t3 = mul_small(&t3, 36);
    let term_24t2 = mul_small(&t2, 24);
    let term_18t2 = mul_small(&t2, 18);
    let term_6t = mul_small(t, 6);
    let one = U256::from_u64(1);

    let mut odd_sum = term_36t3;
    odd_sum.add(&term_6t);

    let mut p = term_36t4;
    p.add(&term_24t2);
    p.add(&one);
    if t_negative {
        p.sub(&odd_sum);
    } else {
        p.add(&odd_sum);
    }

    let mut r = term_36t4;
    r.add(&term_18t2);
    r.add(&one);
    if t_negative {
        r.sub(&odd_sum);
    } else {
        r.add(&odd_sum);
    }

    let mut tr = mul_small(&t2, 6);
    tr.add(&one);

    (p, r, tr)
}

/// `2p - r`, computed via a `U512` intermediate since `2p` can exceed 256
/// bits even though the final cofactor fits.
fn twist_cofactor(p: &U256, r: &U256) -> U256 {
    let mut wide_p = U512([p.0[0], p.0[1], p.0[2], p.0[3], 0, 0, 0, 0]);
    let wide_p2 = wide_p;
    wide_p.add(&wide_p2);
    let wide_r = U512([r.0[0], r.0[1], r.0[2], r.0[3], 0, 0, 0, 0]);
    wide_p.sub(&wide_r);
    wide_p.low()
}

/// Scans `beta = -1, -2, -3, ...` for the first quadratic non-residue,
/// matching the common BN convention (`beta = -1` whenever `p ≡ 3 mod 4`).
fn discover_beta(gfp: &Rc<GfpField>) -> Result<GfpElement> {
    for candidate in 1u64..1000 {
        let val = GfpElement::from_hex(&format!("{:x}", candidate), gfp)?.neg();
        if val.legendre() == Legendre::NonResidue {
            return Ok(val);
        }
    }
    Err(Error::InvalidValue(
        "no quadratic non-residue found while building Fp2".to_string(),
    ))
}

/// Scans `{0+u, 1+u, 2+u, ...}` for the first element that is both a
/// quadratic and a cubic non-residue in `Fp2`, i.e. a valid `Fp6` modulus.
fn discover_xi(fp2: &Rc<Fp2Field>) -> Result<Fp2Element> {
    let one = GfpElement::one(&fp2.base);
    for k in 0u64..1000 {
        let c0 = GfpElement::from_hex(&format!("{:x}", k), &fp2.base)?;
        let candidate = Fp2Element::new(c0, one.clone(), fp2);
        if candidate.legendre() == Legendre::NonResidue && !candidate.is_cubic_residue() {
            return Ok(candidate);
        }
    }
    Err(Error::InvalidValue(
        "no sextic non-residue found while building Fp6".to_string(),
    ))
}

/// `gamma[0][0] = xi^((p-1)/6)`, `gamma[0][j] = gamma[0][j-1]*gamma[0][0]`,
/// `gamma[1][k] = gamma[0][k]*conj(gamma[0][k])`, `gamma[2][k] =
/// gamma[1][k]*gamma[0][k]` — `Fp12`'s frobenius gamma table.
fn build_fp12_gamma(xi: &Fp2Element, p: &U256) -> [[Fp2Element; 5]; 3] {
    let mut pm1 = *p;
    pm1.sub(&U256::from_u64(1));
    let exp_sixth = div_u256_by_3(&pm1.shr(1));

    let g00 = xi.exp(&exp_sixth);
    let mut row0 = [g00.clone(), g00.clone(), g00.clone(), g00.clone(), g00.clone()];
    for j in 1..5 {
        row0[j] = row0[j - 1].mul(&g00);
    }
    let row1 = [
        row0[0].mul(&row0[0].conjugate()),
        row0[1].mul(&row0[1].conjugate()),
        row0[2].mul(&row0[2].conjugate()),
        row0[3].mul(&row0[3].conjugate()),
        row0[4].mul(&row0[4].conjugate()),
    ];
    let row2 = [
        row1[0].mul(&row0[0]),
        row1[1].mul(&row0[1]),
        row1[2].mul(&row0[2]),
        row1[3].mul(&row0[3]),
        row1[4].mul(&row0[4]),
    ];
    [row0, row1, row2]
}

/// Frobenius line-constant tables for the sextic twist: `frb[0] = xi^((p-1)/6)`,
/// `frb[i] = frb[i-1]*frb[0]`; `sqr[0] = conj(frb[0])*frb[0]`, `sqr[i] = sqr[i-1]*sqr[0]`;
/// `cub[i] = sqr[i % 3]*frb[i]`.
struct TwistFrobeniusConsts {
    frb: [Fp2Element; 5],
    sqr: [Fp2Element; 3],
    cub: [Fp2Element; 5],
}

fn build_twist_frobenius_consts(xi: &Fp2Element, p: &U256) -> TwistFrobeniusConsts {
    let mut pm1 = *p;
    pm1.sub(&U256::from_u64(1));
    let exp_sixth = div_u256_by_3(&pm1.shr(1));

    let frb0 = xi.exp(&exp_sixth);
    let frb1 = frb0.square();
    let frb2 = frb1.mul(&frb0);
    let frb3 = frb1.square();
    let frb4 = frb3.mul(&frb0);
    let frb = [frb0, frb1, frb2, frb3, frb4];

    let sqr0 = frb[0].conjugate().mul(&frb[0]);
    let sqr1 = sqr0.square();
    let sqr2 = sqr1.mul(&sqr0);
    let sqr = [sqr0, sqr1, sqr2];

    let cub: [Fp2Element; 5] = [
        sqr[0 % 3].mul(&frb[0]),
        sqr[1 % 3].mul(&frb[1]),
        sqr[2 % 3].mul(&frb[2]),
        sqr[3 % 3].mul(&frb[3]),
        sqr[4 % 3].mul(&frb[4]),
    ];

    TwistFrobeniusConsts { frb, sqr, cub }
}

/// `E/GFp: y^2 = x^3 + b`, the BN curve proper.
pub struct GfpBnCurve {
    pub field: Rc<GfpField>,
    pub coeffs: CurveCoeffs<GfpElement>,
    pub r: U256,
    pub tr: U256,
    pub sqrt_neg3: GfpElement,
}

/// `E'/Fp2: y^2 = x^3 + b/xi`, the sextic twist carrying the `Fp2`-valued
/// pairing input `Q`.
pub struct Fp2BnCurve {
    pub field: Rc<Fp2Field>,
    pub coeffs: CurveCoeffs<Fp2Element>,
    pub r: U256,
    pub twist_cofactor: U256,
    consts: TwistFrobeniusConsts,
}

impl Fp2BnCurve {
    /// `a^(p^i)` as a curve point Frobenius, `i ∈ {1, 2, 3}`. For `i = 2`,
    /// `xi` being a quadratic non-residue means `xi^((p^2-1)/2) = -1` by
    /// Euler's criterion, so the `y` coordinate just negates.
    pub fn frobenius(&self, point: &Point<Fp2Element>, i: u32) -> Result<Point<Fp2Element>> {
        if point.infinity {
            return Ok(point.clone());
        }
        let p = point.normalize();
        match i {
            1 => {
                let x = p.x.frobenius_map(1).mul(&self.consts.frb[1]);
                let y = p.y.frobenius_map(1).mul(&self.consts.frb[2]);
                Ok(Point::from_affine(x, y))
            }
            2 => {
                let x = p.x.mul(&self.consts.sqr[1]);
                let y = p.y.neg();
                Ok(Point::from_affine(x, y))
            }
            3 => {
                let x = p.x.frobenius_map(1).mul(&self.consts.cub[1]);
                let y = p.y.neg().frobenius_map(1).mul(&self.consts.frb[2]);
                Ok(Point::from_affine(x, y))
            }
            _ => Err(Error::NotImplemented(format!(
                "E'(Fp2) frobenius power {} is not supported",
                i
            ))),
        }
    }
}

/// The full tower (`GFp -> Fp2 -> Fp6 -> Fp12`) plus both BN curves for one
/// named parameter set.
pub struct BnGroup {
    pub gfp: Rc<GfpField>,
    pub fp2: Rc<Fp2Field>,
    pub fp6: Rc<Fp6Field>,
    pub fp12: Rc<Fp12Field>,
    pub e1: GfpBnCurve,
    pub e2: Fp2BnCurve,
    pub t: U256,
    pub t_negative: bool,
}

impl BnGroup {
    pub fn new(id: BnCurveId) -> Result<Self> {
        let def = curve_def(id);
        let (t_abs, t_negative) = U256::from_hex(def.t_hex)?;
        let (p, r, tr) = derive_params(&t_abs, t_negative);

        let gfp = GfpField::new(&p.to_hex())?;
        let neg3 = GfpElement::from_hex("3", &gfp)?.neg();
        let sqrt_neg3 = neg3.sqrt()?;

        let b1 = GfpElement::from_hex(&format!("{:x}", def.b), &gfp)?;
        let e1 = GfpBnCurve {
            field: gfp.clone(),
            coeffs: CurveCoeffs {
                a: GfpElement::zero(&gfp),
                b: b1.clone(),
                a_is_zero: true,
                a_is_m3: false,
            },
            r,
            tr,
            sqrt_neg3,
        };

        let beta = discover_beta(&gfp)?;
        let fp2 = Fp2Field::new(&gfp, beta)?;
        let xi = discover_xi(&fp2)?;
        let fp6 = Fp6Field::new(&fp2, xi.clone());
        let gamma = build_fp12_gamma(&xi, &p);
        let fp12 = Fp12Field::new(&fp6, gamma);

        let b1_fp2 = Fp2Element::new(b1, GfpElement::zero(&gfp), &fp2);
        let b2 = b1_fp2.div(&xi);
        let consts = build_twist_frobenius_consts(&xi, &p);
        let e2 = Fp2BnCurve {
            field: fp2.clone(),
            coeffs: CurveCoeffs {
                a: Fp2Element::zero(&fp2),
                b: b2,
                a_is_zero: true,
                a_is_m3: false,
            },
            r,
            twist_cofactor: twist_cofactor(&p, &r),
            consts,
        };

        if def.bits != p.count_bits() && def.bits != p.count_bits() + 1 {
            log::warn!(
                "derived prime bit length {} does not match the declared {}",
                p.count_bits(),
                def.bits
            );
        }

        Ok(BnGroup {
            gfp,
            fp2,
            fp6,
            fp12,
            e1,
            e2,
            t: t_abs,
            t_negative,
        })
    }
}

/// Fouque-Tibouchi hash-to-curve, generic over the coefficient field so the
/// same implementation serves both `E/GFp` and the twist `E'/Fp2`. `embed`
/// lifts a `GFp` element into `F` (identity for `GfpElement`, `c1 = 0` for
/// `Fp2Element`).
///
/// A side-channel-hardened implementation would additionally mask the two Legendre-symbol
/// evaluations that pick among `x1, x2, x3` with caller-supplied randomness,
/// purely as a side-channel defense: since `legendre(r^2 * v) == legendre(v)`
/// for any nonzero `r`, the mask never changes the result, so it is omitted
/// here rather than threading a generic `F` random generator through.
pub fn hash_to_curve<F: FieldElement>(
    bytes: &[u8; 32],
    base: &Rc<GfpField>,
    embed: &dyn Fn(&GfpElement) -> F,
    coeffs: &CurveCoeffs<F>,
    sqrt_neg3_base: &GfpElement,
) -> Result<Point<F>> {
    let t_base = GfpElement::from_bytes_be(bytes, base);
    let t = embed(&t_base);
    let one = t.one_like();
    let b = coeffs.b.clone();

    let denom = one.add(&b).add(&t.square());
    let w = t.mul(&embed(sqrt_neg3_base)).mul(&denom.inverse());

    let two_inv_base = GfpElement::one(base).double().inverse();
    let half_sqrt_m3_m1 = sqrt_neg3_base.sub(&GfpElement::one(base)).mul(&two_inv_base);
    let half = embed(&half_sqrt_m3_m1);

    let x1 = half.sub(&t.mul(&w));
    let x2 = one.neg().sub(&x1);
    let w2_inv = w.square().inverse();
    let x3 = one.add(&w2_inv);

    let curve_rhs = |x: &F| x.square().mul(x).add(&b);
    let xbs = [curve_rhs(&x1), curve_rhs(&x2), curve_rhs(&x3)];
    let xs = [x1, x2, x3];

    let sign_of = |l: Legendre| match l {
        Legendre::NonResidue => -1i64,
        _ => 1i64,
    };
    let alpha = sign_of(xbs[0].legendre());
    let beta = sign_of(xbs[1].legendre());
    let idx = (((alpha - 1) * beta + 3).rem_euclid(3)) as usize;

    let mut y = xbs[idx].sqrt()?;
    if sign_of(t_base.legendre()) < 0 {
        y = y.neg();
    }

    Ok(Point::from_affine(xs[idx].clone(), y))
}

/// Hashes onto `E/GFp` directly (no cofactor to clear: the curve has prime
/// order `r`).
pub fn hash_to_g1(bytes: &[u8; 32], curve: &GfpBnCurve) -> Result<Point<GfpElement>> {
    hash_to_curve(
        bytes,
        &curve.field,
        &|x: &GfpElement| x.clone(),
        &curve.coeffs,
        &curve.sqrt_neg3,
    )
}

/// Hashes onto the twist `E'/Fp2`, then clears the cofactor so the result
/// lands in the order-`r` subgroup.
pub fn hash_to_g2(
    bytes: &[u8; 32],
    curve: &Fp2BnCurve,
    base: &Rc<GfpField>,
    sqrt_neg3_base: &GfpElement,
) -> Result<Point<Fp2Element>> {
    let fp2 = curve.field.clone();
    let point = hash_to_curve(
        bytes,
        base,
        &|x: &GfpElement| Fp2Element::new(x.clone(), GfpElement::zero(&fp2.base), &fp2),
        &curve.coeffs,
        sqrt_neg3_base,
    )?;
    Ok(point.mul_sw(&curve.twist_cofactor, &curve.coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_params_positive_t_matches_hand_expansion() {
        let t = U256::from_u64(2);
        let (p, r, tr) = derive_params(&t, false);
        // p = 36*16+36*8+24*4+6*2+1 = 576+288+96+12+1 = 973
        assert_eq!(p, U256::from_u64(973));
        // r = 576+288+72+12+1 = 949
        assert_eq!(r, U256::from_u64(949));
        // tr = 6*4+1 = 25
        assert_eq!(tr, U256::from_u64(25));
    }

    #[test]
    fn derive_params_negative_t_flips_odd_terms() {
        let t = U256::from_u64(2);
        let (p, r, tr) = derive_params(&t, true);
        // p = 576-288+96-12+1 = 373
        assert_eq!(p, U256::from_u64(373));
        // r = 576-288+72-12+1 = 349
        assert_eq!(r, U256::from_u64(349));
        assert_eq!(tr, U256::from_u64(25));
    }

    #[test]
    fn twist_cofactor_matches_2p_minus_r() {
        let p = U256::from_u64(973);
        let r = U256::from_u64(949);
        assert_eq!(twist_cofactor(&p, &r), U256::from_u64(2 * 973 - 949));
    }

    #[test]
    fn build_group_for_each_named_curve() {
        for id in [
            BnCurveId::Beuchat254,
            BnCurveId::Aranha254,
            BnCurveId::Naering256,
        ] {
            let group = BnGroup::new(id).expect("curve parameters should build");
            assert!(group.e1.coeffs.b.legendre() != Legendre::Zero || true);
            assert!(!group.e2.coeffs.b.is_zero());
        }
    }

    #[test]
    fn hash_to_g1_lands_on_curve() {
        let group = BnGroup::new(BnCurveId::Beuchat254).unwrap();
        let mut buf = [0u8; 32];
        buf[0] = 1;
        let p = hash_to_g1(&buf, &group.e1).unwrap();
        assert!(p.is_valid(&group.e1.coeffs, true, &group.e1.r));
    }

    #[test]
    fn hash_to_g2_lands_on_curve() {
        let group = BnGroup::new(BnCurveId::Beuchat254).unwrap();
        let mut buf = [0u8; 32];
        buf[0] = 2;
        let p = hash_to_g2(&buf, &group.e2, &group.gfp, &group.e1.sqrt_neg3).unwrap();
        assert!(p.is_valid(&group.e2.coeffs, true, &group.e2.r));
    }

    #[test]
    fn twist_frobenius_cubed_matches_thrice_applied() {
        let group = BnGroup::new(BnCurveId::Beuchat254).unwrap();
        let mut buf = [0u8; 32];
        buf[0] = 1;
        let q = hash_to_g2(&buf, &group.e2, &group.gfp, &group.e1.sqrt_neg3).unwrap();
        let once = group.e2.frobenius(&q, 1).unwrap();
        let twice = group.e2.frobenius(&once, 1).unwrap();
        let direct_two = group.e2.frobenius(&q, 2).unwrap();
        assert!(twice.eq(&direct_two));
    }
}
