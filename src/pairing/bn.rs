//! Optimal ate pairing over a BN curve: Miller loop with sparse line
//! multiplication, plus the easy/hard-part final exponentiation that
//! projects the Miller loop's output onto the order-`r` subgroup of `Fp12`.

use crate::bigint::U256;
use crate::curve::bn::BnGroup;
use crate::curve::Point;
use crate::error::Result;
use crate::fields::{Fp12Element, Fp2Element, GfpElement};

fn scale(a: &Fp2Element, s: &GfpElement) -> Fp2Element {
    a.mul_by_base(s)
}

/// A Miller-loop line function, always of the sparse shape
/// `l00 + (l10 + l11*v)*w` once lifted into `Fp12`.
struct Line {
    l00: Fp2Element,
    l10: Fp2Element,
    l11: Fp2Element,
}

/// `s = |6t + 2|`, the exponent the Miller loop walks (in NAF form) so the
/// loop length matches the optimal ate pairing rather than the full
/// `r`-bit Tate pairing.
fn six_t_plus_2(t_abs: &U256, t_negative: bool) -> U256 {
    let mut s = U256::from_u64(6).mul_trunc(t_abs);
    if t_negative {
        s.sub(&U256::from_u64(2));
    } else {
        s.add(&U256::from_u64(2));
    }
    s
}

/// Doubles `t` on the twist and evaluates the resulting tangent line at the
/// fixed `G1` point `p` (affine, `z = 1`).
fn double_and_eval_line(p: &Point<GfpElement>, t: &Point<Fp2Element>) -> (Line, Point<Fp2Element>) {
    let x = &t.x;
    let y = &t.y;
    let z = &t.z;
    let z2 = &t.z2;

    let tmp0 = x.square();
    let tmp1 = y.square();
    let tmp2 = tmp1.square();

    let mut tmp3 = tmp1.add(x).square().sub(&tmp0).sub(&tmp2);
    tmp3 = tmp3.double();

    let tmp4 = tmp0.double().add(&tmp0);
    let mut tmp6 = tmp4.add(x);
    let tmp5 = tmp4.square();

    let rx = tmp5.sub(&tmp3).sub(&tmp3);
    let rz = y.add(z).square().sub(&tmp1).sub(z2);
    let ry = tmp3.sub(&rx).mul(&tmp4).sub(&tmp2.double().double().double());

    let l10 = scale(&tmp4.mul(z2).double().neg(), &p.x);

    tmp6 = tmp6.square().sub(&tmp0).sub(&tmp5).sub(&tmp1.double().double());

    let l00 = scale(&rz.mul(z2).double(), &p.y);

    let out = Point {
        x: rx,
        y: ry,
        z: rz.clone(),
        z2: rz.square(),
        infinity: false,
    };

    (
        Line {
            l00,
            l10,
            l11: tmp6,
        },
        out,
    )
}

/// Adds `q` into `r` on the twist and evaluates the resulting secant line at
/// `p` (affine, `z = 1`).
fn add_and_eval_line(
    p: &Point<GfpElement>,
    q: &Point<Fp2Element>,
    r: &Point<Fp2Element>,
) -> (Line, Point<Fp2Element>) {
    let qy2 = q.y.square();

    let t0 = q.x.mul(&r.z2);
    let t1 = q.y.add(&r.z).square().sub(&qy2).sub(&r.z2).mul(&r.z2);
    let t2 = t0.sub(&r.x);
    let t3 = t2.square();
    let t4 = t3.double().double();
    let t5 = t4.mul(&t2);
    let t6 = t1.sub(&r.y).sub(&r.y);
    let t9_partial = t6.mul(&q.x);
    let t7 = t4.mul(&r.x);

    let rx = t6.square().sub(&t5).sub(&t7).sub(&t7);
    let rz = r.z.add(&t2).square().sub(&r.z2).sub(&t3);
    let t10_partial = rz.add(&q.y);

    let t8 = t7.sub(&rx).mul(&t6);
    let t0b = r.y.mul(&t5).double();
    let ry = t8.sub(&t0b);

    let rz2 = rz.square();
    let t10 = t10_partial.square().sub(&qy2).sub(&rz2);
    let l11 = t9_partial.double().sub(&t10);

    let l00 = scale(&rz.double(), &p.y);

    let neg_t6 = t6.neg();
    let l10 = scale(&neg_t6.double(), &p.x);

    let out = Point {
        x: rx,
        y: ry,
        z: rz,
        z2: rz2,
        infinity: false,
    };

    (Line { l00, l10, l11 }, out)
}

/// Walks the NAF of `s = |6t+2|` doubling `t` on the twist and folding each
/// line's sparse value into the running `Fp12` accumulator, then applies the
/// two correction steps (`Q1 = Frob(Q)`, `Q2 = -Frob^2(Q)`) that account for
/// the sextic twist not being defined over the full `p^12` Frobenius orbit.
fn miller_loop(
    group: &BnGroup,
    p: &Point<GfpElement>,
    q: &Point<Fp2Element>,
) -> Result<Fp12Element> {
    let e2 = &group.e2;
    let p = &p.normalize();
    let qq = q.normalize();
    let m_qq = qq.neg();

    let s = six_t_plus_2(&group.t, group.t_negative);
    let naf = s.get_wnaf(2);

    let mut f = Fp12Element::one(&group.fp12);
    let mut t = qq.clone();

    for i in (0..naf.len() - 1).rev() {
        f = f.square();
        let (line, next_t) = double_and_eval_line(p, &t);
        f = f.mul_by_034(&line.l00, &line.l10, &line.l11);
        t = next_t;

        match naf[i] {
            0 => {}
            d if d < 0 => {
                let (line, next_t) = add_and_eval_line(p, &m_qq, &t);
                f = f.mul_by_034(&line.l00, &line.l10, &line.l11);
                t = next_t;
            }
            _ => {
                let (line, next_t) = add_and_eval_line(p, &qq, &t);
                f = f.mul_by_034(&line.l00, &line.l10, &line.l11);
                t = next_t;
            }
        }
    }

    let q1 = e2.frobenius(&qq, 1)?;
    let q2 = e2.frobenius(&qq, 2)?.neg();

    if group.t_negative {
        t = t.neg();
        f = f.conjugate();
    }

    let (line, next_t) = add_and_eval_line(p, &q1, &t);
    f = f.mul_by_034(&line.l00, &line.l10, &line.l11);
    t = next_t;
    let (line, _) = add_and_eval_line(p, &q2, &t);
    f = f.mul_by_034(&line.l00, &line.l10, &line.l11);

    Ok(f)
}

/// Left-to-right exponentiation by `t`'s NAF, substituting `f`/`conj(f)` for
/// NAF digits `+1`/`-1` and `cyclotomic_square` between digits — valid once
/// `f` has already been projected onto the cyclotomic subgroup by the easy
/// part of final exponentiation, where conjugation equals inversion.
fn exp_by_t(f: &Fp12Element, t_abs: &U256) -> Fp12Element {
    let inv_f = f.conjugate();
    let naf = t_abs.get_wnaf(2);
    let mut acc = f.clone();
    for i in (0..naf.len() - 1).rev() {
        acc = acc.cyclotomic_square();
        match naf[i] {
            0 => {}
            d if d < 0 => acc = acc.mul(&inv_f),
            _ => acc = acc.mul(f),
        }
    }
    acc
}

/// Devegili-Scott-Dahab hard-part addition chain: `y0 = f^(2t)`, `y1 =
/// f^(6t)`, `y2 = f^(6t^2)`, `y3 = f^(12t^3)`, combined with the easy part's
/// output `ff` and its Frobenius powers to land on `f^((p^4-p^2+1)/r)`.
fn hard_part_exponentiation(group: &BnGroup, ff: &Fp12Element) -> Result<Fp12Element> {
    let mut y0 = exp_by_t(ff, &group.t);
    y0 = y0.cyclotomic_square();
    let mut y1 = y0.cyclotomic_square();
    y1 = y1.mul(&y0);
    let y2 = exp_by_t(&y1, &group.t);
    let mut y3 = exp_by_t(&y2.cyclotomic_square(), &group.t);

    if group.t_negative {
        y0 = y0.conjugate();
        y1 = y1.conjugate();
        y3 = y3.conjugate();
    }

    let mut y3 = y3.mul(&y2).mul(&y1);
    let y0 = y3.mul(&y0.conjugate());

    let mut y2 = y2.mul(&y3);
    y2 = y2.mul(ff);
    let mut ff_conj = ff.conjugate();
    ff_conj = ff_conj.mul(&y0);
    ff_conj = ff_conj.frobenius(3)?;
    ff_conj = ff_conj.mul(&y2);
    let y0_p = y0.frobenius(1)?;
    ff_conj = ff_conj.mul(&y0_p);
    let y3_p2 = y3.frobenius(2)?;
    Ok(ff_conj.mul(&y3_p2))
}

/// `f -> f^((p^12-1)/r)`: the easy part (one conjugation, one inversion, a
/// Frobenius-2 step) followed by the BN-specific hard part.
fn final_exponentiation(group: &BnGroup, f: &Fp12Element) -> Result<Fp12Element> {
    let y1 = f.conjugate();
    let y2 = f.inverse();
    let mut ff = y2.mul(&y1);

    let ff_p2 = ff.frobenius(2)?;
    ff = ff_p2.mul(&ff);

    hard_part_exponentiation(group, &ff)
}

/// `pair(P, Q)`: Miller loop followed by final exponentiation.
pub fn pair(
    group: &BnGroup,
    p: &Point<GfpElement>,
    q: &Point<Fp2Element>,
) -> Result<Fp12Element> {
    let f = miller_loop(group, p, q)?;
    final_exponentiation(group, &f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::bn::{hash_to_g1, hash_to_g2, BnCurveId};

    fn generators(group: &BnGroup) -> (Point<GfpElement>, Point<Fp2Element>) {
        let mut buf = [0u8; 32];
        buf[0] = 1;
        let g1 = hash_to_g1(&buf, &group.e1).unwrap();
        let g2 = hash_to_g2(&buf, &group.e2, &group.gfp, &group.e1.sqrt_neg3).unwrap();
        (g1, g2)
    }

    #[test]
    fn pairing_is_nondegenerate_and_order_r() {
        let group = BnGroup::new(BnCurveId::Beuchat254).unwrap();
        let (g1, g2) = generators(&group);
        let f = pair(&group, &g1, &g2).unwrap();
        assert!(!f.is_one());
        let f_r = f.exp(&group.e1.r);
        assert!(f_r.is_one());
    }

    #[test]
    fn pairing_is_bilinear_in_first_argument() {
        let group = BnGroup::new(BnCurveId::Aranha254).unwrap();
        let (g1, g2) = generators(&group);
        let two_g1 = g1.dbl(&group.e1.coeffs);
        let lhs = pair(&group, &two_g1, &g2).unwrap();
        let rhs = pair(&group, &g1, &g2).unwrap().square();
        assert!(lhs.eq(&rhs));
    }
}
