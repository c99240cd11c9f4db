//! `Fp2 = Fp[u]/(u^2 - beta)`, the quadratic extension underlying the
//! sextic twist used by the BN pairing.
//!
//! Multiplication and inversion follow the Karatsuba/norm pattern the
//! teacher's own quadratic extension field uses; squaring uses the
//! "complex method" (`(a+bu)^2 = (a^2+beta*b^2) + 2ab*u`), which is cheaper
//! than a generic Karatsuba square when `beta` is a small constant.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::fields::gfp::{GfpElement, GfpField};
use crate::fields::Legendre;

/// Long division of a `U512` by the small constant 3, limb-wise from the
/// top. Also used by the BN tower builder to derive the `(p^2-1)/3`
/// Frobenius-twist exponent.
pub(crate) fn div_u512_by_3(a: &crate::bigint::U512) -> crate::bigint::U512 {
    let mut quotient = crate::bigint::U512::zero();
    let mut remainder: u128 = 0;
    for i in (0..8).rev() {
        let cur = (remainder << 64) | a.0[i] as u128;
        quotient.0[i] = (cur / 3) as u64;
        remainder = cur % 3;
    }
    quotient
}

#[derive(Debug)]
pub struct Fp2Field {
    pub(crate) base: Rc<GfpField>,
    pub(crate) beta: GfpElement,
    /// `beta^((p-1)/2)`, the coefficient Frobenius multiplies `c1` by on odd
    /// powers; `c1` is untouched on even powers since `u^2 = beta` is fixed
    /// by `Frob^2`.
    frobenius_coeff_c1: GfpElement,
}

impl Fp2Field {
    pub fn new(base: &Rc<GfpField>, beta: GfpElement) -> Result<Rc<Self>> {
        if beta.legendre() != Legendre::NonResidue {
            return Err(Error::InvalidValue(
                "Fp2 nonresidue must be a quadratic non-residue in the base field".to_string(),
            ));
        }
        let mut pm1 = base.modulus();
        pm1.sub(&crate::bigint::U256::from_u64(1));
        let expo = pm1.shr(1);
        let frobenius_coeff_c1 = beta.exp(&expo);
        log::trace!("constructed Fp2 extension");
        Ok(Rc::new(Fp2Field {
            base: base.clone(),
            beta,
            frobenius_coeff_c1,
        }))
    }

    pub fn base(&self) -> &Rc<GfpField> {
        &self.base
    }
}

#[derive(Clone, Debug)]
pub struct Fp2Element {
    pub c0: GfpElement,
    pub c1: GfpElement,
    pub field: Rc<Fp2Field>,
}

impl Fp2Element {
    pub fn new(c0: GfpElement, c1: GfpElement, field: &Rc<Fp2Field>) -> Self {
        Fp2Element {
            c0,
            c1,
            field: field.clone(),
        }
    }

    pub fn zero(field: &Rc<Fp2Field>) -> Self {
        Fp2Element {
            c0: GfpElement::zero(&field.base),
            c1: GfpElement::zero(&field.base),
            field: field.clone(),
        }
    }

    pub fn one(field: &Rc<Fp2Field>) -> Self {
        Fp2Element {
            c0: GfpElement::one(&field.base),
            c1: GfpElement::zero(&field.base),
            field: field.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    pub fn eq(&self, other: &Self) -> bool {
        self.c0.eq(&other.c0) && self.c1.eq(&other.c1)
    }

    pub fn add(&self, other: &Self) -> Self {
        Fp2Element {
            c0: self.c0.add(&other.c0),
            c1: self.c1.add(&other.c1),
            field: self.field.clone(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Fp2Element {
            c0: self.c0.sub(&other.c0),
            c1: self.c1.sub(&other.c1),
            field: self.field.clone(),
        }
    }

    pub fn neg(&self) -> Self {
        Fp2Element {
            c0: self.c0.neg(),
            c1: self.c1.neg(),
            field: self.field.clone(),
        }
    }

    pub fn double(&self) -> Self {
        self.add(self)
    }

    pub fn conjugate(&self) -> Self {
        Fp2Element {
            c0: self.c0.clone(),
            c1: self.c1.neg(),
            field: self.field.clone(),
        }
    }

    /// Multiplies `self` (viewed in the base field, `c1 = 0` implied) by the
    /// nonresidue `beta`; used by the Fp6 tower to build `mul_by_nonresidue`.
    pub fn mul_base_by_nonresidue(base: &GfpElement, field: &Rc<Fp2Field>) -> GfpElement {
        base.mul(&field.beta)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let v0 = self.c0.mul(&other.c0);
        let v1 = self.c1.mul(&other.c1);
        let c0 = v0.add(&v1.mul(&self.field.beta));
        let c1 = self
            .c0
            .add(&self.c1)
            .mul(&other.c0.add(&other.c1))
            .sub(&v0)
            .sub(&v1);
        Fp2Element {
            c0,
            c1,
            field: self.field.clone(),
        }
    }

    pub fn mul_by_base(&self, scalar: &GfpElement) -> Self {
        Fp2Element {
            c0: self.c0.mul(scalar),
            c1: self.c1.mul(scalar),
            field: self.field.clone(),
        }
    }

    pub fn square(&self) -> Self {
        let a = &self.c0;
        let b = &self.c1;
        let c0 = a.square().add(&b.square().mul(&self.field.beta));
        let c1 = a.mul(b).double();
        Fp2Element {
            c0,
            c1,
            field: self.field.clone(),
        }
    }

    /// `Norm(a+bu) = a^2 - beta*b^2`, always an element of the base field.
    pub fn norm(&self) -> GfpElement {
        let a2 = self.c0.square();
        let b2 = self.c1.square();
        a2.sub(&b2.mul(&self.field.beta))
    }

    pub fn inverse(&self) -> Self {
        let norm_inv = self.norm().inverse();
        Fp2Element {
            c0: self.c0.mul(&norm_inv),
            c1: self.c1.neg().mul(&norm_inv),
            field: self.field.clone(),
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.inverse())
    }

    /// Frobenius endomorphism raised to `power`; only `power`'s parity
    /// matters since `Frob^2` fixes `Fp2` pointwise.
    pub fn frobenius_map(&self, power: usize) -> Self {
        if power % 2 == 0 {
            self.clone()
        } else {
            Fp2Element {
                c0: self.c0.clone(),
                c1: self.c1.mul(&self.field.frobenius_coeff_c1),
                field: self.field.clone(),
            }
        }
    }

    pub fn legendre(&self) -> Legendre {
        if self.is_zero() {
            return Legendre::Zero;
        }
        match self.norm().legendre() {
            Legendre::NonResidue => Legendre::NonResidue,
            _ => Legendre::Residue,
        }
    }

    pub fn exp(&self, exponent: &crate::bigint::U256) -> Self {
        let bits = exponent.count_bits();
        if bits == 0 {
            return Fp2Element::one(&self.field);
        }
        let mut acc = self.clone();
        for i in (0..bits - 1).rev() {
            acc = acc.square();
            if exponent.get_bit(i) {
                acc = acc.mul(self);
            }
        }
        acc
    }

    /// Exponentiation by a value up to 512 bits, needed for the
    /// `(p^2-1)/3` cubic-residue exponent used when a sextic-extension
    /// nonresidue is discovered.
    pub fn exp_u512(&self, exponent: &crate::bigint::U512) -> Self {
        let bits = exponent.count_bits();
        if bits == 0 {
            return Fp2Element::one(&self.field);
        }
        let mut acc = self.clone();
        for i in (0..bits - 1).rev() {
            acc = acc.square();
            if exponent.get_bit(i) {
                acc = acc.mul(self);
            }
        }
        acc
    }

    /// Cubic-residue test in `Fp2`, only meaningful when `p^2 ≡ 1 (mod 3)`
    /// (guaranteed for the BN curves this crate targets, since `p ≡ 1 (mod
    /// 3)` by construction).
    pub fn is_cubic_residue(&self) -> bool {
        let p = self.field.base.modulus();
        let mut p2 = p.mul_wide(&p);
        p2.sub(&crate::bigint::U512::from_u64(1));
        let exponent = div_u512_by_3(&p2);
        self.exp_u512(&exponent).eq(&Fp2Element::one(&self.field))
    }

    /// Complex-method square root (Scott, "Implementing cryptographic
    /// pairings", 2007; also eprint 2012/685 Algorithm 8).
    pub fn sqrt(&self) -> Result<Self> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        let norm = self.norm();
        let alpha = norm.sqrt()?;
        let two = GfpElement::one(&self.field.base).double();
        let two_inv = two.inverse();
        let mut delta = self.c0.add(&alpha).mul(&two_inv);
        if delta.legendre() == Legendre::NonResidue {
            delta = self.c0.sub(&alpha).mul(&two_inv);
        }
        let c0 = delta.sqrt()?;
        let c0_inv = c0.inverse();
        let c1 = self.c1.mul(&two_inv).mul(&c0_inv);
        let candidate = Fp2Element {
            c0,
            c1,
            field: self.field.clone(),
        };
        if candidate.square().eq(self) {
            Ok(candidate)
        } else {
            Err(Error::NotSquare)
        }
    }

    pub fn random(field: &Rc<Fp2Field>, rng: &mut dyn crate::rng::Rng) -> Result<Self> {
        Ok(Fp2Element {
            c0: GfpElement::random(&field.base, rng)?,
            c1: GfpElement::random(&field.base, rng)?,
            field: field.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn fp2_field() -> Rc<Fp2Field> {
        // p = 11 (3 mod 4); -1 is a non-residue in F_11 since
        // {1,3,4,5,9} are the residues.
        let base = GfpField::new("b").unwrap();
        let beta = GfpElement::from_hex("a", &base).unwrap(); // -1 mod 11
        Fp2Field::new(&base, beta).unwrap()
    }

    fn elem(c0: u64, c1: u64, field: &Rc<Fp2Field>) -> Fp2Element {
        Fp2Element::new(
            GfpElement::from_hex(&format!("{:x}", c0), &field.base).unwrap(),
            GfpElement::from_hex(&format!("{:x}", c1), &field.base).unwrap(),
            field,
        )
    }

    #[test]
    fn mul_matches_schoolbook() {
        let f = fp2_field();
        let a = elem(3, 5, &f);
        let b = elem(2, 7, &f);
        let viakaratsuba = a.mul(&b);

        // (3+5u)(2+7u) = 6 + 21u + 10u + 35u^2 = 6+35*beta + 31u
        let beta = GfpElement::from_hex("a", &f.base).unwrap();
        let expect_c0 = GfpElement::from_hex("6", &f.base)
            .unwrap()
            .add(&GfpElement::from_hex("23", &f.base).unwrap().mul(&beta));
        let expect_c1 = GfpElement::from_hex("1f", &f.base).unwrap();
        assert!(viakaratsuba.c0.eq(&expect_c0));
        assert!(viakaratsuba.c1.eq(&expect_c1));
    }

    #[test]
    fn square_matches_mul() {
        let f = fp2_field();
        let a = elem(4, 6, &f);
        assert!(a.square().eq(&a.mul(&a)));
    }

    #[test]
    fn inverse_roundtrip() {
        let f = fp2_field();
        let a = elem(3, 5, &f);
        let inv = a.inverse();
        assert!(a.mul(&inv).eq(&Fp2Element::one(&f)));
    }

    #[test]
    fn frobenius_twice_is_identity() {
        let f = fp2_field();
        let a = elem(3, 5, &f);
        let twice = a.frobenius_map(1).frobenius_map(1);
        assert!(twice.eq(&a));
    }

    #[test]
    fn sqrt_roundtrip() {
        let f = fp2_field();
        let a = elem(3, 5, &f);
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert!(root.square().eq(&sq));
    }
}
