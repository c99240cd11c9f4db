//! `Fp6 = Fp2[v]/(v^3 - xi)`, the cubic extension forming two thirds of the
//! pairing target field's 2-over-3-over-2 tower.
//!
//! Multiplication uses the Karatsuba-style cubic formula common to BN/BLS
//! pairing implementations (e.g. Beuchat et al., "High-Speed Software
//! Implementation of the Optimal Ate Pairing over Barreto-Naehrig Curves",
//! Algorithm 7); squaring uses Chung-Hasan's SQR2 method (Algorithm 4 of the
//! same family of papers).

use std::rc::Rc;

use crate::error::Result;
use crate::fields::fp2::{Fp2Element, Fp2Field};

#[derive(Debug)]
pub struct Fp6Field {
    pub(crate) base: Rc<Fp2Field>,
    pub(crate) xi: Fp2Element,
}

impl Fp6Field {
    /// Frobenius at this degree is not implemented directly: `Fp12::frobenius`
    /// rebuilds the action on the six underlying `Fp2` coordinates using its
    /// own precomputed gamma table, per spec.
    pub fn new(base: &Rc<Fp2Field>, xi: Fp2Element) -> Rc<Self> {
        log::trace!("constructed Fp6 extension");
        Rc::new(Fp6Field {
            base: base.clone(),
            xi,
        })
    }

    pub fn base(&self) -> &Rc<Fp2Field> {
        &self.base
    }
}

#[derive(Clone, Debug)]
pub struct Fp6Element {
    pub c0: Fp2Element,
    pub c1: Fp2Element,
    pub c2: Fp2Element,
    pub field: Rc<Fp6Field>,
}

impl Fp6Element {
    pub fn new(c0: Fp2Element, c1: Fp2Element, c2: Fp2Element, field: &Rc<Fp6Field>) -> Self {
        Fp6Element {
            c0,
            c1,
            c2,
            field: field.clone(),
        }
    }

    pub fn zero(field: &Rc<Fp6Field>) -> Self {
        Fp6Element {
            c0: Fp2Element::zero(&field.base),
            c1: Fp2Element::zero(&field.base),
            c2: Fp2Element::zero(&field.base),
            field: field.clone(),
        }
    }

    pub fn one(field: &Rc<Fp6Field>) -> Self {
        Fp6Element {
            c0: Fp2Element::one(&field.base),
            c1: Fp2Element::zero(&field.base),
            c2: Fp2Element::zero(&field.base),
            field: field.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero() && self.c2.is_zero()
    }

    pub fn eq(&self, other: &Self) -> bool {
        self.c0.eq(&other.c0) && self.c1.eq(&other.c1) && self.c2.eq(&other.c2)
    }

    pub fn add(&self, other: &Self) -> Self {
        Fp6Element {
            c0: self.c0.add(&other.c0),
            c1: self.c1.add(&other.c1),
            c2: self.c2.add(&other.c2),
            field: self.field.clone(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Fp6Element {
            c0: self.c0.sub(&other.c0),
            c1: self.c1.sub(&other.c1),
            c2: self.c2.sub(&other.c2),
            field: self.field.clone(),
        }
    }

    pub fn neg(&self) -> Self {
        Fp6Element {
            c0: self.c0.neg(),
            c1: self.c1.neg(),
            c2: self.c2.neg(),
            field: self.field.clone(),
        }
    }

    pub fn double(&self) -> Self {
        self.add(self)
    }

    fn mul_by_nonresidue(&self, a: &Fp2Element) -> Fp2Element {
        a.mul(&self.field.xi)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let v0 = self.c0.mul(&other.c0);
        let v1 = self.c1.mul(&other.c1);
        let v2 = self.c2.mul(&other.c2);

        let c0 = self.mul_by_nonresidue(
            &self
                .c1
                .add(&self.c2)
                .mul(&other.c1.add(&other.c2))
                .sub(&v1)
                .sub(&v2),
        )
        .add(&v0);
        let c1 = self
            .c0
            .add(&self.c1)
            .mul(&other.c0.add(&other.c1))
            .sub(&v0)
            .sub(&v1)
            .add(&self.mul_by_nonresidue(&v2));
        let c2 = self
            .c0
            .add(&self.c2)
            .mul(&other.c0.add(&other.c2))
            .sub(&v0)
            .sub(&v2)
            .add(&v1);

        Fp6Element {
            c0,
            c1,
            c2,
            field: self.field.clone(),
        }
    }

    pub fn mul_by_base(&self, scalar: &Fp2Element) -> Self {
        Fp6Element {
            c0: self.c0.mul(scalar),
            c1: self.c1.mul(scalar),
            c2: self.c2.mul(scalar),
            field: self.field.clone(),
        }
    }

    /// Sparse multiplication by `(c0, c1, 0)`, the shape a Miller-loop line
    /// function evaluates to in the M-twist case.
    pub fn mul_by_01(&self, c0: &Fp2Element, c1: &Fp2Element) -> Self {
        let v0 = self.c0.mul(c0);
        let v1 = self.c1.mul(c1);

        let t0 = self
            .c1
            .add(&self.c2)
            .mul(c1)
            .sub(&v1);
        let out_c0 = self.mul_by_nonresidue(&t0).add(&v0);

        let out_c1 = self
            .c0
            .add(&self.c1)
            .mul(&c0.add(c1))
            .sub(&v0)
            .sub(&v1);

        let out_c2 = self.c0.add(&self.c2).mul(c0).sub(&v0).add(&v1);

        Fp6Element {
            c0: out_c0,
            c1: out_c1,
            c2: out_c2,
            field: self.field.clone(),
        }
    }

    pub fn square(&self) -> Self {
        let a0 = &self.c0;
        let a1 = &self.c1;
        let a2 = &self.c2;

        let s0 = a0.square();
        let ab = a0.mul(a1);
        let s1 = ab.double();
        let s2 = a0.sub(a1).add(a2).square();
        let bc = a1.mul(a2);
        let s3 = bc.double();
        let s4 = a2.square();

        let c0 = self.mul_by_nonresidue(&s3).add(&s0);
        let c1 = self.mul_by_nonresidue(&s4).add(&s1);
        let c2 = s1.add(&s2).add(&s3).sub(&s0).sub(&s4);

        Fp6Element {
            c0,
            c1,
            c2,
            field: self.field.clone(),
        }
    }

    pub fn inverse(&self) -> Self {
        let a0 = &self.c0;
        let a1 = &self.c1;
        let a2 = &self.c2;

        let t0 = a0.square().sub(&self.mul_by_nonresidue(&a1.mul(a2)));
        let t1 = self.mul_by_nonresidue(&a2.square()).sub(&a0.mul(a1));
        let t2 = a1.square().sub(&a0.mul(a2));

        let norm = self
            .mul_by_nonresidue(&a2.mul(&t1))
            .add(&self.mul_by_nonresidue(&a1.mul(&t2)))
            .add(&a0.mul(&t0));
        let norm_inv = norm.inverse();

        Fp6Element {
            c0: t0.mul(&norm_inv),
            c1: t1.mul(&norm_inv),
            c2: t2.mul(&norm_inv),
            field: self.field.clone(),
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.inverse())
    }

    pub fn random(field: &Rc<Fp6Field>, rng: &mut dyn crate::rng::Rng) -> Result<Self> {
        Ok(Fp6Element {
            c0: Fp2Element::random(&field.base, rng)?,
            c1: Fp2Element::random(&field.base, rng)?,
            c2: Fp2Element::random(&field.base, rng)?,
            field: field.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::gfp::GfpField;

    fn fp6_field() -> Rc<Fp6Field> {
        let base = GfpField::new("b").unwrap();
        let beta = crate::fields::gfp::GfpElement::from_hex("a", &base).unwrap();
        let fp2 = Fp2Field::new(&base, beta).unwrap();
        let xi = Fp2Element::new(
            crate::fields::gfp::GfpElement::from_hex("2", &base).unwrap(),
            crate::fields::gfp::GfpElement::from_hex("1", &base).unwrap(),
            &fp2,
        );
        Fp6Field::new(&fp2, xi)
    }

    fn elem(v: u64, field: &Rc<Fp6Field>) -> Fp6Element {
        let base = &field.base.base;
        let c = crate::fields::gfp::GfpElement::from_hex(&format!("{:x}", v), base).unwrap();
        Fp6Element::new(
            Fp2Element::new(c.clone(), crate::fields::gfp::GfpElement::zero(base), &field.base),
            Fp2Element::zero(&field.base),
            Fp2Element::zero(&field.base),
            field,
        )
    }

    #[test]
    fn mul_one_is_identity() {
        let f = fp6_field();
        let a = elem(5, &f);
        let one = Fp6Element::one(&f);
        assert!(a.mul(&one).eq(&a));
    }

    #[test]
    fn square_matches_mul() {
        let f = fp6_field();
        let a = elem(7, &f);
        assert!(a.square().eq(&a.mul(&a)));
    }

    #[test]
    fn inverse_roundtrip() {
        let f = fp6_field();
        let a = elem(7, &f);
        let inv = a.inverse();
        assert!(a.mul(&inv).eq(&Fp6Element::one(&f)));
    }
}
