//! Generic short-Weierstrass curve arithmetic in Jacobian (Chudnovsky)
//! coordinates, parameterized over the coefficient field.
//!
//! The spec's redesign notes ask for fields that are plain values carrying a
//! reference to their (runtime-constructed) field rather than static methods
//! keyed on a compile-time parameter type; [`FieldElement`] is the minimal
//! trait that captures what curve arithmetic needs from such a value,
//! implemented by both [`crate::fields::GfpElement`] and
//! [`crate::fields::Fp2Element`].

use crate::bigint::U256;
use crate::error::{Error, Result};
use crate::fields::Legendre;

pub mod bn;
pub mod named;

/// Coefficient-field operations a Jacobian curve point needs. `zero_like`
/// and `one_like` hand back the additive/multiplicative identities of the
/// same field as `self`, since elements here carry their field with them
/// rather than passing it as a separate argument. `legendre`/`sqrt` are only
/// needed by hash-to-curve and point decompression, but both `GfpElement`
/// and `Fp2Element` already carry them with a matching signature.
pub trait FieldElement: Clone {
    fn zero_like(&self) -> Self;
    fn one_like(&self) -> Self;
    fn is_zero(&self) -> bool;
    fn eq(&self, other: &Self) -> bool;
    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn double(&self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn square(&self) -> Self;
    fn inverse(&self) -> Self;
    fn legendre(&self) -> Legendre;
    fn sqrt(&self) -> Result<Self>;

    /// Embeds a small non-negative integer into the same field as `self`,
    /// via double-and-add from the multiplicative identity.
    fn from_small(&self, mut v: u64) -> Self {
        let mut acc = self.zero_like();
        let mut base = self.one_like();
        while v > 0 {
            if v & 1 == 1 {
                acc = acc.add(&base);
            }
            base = base.double();
            v >>= 1;
        }
        acc
    }
}

impl FieldElement for crate::fields::GfpElement {
    fn zero_like(&self) -> Self {
        Self::zero(&self.field)
    }
    fn one_like(&self) -> Self {
        Self::one(&self.field)
    }
    fn is_zero(&self) -> bool {
        crate::fields::GfpElement::is_zero(self)
    }
    fn eq(&self, other: &Self) -> bool {
        crate::fields::GfpElement::eq(self, other)
    }
    fn add(&self, other: &Self) -> Self {
        crate::fields::GfpElement::add(self, other)
    }
    fn sub(&self, other: &Self) -> Self {
        crate::fields::GfpElement::sub(self, other)
    }
    fn neg(&self) -> Self {
        crate::fields::GfpElement::neg(self)
    }
    fn double(&self) -> Self {
        crate::fields::GfpElement::double(self)
    }
    fn mul(&self, other: &Self) -> Self {
        crate::fields::GfpElement::mul(self, other)
    }
    fn square(&self) -> Self {
        crate::fields::GfpElement::square(self)
    }
    fn inverse(&self) -> Self {
        crate::fields::GfpElement::inverse(self)
    }
    fn legendre(&self) -> Legendre {
        crate::fields::GfpElement::legendre(self)
    }
    fn sqrt(&self) -> Result<Self> {
        crate::fields::GfpElement::sqrt(self)
    }
}

impl FieldElement for crate::fields::Fp2Element {
    fn zero_like(&self) -> Self {
        Self::zero(&self.field)
    }
    fn one_like(&self) -> Self {
        Self::one(&self.field)
    }
    fn is_zero(&self) -> bool {
        crate::fields::Fp2Element::is_zero(self)
    }
    fn eq(&self, other: &Self) -> bool {
        crate::fields::Fp2Element::eq(self, other)
    }
    fn add(&self, other: &Self) -> Self {
        crate::fields::Fp2Element::add(self, other)
    }
    fn sub(&self, other: &Self) -> Self {
        crate::fields::Fp2Element::sub(self, other)
    }
    fn neg(&self) -> Self {
        crate::fields::Fp2Element::neg(self)
    }
    fn double(&self) -> Self {
        crate::fields::Fp2Element::double(self)
    }
    fn mul(&self, other: &Self) -> Self {
        crate::fields::Fp2Element::mul(self, other)
    }
    fn square(&self) -> Self {
        crate::fields::Fp2Element::square(self)
    }
    fn inverse(&self) -> Self {
        crate::fields::Fp2Element::inverse(self)
    }
    fn legendre(&self) -> Legendre {
        crate::fields::Fp2Element::legendre(self)
    }
    fn sqrt(&self) -> Result<Self> {
        crate::fields::Fp2Element::sqrt(self)
    }
}

/// A curve `y^2 = x^3 + a*x + b` in Jacobian coordinates, over field `F`.
#[derive(Clone)]
pub struct Point<F: FieldElement> {
    pub x: F,
    pub y: F,
    pub z: F,
    pub z2: F,
    pub infinity: bool,
}

/// Coefficients shared by every point on one curve instance.
#[derive(Clone)]
pub struct CurveCoeffs<F: FieldElement> {
    pub a: F,
    pub b: F,
    pub a_is_zero: bool,
    pub a_is_m3: bool,
}

impl<F: FieldElement> Point<F> {
    pub fn infinity_like(sample: &F) -> Self {
        Point {
            x: sample.one_like(),
            y: sample.one_like(),
            z: sample.zero_like(),
            z2: sample.zero_like(),
            infinity: true,
        }
    }

    pub fn from_affine(x: F, y: F) -> Self {
        let z = x.one_like();
        let z2 = z.clone();
        Point {
            x,
            y,
            z,
            z2,
            infinity: false,
        }
    }

    pub fn neg(&self) -> Self {
        Point {
            x: self.x.clone(),
            y: self.y.neg(),
            z: self.z.clone(),
            z2: self.z2.clone(),
            infinity: self.infinity,
        }
    }

    pub fn eq(&self, other: &Self) -> bool {
        if self.infinity || other.infinity {
            return self.infinity == other.infinity;
        }
        let a = self.normalize();
        let b = other.normalize();
        a.x.eq(&b.x) && a.y.eq(&b.y)
    }

    /// Doubling, following the `A = 4xy^2`, `B = 3x^2` (+ twists for
    /// `a != 0`) formulas of the generic Jacobian doubling step.
    pub fn dbl(&self, coeffs: &CurveCoeffs<F>) -> Self {
        if self.infinity || self.y.is_zero() {
            return Point::infinity_like(&self.x);
        }
        let y2 = self.y.square();
        let a = self.x.mul(&y2).double().double();
        let b = if coeffs.a_is_zero {
            self.x.square().double().add(&self.x.square())
        } else if coeffs.a_is_m3 {
            let xz2 = self.x.add(&self.z2);
            let xmz2 = self.x.sub(&self.z2);
            xz2.mul(&xmz2).double().add(&xz2.mul(&xmz2))
        } else {
            let z4 = self.z2.square();
            let three_x2 = self.x.square().double().add(&self.x.square());
            three_x2.add(&coeffs.a.mul(&z4))
        };
        let x3 = b.square().sub(&a.double());
        let y4 = y2.square();
        let y3 = b.mul(&a.sub(&x3)).sub(&y4.double().double().double());
        let z3 = self.y.mul(&self.z).double();
        let z3_2 = z3.square();
        Point {
            x: x3,
            y: y3,
            z: z3,
            z2: z3_2,
            infinity: false,
        }
    }

    /// Mixed/general addition, per the generic Jacobian `A,B,C,D,E,F` chain.
    pub fn add(&self, other: &Self, coeffs: &CurveCoeffs<F>) -> Self {
        if self.infinity {
            return other.clone();
        }
        if other.infinity {
            return self.clone();
        }
        let a = self.x.mul(&other.z2);
        let b = other.x.mul(&self.z2);
        let c = self.y.mul(&other.z).mul(&other.z2);
        let d = other.y.mul(&self.z).mul(&self.z2);

        if a.eq(&b) {
            if c.eq(&d) {
                return self.dbl(coeffs);
            }
            return Point::infinity_like(&self.x);
        }

        let e = b.sub(&a);
        let f = d.sub(&c);
        let e2 = e.square();
        let e3 = e2.mul(&e);
        let z3 = self.z.mul(&other.z).mul(&e);
        let x3 = f.square().sub(&a.mul(&e2).double()).sub(&e3);
        let y3 = f.mul(&a.mul(&e2).sub(&x3)).sub(&c.mul(&e3));
        Point {
            x: x3,
            y: y3,
            z: z3.clone(),
            z2: z3.square(),
            infinity: false,
        }
    }

    pub fn normalize(&self) -> Self {
        if self.infinity || self.z.is_zero() {
            return self.clone();
        }
        let z_inv = self.z.inverse();
        let z_inv2 = z_inv.square();
        let z_inv3 = z_inv2.mul(&z_inv);
        Point {
            x: self.x.mul(&z_inv2),
            y: self.y.mul(&z_inv3),
            z: self.x.one_like(),
            z2: self.x.one_like(),
            infinity: false,
        }
    }

    /// Checks the curve equation, and if `verify_order` is set, additionally
    /// checks `[r]P = infinity`.
    pub fn is_valid(&self, coeffs: &CurveCoeffs<F>, verify_order: bool, r: &U256) -> bool {
        if self.infinity {
            return true;
        }
        let lhs = self.y.square();
        let z4 = self.z2.square();
        let z6 = z4.mul(&self.z2);
        let mut rhs = self.x.square().mul(&self.x).add(&coeffs.b.mul(&z6));
        if !coeffs.a_is_zero {
            rhs = rhs.add(&coeffs.a.mul(&self.x).mul(&z4));
        }
        if !lhs.eq(&rhs) {
            return false;
        }
        if verify_order {
            return self.mul_sw(r, coeffs).infinity;
        }
        true
    }

    /// Window-4 sliding-window scalar multiplication via wNAF.
    pub fn mul_sw(&self, k: &U256, coeffs: &CurveCoeffs<F>) -> Self {
        let w = 4u32;
        let digits = k.get_wnaf(w);
        let table_size = 1usize << (w - 2);
        let double_p = self.dbl(coeffs);
        let mut table = Vec::with_capacity(table_size);
        table.push(self.clone());
        for i in 1..table_size {
            table.push(table[i - 1].add(&double_p, coeffs));
        }

        let mut acc = Point::infinity_like(&self.x);
        for &d in digits.iter().rev() {
            acc = acc.dbl(coeffs);
            if d != 0 {
                let idx = ((d.unsigned_abs() as usize) - 1) / 2;
                let mut t = table[idx].clone();
                if d < 0 {
                    t = t.neg();
                }
                acc = acc.add(&t, coeffs);
            }
        }
        acc
    }

    /// Montgomery ladder scalar multiplication.
    pub fn mul_ml(&self, k: &U256, coeffs: &CurveCoeffs<F>) -> Self {
        let bits = k.count_bits();
        if bits == 0 {
            return Point::infinity_like(&self.x);
        }
        let mut r0 = self.clone();
        let mut r1 = self.dbl(coeffs);
        for i in (0..bits - 1).rev() {
            if k.get_bit(i) {
                r0 = r0.add(&r1, coeffs);
                r1 = r1.dbl(coeffs);
            } else {
                r1 = r0.add(&r1, coeffs);
                r0 = r0.dbl(coeffs);
            }
        }
        r0
    }
}

impl Point<crate::fields::GfpElement> {
    /// `(x, lsb(y))`, after normalizing to affine form.
    pub fn compress(&self) -> Result<(crate::fields::GfpElement, bool)> {
        if self.infinity {
            return Err(Error::InvalidValue(
                "cannot compress the point at infinity".to_string(),
            ));
        }
        let affine = self.normalize();
        let y_normal = affine.y.to_hex();
        let last_nibble = u8::from_str_radix(&y_normal[y_normal.len() - 1..], 16).unwrap();
        Ok((affine.x, last_nibble & 1 == 1))
    }

    pub fn decompress(
        x: crate::fields::GfpElement,
        y_bit: bool,
        coeffs: &CurveCoeffs<crate::fields::GfpElement>,
    ) -> Result<Self> {
        let rhs = x
            .square()
            .mul(&x)
            .add(&coeffs.b)
            .add(&if coeffs.a_is_zero {
                crate::fields::GfpElement::zero(&x.field)
            } else {
                coeffs.a.mul(&x)
            });
        let y = rhs.sqrt()?;
        let y_normal = y.to_hex();
        let lsb = u8::from_str_radix(&y_normal[y_normal.len() - 1..], 16).unwrap() & 1 == 1;
        let y = if lsb == y_bit { y } else { y.neg() };
        Ok(Point::from_affine(x, y))
    }
}
