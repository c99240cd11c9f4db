//! `GFp`: a prime field held in Montgomery form.
//!
//! A [`GfpField`] is constructed once (from a prime given as a hex string)
//! and owns every Montgomery constant (`R`, `R²`, `R³`, `μ`). A [`GfpElement`]
//! is a plain `U256` paired with an `Rc<GfpField>`: elements carry a
//! reference to their immutable field value, rather than every operation
//! being a static method taking the field as an explicit parameter.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::bigint::{U256, U512};
use crate::error::{Error, Result};
use crate::fields::Legendre;
use crate::rng::Rng;

/// Montgomery constants for one prime field. Immutable once constructed.
#[derive(Debug)]
pub struct GfpField {
    pub(crate) p: U256,
    pub(crate) r: U256,  // R mod p  ("one" in Montgomery form)
    pub(crate) r2: U256, // R^2 mod p
    pub(crate) r3: U256, // R^3 mod p
    pub(crate) inv: u64, // mu = -p^-1 mod 2^64
    pub(crate) bits: u32,
}

impl GfpField {
    pub fn new(p_hex: &str) -> Result<Rc<Self>> {
        let (p, neg) = U256::from_hex(p_hex)?;
        if neg || p.is_zero() {
            return Err(Error::InvalidValue(format!(
                "GFp modulus must be a positive hex value: {}",
                p_hex
            )));
        }
        if p.0[0] & 1 == 0 {
            return Err(Error::InvalidValue(
                "GFp modulus must be odd".to_string(),
            ));
        }
        let inv = mont_setup(p.0[0]);
        let bits = p.count_bits();

        // R = 2^(4*64) mod p, built by doubling from the MSB of p.
        let mut r = U256::zero();
        let msb = bits - 1;
        r.set_bit(msb);
        while gfp_cmp_raw(&r, &p) != Ordering::Less {
            r.sub(&p);
        }
        let shifts = 4u32 * 64 - msb;
        for _ in 0..shifts {
            gfp_add_raw(&mut r, &r.clone(), &p);
        }

        let mut r2 = r;
        for _ in 0..4 * 64 {
            gfp_add_raw(&mut r2, &r2.clone(), &p);
        }
        let mut r3 = r2;
        for _ in 0..4 * 64 {
            gfp_add_raw(&mut r3, &r3.clone(), &p);
        }

        log::trace!("constructed GFp field with modulus 0x{}", p.to_hex());

        Ok(Rc::new(GfpField {
            p,
            r,
            r2,
            r3,
            inv,
            bits,
        }))
    }

    pub fn modulus(&self) -> U256 {
        self.p
    }

    fn reduce(&self, t: &U512) -> U256 {
        let mut t = t.0;
        for i in 0..4 {
            let m = t[i].wrapping_mul(self.inv);
            let mut carry = 0u64;
            for j in 0..4 {
                t[i + j] = crate::bigint::mac_with_carry(t[i + j], m, self.p.0[j], &mut carry);
            }
            let mut k = i + 4;
            while carry != 0 && k < 8 {
                let (sum, c) = t[k].overflowing_add(carry);
                t[k] = sum;
                carry = c as u64;
                k += 1;
            }
        }
        let mut result = U256([t[4], t[5], t[6], t[7]]);
        if gfp_cmp_raw(&result, &self.p) != Ordering::Less {
            result.sub(&self.p);
        }
        result
    }
}

fn gfp_cmp_raw(a: &U256, b: &U256) -> Ordering {
    a.cmp_to(b)
}

fn gfp_add_raw(out: &mut U256, a: &U256, p: &U256) {
    let mut sum = *a;
    let carry = sum.add(a);
    if carry || gfp_cmp_raw(&sum, p) != Ordering::Less {
        sum.sub(p);
    }
    *out = sum;
}

impl U256 {
    fn set_bit(&mut self, i: u32) {
        self.0[(i / 64) as usize] |= 1u64 << (i % 64);
    }
}

/// Newton-iteration computation of `mu = -p^-1 mod 2^64`.
fn mont_setup(p0: u64) -> u64 {
    let mut x: u64 = (((p0.wrapping_add(2)) & 4) << 1).wrapping_add(p0);
    x = x.wrapping_mul(2u64.wrapping_sub(p0.wrapping_mul(x)));
    x = x.wrapping_mul(2u64.wrapping_sub(p0.wrapping_mul(x)));
    x = x.wrapping_mul(2u64.wrapping_sub(p0.wrapping_mul(x)));
    x = x.wrapping_mul(2u64.wrapping_sub(p0.wrapping_mul(x)));
    0u64.wrapping_sub(x)
}

/// An element of `GFp`, stored in Montgomery form (`value = a*R mod p`).
#[derive(Clone)]
pub struct GfpElement {
    pub(crate) value: U256,
    pub(crate) field: Rc<GfpField>,
}

impl GfpElement {
    pub fn field(&self) -> &Rc<GfpField> {
        &self.field
    }

    pub fn zero(field: &Rc<GfpField>) -> Self {
        GfpElement {
            value: U256::zero(),
            field: field.clone(),
        }
    }

    pub fn one(field: &Rc<GfpField>) -> Self {
        GfpElement {
            value: field.r,
            field: field.clone(),
        }
    }

    /// Wraps a value already known to be in Montgomery form below `p`.
    pub(crate) fn from_montgomery(value: U256, field: &Rc<GfpField>) -> Self {
        GfpElement {
            value,
            field: field.clone(),
        }
    }

    pub fn from_hex(s: &str, field: &Rc<GfpField>) -> Result<Self> {
        let (raw, neg) = U256::from_hex(s)?;
        if gfp_cmp_raw(&raw, &field.p) != Ordering::Less {
            return Err(Error::InvalidValue(format!(
                "value 0x{} is not reduced mod p",
                raw.to_hex()
            )));
        }
        let mont = field.reduce(&raw.mul_wide(&field.r2));
        let mut out = GfpElement {
            value: mont,
            field: field.clone(),
        };
        if neg {
            out = out.neg();
        }
        Ok(out)
    }

    /// Builds an element directly from a 32-byte big-endian buffer, reducing
    /// mod `p` rather than requiring the caller to pre-reduce (hash-to-curve
    /// input is an arbitrary digest, not a canonical field value).
    pub fn from_bytes_be(bytes: &[u8; 32], field: &Rc<GfpField>) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[3 - i] = u64::from_be_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        }
        let raw = U256(limbs);
        GfpElement::from_montgomery(field.reduce(&raw.mul_wide(&field.r2)), field)
    }

    pub fn to_hex(&self) -> String {
        self.to_normal().to_hex()
    }

    fn to_normal(&self) -> U256 {
        self.field.reduce(&U512([
            self.value.0[0],
            self.value.0[1],
            self.value.0[2],
            self.value.0[3],
            0,
            0,
            0,
            0,
        ]))
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.value.cmp_to(&self.field.r) == Ordering::Equal
    }

    pub fn eq(&self, other: &Self) -> bool {
        self.value.cmp_to(&other.value) == Ordering::Equal
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut sum = self.value;
        let carry = sum.add(&other.value);
        if carry || gfp_cmp_raw(&sum, &self.field.p) != Ordering::Less {
            sum.sub(&self.field.p);
        }
        GfpElement::from_montgomery(sum, &self.field)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let mut diff = self.value;
        let borrow = diff.sub(&other.value);
        if borrow {
            diff.add(&self.field.p);
        }
        GfpElement::from_montgomery(diff, &self.field)
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let mut out = self.field.p;
        out.sub(&self.value);
        GfpElement::from_montgomery(out, &self.field)
    }

    pub fn double(&self) -> Self {
        self.add(self)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let wide = self.value.mul_wide(&other.value);
        GfpElement::from_montgomery(self.field.reduce(&wide), &self.field)
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    pub fn mul_small(&self, k: u64) -> Self {
        // Repeated doubling rather than a hard-coded add-chain per small
        // constant; only matters for constant-time performance, not
        // correctness.
        let mut acc = GfpElement::zero(&self.field);
        let mut base = self.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.add(&base);
            }
            base = base.double();
            k >>= 1;
        }
        acc
    }

    /// Almost-Montgomery inverse (Kaliski), ported from `GFp::inv`.
    pub fn inverse(&self) -> Self {
        let p = self.field.p;
        let mut u = p;
        let mut v = self.value;
        let mut r = U256::zero();
        let mut s = U256::from_u64(1);
        let mut k: u32 = 0;
        let mut last_carry = false;

        while !v.is_zero() {
            if u.0[0] & 1 == 0 {
                u = u.shr(1);
                last_carry = s.add(&s.clone());
            } else if v.0[0] & 1 == 0 {
                v = v.shr(1);
                last_carry = r.add(&r.clone());
            } else if gfp_cmp_raw(&u, &v) == Ordering::Greater {
                u.sub(&v);
                u = u.shr(1);
                last_carry = r.add(&s);
                s.add(&s.clone());
            } else {
                v.sub(&u);
                v = v.shr(1);
                let new_s = {
                    let mut t = r;
                    t.add(&s);
                    t
                };
                last_carry = r.add(&r.clone());
                s = new_s;
            }
            k += 1;
        }

        if last_carry || gfp_cmp_raw(&r, &p) != Ordering::Less {
            r.sub(&p);
        }
        r = {
            let mut out = p;
            out.sub(&r);
            out
        };

        // r = a^-1 . 2^-m . 2^k  (m = 256); restore Montgomery form.
        let mut r = self.field.reduce(&r.mul_wide(&self.field.r2));
        let two_m = 2 * 4 * 64;
        if k != two_m as u32 && k != 0 {
            let shift = two_m as u32 - k;
            let mut t = U256::zero();
            t.0[(shift / 64) as usize] = 1u64 << (shift % 64);
            r = self.field.reduce(&r.mul_wide(&t));
        }
        GfpElement::from_montgomery(r, &self.field)
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.inverse())
    }

    /// Left-to-right square-and-multiply, exponent as a normal-form `U256`.
    pub fn exp(&self, exponent: &U256) -> Self {
        let bits = exponent.count_bits();
        if bits == 0 {
            return GfpElement::one(&self.field);
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

    pub fn legendre(&self) -> Legendre {
        if self.is_zero() {
            return Legendre::Zero;
        }
        let mut pm1 = self.field.p;
        pm1.sub(&U256::from_u64(1));
        let expo = pm1.shr(1);
        let t = self.exp(&expo);
        if t.is_one() {
            Legendre::Residue
        } else {
            Legendre::NonResidue
        }
    }

    /// Cubic-residue test; only meaningful when `p ≡ 1 (mod 3)`.
    pub fn is_cubic_residue(&self) -> bool {
        let mut pm1 = self.field.p;
        pm1.sub(&U256::from_u64(1));
        let three = GfpElement::from_montgomery(
            self.field.reduce(&U256::from_u64(3).mul_wide(&self.field.r2)),
            &self.field,
        );
        let e = Self::div_u256_by_small(&pm1, &three.to_normal());
        self.exp(&e).is_one()
    }

    fn div_u256_by_small(a: &U256, _b: &U256) -> U256 {
        // Only ever called with b=3 in this crate; long-division by 3 via
        // repeated subtraction of shifted 3's would be slow for 256 bits, so
        // use a direct limb-wise division by the small constant 3.
        let mut quotient = U256::zero();
        let mut remainder: u128 = 0;
        for i in (0..4).rev() {
            let cur = (remainder << 64) | a.0[i] as u128;
            quotient.0[i] = (cur / 3) as u64;
            remainder = cur % 3;
        }
        quotient
    }

    pub fn sqrt(&self) -> Result<Self> {
        if self.legendre() == Legendre::NonResidue {
            return Err(Error::NotSquare);
        }
        if self.is_zero() {
            return Ok(self.clone());
        }
        let p0 = self.field.p.0[0];
        if p0 & 0x7 != 1 {
            if p0 & 0x3 == 3 {
                // sqrt = a^((p+1)/4)
                let mut expo = self.field.p;
                expo.add(&U256::from_u64(1));
                let expo = expo.shr(2);
                return Ok(self.exp(&expo));
            }
            if p0 & 0x7 == 5 {
                let mut expo = self.field.p;
                expo.sub(&U256::from_u64(1));
                let expo = expo.shr(2);
                let t = self.exp(&expo);
                if t.is_one() {
                    let mut expo2 = self.field.p;
                    expo2.add(&U256::from_u64(3));
                    let expo2 = expo2.shr(3);
                    return Ok(self.exp(&expo2));
                } else {
                    let mut expo2 = self.field.p;
                    expo2.sub(&U256::from_u64(5));
                    let expo2 = expo2.shr(3);
                    let four_a = self.double().double();
                    let two_a = self.double();
                    return Ok(two_a.mul(&four_a.exp(&expo2)));
                }
            }
        }
        self.tonelli_shanks()
    }

    fn tonelli_shanks(&self) -> Result<Self> {
        let one = GfpElement::one(&self.field);
        let mut g = GfpElement::from_montgomery(
            self.field.reduce(&U256::from_u64(7).mul_wide(&self.field.r2)),
            &self.field,
        );
        loop {
            if g.legendre() == Legendre::NonResidue {
                break;
            }
            g = g.add(&one);
        }

        let mut pm1 = self.field.p;
        pm1.sub(&U256::from_u64(1));
        let pm1s2 = pm1.shr(1);

        let mut e1 = pm1s2;
        let mut e2 = U256::zero();
        let aa = self.clone();
        let m1 = one.neg();

        while e1.0[0] & 1 == 0 {
            e1 = e1.shr(1);
            e2 = e2.shr(1);
            let candidate = aa.exp(&e1).mul(&g.exp(&e2));
            if candidate.eq(&m1) {
                let mut sum = pm1s2;
                sum.add(&e2);
                e2 = sum;
            }
        }

        let mut e1p1 = e1;
        e1p1.add(&U256::from_u64(1));
        let e1p1 = e1p1.shr(1);
        let e2s2 = e2.shr(1);
        Ok(aa.exp(&e1p1).mul(&g.exp(&e2s2)))
    }

    /// Fills a uniformly random element below `p`, masking the top word and
    /// rejecting values `>= p` exactly as `GFp::rand` does.
    pub fn random(field: &Rc<GfpField>, rng: &mut dyn Rng) -> Result<Self> {
        let mask_bits = 4 * 64 - field.bits;
        loop {
            let mut bytes = [0u8; 32];
            rng.fill(&mut bytes)?;
            let mut limbs = [0u64; 4];
            for i in 0..4 {
                limbs[i] = u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
            }
            let mut candidate = U256(limbs);
            if mask_bits > 0 && mask_bits < 64 {
                candidate.0[3] &= (1u64 << (64 - mask_bits)) - 1;
            } else if mask_bits >= 64 {
                // bits <= 192, top limbs beyond the masked word are zeroed
                // by construction of the mask loop below.
                let full_limbs = (mask_bits / 64) as usize;
                for limb in candidate.0.iter_mut().rev().take(full_limbs) {
                    *limb = 0;
                }
                let rem = mask_bits % 64;
                let idx = 3 - full_limbs;
                if rem > 0 {
                    candidate.0[idx] &= (1u64 << (64 - rem)) - 1;
                }
            }
            if gfp_cmp_raw(&candidate, &field.p) == Ordering::Less {
                log::trace!("accepted random GFp sample after masking");
                return Ok(GfpElement::from_montgomery(
                    field.reduce(&candidate.mul_wide(&field.r2)),
                    field,
                ));
            }
            log::warn!("rejected random GFp sample, retrying");
        }
    }
}

impl std::fmt::Debug for GfpElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GfpElement(0x{})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A small prime (p = 3 mod 4) convenient for exhaustive-ish checks.
    fn small_field() -> Rc<GfpField> {
        GfpField::new("b").unwrap() // 11, 11 mod 4 == 3
    }

    #[test]
    fn add_sub_identity() {
        let f = small_field();
        let a = GfpElement::from_hex("7", &f).unwrap();
        let zero = GfpElement::zero(&f);
        assert!(a.sub(&a).is_zero());
        assert!(a.add(&zero).eq(&a));
    }

    #[test]
    fn mul_one_is_identity() {
        let f = small_field();
        let a = GfpElement::from_hex("7", &f).unwrap();
        let one = GfpElement::one(&f);
        assert!(a.mul(&one).eq(&a));
    }

    #[test]
    fn inverse_roundtrip() {
        let f = small_field();
        let a = GfpElement::from_hex("7", &f).unwrap();
        let inv = a.inverse();
        assert!(a.mul(&inv).is_one());
    }

    #[test]
    fn square_matches_mul() {
        let f = small_field();
        let a = GfpElement::from_hex("5", &f).unwrap();
        assert!(a.square().eq(&a.mul(&a)));
    }

    #[test]
    fn sqrt_roundtrip_p_3_mod_4() {
        let f = small_field();
        let a = GfpElement::from_hex("5", &f).unwrap();
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert!(root.square().eq(&sq));
    }

    #[test]
    fn legendre_of_zero_is_zero() {
        let f = small_field();
        let zero = GfpElement::zero(&f);
        assert_eq!(zero.legendre(), Legendre::Zero);
    }

    #[test]
    fn non_residue_sqrt_errs() {
        let f = small_field();
        // In F_11, quadratic residues are {1,3,4,5,9}; 2 is not one.
        let a = GfpElement::from_hex("2", &f).unwrap();
        assert_eq!(a.sqrt(), Err(Error::NotSquare));
    }

    #[test]
    fn exp_matches_repeated_mul() {
        let f = small_field();
        let a = GfpElement::from_hex("4", &f).unwrap();
        let mut expected = GfpElement::one(&f);
        for _ in 0..5 {
            expected = expected.mul(&a);
        }
        assert!(a.exp(&U256::from_u64(5)).eq(&expected));
    }
}
