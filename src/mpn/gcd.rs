//! Greatest common divisor and modular inverse, constant-time.
//!
//! Both are built on the same masked divstep transition: at every round,
//! exactly one of three mutually exclusive actions applies — halve the
//! running value `u`, halve the running value `v`, or subtract the smaller
//! from the larger — chosen by a data-dependent *mask* rather than a
//! data-dependent *branch*. All three candidate next-states are computed
//! every round; the mask only selects which one is kept. The round count is
//! fixed up front from the operands' public bit length, and every round
//! past convergence (`u == 0`) is latched into a no-op by the same masking
//! technique, so the number of rounds executed never depends on where
//! convergence actually happens.
//!
//! The per-round cofactor update is the textbook binary extended gcd
//! recurrence (Handbook of Applied Cryptography, Algorithm 14.61): instead
//! of Bernstein–Yang's usual trick of tracking cofactors as dyadic
//! fractions and rescaling by `2^-rounds mod m` at the end (which requires
//! `m` odd, since that rescaling is a division by a power of two modulo
//! `m`), the cofactor pairs here are kept as exact integers throughout by
//! adding the *other* operand before halving whenever a cofactor pair's
//! parity doesn't already allow it (`A,B` not both even → `A += m, B -= a`
//! first, which changes neither `A*a + B*m` nor `B`'s role since `m*a +
//! (-a)*m = 0`). This is what makes `mod_invert` correct for RSA's `e^-1
//! mod phi` with `phi` even as well as for odd moduli — no parity
//! requirement is placed on either operand.

use super::{add_n, cmp_ct, sub_n, Nat};
use crate::error::Error;
use crate::limb::{Limb, LIMB_BITS};

/// Number of limbs to carry through the recurrence: enough for `u`/`v`
/// (bounded by `max(a, m)` throughout, since both only shrink) and for the
/// cofactors (bounded by the same order of magnitude per the HAC 14.61
/// invariant), plus two spare limbs of headroom so the `A += m` / `B -= a`
/// fixup steps never truncate before the following halving brings the
/// value back down.
fn width_limbs(a: &Nat, m: &Nat) -> usize {
    let bits = a.bit_length().max(m.bit_length()).max(1);
    bits.div_ceil(LIMB_BITS as usize) + 2
}

/// Fixed round count. Each round either halves `u` or `v` (shrinking
/// `bitlen(u) + bitlen(v)` by exactly one) or subtracts the smaller from
/// the larger (which need not shrink that sum by itself, but always
/// leaves an even value behind, so the very next round is guaranteed to be
/// a halving round). Any two consecutive rounds therefore shrink the
/// potential `bitlen(u) + bitlen(v)` by at least one, so `2 * (bitlen(a) +
/// bitlen(m))` rounds always suffice; a flat constant covers the small
/// fixed-point cases (e.g. one operand already 1).
fn round_bound(a: &Nat, m: &Nat) -> usize {
    let bits = a.bit_length().max(m.bit_length()).max(1);
    4 * bits + 80
}

/// `mask.wrapping_neg()`-style expansion of a 0/1 flag into an all-zero or
/// all-one `Limb`, for masked selects below.
#[inline]
fn spread(bit: Limb) -> Limb {
    bit.wrapping_neg()
}

#[inline]
fn is_even(mag: &[Limb]) -> Limb {
    1 - (mag[0] & 1)
}

#[inline]
fn is_zero(mag: &[Limb]) -> Limb {
    let any = mag.iter().fold(0 as Limb, |acc, &l| acc | l);
    (any == 0) as Limb
}

#[inline]
fn select_vec(mask: Limb, a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    a.iter().zip(b).map(|(&x, &y)| (x & mask) | (y & !mask)).collect()
}

/// `select_vec` gated by a 0/1 flag rather than an already-spread mask.
#[inline]
fn select(bit: Limb, a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    select_vec(spread(bit), a, b)
}

#[inline]
fn shr1(mag: &mut [Limb]) {
    let mut carry: Limb = 0;
    for limb in mag.iter_mut().rev() {
        let next_carry = *limb & 1;
        *limb = (*limb >> 1) | (carry << (LIMB_BITS - 1));
        carry = next_carry;
    }
}

#[inline]
fn add_w(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let mut out = vec![0 as Limb; a.len()];
    let carry = add_n(&mut out, a, b);
    debug_assert_eq!(carry, 0, "gcd: cofactor addition overflowed its headroom limbs");
    out
}

#[inline]
fn sub_w(a: &[Limb], b: &[Limb]) -> (Vec<Limb>, Limb) {
    let mut out = vec![0 as Limb; a.len()];
    let borrow = sub_n(&mut out, a, b);
    (out, borrow)
}

/// A signed magnitude of fixed width, private to this module's recurrence.
/// `sign` is `0` (non-negative) or `1` (negative); always normalized so
/// that a zero magnitude carries `sign == 0`.
#[derive(Clone)]
struct Signed {
    sign: Limb,
    mag: Vec<Limb>,
}

impl Signed {
    fn positive(mag: Vec<Limb>) -> Self {
        Signed { sign: 0, mag }
    }

    fn select(bit: Limb, a: &Signed, b: &Signed) -> Signed {
        let mask = spread(bit);
        let sign = (a.sign & mask) | (b.sign & !mask);
        Signed { sign, mag: select_vec(mask, &a.mag, &b.mag) }
    }

    fn negate(&self) -> Signed {
        let z = is_zero(&self.mag);
        Signed { sign: (1 - self.sign) & (1 - z), mag: self.mag.clone() }
    }

    /// `self + other`, both treated as signed integers of equal width.
    fn add(&self, other: &Signed) -> Signed {
        let same_sign = (self.sign == other.sign) as Limb;

        let sum = add_w(&self.mag, &other.mag);
        let (d1, borrow1) = sub_w(&self.mag, &other.mag); // self.mag - other.mag
        let (d2, _borrow2) = sub_w(&other.mag, &self.mag); // other.mag - self.mag
        let self_is_bigger = (borrow1 == 0) as Limb;
        let diff_mag = select(self_is_bigger, &d1, &d2);
        let diff_sign = (self.sign & spread(self_is_bigger)) | (other.sign & !spread(self_is_bigger));

        let mag = select(same_sign, &sum, &diff_mag);
        let sign_if_diff = diff_sign;
        let sign = (self.sign & spread(same_sign)) | (sign_if_diff & !spread(same_sign));

        let z = is_zero(&mag);
        Signed { sign: sign & (1 - z), mag }
    }

    fn sub(&self, other: &Signed) -> Signed {
        self.add(&other.negate())
    }

    fn halve(&self) -> Signed {
        let mut mag = self.mag.clone();
        shr1(&mut mag);
        Signed { sign: self.sign, mag }
    }

    /// Reduces to the canonical representative in `[0, m)`, constant-time
    /// in this value's sign and magnitude. `m_ext` must be this value's
    /// width, zero-extended from the true modulus.
    fn reduce_mod(&self, m_ext: &[Limb]) -> Nat {
        let mut r = self.mag.clone();
        // The HAC 14.61 invariant keeps this cofactor's magnitude bounded
        // by roughly `m`, so a handful of conditional subtractions is
        // always enough to land in `[0, m)` regardless of which way any
        // slack in that bound breaks.
        for _ in 0..4 {
            let (diff, borrow) = sub_w(&r, m_ext);
            let take = (borrow == 0) as Limb;
            r = select(take, &diff, &r);
        }
        let z = is_zero(&r);
        let negate = self.sign & (1 - z);
        let (complement, _) = sub_w(m_ext, &r);
        let out = select(negate, &complement, &r);
        Nat::from_limbs(out)
    }
}

/// Zero-extends `n`'s limbs to exactly `w` limbs.
fn zero_extend(n: &Nat, w: usize) -> Vec<Limb> {
    let mut v = n.limbs().to_vec();
    v.resize(w, 0);
    v
}

/// Runs the masked binary extended gcd recurrence on `(a, m)`, returning
/// `(gcd(a, m), bezout_a)` where `bezout_a * a + bezout_m * m = gcd(a, m)`
/// for some `bezout_m` this function doesn't bother returning (`mod_invert`
/// only ever needs `a`'s coefficient).
///
/// Degenerate zero operands are short-circuited before the recurrence:
/// `gcd(a, 0) = a` and `gcd(0, m) = m` are true regardless of which operand
/// is "secret" (an all-zero key parameter is not a value RSA ever produces),
/// and the recurrence below is not well-founded when one operand starts at
/// zero and the other doesn't (`v` would sit at a fixed point forever and
/// `u` would never reach zero).
fn binary_ext_gcd(a: &Nat, m: &Nat) -> (Nat, Signed) {
    let w = width_limbs(a, m);
    if m.is_zero() {
        let mut one = vec![0 as Limb; w];
        one[0] = 1;
        return (a.clone(), Signed::positive(one));
    }
    if a.is_zero() {
        return (m.clone(), Signed::positive(vec![0 as Limb; w]));
    }

    let rounds = round_bound(a, m);

    let a_ext = zero_extend(a, w);
    let m_ext = zero_extend(m, w);

    let mut u = a_ext.clone();
    let mut v = m_ext.clone();
    let mut ca = Signed::positive({
        let mut one = vec![0 as Limb; w];
        one[0] = 1;
        one
    });
    let mut cb = Signed::positive(vec![0 as Limb; w]);
    let mut cc = Signed::positive(vec![0 as Limb; w]);
    let mut cd = Signed::positive({
        let mut one = vec![0 as Limb; w];
        one[0] = 1;
        one
    });

    let a_signed = Signed::positive(a_ext.clone());
    let m_signed = Signed::positive(m_ext.clone());

    for _ in 0..rounds {
        let done = is_zero(&u);
        let u_even = is_even(&u);
        let v_even = is_even(&v);

        // Candidate: halve u, fixing up (ca, cb) first if their parity
        // doesn't already allow an exact halving.
        let ab_both_even = is_even(&ca.mag) & is_even(&cb.mag);
        let ca_fix = ca.add(&m_signed);
        let cb_fix = cb.sub(&a_signed);
        let ca_for_halve = Signed::select(ab_both_even, &ca, &ca_fix).halve();
        let cb_for_halve = Signed::select(ab_both_even, &cb, &cb_fix).halve();
        let mut u_halved = u.clone();
        shr1(&mut u_halved);

        // Candidate: halve v, fixing up (cc, cd) the same way.
        let cd_both_even = is_even(&cc.mag) & is_even(&cd.mag);
        let cc_fix = cc.add(&m_signed);
        let cd_fix = cd.sub(&a_signed);
        let cc_for_halve = Signed::select(cd_both_even, &cc, &cc_fix).halve();
        let cd_for_halve = Signed::select(cd_both_even, &cd, &cd_fix).halve();
        let mut v_halved = v.clone();
        shr1(&mut v_halved);

        // Candidate: subtract the smaller of u, v from the larger.
        let u_ge_v = (cmp_ct(&u, &v) >= 0) as Limb;
        let (u_minus_v, _) = sub_w(&u, &v);
        let (v_minus_u, _) = sub_w(&v, &u);
        let u_sub = select(u_ge_v, &u_minus_v, &u);
        let v_sub = select(u_ge_v, &v, &v_minus_u);
        let ca_sub = Signed::select(u_ge_v, &ca.sub(&cc), &ca);
        let cb_sub = Signed::select(u_ge_v, &cb.sub(&cd), &cb);
        let cc_sub = Signed::select(u_ge_v, &cc, &cc.sub(&ca));
        let cd_sub = Signed::select(u_ge_v, &cd, &cd.sub(&cb));

        // Priority select: done > halve-u > halve-v > subtract.
        let new_u = select(done, &u, &select(u_even, &u_halved, &select(v_even, &u, &u_sub)));
        let new_v = select(done, &v, &select(u_even, &v, &select(v_even, &v_halved, &v_sub)));
        let new_ca = Signed::select(
            done,
            &ca,
            &Signed::select(u_even, &ca_for_halve, &Signed::select(v_even, &ca, &ca_sub)),
        );
        let new_cb = Signed::select(
            done,
            &cb,
            &Signed::select(u_even, &cb_for_halve, &Signed::select(v_even, &cb, &cb_sub)),
        );
        let new_cc = Signed::select(
            done,
            &cc,
            &Signed::select(u_even, &cc, &Signed::select(v_even, &cc_for_halve, &cc_sub)),
        );
        let new_cd = Signed::select(
            done,
            &cd,
            &Signed::select(u_even, &cd, &Signed::select(v_even, &cd_for_halve, &cd_sub)),
        );

        u = new_u;
        v = new_v;
        ca = new_ca;
        cb = new_cb;
        cc = new_cc;
        cd = new_cd;
    }

    debug_assert_eq!(is_zero(&u), 1, "gcd: round bound did not converge");
    (Nat::from_limbs(v), cc)
}

/// `gcd(a, m)`. Fixed round count per [module docs](self); no data-dependent
/// early exit.
pub fn divsteps_gcd(a: &Nat, m: &Nat) -> Nat {
    binary_ext_gcd(a, m).0
}

/// `a^-1 mod m`.
///
/// Constant-time in `a` and `m`'s values: the masked recurrence in
/// [`binary_ext_gcd`] runs a fixed number of rounds regardless of either
/// operand, and works for even `m` (needed for RSA's `e^-1 mod phi`) as
/// well as odd `m` (needed for `q^-1 mod p`).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `m < 2`, or
/// [`Error::NotInvertible`] if `gcd(a, m) != 1`.
pub fn mod_invert(a: &Nat, m: &Nat) -> Result<Nat, Error> {
    if super::cmp(m, &Nat::one()) <= 0 {
        return Err(Error::InvalidArgument);
    }
    let (g, bezout_a) = binary_ext_gcd(a, m);
    if g != Nat::one() {
        return Err(Error::NotInvertible);
    }
    let w = width_limbs(a, m);
    let m_ext = zero_extend(m, w);
    Ok(bezout_a.reduce_mod(&m_ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpn::Nat;

    #[test]
    fn gcd_matches_known_values() {
        assert_eq!(divsteps_gcd(&Nat::from_limb(48), &Nat::from_limb(18)), Nat::from_limb(6));
        assert_eq!(divsteps_gcd(&Nat::from_limb(17), &Nat::from_limb(5)), Nat::one());
        assert_eq!(divsteps_gcd(&Nat::zero(), &Nat::from_limb(9)), Nat::from_limb(9));
        assert_eq!(divsteps_gcd(&Nat::from_limb(9), &Nat::zero()), Nat::from_limb(9));
    }

    #[test]
    fn gcd_handles_even_modulus() {
        // phi(n)-style even modulus, coprime odd `a`.
        assert_eq!(divsteps_gcd(&Nat::from_limb(65537), &Nat::from_limb(3120)), Nat::one());
    }

    #[test]
    fn gcd_handles_large_even_modulus() {
        // A larger even modulus spanning multiple limbs on a 32-bit build,
        // and a cofactor-heavy case (both operands even except for a
        // shared odd remainder).
        let a = Nat::from_limbs(vec![0x1234_5678, 0x9ABC]);
        let m = Nat::from_limbs(vec![0x0000_0002, 0x0010]);
        let g = divsteps_gcd(&a, &m);
        // Cross-check against the plain (variable-time) division-based gcd
        // via the Euclidean identity rem(a, g) == 0 for both operands.
        assert_eq!(super::super::rem(&a, &g), Nat::zero());
        assert_eq!(super::super::rem(&m, &g), Nat::zero());
    }

    #[test]
    fn mod_invert_matches_spec_scenarios() {
        assert_eq!(mod_invert(&Nat::from_limb(3), &Nat::from_limb(11)).unwrap(), Nat::from_limb(4));
        assert_eq!(mod_invert(&Nat::from_limb(6), &Nat::from_limb(9)), Err(Error::NotInvertible));
    }

    #[test]
    fn mod_invert_round_trips_with_multiplication() {
        let a = Nat::from_limb(65537);
        let m = Nat::from_limb(3_120_000_000 + 7919); // an arbitrary odd-ish large-ish modulus
        let inv = mod_invert(&a, &m).unwrap();
        let product = super::super::rem(&super::super::mul(&a, &inv), &m);
        assert_eq!(product, Nat::one());
    }

    #[test]
    fn mod_invert_handles_even_modulus_like_phi() {
        // e^-1 mod phi with phi even, mirroring RSA keygen's d = e^-1 mod
        // (p-1)(q-1).
        let e = Nat::from_limb(65537);
        let phi = Nat::from_limb(3_120_000_000); // even
        let d = mod_invert(&e, &phi).unwrap();
        let product = super::super::rem(&super::super::mul(&e, &d), &phi);
        assert_eq!(product, Nat::one());
    }

    #[test]
    fn mod_invert_rejects_small_modulus() {
        assert_eq!(mod_invert(&Nat::one(), &Nat::one()), Err(Error::InvalidArgument));
        assert_eq!(mod_invert(&Nat::one(), &Nat::zero()), Err(Error::InvalidArgument));
    }
}
