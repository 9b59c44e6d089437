//! Division and remainder (Knuth's Algorithm D, with a preinverted-
//! reciprocal top-limb estimate and at-most-one correction, per the base
//! spec's §4.2).

use super::ops::{add_n, incr_1};
use super::Nat;
use crate::limb::{div_2by1, div_2by1_preinv, invert_limb, mul_wide, mul_wide_add, sub_with_borrow, Limb};

/// `u / d` and `u % d` for a single non-zero limb `d`.
///
/// Unlike the multi-limb [`div`], this does not need the
/// normalize-and-preinvert dance: `div_2by1`'s only precondition is that
/// the running remainder stays below `d`, which is already the loop
/// invariant here, so each step is a single plain double-by-single
/// division.
///
/// # Panics
///
/// Panics if `d == 0`.
pub fn div_1(u: &Nat, d: Limb) -> (Nat, Limb) {
    assert!(d != 0, "mpn::div_1: division by zero");
    let limbs = u.limbs();
    let mut q = vec![0 as Limb; limbs.len()];
    let mut rem: Limb = 0;
    for i in (0..limbs.len()).rev() {
        let (qi, ri) = div_2by1(rem, limbs[i], d);
        q[i] = qi;
        rem = ri;
    }
    (Nat::from_limbs(q), rem)
}

/// `u % d` for a single non-zero limb `d`.
pub fn rem_1(u: &Nat, d: Limb) -> Limb {
    div_1(u, d).1
}

/// `u / v` and `u % v`.
///
/// # Panics
///
/// Panics if `v` is zero.
pub fn div(u: &Nat, v: &Nat) -> (Nat, Nat) {
    assert!(!v.is_zero(), "mpn::div: division by zero");

    if super::cmp(u, v) < 0 {
        return (Nat::zero(), u.clone());
    }
    if v.len() == 1 {
        let (q, r) = div_1(u, v.limbs()[0]);
        return (q, Nat::from_limb(r));
    }

    let n = v.len();
    let m = u.len() - n;

    let shift = (v.limbs()[n - 1].leading_zeros()) as usize;
    let v_norm = super::shl(v, shift);
    debug_assert_eq!(v_norm.len(), n, "normalizing shift must not grow the divisor");

    let mut un = super::shl(u, shift).limbs().to_vec();
    un.resize(m + n + 1, 0);

    let v_top = v_norm.limbs()[n - 1];
    let v_second = v_norm.limbs()[n - 2];
    let v_inv = invert_limb(v_top);

    let mut q = vec![0 as Limb; m + 1];

    for j in (0..=m).rev() {
        let top = un[j + n];
        let mid = un[j + n - 1];
        let low2 = un[j + n - 2];

        let mut qhat = qhat_estimate(top, mid, low2, v_top, v_second, v_inv);

        loop {
            let borrow = mul_sub(&mut un[j..=j + n], v_norm.limbs(), qhat);
            if borrow == 0 {
                break;
            }
            qhat -= 1;
            let carry = add_n(&mut un[j..j + n], &un[j..j + n].to_vec(), v_norm.limbs());
            let _ = incr_1(&mut un[j + n..=j + n], carry);
            break;
        }

        q[j] = qhat;
    }

    let quotient = Nat::from_limbs(q);
    let remainder = super::shr(&Nat::from_limbs(un[..n].to_vec()), shift);
    (quotient, remainder)
}

/// `u % v`.
pub fn rem(u: &Nat, v: &Nat) -> Nat {
    div(u, v).1
}

/// Estimates the quotient limb from the top two (and, when available,
/// three) limbs of the current remainder window, per Knuth's refinement:
/// start from the 2-by-1 preinverted estimate using only the top divisor
/// limb, then correct at most twice using the second-highest divisor
/// limb. The multiply-subtract step that follows corrects any remaining
/// one-off error (there can be at most one, after this refinement).
fn qhat_estimate(top: Limb, mid: Limb, low2: Limb, v_top: Limb, v_second: Limb, v_inv: Limb) -> Limb {
    let (mut qhat, mut rhat, mut rhat_overflowed) = if top == v_top {
        let (sum, carry) = mid.overflowing_add(v_top);
        (Limb::MAX, sum, carry)
    } else {
        let (q, r) = div_2by1_preinv(top, mid, v_top, v_inv);
        (q, r, false)
    };

    loop {
        if rhat_overflowed {
            break;
        }
        let (hi, lo) = mul_wide(qhat, v_second);
        let too_big = hi > rhat || (hi == rhat && lo > low2);
        if !too_big {
            break;
        }
        qhat -= 1;
        let (new_rhat, carry) = rhat.overflowing_add(v_top);
        rhat = new_rhat;
        rhat_overflowed = carry;
    }

    qhat
}

/// `u[0..=n] -= qhat * v[0..n]`, returning the borrow out of the top limb
/// (0 or 1; 1 means `qhat` was one too large and the caller must add `v`
/// back in and decrement `qhat`).
fn mul_sub(u: &mut [Limb], v: &[Limb], qhat: Limb) -> Limb {
    let n = v.len();
    debug_assert_eq!(u.len(), n + 1);
    let mut borrow: Limb = 0;
    let mut carry: Limb = 0;
    for i in 0..n {
        let (hi, lo) = mul_wide_add(v[i], qhat, carry);
        carry = hi;
        let (d, b) = sub_with_borrow(u[i], lo, borrow);
        u[i] = d;
        borrow = b;
    }
    let (d, b) = sub_with_borrow(u[n], carry, borrow);
    u[n] = d;
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpn::Nat;

    fn to_big(n: &Nat) -> num_bigint::BigUint {
        num_bigint::BigUint::from_bytes_le(
            &n.limbs().iter().flat_map(|l| l.to_le_bytes()).collect::<Vec<u8>>(),
        )
    }

    #[test]
    fn divide_with_borrow_and_restore() {
        // Scenario 2 from the spec: u = 2^128 - 1, v = 2^64.
        let u = Nat::from_limbs(vec![Limb::MAX, Limb::MAX]);
        let v = Nat::from_limbs(vec![0, 1]);
        let (q, r) = div(&u, &v);
        assert_eq!(q, Nat::from_limb(Limb::MAX));
        assert_eq!(r, Nat::from_limb(Limb::MAX));
    }

    #[test]
    fn div_1_matches_multi_limb_div() {
        let u = Nat::from_limbs(vec![0x1234_5678, 0x9ABC_DEF0, 42]);
        let d = 7 as Limb;
        let (q1, r1) = div_1(&u, d);
        let (q2, r2) = div(&u, &Nat::from_limb(d));
        assert_eq!(q1, q2);
        assert_eq!(Nat::from_limb(r1), r2);
    }

    #[test]
    fn div_against_bigint_oracle() {
        let cases: [(&[Limb], &[Limb]); 4] = [
            (&[5, 7, 11], &[13, 17]),
            (&[Limb::MAX, Limb::MAX, Limb::MAX], &[1, 1]),
            (&[0, 0, 1], &[0, 1]),
            (&[7], &[3]),
        ];
        for (u, v) in cases {
            let un = Nat::from_limbs(u.to_vec());
            let vn = Nat::from_limbs(v.to_vec());
            let (q, r) = div(&un, &vn);
            let (eq, er) = {
                let u = to_big(&un);
                let v = to_big(&vn);
                (u.clone() / v.clone(), u % v)
            };
            assert_eq!(to_big(&q), eq, "quotient mismatch for {u:?}/{v:?}");
            assert_eq!(to_big(&r), er, "remainder mismatch for {u:?}/{v:?}");
        }
    }

    #[test]
    fn div_invariant_holds_for_random_like_inputs() {
        use num_integer::Integer;
        let mut state: u64 = 0x243F_6A88_85A3_08D3;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for _ in 0..50 {
            let ulen = 2 + (next() % 4) as usize;
            let vlen = 1 + (next() % ulen as u64) as usize;
            let u_limbs: Vec<Limb> = (0..ulen).map(|_| next() as Limb).collect();
            let mut v_limbs: Vec<Limb> = (0..vlen).map(|_| next() as Limb).collect();
            if *v_limbs.last().unwrap() == 0 {
                *v_limbs.last_mut().unwrap() = 1;
            }
            let un = Nat::from_limbs(u_limbs);
            let vn = Nat::from_limbs(v_limbs);
            if vn.is_zero() {
                continue;
            }
            let (q, r) = div(&un, &vn);
            assert!(super::super::cmp(&r, &vn) < 0);
            let reconstructed = super::super::add(&super::super::mul(&q, &vn), &r);
            assert_eq!(reconstructed, un);

            let (eq, er) = to_big(&un).div_rem(&to_big(&vn));
            assert_eq!(to_big(&q), eq);
            assert_eq!(to_big(&r), er);
        }
    }
}
