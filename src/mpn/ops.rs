//! Addition and subtraction on digit vectors.

use super::Nat;
use crate::limb::{add_with_carry, sub_with_borrow, Limb};

/// `r[i] = a[i] + b[i] + carry`, chained across same-length slices.
/// Returns the outgoing carry (0 or 1). `r`, `a`, `b` must have equal
/// length; `r` may alias `a` or `b`.
pub fn add_n(r: &mut [Limb], a: &[Limb], b: &[Limb]) -> Limb {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(r.len(), a.len());
    let mut carry = 0;
    for i in 0..a.len() {
        let (s, c) = add_with_carry(a[i], b[i], carry);
        r[i] = s;
        carry = c;
    }
    carry
}

/// `r[i] = a[i] - b[i] - borrow`, chained across same-length slices.
/// Returns the outgoing borrow (0 or 1).
pub fn sub_n(r: &mut [Limb], a: &[Limb], b: &[Limb]) -> Limb {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(r.len(), a.len());
    let mut borrow = 0;
    for i in 0..a.len() {
        let (d, b_out) = sub_with_borrow(a[i], b[i], borrow);
        r[i] = d;
        borrow = b_out;
    }
    borrow
}

/// Propagates a carry of `c` into `r[..]`, starting at limb 0. Returns the
/// carry out of the top limb (0 or 1). Short-circuits once the carry
/// clears — the number of limbs walked depends only on `r`'s length and
/// how many low limbs happen to be `Limb::MAX`, not on any secret value,
/// so this is safe for secret data (it never changes *which* limbs are
/// touched, only how many of a public-length buffer are).
pub fn incr_1(r: &mut [Limb], mut c: Limb) -> Limb {
    for limb in r.iter_mut() {
        let (s, carry) = add_with_carry(*limb, c, 0);
        *limb = s;
        c = carry;
        if c == 0 {
            break;
        }
    }
    c
}

/// Propagates a borrow of `c` into `r[..]`. Returns the outgoing borrow.
pub fn decr_1(r: &mut [Limb], mut c: Limb) -> Limb {
    for limb in r.iter_mut() {
        let (d, borrow) = sub_with_borrow(*limb, c, 0);
        *limb = d;
        c = borrow;
        if c == 0 {
            break;
        }
    }
    c
}

/// `a + b`, arbitrary lengths, fully normalized.
pub fn add(a: &Nat, b: &Nat) -> Nat {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = vec![0 as Limb; long.len() + 1];
    let n = short.len();
    let carry = add_n(&mut out[..n], &long.limbs()[..n], short.limbs());
    out[n..long.len()].copy_from_slice(&long.limbs()[n..]);
    let carry = incr_1(&mut out[n..long.len()], carry);
    out[long.len()] = carry;
    Nat::from_limbs(out)
}

/// `a + c` for a single limb `c`.
pub fn add_1(a: &Nat, c: Limb) -> Nat {
    let mut out = a.limbs().to_vec();
    out.push(0);
    let carry = incr_1(&mut out, c);
    debug_assert_eq!(carry, 0, "incr_1 overflowed a buffer with a reserved top limb");
    Nat::from_limbs(out)
}

/// `a - b`. Requires `a >= b`.
///
/// # Panics
///
/// Panics if `a < b` — natural numbers have no negative values, and
/// producing one is a programmer error (use [`crate::sint`] if a signed
/// result is actually needed).
pub fn sub(a: &Nat, b: &Nat) -> Nat {
    assert!(super::cmp(a, b) >= 0, "mpn::sub: a < b");
    let n = a.len();
    let mut out = vec![0 as Limb; n];
    let b_padded_len = b.len();
    let borrow = sub_n(&mut out[..b_padded_len], &a.limbs()[..b_padded_len], b.limbs());
    out[b_padded_len..].copy_from_slice(&a.limbs()[b_padded_len..]);
    let borrow = decr_1(&mut out[b_padded_len..], borrow);
    debug_assert_eq!(borrow, 0, "mpn::sub: unexpected borrow past the check above");
    Nat::from_limbs(out)
}

/// `a - c` for a single limb `c`. Requires `a >= c`.
pub fn sub_1(a: &Nat, c: Limb) -> Nat {
    let mut out = a.limbs().to_vec();
    let borrow = decr_1(&mut out, c);
    assert_eq!(borrow, 0, "mpn::sub_1: underflow");
    Nat::from_limbs(out)
}
