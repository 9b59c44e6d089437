//! Multiplication and squaring.
//!
//! Schoolbook algorithms with `DoubleLimb`-promoted cross products, the
//! same strategy this crate's fixed-width `U256::mul` uses, generalized
//! from 4 fixed limbs to N variable limbs.

use super::Nat;
use crate::limb::{mul_wide_add, mul_wide_add2, Limb};

/// `r += a * c` for a single limb `c`, where `r` has `a.len() + 1` limbs
/// of headroom. Returns the final carry out of the top limb (always fits,
/// since `r` was sized with the extra limb).
pub(crate) fn mul_1_acc(r: &mut [Limb], a: &[Limb], c: Limb) -> Limb {
    let mut carry: Limb = 0;
    for i in 0..a.len() {
        let (hi, lo) = mul_wide_add2(a[i], c, r[i], carry);
        r[i] = lo;
        carry = hi;
    }
    carry
}

/// `a * c` for a single limb `c`, normalized. The "carry" terminology in
/// the base spec refers to this function's overflow limb, which is folded
/// into the output here rather than returned separately.
pub fn mul_1(a: &Nat, c: Limb) -> Nat {
    if a.is_zero() || c == 0 {
        return Nat::zero();
    }
    let mut out = vec![0 as Limb; a.len() + 1];
    let carry = mul_1_acc(&mut out, a.limbs(), c);
    out[a.len()] = carry;
    Nat::from_limbs(out)
}

/// `a * b`, schoolbook, normalized.
pub fn mul(a: &Nat, b: &Nat) -> Nat {
    if a.is_zero() || b.is_zero() {
        return Nat::zero();
    }
    let mut out = vec![0 as Limb; a.len() + b.len()];
    for (j, &bj) in b.limbs().iter().enumerate() {
        let carry = mul_1_acc(&mut out[j..j + a.len()], a.limbs(), bj);
        out[j + a.len()] = carry;
    }
    Nat::from_limbs(out)
}

/// `a * a`, symmetric schoolbook: each off-diagonal product is computed
/// once and doubled, then the diagonal squares are added.
pub fn sqr(a: &Nat) -> Nat {
    if a.is_zero() {
        return Nat::zero();
    }
    let n = a.len();
    let limbs = a.limbs();
    let mut out = vec![0 as Limb; 2 * n];

    // Off-diagonal cross terms, each counted once (i < j).
    for i in 0..n {
        if limbs[i] == 0 {
            continue;
        }
        let mut carry: Limb = 0;
        for j in (i + 1)..n {
            let (hi, lo) = mul_wide_add2(limbs[i], limbs[j], out[i + j], carry);
            out[i + j] = lo;
            carry = hi;
        }
        let mut k = i + n;
        let mut add = carry;
        while add != 0 && k < out.len() {
            let (s, c) = out[k].overflowing_add(add);
            out[k] = s;
            add = c as Limb;
            k += 1;
        }
    }

    // Double the cross terms.
    let mut carry: Limb = 0;
    for limb in out.iter_mut() {
        let doubled = (*limb << 1) | carry;
        carry = *limb >> (crate::limb::LIMB_BITS - 1);
        *limb = doubled;
    }
    debug_assert_eq!(carry, 0, "squaring cross-term doubling overflowed the 2n-limb buffer");

    // Add the diagonal squares a[i]^2.
    let mut carry: Limb = 0;
    for i in 0..n {
        let (hi, lo) = mul_wide_add(limbs[i], limbs[i], out[2 * i]);
        let (lo, c1) = lo.overflowing_add(carry);
        out[2 * i] = lo;
        let (hi2, c2) = out[2 * i + 1].overflowing_add(hi.wrapping_add(c1 as Limb));
        out[2 * i + 1] = hi2;
        carry = c2 as Limb;
        let mut k = 2 * i + 2;
        let mut add = carry;
        while add != 0 && k < out.len() {
            let (s, c) = out[k].overflowing_add(add);
            out[k] = s;
            add = c as Limb;
            k += 1;
        }
        carry = 0;
    }

    Nat::from_limbs(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpn::Nat;
    use crate::limb::Limb;

    fn to_big(n: &Nat) -> num_bigint::BigUint {
        num_bigint::BigUint::from_bytes_le(
            &n.limbs()
                .iter()
                .flat_map(|l| l.to_le_bytes())
                .collect::<Vec<u8>>(),
        )
    }

    fn from_u64(v: u64) -> Nat {
        Nat::from_limb(v as Limb)
    }

    #[test]
    fn mul_1_matches_schoolbook_mul() {
        let a = Nat::from_limbs(vec![Limb::MAX, 5]);
        let c = 7 as Limb;
        let direct = mul_1(&a, c);
        let via_mul = mul(&a, &from_u64(c as u64));
        assert_eq!(direct, via_mul);
    }

    #[test]
    fn mul_against_bigint_oracle() {
        let cases: [(&[Limb], &[Limb]); 3] = [
            (&[Limb::MAX], &[Limb::MAX]),
            (&[1, 2, 3], &[4, 5]),
            (&[0xFFFF_FFFF], &[0xFFFF_FFFF]),
        ];
        for (a, b) in cases {
            let an = Nat::from_limbs(a.to_vec());
            let bn = Nat::from_limbs(b.to_vec());
            let got = mul(&an, &bn);
            let expect = to_big(&an) * to_big(&bn);
            assert_eq!(to_big(&got), expect);
        }
    }

    #[test]
    fn sqr_matches_mul_self() {
        let cases: [&[Limb]; 3] = [&[Limb::MAX], &[1, 2, 3], &[Limb::MAX, Limb::MAX, 1]];
        for a in cases {
            let an = Nat::from_limbs(a.to_vec());
            assert_eq!(sqr(&an), mul(&an, &an));
        }
    }
}
