//! Left/right shifts by an arbitrary bit count.

use super::Nat;
use crate::limb::{Limb, LIMB_BITS};

/// `a << bits`, fully normalized.
pub fn shl(a: &Nat, bits: usize) -> Nat {
    if a.is_zero() || bits == 0 {
        return a.clone();
    }
    let limb_shift = bits / LIMB_BITS as usize;
    let bit_shift = (bits % LIMB_BITS as usize) as u32;

    let mut out = vec![0 as Limb; a.len() + limb_shift + 1];
    if bit_shift == 0 {
        out[limb_shift..limb_shift + a.len()].copy_from_slice(a.limbs());
    } else {
        let mut carry: Limb = 0;
        for (i, &limb) in a.limbs().iter().enumerate() {
            out[limb_shift + i] = (limb << bit_shift) | carry;
            carry = limb >> (LIMB_BITS - bit_shift);
        }
        out[limb_shift + a.len()] = carry;
    }
    Nat::from_limbs(out)
}

/// `a >> bits`, fully normalized.
pub fn shr(a: &Nat, bits: usize) -> Nat {
    let limb_shift = bits / LIMB_BITS as usize;
    let bit_shift = (bits % LIMB_BITS as usize) as u32;

    if limb_shift >= a.len() {
        return Nat::zero();
    }

    let src = &a.limbs()[limb_shift..];
    let mut out = vec![0 as Limb; src.len()];
    if bit_shift == 0 {
        out.copy_from_slice(src);
    } else {
        for i in 0..src.len() {
            let lo = src[i] >> bit_shift;
            let hi = if i + 1 < src.len() { src[i + 1] << (LIMB_BITS - bit_shift) } else { 0 };
            out[i] = lo | hi;
        }
    }
    Nat::from_limbs(out)
}
