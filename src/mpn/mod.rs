//! Digit-vector ("natural number") arithmetic core.
//!
//! This is the L2/L3 layer of the crate: a variable-length, little-endian
//! vector of [`crate::limb::Limb`]s (`Nat`) with addition, subtraction,
//! shifting, comparison, multiplication, squaring, division, constant-time
//! GCD and modular inverse, and octet/hex I/O.
//!
//! Every higher layer — [`crate::sint`], [`crate::montgomery`],
//! [`crate::rsa`] — is built on top of `Nat`; none of them duplicate its
//! arithmetic, only compose it.
//!
//! ## Representation
//!
//! `Nat` wraps a `Vec<Limb>` in normalized form: the highest limb is
//! non-zero, or the vector is empty (representing zero). Every operation
//! that returns a `Nat` normalizes its result; operations that only need
//! to *read* a value accept unnormalized slices.
//!
//! ## Constant time
//!
//! Operations used on secret data (modular inverse, the divsteps GCD) are
//! written with masked selection instead of branches and run a fixed
//! number of rounds regardless of the operand values. Operations used only
//! on public data (decimal-ish division, non-secret comparison) are
//! allowed to be variable-time and are documented as such.

mod cmp;
mod div;
mod gcd;
pub mod io;
mod mul;
mod ops;
mod shift;

pub use cmp::cmp_ct;
pub use gcd::{divsteps_gcd, mod_invert};

use crate::limb::Limb;
use std::fmt;

/// An owned, normalized, non-negative multi-precision integer.
#[derive(Clone, Default, Eq)]
pub struct Nat {
    /// Little-endian limbs. Normalized: either empty, or the last limb is
    /// non-zero.
    limbs: Vec<Limb>,
}

impl Nat {
    /// The value zero.
    pub fn zero() -> Self {
        Nat { limbs: Vec::new() }
    }

    /// The value one.
    pub fn one() -> Self {
        Nat { limbs: vec![1] }
    }

    /// Builds a `Nat` from raw little-endian limbs, normalizing.
    pub fn from_limbs(mut limbs: Vec<Limb>) -> Self {
        normalize(&mut limbs);
        Nat { limbs }
    }

    /// Builds a `Nat` from a single limb.
    pub fn from_limb(v: Limb) -> Self {
        if v == 0 { Nat::zero() } else { Nat { limbs: vec![v] } }
    }

    /// Normalized limb slice, most-significant limb last.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    /// Current normalized length in limbs.
    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Number of significant bits (0 for the value zero).
    pub fn bit_length(&self) -> usize {
        match self.limbs.last() {
            None => 0,
            Some(&top) => {
                (self.limbs.len() - 1) * crate::limb::LIMB_BITS as usize
                    + (crate::limb::LIMB_BITS - top.leading_zeros()) as usize
            }
        }
    }

    /// Returns the value of bit `i` (0 = LSB), or 0 past the end.
    pub fn bit(&self, i: usize) -> u32 {
        let limb_idx = i / crate::limb::LIMB_BITS as usize;
        let bit_idx = i % crate::limb::LIMB_BITS as usize;
        match self.limbs.get(limb_idx) {
            None => 0,
            Some(&l) => ((l >> bit_idx) & 1) as u32,
        }
    }

    /// Ensures the backing storage holds at least `n` limbs, extending with
    /// (unnormalized, trailing) zero limbs. Used by callers that need a
    /// fixed-width scratch view, e.g. Montgomery contexts.
    pub fn resize_unnormalized(&mut self, n: usize) {
        self.limbs.resize(n, 0);
    }

    /// Drops trailing zero limbs so the representation is canonical again.
    /// Only needed after `resize_unnormalized` or direct limb mutation.
    pub fn normalize(&mut self) {
        normalize(&mut self.limbs);
    }

    /// Raw mutable limb access for callers (Montgomery reduction, masked
    /// select) that need to fill a fixed-width buffer in place rather than
    /// go through the normalizing constructors. Callers that may leave the
    /// value unnormalized must call [`Nat::normalize`] afterward.
    pub(crate) fn limbs_mut(&mut self) -> &mut [Limb] {
        &mut self.limbs
    }

    pub fn is_even(&self) -> bool {
        match self.limbs.first() {
            None => true,
            Some(&l) => l & 1 == 0,
        }
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }
}

impl PartialEq for Nat {
    fn eq(&self, other: &Self) -> bool {
        self.limbs == other.limbs
    }
}

impl fmt::Debug for Nat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nat({})", io::to_hex(self))
    }
}

/// Strips trailing (most-significant) zero limbs.
fn normalize(limbs: &mut Vec<Limb>) {
    while let Some(&0) = limbs.last() {
        limbs.pop();
    }
}

impl zeroize::Zeroize for Nat {
    fn zeroize(&mut self) {
        self.limbs.zeroize();
    }
}

pub use cmp::cmp;
pub use div::{div, div_1, rem};
pub use mul::{mul, mul_1, sqr};
pub use ops::{add, add_1, sub, sub_1};
pub use shift::{shl, shr};

// Raw slice-level primitives, visible crate-wide (but not part of the
// public API) for the Montgomery subsystem's CIOS reduction and masked
// conditional-subtract steps, which need to work on fixed-width limb
// windows rather than normalized `Nat`s.
pub(crate) use mul::mul_1_acc;
pub(crate) use ops::{add_n, incr_1, sub_n};
