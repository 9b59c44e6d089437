//! Signed integer wrapper over [`crate::mpn::Nat`].
//!
//! `Int` adds a sign to a `Nat` magnitude. It owns no limb storage beyond
//! what its `Nat` owns and never reimplements digit-vector arithmetic: it
//! only tracks which side of zero a value sits on and forwards everything
//! else to `mpn`.

use crate::mpn::{self, Nat};
use std::cmp::Ordering;

/// A signed multi-precision integer. Zero is canonically non-negative.
#[derive(Clone, Debug, Eq)]
pub struct Int {
    neg: bool,
    magnitude: Nat,
}

impl Int {
    /// The value zero.
    pub fn zero() -> Self {
        Int { neg: false, magnitude: Nat::zero() }
    }

    /// Wraps a non-negative `Nat` as a non-negative `Int`.
    pub fn from_nat(magnitude: Nat) -> Self {
        Int { neg: false, magnitude }
    }

    /// Builds an `Int` from an explicit sign and magnitude. Zero is
    /// normalized to non-negative regardless of the requested sign.
    pub fn from_parts(neg: bool, magnitude: Nat) -> Self {
        let neg = neg && !magnitude.is_zero();
        Int { neg, magnitude }
    }

    pub fn is_negative(&self) -> bool {
        self.neg
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn magnitude(&self) -> &Nat {
        &self.magnitude
    }

    /// Consumes `self`, discarding the sign.
    pub fn into_magnitude(self) -> Nat {
        self.magnitude
    }

    pub fn negate(&self) -> Self {
        Int::from_parts(!self.neg, self.magnitude.clone())
    }

    /// `self + other`.
    pub fn add(&self, other: &Int) -> Int {
        if self.neg == other.neg {
            return Int::from_parts(self.neg, mpn::add(&self.magnitude, &other.magnitude));
        }
        match mpn::cmp(&self.magnitude, &other.magnitude) {
            0 => Int::zero(),
            1 => Int::from_parts(self.neg, mpn::sub(&self.magnitude, &other.magnitude)),
            _ => Int::from_parts(other.neg, mpn::sub(&other.magnitude, &self.magnitude)),
        }
    }

    /// `self - other`.
    pub fn sub(&self, other: &Int) -> Int {
        self.add(&other.negate())
    }

    /// Three-way comparison, sign-aware.
    pub fn cmp(&self, other: &Int) -> Ordering {
        match (self.neg, other.neg) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => mpn::cmp(&self.magnitude, &other.magnitude).cmp(&0),
            (true, true) => mpn::cmp(&other.magnitude, &self.magnitude).cmp(&0),
        }
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
