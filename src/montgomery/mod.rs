//! Montgomery modular arithmetic: context setup, reduction, modular
//! multiplication/squaring/add/sub, and fixed-window / constant-time
//! exponentiation.
//!
//! This is the layer that makes RSA's repeated modular exponentiation
//! division-free: every reduction step replaces a division by the modulus
//! with a division by a power of two (`R`), which is free in binary
//! arithmetic. [`Context`] owns the per-modulus precomputed constants; it is
//! built once per modulus and reused across every operation against that
//! modulus.
//!
//! ## Constant time
//!
//! Everything in this module that may run on secret data (a private
//! exponent, a candidate prime during key generation) goes through masked
//! selection rather than a data-dependent branch: [`cond_sub_ct`] for the
//! end-of-reduction correction, [`Context::select_ct`] for table lookups in
//! [`Context::exp_consttime`]. The variable-time [`Context::exp`] entry
//! point exists only for public exponents (RSA's `e`), where leaking the
//! exponent's bit pattern through timing is not a concern.

mod primality;

pub use primality::{generate_prime, is_prime};

use crate::error::Error;
use crate::limb::Limb;
use crate::mpn::{self, Nat};

/// A modulus `m` together with the Montgomery constants derived from it:
/// `m′ = −m⁻¹ mod 2^W`, `R mod m`, and `R² mod m`.
///
/// `m` must be odd — Montgomery reduction relies on `R = 2^(nW)` being
/// invertible mod `m`, which requires `gcd(m, 2) = 1`.
///
/// A `Context` is single-owner and not `Clone`: two contexts over the same
/// modulus are built independently via [`Context::new`] rather than shared,
/// matching this crate's existing single-owner key types.
pub struct Context {
    /// The modulus, normalized to exactly `n` limbs.
    m: Nat,
    /// Limb width of the modulus: `n = ceil(bits / W)`.
    n: usize,
    /// `m′ = −m⁻¹ mod 2^W`, used by [`Context::reduce`]'s inner loop.
    m_prime: Limb,
    /// `R² mod m`, used to bring values into Montgomery form.
    mont_rr: Nat,
    /// `R mod m`, the Montgomery-form encoding of 1.
    one: Nat,
    /// `m − (R mod m)`, the Montgomery-form encoding of −1.
    minus_one: Nat,
}

impl Context {
    /// Builds a Montgomery context for modulus `m`, declared to be `bits`
    /// bits wide (`n = ceil(bits / W)` limbs).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `m` is zero or even, or if `m`
    /// does not normalize to exactly `n` limbs (i.e. `bits` does not match
    /// `m`'s actual bit length rounded up to a limb boundary).
    pub fn new(m: &Nat, bits: usize) -> Result<Self, Error> {
        if m.is_zero() || m.is_even() {
            return Err(Error::InvalidArgument);
        }
        let n = bits.div_ceil(crate::limb::LIMB_BITS as usize);
        if n == 0 || m.len() != n {
            return Err(Error::InvalidArgument);
        }

        let m_prime = compute_m_prime(m.limbs()[0]);

        // R mod m and R² mod m, computed by repeated doubling-mod-m rather
        // than a generic division: the modulus may be secret (a candidate
        // prime during RSA key generation), and `mpn::div`/`rem` are
        // variable-time. Doubling n*W times from 1 reaches exactly
        // `2^(nW) mod m` = R mod m; doubling n*W times again reaches
        // `2^(2nW) mod m` = R² mod m. Each doubling step is a single masked
        // conditional subtract, so the whole computation is constant-time
        // in the modulus's value (though not in `n`, which is public).
        let mut acc = Nat::one();
        for _ in 0..(n * crate::limb::LIMB_BITS as usize) {
            acc = double_mod_ct(&acc, m, n);
        }
        let one = acc.clone();
        for _ in 0..(n * crate::limb::LIMB_BITS as usize) {
            acc = double_mod_ct(&acc, m, n);
        }
        let mont_rr = acc;

        let minus_one = if one.is_zero() { Nat::zero() } else { mpn::sub(m, &one) };

        Ok(Context { m: m.clone(), n, m_prime, mont_rr, one, minus_one })
    }

    /// Limb width of the modulus (`n = ceil(bits / W)`).
    pub fn limb_width(&self) -> usize {
        self.n
    }

    /// The modulus this context was built for.
    pub fn modulus(&self) -> &Nat {
        &self.m
    }

    /// `R mod m`, the Montgomery-form encoding of the integer 1.
    pub fn one(&self) -> &Nat {
        &self.one
    }

    /// `m − (R mod m)`, the Montgomery-form encoding of the integer −1.
    pub fn minus_one(&self) -> &Nat {
        &self.minus_one
    }

    /// CIOS Montgomery reduction: given `t` of length `2n + 1` (the extra
    /// top limb absorbs the reduction loop's carry chain; callers must zero
    /// it before calling), returns `t · R⁻¹ mod m`.
    fn reduce(&self, t: &mut [Limb]) -> Nat {
        debug_assert_eq!(t.len(), 2 * self.n + 1, "montgomery::reduce: wrong scratch width");
        let m = self.m.limbs();
        for i in 0..self.n {
            let u = t[i].wrapping_mul(self.m_prime);
            let carry = mpn::mul_1_acc(&mut t[i..i + self.n], m, u);
            let overflow = mpn::incr_1(&mut t[i + self.n..], carry);
            debug_assert_eq!(overflow, 0, "montgomery::reduce: carry overflowed the reserved top limb");
        }

        let mut result = t[self.n..].to_vec();
        let mut m_ext = m.to_vec();
        m_ext.push(0);
        cond_sub_ct(&mut result, &m_ext);
        debug_assert_eq!(result[self.n], 0, "montgomery::reduce: result did not fit after correction");
        result.truncate(self.n);
        let mut out = Nat::from_limbs(result);
        out.normalize();
        out
    }

    /// Widens a product into reduction scratch: `2n` limbs of product plus
    /// one reserved carry limb.
    fn into_scratch(&self, product: Nat) -> Vec<Limb> {
        let mut limbs = product.limbs().to_vec();
        limbs.resize(2 * self.n + 1, 0);
        limbs
    }

    /// `a · b · R⁻¹ mod m`: the Montgomery product. If `a` and `b` are both
    /// in Montgomery form, the result is too (`mont_mul(encode(x),
    /// encode(y))` decodes to `x·y mod m`).
    pub fn mont_mul(&self, a: &Nat, b: &Nat) -> Nat {
        let mut scratch = self.into_scratch(mpn::mul(a, b));
        self.reduce(&mut scratch)
    }

    /// `a² · R⁻¹ mod m`.
    pub fn mont_sqr(&self, a: &Nat) -> Nat {
        let mut scratch = self.into_scratch(mpn::sqr(a));
        self.reduce(&mut scratch)
    }

    /// Brings `a` (a plain residue in `[0, m)`) into Montgomery form:
    /// `a · R mod m`.
    pub fn encode(&self, a: &Nat) -> Nat {
        self.mont_mul(a, &self.mont_rr)
    }

    /// Brings `a` (a Montgomery-form residue) back to plain form:
    /// `a · R⁻¹ mod m`.
    pub fn decode(&self, a: &Nat) -> Nat {
        let mut limbs = a.limbs().to_vec();
        limbs.resize(2 * self.n + 1, 0);
        self.reduce(&mut limbs)
    }

    /// `(a + b) mod m`, for `a, b` already reduced to `[0, m)` (in either
    /// plain or Montgomery form — addition commutes with the Montgomery
    /// encoding since it's linear). Constant-time in the operand values.
    pub fn add_mod(&self, a: &Nat, b: &Nat) -> Nat {
        let n = self.n;
        let a_ext = zero_extend(a, n);
        let b_ext = zero_extend(b, n);
        let mut sum = vec![0 as Limb; n + 1];
        let carry = mpn::add_n(&mut sum[..n], &a_ext, &b_ext);
        sum[n] = carry;
        let mut m_ext = self.m.limbs().to_vec();
        m_ext.push(0);
        cond_sub_ct(&mut sum, &m_ext);
        sum.truncate(n);
        Nat::from_limbs(sum)
    }

    /// `(a − b) mod m`, for `a, b` in `[0, m)`. Constant-time in the operand
    /// values: always computes both `a − b` and `a − b + m`, selecting by a
    /// mask on the borrow rather than branching.
    pub fn sub_mod(&self, a: &Nat, b: &Nat) -> Nat {
        let n = self.n;
        let a_ext = zero_extend(a, n);
        let b_ext = zero_extend(b, n);
        let mut diff = vec![0 as Limb; n];
        let borrow = mpn::sub_n(&mut diff, &a_ext, &b_ext);

        let mut restored = vec![0 as Limb; n];
        let _ = mpn::add_n(&mut restored, &diff, self.m.limbs());

        let mask = (borrow as Limb).wrapping_neg();
        for i in 0..n {
            diff[i] = (restored[i] & mask) | (diff[i] & !mask);
        }
        Nat::from_limbs(diff)
    }

    /// Builds the `2^w`-entry exponentiation table `T[0] = R mod m, T[1] =
    /// encode(g), T[i] = T[i-1] · T[1]` (all in Montgomery form).
    fn build_table(&self, g: &Nat, w: usize) -> Vec<Nat> {
        let size = 1usize << w;
        let mut table = Vec::with_capacity(size);
        table.push(self.one.clone());
        let base = self.encode(g);
        table.push(base.clone());
        for i in 2..size {
            let prev = table[i - 1].clone();
            table.push(self.mont_mul(&prev, &base));
        }
        table
    }

    /// Fixed-window modular exponentiation: `g^e mod m`. Variable-time in
    /// `e` (the window schedule and table-index selection both depend on
    /// `e`'s bits directly) — use this only when `e` is public, e.g. RSA's
    /// public exponent.
    pub fn exp(&self, g: &Nat, e: &Nat) -> Nat {
        if e.is_zero() {
            return Nat::one();
        }
        let e_bits = e.bit_length();
        let w = window_width(e_bits);
        let table = self.build_table(g, w);
        let total_windows = e_bits.div_ceil(w);

        let mut acc = table[window_at(e, total_windows - 1, w)].clone();
        for wi in (0..total_windows - 1).rev() {
            for _ in 0..w {
                acc = self.mont_sqr(&acc);
            }
            let window_val = window_at(e, wi, w);
            if window_val != 0 {
                acc = self.mont_mul(&acc, &table[window_val]);
            }
        }
        self.decode(&acc)
    }

    /// Constant-time modular exponentiation: `g^e mod m`, where the caller
    /// declares `e`'s bit width up front (`e_bits`) rather than letting it
    /// be inferred from `e`'s own normalized length — the window schedule
    /// is driven entirely by `e_bits`, so it does not leak how many of `e`'s
    /// leading bits happen to be zero. Every table lookup scans the whole
    /// table via [`Context::select_ct`], and every iteration performs
    /// exactly the same squarings-then-multiply sequence regardless of the
    /// window value. Mandatory for private exponents.
    pub fn exp_consttime(&self, g: &Nat, e: &Nat, e_bits: usize) -> Nat {
        let w = window_width(e_bits.max(1));
        let table = self.build_table(g, w);
        let total_windows = e_bits.max(1).div_ceil(w);

        let mut acc = table[0].clone();
        for wi in (0..total_windows).rev() {
            for _ in 0..w {
                acc = self.mont_sqr(&acc);
            }
            let window_val = window_at(e, wi, w);
            let selected = select_ct(&table, window_val, self.n);
            acc = self.mont_mul(&acc, &selected);
        }
        self.decode(&acc)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.m.zeroize();
        self.mont_rr.zeroize();
        self.one.zeroize();
        self.minus_one.zeroize();
    }
}

/// The `bits` argument [`Context::new`] needs to accept exactly `n`, for a
/// normalized value already known to occupy `n` limbs. Centralized here so
/// every call site (primality testing, RSA key setup) derives it the same
/// way instead of recomputing `bit_length().div_ceil(W) * W` inline.
pub(crate) fn context_bits(n: &Nat) -> usize {
    n.len() * crate::limb::LIMB_BITS as usize
}

/// Reduces `a` modulo `m` with a single conditional subtraction, for
/// callers that already know `a < 2m` (e.g. RSA CRT recombination moving a
/// mod-`q` residue into `p`'s residue system when `p` and `q` have equal
/// bit length). Constant-time in both operands' values.
///
/// # Panics
///
/// Debug-asserts that `a` fits in `m.len()` limbs; violating this means the
/// `a < 2m` precondition didn't hold and the result would be wrong.
pub(crate) fn reduce_once_ct(a: &Nat, m: &Nat) -> Nat {
    let n = m.len();
    let mut ext = zero_extend(a, n);
    cond_sub_ct(&mut ext, m.limbs());
    Nat::from_limbs(ext)
}

/// Computes `m′ = −(m mod 2^W)⁻¹ mod 2^W` by Newton–Hensel lifting: start
/// from the (trivially correct, since `m` is odd) 1-bit inverse `x = 1` and
/// double the number of correct bits each round via `x ← x·(2 − m·x)`. A
/// fixed 7 rounds covers any limb width up to 128 bits; rounds past
/// convergence are no-ops since the iteration is already at its fixed
/// point, so this never depends on `m`'s value, only on `LIMB_BITS`.
fn compute_m_prime(m0: Limb) -> Limb {
    debug_assert!(m0 & 1 == 1, "compute_m_prime: modulus must be odd");
    let mut x: Limb = 1;
    for _ in 0..7 {
        let two_minus_mx = (2 as Limb).wrapping_sub(m0.wrapping_mul(x));
        x = x.wrapping_mul(two_minus_mx);
    }
    x.wrapping_neg()
}

/// Doubles `a` modulo `m` (both normalized to `n` limbs of headroom),
/// without a generic division: shift left by one bit, then subtract `m`
/// once if the result overflowed or is still `>= m` (at most one
/// correction is ever needed, since `a < m` implies `2a < 2m`).
fn double_mod_ct(a: &Nat, m: &Nat, n: usize) -> Nat {
    let mut doubled = zero_extend(a, n);
    let mut carry: Limb = 0;
    for limb in doubled.iter_mut() {
        let next_carry = *limb >> (crate::limb::LIMB_BITS - 1);
        *limb = (*limb << 1) | carry;
        carry = next_carry;
    }
    doubled.push(carry);

    let mut m_ext = m.limbs().to_vec();
    m_ext.push(0);
    cond_sub_ct(&mut doubled, &m_ext);
    doubled.truncate(n);
    Nat::from_limbs(doubled)
}

/// Subtracts `m` from `r` in place if `r >= m`, without branching on the
/// comparison outcome: both `r` and `r − m` are always computed, and the
/// result is chosen by a mask built from the subtraction's borrow bit. `r`
/// and `m` must have equal length.
fn cond_sub_ct(r: &mut [Limb], m: &[Limb]) {
    debug_assert_eq!(r.len(), m.len());
    let mut diff = vec![0 as Limb; r.len()];
    let borrow = mpn::sub_n(&mut diff, r, m);
    // borrow == 0 means r >= m (no underflow), so the subtraction applies.
    let mask = (borrow as Limb).wrapping_sub(1);
    for i in 0..r.len() {
        r[i] = (diff[i] & mask) | (r[i] & !mask);
    }
}

/// Zero-extends `a`'s limbs to exactly `n` limbs (`a` must already fit).
fn zero_extend(a: &Nat, n: usize) -> Vec<Limb> {
    let mut v = a.limbs().to_vec();
    debug_assert!(v.len() <= n, "zero_extend: value does not fit in n limbs");
    v.resize(n, 0);
    v
}

/// Reads window `wi` (0 = least significant) of width `w` bits out of `e`.
fn window_at(e: &Nat, wi: usize, w: usize) -> usize {
    let mut v = 0usize;
    for b in 0..w {
        let bit_pos = wi * w + (w - 1 - b);
        v = (v << 1) | (e.bit(bit_pos) as usize);
    }
    v
}

/// Selects `table[index]` without branching on `index`: every entry is
/// scanned, masked by whether its position matches, and OR-accumulated.
fn select_ct(table: &[Nat], index: usize, n: usize) -> Nat {
    let mut out = vec![0 as Limb; n];
    for (i, entry) in table.iter().enumerate() {
        let is_match = (i == index) as Limb;
        let mask = is_match.wrapping_neg();
        let limbs = zero_extend(entry, n);
        for j in 0..n {
            out[j] |= limbs[j] & mask;
        }
    }
    Nat::from_limbs(out)
}

/// Window width for a `w`-ary exponentiation table, from the table in the
/// base spec's §4.3 (breakpoints at 7/23/79/239/671 exponent bits, widths
/// 1/3/4/5/6/7 — width 2 is skipped, matching the original library's
/// table).
fn window_width(e_bits: usize) -> usize {
    if e_bits < 7 {
        1
    } else if e_bits < 23 {
        3
    } else if e_bits < 79 {
        4
    } else if e_bits < 239 {
        5
    } else if e_bits < 671 {
        6
    } else {
        7
    }
}
