//! RSA key lifecycle and the three ciphers built on top of the Montgomery
//! subsystem: public-exponent, private-exponent, and CRT-accelerated
//! private-exponent.
//!
//! A [`Key`] moves through three states — `Fresh` (sized but empty),
//! `Imported` (populated from external material) or `Generated` (populated
//! by [`Key::generate`]) — and only the latter two may serve a cipher. This
//! mirrors the original C library's `rsa_key_t` lifecycle (`rsa_new` →
//! `rsa_import`/`rsa_generate_key` → cipher calls → `rsa_free`) expressed as
//! Rust ownership and `Drop` instead of an explicit free function.
//!
//! This implementation keeps exactly two prime factors — see
//! `DESIGN.md`'s Open Question 2 — so there is no factor-count field and no
//! multi-prime CRT path.

use crate::error::Error;
use crate::mpn::{self, Nat};
use crate::montgomery::{self, generate_prime, Context};
use crate::rng::SecureRandom;

/// Lifecycle state of a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Sized by [`Key::new`] but not yet populated. No cipher may run.
    Fresh,
    /// Populated (at least partially) by [`Key::import`].
    Imported,
    /// Populated by [`Key::generate`].
    Generated,
}

/// An RSA key: public modulus and exponent, and (when available) the
/// private exponent and CRT parameters.
///
/// All private limb buffers are zeroized on drop; the three Montgomery
/// contexts this key owns zeroize their own modulus and precomputed
/// constants independently (see [`crate::montgomery::Context`]'s `Drop`).
pub struct Key {
    n_bits: usize,
    e_bits: usize,
    p_bits: usize,
    q_bits: usize,
    state: KeyState,
    e: Nat,
    d: Option<Nat>,
    dp: Option<Nat>,
    dq: Option<Nat>,
    qinv: Option<Nat>,
    mont_n: Option<Context>,
    mont_p: Option<Context>,
    mont_q: Option<Context>,
}

impl Key {
    /// Allocates a key sized for an `n_bits`-bit modulus and an exponent of
    /// at most `e_bits` bits, with the two-prime split `p_bits =
    /// floor(n_bits/2)`, `q_bits = n_bits - p_bits`. The key starts in
    /// state [`KeyState::Fresh`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either bit count is zero.
    pub fn new(e_bits: usize, n_bits: usize) -> Result<Self, Error> {
        if e_bits == 0 || n_bits == 0 {
            return Err(Error::InvalidArgument);
        }
        let p_bits = n_bits / 2;
        let q_bits = n_bits - p_bits;
        Ok(Key {
            n_bits,
            e_bits,
            p_bits,
            q_bits,
            state: KeyState::Fresh,
            e: Nat::zero(),
            d: None,
            dp: None,
            dq: None,
            qinv: None,
            mont_n: None,
            mont_p: None,
            mont_q: None,
        })
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// The modulus, once a public component has been imported or
    /// generated.
    pub fn modulus(&self) -> Option<&Nat> {
        self.mont_n.as_ref().map(Context::modulus)
    }

    /// Partial import: any subset of `n`/`e`/`d`/`dp`/`dq`/`qinv` consistent
    /// with this key's declared bit bounds is accepted. Importing `d`
    /// without the full CRT triple in the *same call* discards any
    /// previously-held CRT material — [`Key::prv_cipher_crt`] becomes
    /// unavailable until a CRT triple is imported or the key is
    /// regenerated. This mirrors a real limitation of the original C
    /// `rsa_import`: there is no way to hand it fresh `p`/`q` to rebuild
    /// the CRT Montgomery contexts from an imported CRT triple alone — see
    /// `DESIGN.md`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any provided value exceeds its
    /// corresponding bit bound.
    pub fn import(
        &mut self,
        n: Option<&Nat>,
        e: Option<&Nat>,
        d: Option<&Nat>,
        dp: Option<&Nat>,
        dq: Option<&Nat>,
        qinv: Option<&Nat>,
    ) -> Result<(), Error> {
        if let Some(n) = n {
            if n.is_zero() || n.bit_length() > self.n_bits {
                return Err(Error::InvalidArgument);
            }
            self.mont_n = Some(Context::new(n, montgomery::context_bits(n))?);
        }

        if let Some(e) = e {
            if e.bit_length() > self.e_bits {
                return Err(Error::InvalidArgument);
            }
            self.e = e.clone();
        }

        if let Some(d) = d {
            if d.bit_length() > self.n_bits {
                return Err(Error::InvalidArgument);
            }
            self.d = Some(d.clone());
            if dp.is_none() || dq.is_none() || qinv.is_none() {
                self.dp = None;
                self.dq = None;
                self.qinv = None;
                self.mont_p = None;
                self.mont_q = None;
            }
        }

        if let (Some(dp), Some(dq), Some(qinv)) = (dp, dq, qinv) {
            if dp.bit_length() > self.p_bits || dq.bit_length() > self.q_bits || qinv.bit_length() > self.p_bits {
                return Err(Error::InvalidArgument);
            }
            self.dp = Some(dp.clone());
            self.dq = Some(dq.clone());
            self.qinv = Some(qinv.clone());
        }

        if self.state == KeyState::Fresh {
            self.state = KeyState::Imported;
        }
        Ok(())
    }

    /// Generates a fresh two-prime key for public exponent `e`, following
    /// the original library's sequence: generate `p`, `q`; compute `φ =
    /// (p-1)(q-1)`; invert `e` mod `φ` (retrying with new primes on a
    /// non-invertible `e`, rather than failing outright — the event is rare
    /// but not excluded by construction); derive `dp`, `dq`; derive `qinv =
    /// q⁻¹ mod p`; form `n = p·q`, retrying if the product falls one bit
    /// short of `n_bits` (the standard top-bit-alignment corner case of
    /// multiplying two `n_bits/2`-bit numbers).
    ///
    /// Unlike the C original, `p` and `q` are never decremented in place
    /// and restored afterward — `p - 1` and `q - 1` are computed into their
    /// own values, so there is nothing to undo and no window where a
    /// partially-decremented prime is live.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `e` is zero or wider than this
    /// key's `e_bits`. Propagates [`Error::RngFailure`] from `rng`.
    pub fn generate<R: SecureRandom>(&mut self, e: &Nat, rng: &mut R) -> Result<(), Error> {
        if e.is_zero() || e.bit_length() > self.e_bits {
            return Err(Error::InvalidArgument);
        }

        loop {
            let p = generate_prime(self.p_bits, rng)?;
            let q = generate_prime(self.q_bits, rng)?;

            let p_minus_1 = mpn::sub_1(&p, 1);
            let q_minus_1 = mpn::sub_1(&q, 1);
            let phi = mpn::mul(&p_minus_1, &q_minus_1);

            let d = match mpn::mod_invert(e, &phi) {
                Ok(d) => d,
                Err(Error::NotInvertible) => continue,
                Err(other) => return Err(other),
            };

            let n = mpn::mul(&p, &q);
            if n.bit_length() != self.n_bits {
                continue;
            }

            let dp = mpn::rem(&d, &p_minus_1);
            let dq = mpn::rem(&d, &q_minus_1);
            let qinv = mpn::mod_invert(&q, &p)?;

            let mont_p = Context::new(&p, montgomery::context_bits(&p))?;
            let mont_q = Context::new(&q, montgomery::context_bits(&q))?;
            let mont_n = Context::new(&n, montgomery::context_bits(&n))?;

            self.e = e.clone();
            self.d = Some(d);
            self.dp = Some(dp);
            self.dq = Some(dq);
            self.qinv = Some(qinv);
            self.mont_p = Some(mont_p);
            self.mont_q = Some(mont_q);
            self.mont_n = Some(mont_n);
            self.state = KeyState::Generated;
            return Ok(());
        }
    }

    /// `x^e mod n`. Variable-time in `e` (it's public).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if this key has no public modulus
    /// yet (state [`KeyState::Fresh`]).
    pub fn pub_cipher(&self, x: &Nat) -> Result<Nat, Error> {
        let ctx = self.mont_n.as_ref().ok_or(Error::InvalidState)?;
        let reduced = mpn::rem(x, ctx.modulus());
        Ok(ctx.exp(&reduced, &self.e))
    }

    /// `x^d mod n`, constant-time in `d`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if this key has no private exponent.
    pub fn prv_cipher(&self, x: &Nat) -> Result<Nat, Error> {
        let ctx = self.mont_n.as_ref().ok_or(Error::InvalidState)?;
        let d = self.d.as_ref().ok_or(Error::InvalidState)?;
        let reduced = mpn::rem(x, ctx.modulus());
        Ok(ctx.exp_consttime(&reduced, d, self.n_bits))
    }

    /// CRT-accelerated private operation, bit-identical to
    /// [`Key::prv_cipher`] but roughly 4x faster: exponentiate modulo `p`
    /// and `q` separately (each about half the width of `n`, so each
    /// exponentiation is about 8x cheaper, for a combined ~4x), then
    /// recombine via Garner's formula.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if this key has no CRT triple (e.g.
    /// a partial import of `d` without `dp`/`dq`/`qinv`).
    pub fn prv_cipher_crt(&self, x: &Nat) -> Result<Nat, Error> {
        let mont_p = self.mont_p.as_ref().ok_or(Error::InvalidState)?;
        let mont_q = self.mont_q.as_ref().ok_or(Error::InvalidState)?;
        let dp = self.dp.as_ref().ok_or(Error::InvalidState)?;
        let dq = self.dq.as_ref().ok_or(Error::InvalidState)?;
        let qinv = self.qinv.as_ref().ok_or(Error::InvalidState)?;

        let p = mont_p.modulus();
        let q = mont_q.modulus();

        let x_mod_p = mpn::rem(x, p);
        let x_mod_q = mpn::rem(x, q);

        let xp = mont_p.exp_consttime(&x_mod_p, dp, self.p_bits);
        let xq = mont_q.exp_consttime(&x_mod_q, dq, self.q_bits);

        let xq_mod_p = if self.p_bits == self.q_bits {
            montgomery::reduce_once_ct(&xq, p)
        } else {
            mpn::rem(&xq, p)
        };

        let t = mont_p.sub_mod(&xp, &xq_mod_p);
        let h = mont_p.decode(&mont_p.mont_mul(&mont_p.encode(&t), &mont_p.encode(qinv)));
        Ok(mpn::add(&xq, &mpn::mul(q, &h)))
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        if let Some(d) = self.d.as_mut() {
            d.zeroize();
        }
        if let Some(dp) = self.dp.as_mut() {
            dp.zeroize();
        }
        if let Some(dq) = self.dq.as_mut() {
            dq.zeroize();
        }
        if let Some(qinv) = self.qinv.as_mut() {
            qinv.zeroize();
        }
    }
}
