//! Miller–Rabin primality testing and random prime generation.
//!
//! A small trial-division pre-screen against the first ~300 primes rejects
//! the overwhelming majority of composite candidates cheaply; anything that
//! survives goes through a Miller–Rabin run whose round count comes from
//! the table in the base spec's §6.5 (more rounds for smaller candidates,
//! since a false witness is easier to find by chance against a small
//! modulus). Witness exponentiation always goes through
//! [`super::Context::exp_consttime`]: candidates are RSA prime factors in
//! progress, secret for as long as key generation is running.

use super::Context;
use crate::error::Error;
use crate::limb::Limb;
use crate::mpn::{self, Nat};
use crate::rng::SecureRandom;
use std::sync::OnceLock;

/// Round count for error probability `< 2⁻⁸⁰`, from the base spec's §6.5
/// table. Smaller candidates need more rounds; thresholds are checked from
/// the top down, so the first one `bits` meets wins.
fn round_count(bits: usize) -> usize {
    const TABLE: &[(usize, usize)] = &[
        (1300, 2),
        (850, 3),
        (650, 4),
        (550, 5),
        (450, 6),
        (400, 7),
        (350, 8),
        (300, 9),
        (250, 12),
        (200, 15),
        (150, 18),
        (100, 27),
    ];
    for &(threshold, rounds) in TABLE {
        if bits >= threshold {
            return rounds;
        }
    }
    40
}

fn small_primes() -> &'static [u64] {
    static PRIMES: OnceLock<Vec<u64>> = OnceLock::new();
    PRIMES.get_or_init(|| sieve_below(2000))
}

fn sieve_below(bound: u64) -> Vec<u64> {
    let mut is_composite = vec![false; bound as usize];
    let mut primes = Vec::new();
    for i in 2..bound {
        if !is_composite[i as usize] {
            primes.push(i);
            let mut j = i * i;
            while j < bound {
                is_composite[j as usize] = true;
                j += i;
            }
        }
    }
    primes
}

/// Tests `n` for primality: trial division against the small-prime table,
/// then [`round_count(n.bit_length())`](round_count) rounds of
/// Miller–Rabin with random witnesses supplied by `rng`.
///
/// # Errors
///
/// Propagates [`Error::RngFailure`] from `rng`, or [`Error::InvalidArgument`]
/// if `n` is degenerate (zero/one — not meaningful moduli for the
/// Montgomery context this needs to build).
pub fn is_prime<R: SecureRandom>(n: &Nat, rng: &mut R) -> Result<bool, Error> {
    if mpn::cmp(n, &Nat::from_limb(2)) < 0 {
        return Ok(false);
    }
    if *n == Nat::from_limb(2) {
        return Ok(true);
    }
    if n.is_even() {
        return Ok(false);
    }

    for &p in small_primes() {
        if *n == Nat::from_limb(p as Limb) {
            return Ok(true);
        }
        let (_, r) = mpn::div_1(n, p as Limb);
        if r == 0 {
            return Ok(false);
        }
    }

    let n_minus_1 = mpn::sub_1(n, 1);
    let mut d = n_minus_1.clone();
    let mut s: u32 = 0;
    while d.is_even() {
        d = mpn::shr(&d, 1);
        s += 1;
    }

    let bits = n.bit_length();
    let rounds = round_count(bits);
    let ctx = Context::new(n, super::context_bits(n))?;

    for _ in 0..rounds {
        let a = random_witness(n, rng)?;
        if is_witness_to_compositeness(&ctx, &a, &d, s, &n_minus_1, bits) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// One Miller–Rabin round: `true` if `a` proves `n` composite.
fn is_witness_to_compositeness(ctx: &Context, a: &Nat, d: &Nat, s: u32, n_minus_1: &Nat, e_bits: usize) -> bool {
    let mut x = ctx.exp_consttime(a, d, e_bits);
    if x == Nat::one() || x == *n_minus_1 {
        return false;
    }
    let mut x_mont = ctx.encode(&x);
    for _ in 1..s {
        x_mont = ctx.mont_sqr(&x_mont);
        x = ctx.decode(&x_mont);
        if x == *n_minus_1 {
            return false;
        }
    }
    true
}

/// Samples a witness uniformly from `[2, n-2]` by rejection sampling
/// (regenerate whenever the drawn value falls outside the range) rather
/// than a modular reduction, so this never divides by a value derived from
/// the (still secret, during key generation) candidate `n`.
fn random_witness<R: SecureRandom>(n: &Nat, rng: &mut R) -> Result<Nat, Error> {
    let n_minus_2 = mpn::sub(n, &Nat::from_limb(2));
    let byte_len = n.bit_length().div_ceil(8).max(1);
    let mut buf = vec![0u8; byte_len];
    for _ in 0..1000 {
        rng.try_fill(&mut buf)?;
        let candidate = mpn::io::from_be_bytes(&buf);
        if mpn::cmp(&candidate, &Nat::from_limb(2)) >= 0 && mpn::cmp(&candidate, &n_minus_2) <= 0 {
            return Ok(candidate);
        }
    }
    Err(Error::RngFailure)
}

/// Generates a random prime of exactly `bits` bits (top bit set) by
/// repeated trial: draw a random odd candidate of the right bit length,
/// test it, retry on failure.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `bits == 0`, or propagates
/// [`Error::RngFailure`] from `rng`.
pub fn generate_prime<R: SecureRandom>(bits: usize, rng: &mut R) -> Result<Nat, Error> {
    if bits == 0 {
        return Err(Error::InvalidArgument);
    }
    loop {
        let candidate = random_odd_of_bitlen(bits, rng)?;
        if is_prime(&candidate, rng)? {
            return Ok(candidate);
        }
    }
}

fn random_odd_of_bitlen<R: SecureRandom>(bits: usize, rng: &mut R) -> Result<Nat, Error> {
    let byte_len = bits.div_ceil(8);
    let mut buf = vec![0u8; byte_len];
    rng.try_fill(&mut buf)?;
    let extra_bits = byte_len * 8 - bits;
    let top_mask = 0xFFu8 >> extra_bits;
    buf[0] &= top_mask;
    buf[0] |= 1u8 << (7 - extra_bits);
    *buf.last_mut().expect("byte_len >= 1 since bits >= 1") |= 1;
    Ok(mpn::io::from_be_bytes(&buf))
}
