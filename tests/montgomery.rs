use nebula_mpi::montgomery::{self, Context};
use nebula_mpi::mpn::{self, Nat};

use num_bigint::BigUint;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn from_u64(v: u64) -> Nat {
    mpn::io::from_be_bytes(&v.to_be_bytes())
}

fn to_big(n: &Nat) -> BigUint {
    BigUint::from_bytes_be(&mpn::io::to_be_bytes_minimal(n))
}

/// Base spec scenario: m=17, single-limb Montgomery setup, R mod m = 1
/// (since R = 2^64 and 2^64 mod 17 == 1 for this particular modulus).
#[test]
fn setup_matches_known_scenario() {
    let m = from_u64(17);
    let ctx = Context::new(&m, nebula_mpi::limb::LIMB_BITS as usize).unwrap();
    assert_eq!(ctx.one(), &Nat::one());
}

/// Base spec scenario: 3^65537 mod 65519 = 6168.
#[test]
fn exp_matches_known_scenario() {
    let m = from_u64(65519);
    let ctx = Context::new(&m, nebula_mpi::limb::LIMB_BITS as usize).unwrap();
    let result = ctx.exp(&from_u64(3), &from_u64(65537));
    assert_eq!(result, from_u64(6168));
}

#[test]
fn exp_against_bigint_oracle() {
    let m = from_u64(1_000_003);
    let ctx = Context::new(&m, nebula_mpi::limb::LIMB_BITS as usize).unwrap();
    for (base, exp) in [(2u64, 1000u64), (7, 999_999), (999_002, 65537)] {
        let got = ctx.exp(&from_u64(base), &from_u64(exp));
        let expected = BigUint::from(base).modpow(&BigUint::from(exp), &BigUint::from(1_000_003u64));
        assert_eq!(to_big(&got), expected);
    }
}

#[test]
fn exp_and_exp_consttime_agree() {
    let m = from_u64(0xFFFF_FFFF_FFFF_FFC5u64);
    let ctx = Context::new(&m, nebula_mpi::limb::LIMB_BITS as usize).unwrap();
    let g = from_u64(123_456_789);
    let e = from_u64(987_654_321);
    let variable = ctx.exp(&g, &e);
    let fixed = ctx.exp_consttime(&g, &e, nebula_mpi::limb::LIMB_BITS as usize);
    assert_eq!(variable, fixed);
}

#[test]
fn rejects_even_or_degenerate_modulus() {
    assert!(Context::new(&Nat::zero(), 64).is_err());
    assert!(Context::new(&from_u64(16), 64).is_err());
}

#[test]
fn miller_rabin_agrees_with_known_primes_and_carmichael_numbers() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xC0FF_EE);
    for &p in &[2u64, 3, 5, 97, 7919, 104_729] {
        assert!(montgomery::is_prime(&from_u64(p), &mut rng).unwrap());
    }
    for &c in &[4u64, 100, 561, 1105, 1729] {
        assert!(!montgomery::is_prime(&from_u64(c), &mut rng).unwrap());
    }
}

#[test]
fn generate_prime_hits_the_requested_bit_length() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xC0FF_EE);
    for bits in [24usize, 48] {
        let p = montgomery::generate_prime(bits, &mut rng).unwrap();
        assert_eq!(p.bit_length(), bits);
        assert!(montgomery::is_prime(&p, &mut rng).unwrap());
    }
}
