use nebula_mpi::mpn::{self, Nat};

use num_bigint::BigUint;

fn to_big(n: &Nat) -> BigUint {
    BigUint::from_bytes_be(&mpn::io::to_be_bytes_minimal(n))
}

fn from_u64(v: u64) -> Nat {
    mpn::io::from_be_bytes(&v.to_be_bytes())
}

#[test]
fn add_sub_round_trip_against_bigint() {
    for (a, b) in [(0u64, 0u64), (1, 1), (5, 3), (u32::MAX as u64, 1), (123_456, 654_321)] {
        let na = from_u64(a);
        let nb = from_u64(b);
        let sum = mpn::add(&na, &nb);
        assert_eq!(to_big(&sum), BigUint::from(a) + BigUint::from(b));

        if a >= b {
            let diff = mpn::sub(&na, &nb);
            assert_eq!(to_big(&diff), BigUint::from(a) - BigUint::from(b));
        }
    }
}

#[test]
fn mul_matches_bigint_oracle() {
    for (a, b) in [(0u64, 5u64), (7, 6), (u32::MAX as u64, u32::MAX as u64), (1 << 40, 1 << 20)] {
        let product = mpn::mul(&from_u64(a), &from_u64(b));
        assert_eq!(to_big(&product), BigUint::from(a) * BigUint::from(b));
    }
}

#[test]
fn div_rem_matches_bigint_oracle() {
    for (a, b) in [(100u64, 7u64), (1 << 50, 3), (999_999_937, 999_999_929)] {
        let (q, r) = mpn::div(&from_u64(a), &from_u64(b));
        let expected_q = BigUint::from(a) / BigUint::from(b);
        let expected_r = BigUint::from(a) % BigUint::from(b);
        assert_eq!(to_big(&q), expected_q);
        assert_eq!(to_big(&r), expected_r);
    }
}

#[test]
fn mod_invert_matches_extended_euclid() {
    // 3 * 4 = 12 = 1 mod 11
    let inv = mpn::mod_invert(&from_u64(3), &from_u64(11)).unwrap();
    assert_eq!(inv, from_u64(4));

    // e=65537 inverse modulo a small even phi (phi must be allowed to be
    // even for RSA key generation to work at all).
    let phi = from_u64(3_120); // (61-1)*(53-1), textbook RSA toy example
    let e = from_u64(17);
    let d = mpn::mod_invert(&e, &phi).unwrap();
    let check = mpn::rem(&mpn::mul(&e, &d), &phi);
    assert_eq!(check, Nat::one());
}

#[test]
fn mod_invert_rejects_non_coprime() {
    assert!(mpn::mod_invert(&from_u64(6), &from_u64(9)).is_err());
}

#[test]
fn octet_round_trip() {
    for v in [0u64, 1, 255, 65536, u64::MAX] {
        let n = from_u64(v);
        let bytes = mpn::io::to_be_bytes_minimal(&n);
        let back = mpn::io::from_be_bytes(&bytes);
        assert_eq!(back, n);
    }
}
