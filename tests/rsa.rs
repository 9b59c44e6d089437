use nebula_mpi::error::Error;
use nebula_mpi::mpn::Nat;
use nebula_mpi::rsa::{Key, KeyState};

use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(0xBEEF_CAFE)
}

#[test]
fn state_machine_starts_fresh_and_advances_to_generated() {
    let mut key = Key::new(17, 256).unwrap();
    assert_eq!(key.state(), KeyState::Fresh);
    key.generate(&Nat::from_limb(65537), &mut rng()).unwrap();
    assert_eq!(key.state(), KeyState::Generated);
}

#[test]
fn pub_then_prv_round_trips() {
    let mut key = Key::new(17, 512).unwrap();
    key.generate(&Nat::from_limb(65537), &mut rng()).unwrap();

    for msg in [1u64, 2, 42, 0xFFFF_FFFF] {
        let x = Nat::from_limb(msg);
        let c = key.pub_cipher(&x).unwrap();
        assert_eq!(key.prv_cipher(&c).unwrap(), x);
    }
}

/// Base spec property: the CRT-accelerated private cipher must be
/// bit-identical to the plain private cipher for every input.
#[test]
fn crt_cipher_matches_plain_private_cipher() {
    let mut key = Key::new(17, 512).unwrap();
    key.generate(&Nat::from_limb(65537), &mut rng()).unwrap();

    for msg in [1u64, 2, 3, 999_983, 0xDEAD_BEEF] {
        let x = Nat::from_limb(msg);
        let c = key.pub_cipher(&x).unwrap();
        let plain = key.prv_cipher(&c).unwrap();
        let crt = key.prv_cipher_crt(&c).unwrap();
        assert_eq!(plain, crt);
        assert_eq!(plain, x);
    }
}

#[test]
fn fresh_key_refuses_every_operation() {
    let key = Key::new(17, 256).unwrap();
    assert_eq!(key.pub_cipher(&Nat::from_limb(1)).unwrap_err(), Error::InvalidState);
    assert_eq!(key.prv_cipher(&Nat::from_limb(1)).unwrap_err(), Error::InvalidState);
    assert_eq!(key.prv_cipher_crt(&Nat::from_limb(1)).unwrap_err(), Error::InvalidState);
}

#[test]
fn generate_rejects_oversized_exponent() {
    let mut key = Key::new(8, 256).unwrap();
    // 65537 needs 17 bits, wider than the 8-bit budget this key was sized for.
    let err = key.generate(&Nat::from_limb(65537), &mut rng()).unwrap_err();
    assert_eq!(err, Error::InvalidArgument);
}

#[test]
fn import_public_modulus_enables_pub_cipher_only() {
    let mut source = Key::new(17, 256).unwrap();
    source.generate(&Nat::from_limb(65537), &mut rng()).unwrap();
    let n = source.modulus().unwrap().clone();

    let mut imported = Key::new(17, 256).unwrap();
    imported.import(Some(&n), Some(&Nat::from_limb(65537)), None, None, None, None).unwrap();
    assert_eq!(imported.state(), KeyState::Imported);

    let x = Nat::from_limb(7);
    let c = imported.pub_cipher(&x).unwrap();
    assert_eq!(source.prv_cipher(&c).unwrap(), x);
    assert_eq!(imported.prv_cipher(&x).unwrap_err(), Error::InvalidState);
}
