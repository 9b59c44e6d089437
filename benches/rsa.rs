use nebula_mpi::mpn::Nat;
use nebula_mpi::rsa::Key;

use criterion::{criterion_group, criterion_main, Criterion};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::hint::black_box;

fn generated_key(n_bits: usize) -> Key {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    let mut key = Key::new(17, n_bits).unwrap();
    key.generate(&Nat::from_limb(65537), &mut rng).unwrap();
    key
}

pub fn bench_keygen_1024(c: &mut Criterion) {
    c.bench_function("rsa keygen 1024-bit", |bench| {
        bench.iter(|| generated_key(black_box(1024)))
    });
}

pub fn bench_pub_cipher(c: &mut Criterion) {
    let key = generated_key(2048);
    let x = Nat::from_limb(0xDEAD_BEEF);

    c.bench_function("rsa pub_cipher 2048-bit", |bench| {
        bench.iter(|| key.pub_cipher(black_box(&x)).unwrap())
    });
}

pub fn bench_prv_cipher(c: &mut Criterion) {
    let key = generated_key(2048);
    let x = Nat::from_limb(0xDEAD_BEEF);

    c.bench_function("rsa prv_cipher 2048-bit", |bench| {
        bench.iter(|| key.prv_cipher(black_box(&x)).unwrap())
    });
}

pub fn bench_prv_cipher_crt(c: &mut Criterion) {
    let key = generated_key(2048);
    let x = Nat::from_limb(0xDEAD_BEEF);

    c.bench_function("rsa prv_cipher_crt 2048-bit", |bench| {
        bench.iter(|| key.prv_cipher_crt(black_box(&x)).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_keygen_1024, bench_pub_cipher, bench_prv_cipher, bench_prv_cipher_crt
}
criterion_main!(benches);
