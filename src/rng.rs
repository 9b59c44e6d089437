//! Randomness source used by key generation and blinding.
//!
//! Every operation in this crate that needs randomness takes a
//! `&mut impl SecureRandom` rather than reaching for an internal generator
//! or the operating system directly — callers choose and own their entropy
//! source, and tests can substitute a deterministic one. This is the
//! idiomatic-Rust shape of an injected `fn(state, out, len) -> int`
//! callback: a trait with a blanket impl over the `rand_core` traits every
//! ecosystem RNG already implements, rather than a bespoke function
//! pointer type.

use crate::error::Error;
use rand_core::{CryptoRng, RngCore};

/// A source of cryptographically secure randomness.
///
/// Implemented for anything that is already `RngCore + CryptoRng`, so any
/// ecosystem RNG (`rand_chacha::ChaCha20Rng`, `OsRng`, a test-only seeded
/// stream) works here without an adapter.
pub trait SecureRandom {
    /// Fills `dest` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RngFailure`] if the underlying source cannot
    /// produce randomness (e.g. an exhausted hardware entropy pool).
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), Error>;
}

impl<T: RngCore + CryptoRng> SecureRandom for T {
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.try_fill_bytes(dest).map_err(|_| Error::RngFailure)
    }
}
