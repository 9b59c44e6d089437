//! Multi-precision integer arithmetic and RSA for the Nebula ecosystem
//!
//! This crate provides a layered bignum stack — limb primitives, a
//! variable-length digit-vector type, a Montgomery modular-arithmetic
//! subsystem, and an RSA facade built on top of it — intended for
//! protocol-level use where the specific modular-exponentiation and
//! key-generation semantics need to be auditable end to end rather than
//! delegated to an opaque external library.
//!
//! The focus is on **clarity, predictability, and auditability**, rather
//! than on providing a large or high-level cryptographic API. Secret-facing
//! operations are written to run in constant time (masked selection, no
//! data-dependent branches or indices); operations that only ever see
//! public data are allowed to be variable-time and are documented as such.
//!
//! # Module overview
//!
//! - `limb`
//!   The machine-word layer: `Limb`/`DoubleLimb` types and the carry/borrow,
//!   wide-multiply, and Barrett-style single-limb division primitives that
//!   every layer above builds on.
//!
//! - `sint`
//!   A signed wrapper around [`mpn::Nat`] for the handful of call sites
//!   (GCD bookkeeping) that need a sign alongside the magnitude.
//!
//! - `mpn`
//!   The digit-vector ("natural number") core: `Nat`, plus addition,
//!   subtraction, shifting, comparison, multiplication, division,
//!   constant-time extended GCD / modular inverse, and octet/hex I/O.
//!
//! - `montgomery`
//!   CIOS Montgomery multiplication and modular exponentiation (both
//!   variable-time and constant-time variants), and the Miller-Rabin
//!   primality testing and random prime generation built on top of it.
//!
//! - `rsa`
//!   Key generation, import, and the public/private/CRT-private ciphers.
//!
//! - `rng`
//!   The `SecureRandom` trait bridging this crate's fallible randomness
//!   needs to any `rand_core` CSPRNG.
//!
//! - `error`
//!   The crate-wide `Error` type.
//!
//! # Design goals
//!
//! - Explicit, auditable control flow for every modular-arithmetic step
//! - Constant-time behavior on secret data, documented where it is relaxed
//! - Minimal and explicit APIs
//!
//! This crate is not intended to replace full-featured, externally audited
//! cryptographic libraries, but to serve as a small, controlled foundation
//! for Nebula's internal RSA needs.

pub mod error;
pub mod limb;
pub mod montgomery;
pub mod mpn;
pub mod rng;
pub mod rsa;
pub mod sint;
