//! Crate-wide error type.
//!
//! Every fallible public operation in this crate returns `Result<T, Error>`.
//! There is deliberately no `std::error::Error` impl pulled in via an extra
//! dependency: the variants are few, self-explanatory, and callers in the
//! Nebula stack match on them directly rather than treating them as opaque
//! trait objects.

/// The failure modes exposed by this crate's public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument violated a documented precondition: wrong length, zero
    /// where non-zero is required, a key size outside the supported range,
    /// and so on.
    InvalidArgument,
    /// An operation was attempted on a [`crate::rsa::Key`] in a state that
    /// does not support it (e.g. encrypting with a key that has no public
    /// component yet).
    InvalidState,
    /// A modular inverse was requested for a value that shares a common
    /// factor with the modulus.
    NotInvertible,
    /// The caller-supplied randomness source returned an error.
    RngFailure,
}
