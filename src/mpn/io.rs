//! Conversions between `Nat` and the external octet/hex encodings used for
//! key material and ciphertexts — big-endian throughout, matching the
//! convention every wire format in this crate's ecosystem uses.

use super::Nat;
use crate::error::Error;
use crate::limb::{Limb, LIMB_BITS};

const LIMB_BYTES: usize = (LIMB_BITS / 8) as usize;

/// Parses a big-endian byte string into a `Nat`. An empty slice is zero.
pub fn from_be_bytes(bytes: &[u8]) -> Nat {
    if bytes.is_empty() {
        return Nat::zero();
    }
    let n_limbs = bytes.len().div_ceil(LIMB_BYTES);
    let mut limbs = vec![0 as Limb; n_limbs];
    let mut end = bytes.len();
    for limb in limbs.iter_mut() {
        let start = end.saturating_sub(LIMB_BYTES);
        let chunk = &bytes[start..end];
        let mut buf = [0u8; LIMB_BYTES];
        buf[LIMB_BYTES - chunk.len()..].copy_from_slice(chunk);
        *limb = Limb::from_be_bytes(buf);
        end = start;
    }
    Nat::from_limbs(limbs)
}

/// Renders `n` as a minimal-length big-endian byte string. Zero encodes as
/// an empty slice.
pub fn to_be_bytes_minimal(n: &Nat) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }
    let limbs = n.limbs();
    let mut out = Vec::with_capacity(limbs.len() * LIMB_BYTES);
    for &limb in limbs.iter().rev() {
        out.extend_from_slice(&limb.to_be_bytes());
    }
    let first_nonzero = out.iter().position(|&b| b != 0).expect("non-zero Nat produced all-zero bytes");
    out.split_off(first_nonzero)
}

/// Renders `n` as a big-endian byte string zero-padded to exactly `width`
/// bytes.
///
/// # Panics
///
/// Panics if `n` does not fit in `width` bytes.
pub fn to_be_bytes(n: &Nat, width: usize) -> Vec<u8> {
    let minimal = to_be_bytes_minimal(n);
    assert!(minimal.len() <= width, "mpn::io::to_be_bytes: value does not fit in {width} bytes");
    let mut out = vec![0u8; width - minimal.len()];
    out.extend_from_slice(&minimal);
    out
}

/// Parses a hex string (with or without a leading `0x`) into a `Nat`. An
/// odd-length string is treated as if left-padded with a `0` nibble.
pub fn from_hex(s: &str) -> Result<Nat, Error> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Nat::zero());
    }
    let bytes = if s.len() % 2 == 1 {
        hex::decode(format!("0{s}")).map_err(|_| Error::InvalidArgument)?
    } else {
        hex::decode(s).map_err(|_| Error::InvalidArgument)?
    };
    Ok(from_be_bytes(&bytes))
}

/// Renders `n` as a minimal-length lowercase hex string (`"0"` for zero, no
/// `0x` prefix).
pub fn to_hex(n: &Nat) -> String {
    let bytes = to_be_bytes_minimal(n);
    if bytes.is_empty() {
        return "0".to_string();
    }
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpn::Nat;

    #[test]
    fn round_trips_through_bytes() {
        let n = Nat::from_limbs(vec![0x1122_3344_5566_7788u64 as Limb, 0x99 as Limb]);
        let bytes = to_be_bytes_minimal(&n);
        assert_eq!(from_be_bytes(&bytes), n);
    }

    #[test]
    fn zero_round_trips_as_empty() {
        assert!(to_be_bytes_minimal(&Nat::zero()).is_empty());
        assert_eq!(from_be_bytes(&[]), Nat::zero());
    }

    #[test]
    fn padded_width_zero_extends() {
        let n = Nat::from_limb(0xAB);
        let bytes = to_be_bytes(&n, 4);
        assert_eq!(bytes, vec![0, 0, 0, 0xAB]);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn padded_width_too_small_panics() {
        let n = Nat::from_limb(0x1_0000);
        let _ = to_be_bytes(&n, 1);
    }

    #[test]
    fn hex_round_trips() {
        let n = Nat::from_limb(0xDEAD_BEEF);
        let hex = to_hex(&n);
        assert_eq!(hex, "deadbeef");
        assert_eq!(from_hex(&hex).unwrap(), n);
        assert_eq!(from_hex("0xdeadbeef").unwrap(), n);
    }

    #[test]
    fn hex_zero_is_literal_zero() {
        assert_eq!(to_hex(&Nat::zero()), "0");
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert_eq!(from_hex("not-hex"), Err(Error::InvalidArgument));
    }
}
