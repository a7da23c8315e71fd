//! Keyed message authentication built on SHA-256.
//!
//! Used for payment-gateway signature checks and CSRF token MACs. The
//! construction is standard HMAC (RFC 2104) over the `sha2` primitives the
//! rest of the crate already depends on.

use sha2::{Digest, Sha256};

const BLOCK_SIZE: usize = 64;

/// Compute `HMAC-SHA256(key, message)`.
///
/// # Examples
/// ```
/// use backend::domain::mac::hmac_sha256;
///
/// let tag = hmac_sha256(b"secret", b"order_1|pay_1");
/// assert_eq!(tag.len(), 32);
/// ```
#[must_use]
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut normalised_key = [0_u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        let digest = Sha256::digest(key);
        normalised_key[..digest.len()].copy_from_slice(&digest);
    } else {
        normalised_key[..key.len()].copy_from_slice(key);
    }

    let mut inner_pad = [0x36_u8; BLOCK_SIZE];
    let mut outer_pad = [0x5c_u8; BLOCK_SIZE];
    for index in 0..BLOCK_SIZE {
        inner_pad[index] ^= normalised_key[index];
        outer_pad[index] ^= normalised_key[index];
    }

    let mut inner = Sha256::new();
    inner.update(inner_pad);
    inner.update(message);
    let inner_digest = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(outer_pad);
    outer.update(inner_digest);
    outer.finalize().into()
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Length differences still return early; the contents comparison is
/// constant-time for equal-length inputs, which is the case that matters for
/// MAC verification.
#[must_use]
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut diff = 0_u8;
    for (a, b) in left.iter().zip(right.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // RFC 4231 test case 2: short key, short message.
    #[test]
    fn matches_rfc4231_vector() {
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn long_keys_are_hashed_first() {
        let long_key = vec![0xaa_u8; 131];
        let tag = hmac_sha256(&long_key, b"Test Using Larger Than Block-Size Key - Hash Key First");
        // RFC 4231 test case 6.
        assert_eq!(
            hex::encode(tag),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[rstest]
    #[case(b"same".as_slice(), b"same".as_slice(), true)]
    #[case(b"same".as_slice(), b"diff".as_slice(), false)]
    #[case(b"short".as_slice(), b"longer".as_slice(), false)]
    fn constant_time_eq_compares_content(
        #[case] left: &[u8],
        #[case] right: &[u8],
        #[case] expected: bool,
    ) {
        assert_eq!(constant_time_eq(left, right), expected);
    }
}
