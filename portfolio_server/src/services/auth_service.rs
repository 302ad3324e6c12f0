//! Admin password check.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare a submitted password with the configured one.
///
/// Both sides are hashed first so the comparison is constant-time and does
/// not depend on either length.
pub fn password_matches(expected: &str, submitted: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let submitted = Sha256::digest(submitted.as_bytes());
    expected.as_slice().ct_eq(submitted.as_slice()).into()
}
