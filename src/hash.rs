//! The hash primitive (§4.1): a fixed-width digest, composition of two
//! digests into one, and hex interchange.

use std::fmt;

use digest::Digest as _;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use crate::error::MerkleError;

/// The digest length this crate is built around. Choosing SHA-256
/// fixes this at 32 bytes; see [`HashAlgorithm`] for the polymorphism
/// point if a different fixed-width algorithm is ever substituted.
pub const HASH_LEN: usize = 32;

/// An opaque fixed-width digest.
///
/// Equality is byte-wise. The only way to construct one with the
/// wrong length is [`Digest::from_hex`] on malformed input, which
/// fails with [`MerkleError::InvalidHexFormat`] rather than producing
/// a short or long value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; HASH_LEN]);

impl Digest {
    /// Wrap a raw byte array known to already be `HASH_LEN` bytes.
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Digest(bytes)
    }

    /// Wrap a byte slice, checking its length against `HASH_LEN`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MerkleError> {
        if bytes.len() != HASH_LEN {
            return Err(MerkleError::InvalidHashLength {
                expected: HASH_LEN,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; HASH_LEN];
        buf.copy_from_slice(bytes);
        Ok(Digest(buf))
    }

    /// The raw bytes of this digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Parse a `2 * HASH_LEN`-character hex string (either case) into
    /// a digest.
    ///
    /// Fails with [`MerkleError::InvalidHexFormat`] on odd length,
    /// non-hex characters, or a decoded length other than `HASH_LEN`.
    pub fn from_hex(s: &str) -> Result<Self, MerkleError> {
        let bytes =
            hex::decode(s).map_err(|e| MerkleError::InvalidHexFormat(e.to_string()))?;
        if bytes.len() != HASH_LEN {
            return Err(MerkleError::InvalidHexFormat(format!(
                "expected {} hex characters, got {}",
                HASH_LEN * 2,
                s.len()
            )));
        }
        let mut buf = [0u8; HASH_LEN];
        buf.copy_from_slice(&bytes);
        Ok(Digest(buf))
    }

    /// Render this digest as lowercase hex.
    ///
    /// New code should treat this as the canonical rendering; parsing
    /// ([`Digest::from_hex`]) accepts uppercase too so both round-trip.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Digests serialize as lowercase hex strings, which is what the
/// proof envelope (§4.6) expects for `rootHash`, `leafHash`, and the
/// `hash` field of each proof path entry. Deserialization reuses
/// [`Digest::from_hex`], so a malformed hex string surfaces as a
/// `serde_json` error the caller can map to
/// [`MerkleError::MalformedProofEnvelope`].
impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(D::Error::custom)
    }
}

/// The interface a hash function must satisfy to back a [`Tree`](crate::tree::Tree).
///
/// Sealed so that embedders cannot register an algorithm whose output
/// length silently disagrees with [`HASH_LEN`] (§9, "Hash-algorithm
/// polymorphism"). The length is checked once, in [`HashAlgorithm::new`]-style
/// construction, never on the per-composition hot path.
pub trait HashAlgorithm: private::Sealed + Send + Sync + 'static {
    /// A human-readable name, used in proof envelope metadata.
    const NAME: &'static str;

    /// Hash arbitrary-length input.
    fn digest_of(data: &[u8]) -> Digest;

    /// `H(L ‖ R)`: hash a single contiguous `2 * HASH_LEN`-byte buffer
    /// formed by concatenating `left` and `right`, with no separator
    /// and no length prefix. This is the one point of algorithmic
    /// truth every proof depends on.
    fn compose(left: &Digest, right: &Digest) -> Digest {
        let mut buf = [0u8; 2 * HASH_LEN];
        buf[..HASH_LEN].copy_from_slice(left.as_bytes());
        buf[HASH_LEN..].copy_from_slice(right.as_bytes());
        Self::digest_of(&buf)
    }
}

/// SHA-256, the only production [`HashAlgorithm`] this crate ships.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    const NAME: &'static str = "sha256";

    fn digest_of(data: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let out = hasher.finalize();
        // SHA-256 always yields 32 bytes; this is an internal
        // invariant, not something caller input can violate.
        Digest::from_bytes(out.into())
    }
}

mod private {
    use super::Sha256Algorithm;

    pub trait Sealed {}
    impl Sealed for Sha256Algorithm {}
}

/// Hash arbitrary-length input with SHA-256. Free function form of
/// `digest_of` for callers who just want the default algorithm.
pub fn digest_of(data: impl AsRef<[u8]>) -> Digest {
    Sha256Algorithm::digest_of(data.as_ref())
}

/// `H(L ‖ R)` under SHA-256.
pub fn compose(left: &Digest, right: &Digest) -> Digest {
    Sha256Algorithm::compose(left, right)
}
