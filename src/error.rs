use thiserror::Error;

/// Errors produced by tree construction, proof generation, proof
/// verification, and envelope (de)serialization.
///
/// This is the single error family for the crate: every fallible
/// operation returns one of these variants rather than inventing a
/// per-module error type.
#[derive(Error, Debug)]
pub enum MerkleError {
    /// `build` or `consistency_proof` was called before any leaves
    /// were appended.
    #[error("tree has no leaves")]
    EmptyTree,

    /// A provided or computed digest was not `HASH_LEN` bytes long.
    #[error("expected a {expected}-byte digest, got {actual} bytes")]
    InvalidHashLength {
        /// The length the configured hash algorithm requires.
        expected: usize,
        /// The length that was actually supplied.
        actual: usize,
    },

    /// `digest_from_hex` was given malformed input: odd length,
    /// non-hex characters, or the wrong number of bytes once decoded.
    #[error("invalid hex digest: {0}")]
    InvalidHexFormat(String),

    /// A verification routine was handed an empty proof.
    #[error("proof has no elements")]
    EmptyProof,

    /// A consistency proof was requested for an `m` exceeding the
    /// depth of the built tree.
    #[error("tree does not have {requested} leaves to prove consistency against")]
    TreeTooSmall {
        /// The `m` that was requested.
        requested: usize,
    },

    /// Proof navigation reached an absent required node.
    #[error("proof structure requires a node that does not exist in the tree")]
    InvalidProofStructure,

    /// JSON envelope deserialization rejected the input: a required
    /// field was missing, a hex string was malformed, a `direction`
    /// was neither `"Left"`, `"Right"` nor `"OldRoot"`, or the JSON
    /// itself was ill-formed.
    #[error("malformed proof envelope: {0}")]
    MalformedProofEnvelope(#[from] serde_json::Error),
}
