//! A tamper-evident Merkle tree over an ordered sequence of byte
//! strings, with audit (inclusion) proofs and consistency (append-only
//! extension) proofs, plus a JSON envelope for shipping either kind of
//! proof across a wire boundary.
//!
//! ```
//! use merkle_transparency::{hash::digest_of, tree::Tree, proof::verify_audit, hash::Sha256Algorithm};
//!
//! let mut tree: Tree = Tree::new();
//! tree.append_leaves(["a", "b", "c"].iter().map(digest_of));
//! let root = tree.build().unwrap();
//!
//! let leaf = digest_of("b");
//! let proof = tree.audit_proof(leaf).unwrap();
//! assert!(verify_audit::<Sha256Algorithm>(root, leaf, &proof).unwrap());
//! ```

pub mod envelope;
pub mod error;
pub mod hash;
pub mod node;
pub mod proof;
pub mod tree;

pub use error::MerkleError;
pub use hash::{digest_of, Digest, HashAlgorithm, Sha256Algorithm, HASH_LEN};
pub use proof::{verify_audit, verify_consistency, AuditProof, ConsistencyProof, ProofElement, Tag};
pub use tree::Tree;
