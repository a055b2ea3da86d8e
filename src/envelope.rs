//! JSON proof envelope (§4.6, C6).
//!
//! Shaped after `protocol::proto_envelope::ProtoEnvelopeBody` for its
//! plain-`serde`, `#[serde(rename_all = "camelCase")]`,
//! dedicated-parse-error-variant style — but without that type's
//! protobuf/signature fields, since this format has neither. The
//! `chrono` timestamp follows `protocol-wasm` and `rest_listener`,
//! the teacher crates that already pull in `chrono` for RFC 3339
//! rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::MerkleError,
    hash::{Digest, HashAlgorithm},
    proof::{AuditProof, ConsistencyProof, ProofElement, Tag},
    tree::Tree,
};

/// One step of a proof path as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofPathEntry {
    pub hash: Digest,
    pub direction: Tag,
}

impl From<&ProofElement> for ProofPathEntry {
    fn from(element: &ProofElement) -> Self {
        ProofPathEntry {
            hash: element.digest,
            direction: element.tag,
        }
    }
}

impl From<&ProofPathEntry> for ProofElement {
    fn from(entry: &ProofPathEntry) -> Self {
        ProofElement {
            digest: entry.hash,
            tag: entry.direction,
        }
    }
}

/// `treeMetadata` for an audit envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTreeMetadata {
    pub root_hash: Digest,
    pub leaf_count: usize,
    pub tree_depth: usize,
    pub hash_algorithm: String,
}

/// The `proof` object of an audit envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditProofBody {
    pub leaf_hash: Digest,
    pub proof_path: Vec<ProofPathEntry>,
}

/// The wire envelope for an audit (inclusion) proof (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditProofEnvelope {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub tree_metadata: AuditTreeMetadata,
    pub proof: AuditProofBody,
}

/// `treeMetadata` for a consistency envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyTreeMetadata {
    pub old_root_hash: Digest,
    pub new_root_hash: Digest,
    pub old_leaf_count: usize,
    pub new_leaf_count: usize,
    pub hash_algorithm: String,
}

/// The `proof` object of a consistency envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyProofBody {
    pub proof_path: Vec<ProofPathEntry>,
}

/// The wire envelope for a consistency proof (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyProofEnvelope {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub tree_metadata: ConsistencyTreeMetadata,
    pub proof: ConsistencyProofBody,
}

const ENVELOPE_VERSION: &str = "1.0";
const AUDIT_KIND: &str = "merkle_audit_proof";
const CONSISTENCY_KIND: &str = "merkle_consistency_proof";

impl AuditProofEnvelope {
    /// Build an envelope from a built tree, a leaf, and its proof.
    /// `timestamp` is supplied by the caller rather than stamped
    /// internally, since this crate does not otherwise depend on
    /// wall-clock time.
    pub fn new<A: HashAlgorithm>(
        tree: &Tree<A>,
        leaf: Digest,
        proof: &AuditProof,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, MerkleError> {
        Ok(AuditProofEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            kind: AUDIT_KIND.to_string(),
            timestamp,
            tree_metadata: AuditTreeMetadata {
                root_hash: tree.root().ok_or(MerkleError::EmptyTree)?,
                leaf_count: tree.leaf_count(),
                tree_depth: tree.depth(),
                hash_algorithm: tree.hash_algorithm_name().to_string(),
            },
            proof: AuditProofBody {
                leaf_hash: leaf,
                proof_path: proof.elements().iter().map(ProofPathEntry::from).collect(),
            },
        })
    }

    /// Recover the [`AuditProof`] carried by this envelope, discarding
    /// the metadata around it.
    pub fn proof(&self) -> AuditProof {
        AuditProof(self.proof.proof_path.iter().map(ProofElement::from).collect())
    }

    pub fn to_json(&self) -> Result<String, MerkleError> {
        serde_json::to_string_pretty(self).map_err(MerkleError::MalformedProofEnvelope)
    }

    pub fn from_json(s: &str) -> Result<Self, MerkleError> {
        serde_json::from_str(s).map_err(MerkleError::MalformedProofEnvelope)
    }
}

impl ConsistencyProofEnvelope {
    pub fn new<A: HashAlgorithm>(
        old_leaf_count: usize,
        old_root_hash: Digest,
        new_tree: &Tree<A>,
        proof: &ConsistencyProof,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, MerkleError> {
        Ok(ConsistencyProofEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            kind: CONSISTENCY_KIND.to_string(),
            timestamp,
            tree_metadata: ConsistencyTreeMetadata {
                old_root_hash,
                new_root_hash: new_tree.root().ok_or(MerkleError::EmptyTree)?,
                old_leaf_count,
                new_leaf_count: new_tree.leaf_count(),
                hash_algorithm: new_tree.hash_algorithm_name().to_string(),
            },
            proof: ConsistencyProofBody {
                proof_path: proof.elements().iter().map(ProofPathEntry::from).collect(),
            },
        })
    }

    pub fn proof(&self) -> ConsistencyProof {
        ConsistencyProof(self.proof.proof_path.iter().map(ProofElement::from).collect())
    }

    pub fn to_json(&self) -> Result<String, MerkleError> {
        serde_json::to_string_pretty(self).map_err(MerkleError::MalformedProofEnvelope)
    }

    pub fn from_json(s: &str) -> Result<Self, MerkleError> {
        serde_json::from_str(s).map_err(MerkleError::MalformedProofEnvelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest_of;
    use crate::hash::Sha256Algorithm;
    use crate::proof::verify_audit;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn audit_envelope_matches_the_nested_wire_shape() {
        let mut tree: Tree = Tree::new();
        tree.append_leaves(["1", "2", "3", "4"].iter().map(digest_of));
        tree.build().unwrap();

        let leaf = digest_of("3");
        let proof = tree.audit_proof(leaf).unwrap();
        let envelope = AuditProofEnvelope::new(&tree, leaf, &proof, ts()).unwrap();

        let json = envelope.to_json().unwrap();
        assert!(json.contains("\"version\": \"1.0\""));
        assert!(json.contains("\"type\": \"merkle_audit_proof\""));
        assert!(json.contains("\"treeMetadata\""));
        assert!(json.contains("\"treeDepth\""));
        assert!(json.contains("\"proof\""));
        assert!(json.contains("\"proofPath\""));
        assert!(!json.contains("\"treeSize\""));

        let parsed = AuditProofEnvelope::from_json(&json).unwrap();
        assert_eq!(parsed.tree_metadata.root_hash, envelope.tree_metadata.root_hash);
        assert_eq!(parsed.tree_metadata.tree_depth, tree.depth());
        assert!(verify_audit::<Sha256Algorithm>(
            parsed.tree_metadata.root_hash,
            leaf,
            &parsed.proof()
        )
        .unwrap());
    }

    #[test]
    fn consistency_envelope_matches_the_nested_wire_shape() {
        let mut old: Tree = Tree::new();
        old.append_leaves(["1", "2", "3"].iter().map(digest_of));
        let old_root = old.build().unwrap();

        let mut new: Tree = Tree::new();
        new.append_leaves(["1", "2", "3", "4", "5"].iter().map(digest_of));
        new.build().unwrap();

        let proof = new.consistency_proof(3).unwrap();
        let envelope = ConsistencyProofEnvelope::new(3, old_root, &new, &proof, ts()).unwrap();

        let json = envelope.to_json().unwrap();
        assert!(json.contains("\"type\": \"merkle_consistency_proof\""));
        assert!(json.contains("\"oldRootHash\""));
        assert!(json.contains("\"newRootHash\""));
        assert!(json.contains("\"oldLeafCount\""));
        assert!(json.contains("\"newLeafCount\""));

        let parsed = ConsistencyProofEnvelope::from_json(&json).unwrap();
        assert_eq!(parsed.tree_metadata.new_root_hash, new.root().unwrap());

        use crate::proof::verify_consistency;
        assert!(verify_consistency::<Sha256Algorithm>(old_root, &parsed.proof()).unwrap());
    }

    #[test]
    fn direction_is_case_sensitive() {
        let bad = format!(r#"{{"hash":"{}","direction":"left"}}"#, "00".repeat(32));
        let err = serde_json::from_str::<ProofPathEntry>(&bad).unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn malformed_hex_surfaces_as_malformed_envelope() {
        let bad = r#"{
            "version": "1.0",
            "type": "merkle_audit_proof",
            "timestamp": "2026-01-01T00:00:00Z",
            "treeMetadata": {
                "rootHash": "not-hex",
                "leafCount": 1,
                "treeDepth": 0,
                "hashAlgorithm": "sha256"
            },
            "proof": {
                "leafHash": "00",
                "proofPath": []
            }
        }"#;
        let err = AuditProofEnvelope::from_json(bad).unwrap_err();
        assert!(matches!(err, MerkleError::MalformedProofEnvelope(_)));
    }
}
