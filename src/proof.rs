//! Audit proofs (§4.4, C4) and consistency proofs (§4.5, C5).
//!
//! Both proof kinds share a single element shape — a digest plus a
//! [`Tag`] saying how it composes with the running digest during
//! verification — the way `forrest::log::proof` shares node/sibling
//! machinery between its `InclusionProof` and `ConsistencyProof`.

use serde::{Deserialize, Serialize};

use crate::{
    error::MerkleError,
    hash::{Digest, HashAlgorithm},
    node::NodeId,
    tree::Tree,
};

/// How a [`ProofElement`]'s digest composes against the running
/// digest during verification.
///
/// `Left`/`Right` name the slot the *sibling* digest sits in: `Left`
/// composes as `compose(sibling, running)`, `Right` as
/// `compose(running, sibling)`. `OldRoot` is a consistency-proof-only
/// annotation; verification ignores it and relies solely on element
/// order (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Left,
    Right,
    OldRoot,
}

/// One step of a proof: a sibling digest and how it composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofElement {
    pub digest: Digest,
    pub tag: Tag,
}

/// An ordered sequence of sibling digests letting a verifier
/// recompute the root from a known leaf. An empty proof means "leaf
/// not found" when returned by [`Tree::audit_proof`]; verification
/// instead treats an empty proof as an error (§4.4).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditProof(pub(crate) Vec<ProofElement>);

impl AuditProof {
    pub fn elements(&self) -> &[ProofElement] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An ordered sequence of subtree digests witnessing that a tree with
/// `new_length` leaves is an append-only extension of a tree with
/// `old_length` leaves (§4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyProof(pub(crate) Vec<ProofElement>);

impl ConsistencyProof {
    pub fn elements(&self) -> &[ProofElement] {
        &self.0
    }
}

impl<A: HashAlgorithm> Tree<A> {
    /// Generate an audit proof for `leaf` (§4.4, "Generation").
    ///
    /// Locates the leftmost leaf equal to `leaf` by linear scan; if
    /// none matches, returns an empty proof rather than an error —
    /// "leaf not found" is not a failure, it's a negative result the
    /// caller distinguishes by checking [`AuditProof::is_empty`].
    pub fn audit_proof(&self, leaf: Digest) -> Result<AuditProof, MerkleError> {
        let root_id = self.root_id().ok_or(MerkleError::EmptyTree)?;

        let Some(leaf_index) = (0..self.leaf_count()).find(|&i| self.leaf_digest(i) == Some(leaf))
        else {
            return Ok(AuditProof::default());
        };

        let mut elements = Vec::new();
        let mut current = self.leaf_id(leaf_index).expect("leaf_index is in range");

        while current != root_id {
            let parent_id = self
                .node(current)
                .parent()
                .ok_or(MerkleError::InvalidProofStructure)?;
            let parent = self.node(parent_id);

            match (parent.left(), parent.right()) {
                (Some(left), Some(right)) if left == current => {
                    elements.push(ProofElement {
                        digest: self.node(right).digest(),
                        tag: Tag::Right,
                    });
                }
                (Some(left), Some(right)) if right == current => {
                    elements.push(ProofElement {
                        digest: self.node(left).digest(),
                        tag: Tag::Left,
                    });
                }
                (Some(left), None) if left == current => {
                    // Carry-up: no sibling, nothing emitted at this level.
                }
                _ => return Err(MerkleError::InvalidProofStructure),
            }

            current = parent_id;
        }

        Ok(AuditProof(elements))
    }

    /// Generate a consistency proof witnessing that this tree (built
    /// with `n` leaves) is an append-only extension of a prior tree
    /// with `m` leaves, `1 <= m <= n` (§4.5, "Generation").
    pub fn consistency_proof(&self, m: usize) -> Result<ConsistencyProof, MerkleError> {
        self.root_id().ok_or(MerkleError::EmptyTree)?;

        let n = self.leaf_count();
        if m == 0 || m > n {
            return Err(MerkleError::TreeTooSmall { requested: m });
        }

        let depth = m.ilog2() as usize;
        let mut current: NodeId = self.leaf_id(0).ok_or(MerkleError::EmptyTree)?;
        for _ in 0..depth {
            current = self
                .node(current)
                .parent()
                .ok_or(MerkleError::TreeTooSmall { requested: m })?;
        }

        let mut k = self.node(current).leaf_count();
        let mut elements = vec![ProofElement {
            digest: self.node(current).digest(),
            tag: Tag::OldRoot,
        }];

        if m == k {
            return Ok(ConsistencyProof(elements));
        }

        let parent_id = self
            .node(current)
            .parent()
            .ok_or(MerkleError::InvalidProofStructure)?;
        let mut sibling = self
            .node(parent_id)
            .right()
            .ok_or(MerkleError::InvalidProofStructure)?;

        loop {
            let sn = self.node(sibling).leaf_count();

            if m - k == sn {
                elements.push(ProofElement {
                    digest: self.node(sibling).digest(),
                    tag: Tag::OldRoot,
                });
                break;
            } else if m - k > sn {
                elements.push(ProofElement {
                    digest: self.node(sibling).digest(),
                    tag: Tag::OldRoot,
                });
                let sibling_parent = self
                    .node(sibling)
                    .parent()
                    .ok_or(MerkleError::InvalidProofStructure)?;
                sibling = self
                    .node(sibling_parent)
                    .right()
                    .ok_or(MerkleError::InvalidProofStructure)?;
                k += sn;
            } else {
                sibling = self
                    .node(sibling)
                    .left()
                    .ok_or(MerkleError::InvalidProofStructure)?;
            }
        }

        Ok(ConsistencyProof(elements))
    }
}

/// Verify an audit proof (§4.4, "Verification").
///
/// The proof must be non-empty: a single-leaf tree has no verifiable
/// audit proof, and the embedder is expected to compare the leaf to
/// the root directly in that case.
pub fn verify_audit<A: HashAlgorithm>(
    root: Digest,
    leaf: Digest,
    proof: &AuditProof,
) -> Result<bool, MerkleError> {
    if proof.is_empty() {
        return Err(MerkleError::EmptyProof);
    }

    let mut running = leaf;
    for element in &proof.0 {
        running = match element.tag {
            // The sibling sat in the left slot; reconstruct that order.
            Tag::Left => Tree::<A>::compose(&element.digest, &running),
            // The sibling sat in the right slot.
            Tag::Right => Tree::<A>::compose(&running, &element.digest),
            Tag::OldRoot => return Err(MerkleError::InvalidProofStructure),
        };
    }

    Ok(running == root)
}

/// Verify a consistency proof (§4.5, "Verification").
///
/// The `OldRoot` tag is a generation-time annotation only;
/// verification ignores it and relies on the right-to-left fold order
/// of the elements.
pub fn verify_consistency<A: HashAlgorithm>(
    old_root: Digest,
    proof: &ConsistencyProof,
) -> Result<bool, MerkleError> {
    let elements = &proof.0;

    match elements.len() {
        0 => Err(MerkleError::EmptyProof),
        1 => Ok(elements[0].digest == old_root),
        len => {
            let mut running = Tree::<A>::compose(&elements[len - 2].digest, &elements[len - 1].digest);
            for element in elements[..len - 2].iter().rev() {
                running = Tree::<A>::compose(&element.digest, &running);
            }
            Ok(running == old_root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{digest_of, Sha256Algorithm};

    fn tree_of(strings: &[&str]) -> Tree {
        let mut tree = Tree::new();
        tree.append_leaves(strings.iter().map(digest_of));
        tree.build().unwrap();
        tree
    }

    #[test]
    fn s1_single_leaf_has_empty_audit_proof() {
        let tree = tree_of(&["leaf1"]);
        let proof = tree.audit_proof(digest_of("leaf1")).unwrap();
        assert!(proof.is_empty());
    }

    #[test]
    fn s2_two_leaves() {
        let tree = tree_of(&["1", "2"]);
        let proof = tree.audit_proof(digest_of("1")).unwrap();
        assert_eq!(
            proof.elements(),
            &[ProofElement {
                digest: digest_of("2"),
                tag: Tag::Right
            }]
        );
        assert!(verify_audit::<Sha256Algorithm>(tree.root().unwrap(), digest_of("1"), &proof).unwrap());
    }

    #[test]
    fn s3_odd_width_three() {
        let tree = tree_of(&["1", "2", "3"]);
        let p12 = crate::hash::compose(&digest_of("1"), &digest_of("2"));

        let proof = tree.audit_proof(digest_of("3")).unwrap();
        assert_eq!(
            proof.elements(),
            &[ProofElement {
                digest: p12,
                tag: Tag::Left
            }]
        );
        assert!(verify_audit::<Sha256Algorithm>(tree.root().unwrap(), digest_of("3"), &proof).unwrap());
    }

    #[test]
    fn s4_eight_leaves_tag_sequence() {
        let strings: Vec<String> = (1..=8).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = strings.iter().map(String::as_str).collect();
        let tree = tree_of(&refs);

        let proof = tree.audit_proof(digest_of("5")).unwrap();
        let tags: Vec<Tag> = proof.elements().iter().map(|e| e.tag).collect();
        assert_eq!(tags, vec![Tag::Right, Tag::Right, Tag::Left]);
        assert!(verify_audit::<Sha256Algorithm>(tree.root().unwrap(), digest_of("5"), &proof).unwrap());
    }

    #[test]
    fn invariant_every_leaf_has_a_verifying_audit_proof() {
        for n in 2..30 {
            let strings: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = strings.iter().map(String::as_str).collect();
            let tree = tree_of(&refs);
            let root = tree.root().unwrap();

            for s in &refs {
                let leaf = digest_of(*s);
                let proof = tree.audit_proof(leaf).unwrap();
                assert!(
                    verify_audit::<Sha256Algorithm>(root, leaf, &proof).unwrap(),
                    "leaf {s} failed to verify in a tree of {n} leaves"
                );
            }
        }
    }

    #[test]
    fn tamper_detection_audit() {
        let tree = tree_of(&["1", "2", "3", "4"]);
        let root = tree.root().unwrap();
        let leaf = digest_of("1");
        let mut proof = tree.audit_proof(leaf).unwrap();
        assert!(verify_audit::<Sha256Algorithm>(root, leaf, &proof).unwrap());

        // Flip a byte of the first element's digest.
        let mut bytes = *proof.0[0].digest.as_bytes();
        bytes[0] ^= 0xFF;
        proof.0[0].digest = Digest::from_bytes(bytes);
        assert!(!verify_audit::<Sha256Algorithm>(root, leaf, &proof).unwrap());
    }

    #[test]
    fn s5_consistency_four_to_eight() {
        let mut t4: Tree = Tree::new();
        t4.append_leaves((1..=4).map(|i| digest_of(i.to_string())));
        let r4 = t4.build().unwrap();

        let mut t8: Tree = Tree::new();
        t8.append_leaves((1..=8).map(|i| digest_of(i.to_string())));
        t8.build().unwrap();

        let mut proof = t8.consistency_proof(4).unwrap();
        assert!(verify_consistency::<Sha256Algorithm>(r4, &proof).unwrap());

        let mut bytes = *proof.0[0].digest.as_bytes();
        bytes[0] ^= 0xFF;
        proof.0[0].digest = Digest::from_bytes(bytes);
        assert!(!verify_consistency::<Sha256Algorithm>(r4, &proof).unwrap());
    }

    #[test]
    fn s6_incremental_consistency() {
        let mut tree: Tree = Tree::new();
        let mut roots = Vec::new();

        for i in 1..30 {
            tree.append_leaf(digest_of(i.to_string()));
            roots.push(tree.build().unwrap());
        }

        for i in 1..30usize {
            let r_i = roots[i - 1];
            let mut t_i: Tree = Tree::new();
            t_i.append_leaves((1..=i).map(|j| digest_of(j.to_string())));
            t_i.build().unwrap();

            for m in 1..=i {
                let r_m = roots[m - 1];
                let proof = t_i.consistency_proof(m).unwrap();
                assert!(
                    verify_consistency::<Sha256Algorithm>(r_m, &proof).unwrap(),
                    "m={m} i={i} failed"
                );
            }
        }
    }

    #[test]
    fn consistency_rejects_m_greater_than_n() {
        let tree = tree_of(&["1", "2", "3"]);
        assert!(matches!(
            tree.consistency_proof(10),
            Err(MerkleError::TreeTooSmall { requested: 10 })
        ));
    }

    #[test]
    fn verify_audit_rejects_empty_proof() {
        let empty = AuditProof::default();
        assert!(matches!(
            verify_audit::<Sha256Algorithm>(digest_of("x"), digest_of("x"), &empty),
            Err(MerkleError::EmptyProof)
        ));
    }
}
