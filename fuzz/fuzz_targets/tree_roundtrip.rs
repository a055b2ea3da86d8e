#![no_main]

//! Fuzz harness for the tree/proof produce-then-verify round-trip.
//!
//! # What is fuzzed
//!
//! | Target              | What we are looking for                         |
//! |---------------------|--------------------------------------------------|
//! | `Tree::build`       | No panics for any leaf-count sequence            |
//! | `Tree::audit_proof` | A proof for a leaf that is in the tree always    |
//! |                     | verifies against the tree's root                |
//! | `Tree::consistency_proof` | A proof between any two valid sizes        |
//! |                     | drawn from the same growing tree always verifies |
//!
//! # What is NOT fuzzed here
//!
//! Verification of externally supplied, potentially malformed proofs is
//! exercised by dedicated tests in `src/proof.rs` (`tamper_detection_audit`).
//! This harness targets internal invariants of the generation path.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use merkle_transparency::hash::digest_of;
use merkle_transparency::{verify_audit, verify_consistency, Sha256Algorithm, Tree};

#[derive(Arbitrary, Debug)]
struct Input {
    leaves: Vec<Vec<u8>>,
    check_index: u8,
    old_size: u16,
}

fuzz_target!(|input: Input| {
    if input.leaves.is_empty() || input.leaves.len() > 512 {
        return;
    }

    let mut tree: Tree = Tree::new();
    let digests: Vec<_> = input.leaves.iter().map(digest_of).collect();
    tree.append_leaves(digests.iter().copied());
    let Ok(root) = tree.build() else { return };

    let index = input.check_index as usize % digests.len();
    let leaf = digests[index];
    let proof = tree.audit_proof(leaf).expect("audit_proof should not error on a known leaf");
    if !proof.is_empty() {
        assert!(verify_audit::<Sha256Algorithm>(root, leaf, &proof).unwrap());
    }

    let old_size = (input.old_size as usize % digests.len()) + 1;
    let mut old_tree: Tree = Tree::new();
    old_tree.append_leaves(digests[..old_size].iter().copied());
    let Ok(old_root) = old_tree.build() else { return };

    if let Ok(consistency) = tree.consistency_proof(old_size) {
        assert!(verify_consistency::<Sha256Algorithm>(old_root, &consistency).unwrap());
    }
});
