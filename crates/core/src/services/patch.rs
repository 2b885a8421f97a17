//! Line-level text patch generation.
//!
//! Produces a forward/reverse pair of unified patches between two versions
//! of an article's raw document. The reverse patch allows rolling a stored
//! body back to the previous revision without keeping full copies.

use diffy::create_patch;

/// Forward and reverse unified patches between two text blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPair {
    /// Patch converting `before` into `after`.
    pub forward: String,
    /// Patch converting `after` back into `before`.
    pub reverse: String,
}

/// Compute a forward/reverse patch pair between two text blobs.
///
/// Pure and deterministic: identical inputs always serialize to identical
/// patch text. Applying `forward` to `before` reproduces `after`, and
/// applying `reverse` to `after` reproduces `before`.
#[must_use]
pub fn make_patch_pair(before: &str, after: &str) -> PatchPair {
    PatchPair {
        forward: create_patch(before, after).to_string(),
        reverse: create_patch(after, before).to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use diffy::{Patch, apply};

    const BEFORE: &str = "# Title\n\nfirst paragraph\nsecond paragraph\n";
    const AFTER: &str = "# Title\n\nfirst paragraph, revised\nsecond paragraph\nthird paragraph\n";

    #[test]
    fn test_forward_round_trip() {
        let pair = make_patch_pair(BEFORE, AFTER);
        let patch = Patch::from_str(&pair.forward).unwrap();
        assert_eq!(apply(BEFORE, &patch).unwrap(), AFTER);
    }

    #[test]
    fn test_reverse_round_trip() {
        let pair = make_patch_pair(BEFORE, AFTER);
        let patch = Patch::from_str(&pair.reverse).unwrap();
        assert_eq!(apply(AFTER, &patch).unwrap(), BEFORE);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let first = make_patch_pair(BEFORE, AFTER);
        let second = make_patch_pair(BEFORE, AFTER);
        assert_eq!(first, second);
    }

    #[test]
    fn test_changed_bodies_produce_nontrivial_patches() {
        let pair = make_patch_pair(BEFORE, AFTER);
        assert!(pair.forward.contains("revised"));
        assert!(pair.reverse.contains("revised"));
    }
}
