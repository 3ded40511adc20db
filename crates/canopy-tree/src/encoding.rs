//! Flat, array-based binary tree encoding as produced by tree learners.

use serde::{Deserialize, Serialize};

use crate::TreeError;

/// Feature value marking a position in the encoding as a leaf.
pub const LEAF_SENTINEL: i64 = -2;

/// A binary decision tree stored as four co-indexed, pre-order sequences.
///
/// Position `i + 1` after a split at `i` is the split's `≤` child; the
/// `>` child follows the whole `≤` subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTree {
    /// Feature index per node, or [`LEAF_SENTINEL`] for leaves.
    pub feature: Vec<i64>,
    /// Split threshold per node; ignored for leaves.
    pub threshold: Vec<f64>,
    /// Class counts per node, one row per output. Only the first row is used.
    pub value: Vec<Vec<Vec<f64>>>,
    /// Impurity per node.
    pub impurity: Vec<f64>,
}

impl FlatTree {
    /// Create an encoding from its four sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyEncoding`] | `feature` is empty |
    /// | [`TreeError::LengthMismatch`] | another sequence differs in length from `feature` |
    pub fn new(
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<Vec<Vec<f64>>>,
        impurity: Vec<f64>,
    ) -> Result<Self, TreeError> {
        let tree = Self {
            feature,
            threshold,
            value,
            impurity,
        };
        tree.validate_lengths()?;
        Ok(tree)
    }

    /// Check that the encoding is non-empty and all sequences are co-indexed.
    ///
    /// # Errors
    ///
    /// Same as [`FlatTree::new`].
    pub fn validate_lengths(&self) -> Result<(), TreeError> {
        let expected = self.feature.len();
        if expected == 0 {
            return Err(TreeError::EmptyEncoding);
        }
        let lengths = [
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
            ("impurity", self.impurity.len()),
        ];
        for (field, got) in lengths {
            if got != expected {
                return Err(TreeError::LengthMismatch {
                    field,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.feature.len()
    }

    /// Return the number of positions marked as leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.feature.iter().filter(|&&f| f == LEAF_SENTINEL).count()
    }

    /// Return `true` if position `i` is a leaf.
    #[must_use]
    pub fn is_leaf(&self, i: usize) -> bool {
        self.feature[i] == LEAF_SENTINEL
    }
}
