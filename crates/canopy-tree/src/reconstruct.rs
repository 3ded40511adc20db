//! Bottom-up reconstruction of a nested tree from a flat pre-order encoding.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::TreeError;
use crate::encoding::{FlatTree, LEAF_SENTINEL};
use crate::node::{LeafId, NodeStats, TreeNode};
use crate::palette::majority_class;

/// Raw class counts per leaf, ordered by leaf number.
pub type LeafValues = BTreeMap<LeafId, Vec<u64>>;

/// Output of [`reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The root of the nested tree.
    pub root: TreeNode,
    /// Class counts of every leaf, keyed by leaf id.
    pub leaf_values: LeafValues,
}

/// Rebuild the nested tree encoded by `tree`.
///
/// Walks the encoding from the last position to the first with an explicit
/// stack. Leaves are pushed; a split pops its `≤` subtree (the one rooted
/// at the next position) and then its `>` subtree. Leaves are numbered
/// `leaf<L>` down to `leaf1` in the order the walk meets them, so the first
/// leaf in pre-order is `leaf1`.
///
/// `colors` must hold one color per class.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyEncoding`] | the encoding has no nodes |
/// | [`TreeError::LengthMismatch`] | the sequences are not co-indexed |
/// | [`TreeError::FeatureOutOfRange`] | a split names a feature with no name |
/// | [`TreeError::EmptyValue`] | a node has no class-count row |
/// | [`TreeError::ClassCountMismatch`] | a class-count row length differs from `colors.len()` |
/// | [`TreeError::MalformedEncoding`] | the leaf/split markers do not form one binary tree |
#[instrument(skip_all, fields(n_nodes = tree.n_nodes()))]
pub fn reconstruct(
    tree: &FlatTree,
    feature_names: &[String],
    colors: &[String],
) -> Result<Reconstruction, TreeError> {
    tree.validate_lengths()?;

    let mut stack: Vec<TreeNode> = Vec::new();
    let mut leaf_values = LeafValues::new();
    let mut remaining_leaves = tree.n_leaves();

    for i in (0..tree.n_nodes()).rev() {
        let class_counts = class_counts(tree, i, colors.len())?;
        let samples = class_counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
        let color = colors[majority_class(&class_counts)].clone();
        let impurity = round_to(tree.impurity[i], 3);

        if tree.is_leaf(i) {
            let id = LeafId::new(remaining_leaves);
            remaining_leaves -= 1;
            leaf_values.insert(id, class_counts.clone());
            stack.push(TreeNode::Leaf {
                id,
                stats: NodeStats {
                    label: id.to_string(),
                    samples,
                    class_counts,
                    color,
                    impurity,
                },
            });
            continue;
        }

        let name = feature_name(feature_names, i, tree.feature[i])?;
        let label = split_label(name, tree.threshold[i]);
        let (Some(left), Some(right)) = (stack.pop(), stack.pop()) else {
            return Err(TreeError::MalformedEncoding {
                reason: format!("split at node {i} has fewer than two subtrees after it"),
            });
        };
        stack.push(TreeNode::Internal {
            stats: NodeStats {
                label,
                samples,
                class_counts,
                color,
                impurity,
            },
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    if stack.len() != 1 {
        return Err(TreeError::MalformedEncoding {
            reason: format!("{} subtrees remain after the pass, expected 1", stack.len()),
        });
    }
    let root = stack.pop().ok_or_else(|| TreeError::MalformedEncoding {
        reason: "no root".to_string(),
    })?;

    debug!(
        n_leaves = leaf_values.len(),
        depth = root.depth(),
        "tree reconstructed"
    );

    Ok(Reconstruction { root, leaf_values })
}

/// First output row of node `i`, each count truncated toward zero.
fn class_counts(tree: &FlatTree, i: usize, n_classes: usize) -> Result<Vec<u64>, TreeError> {
    let row = tree.value[i]
        .first()
        .filter(|row| !row.is_empty())
        .ok_or(TreeError::EmptyValue { position: i })?;
    if row.len() != n_classes {
        return Err(TreeError::ClassCountMismatch {
            position: i,
            expected: n_classes,
            got: row.len(),
        });
    }
    Ok(row.iter().map(|&v| v.trunc() as u64).collect())
}

fn feature_name<'a>(
    feature_names: &'a [String],
    position: usize,
    feature: i64,
) -> Result<&'a str, TreeError> {
    debug_assert_ne!(feature, LEAF_SENTINEL);
    usize::try_from(feature)
        .ok()
        .and_then(|f| feature_names.get(f))
        .map(String::as_str)
        .ok_or(TreeError::FeatureOutOfRange {
            position,
            feature,
            n_features: feature_names.len(),
        })
}

/// `"<feature> ≤ <threshold>"` with the threshold rounded to two decimals.
#[must_use]
pub fn split_label(feature_name: &str, threshold: f64) -> String {
    format!("{feature_name} \u{2264} {:?}", round_to(threshold, 2))
}

/// Round to `decimals` places, sending exact halves to the even digit.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}
