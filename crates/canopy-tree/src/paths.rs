//! Root-to-leaf decision paths and their tabular ranking.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::TreeError;
use crate::node::{LeafId, TreeNode};
use crate::reconstruct::LeafValues;

/// Conditions from the root to each leaf, ending with the leaf label.
pub type DecisionPaths = BTreeMap<LeafId, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Left,
    Right,
}

/// Collect the decision path of every leaf under `root`.
///
/// Conditions on the way to a `>` branch are rewritten from `≤` to `>`.
/// A single-leaf tree yields one path holding only the leaf label.
#[must_use]
pub fn decision_paths(root: &TreeNode) -> DecisionPaths {
    let mut paths = DecisionPaths::new();
    walk(root, Vec::new(), Branch::Left, &mut paths);
    paths
}

// `path` is owned per call: siblings never see each other's conditions.
fn walk(node: &TreeNode, mut path: Vec<String>, branch: Branch, paths: &mut DecisionPaths) {
    if branch == Branch::Right {
        if let Some(last) = path.last_mut() {
            *last = negate(last);
        }
    }
    path.push(node.label().to_string());

    match node {
        TreeNode::Leaf { id, .. } => {
            paths.insert(*id, path);
        }
        TreeNode::Internal { left, right, .. } => {
            walk(left, path.clone(), Branch::Left, paths);
            walk(right, path, Branch::Right, paths);
        }
    }
}

/// Turn `"<feature> ≤ <threshold>"` into `"<feature> > <threshold>"`.
#[must_use]
pub fn negate(condition: &str) -> String {
    condition.replace('\u{2264}', ">")
}

/// Length of the longest decision path (leaf label included).
#[must_use]
pub fn max_path_len(paths: &DecisionPaths) -> usize {
    paths.values().map(Vec::len).max().unwrap_or(0)
}

/// Row ordering for [`rank_paths`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathOrder {
    /// Ascending leaf number.
    #[default]
    LeafNumber,
    /// Descending count of the given class; ties keep leaf-number order.
    ClassCount(usize),
}

/// One row of a decision path table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRow {
    /// 1-based position in the table.
    pub rank: usize,
    /// The leaf this path ends in.
    pub leaf: LeafId,
    /// Conditions from the root, without the trailing leaf label.
    pub conditions: Vec<String>,
    /// Class counts at the leaf.
    pub class_counts: Vec<u64>,
}

/// Order decision paths into ranked table rows.
///
/// # Errors
///
/// Returns [`TreeError::ClassOutOfRange`] if `order` names a class beyond
/// a leaf's class-count vector.
pub fn rank_paths(
    paths: &DecisionPaths,
    leaf_values: &LeafValues,
    order: PathOrder,
) -> Result<Vec<PathRow>, TreeError> {
    let mut rows: Vec<PathRow> = paths
        .iter()
        .map(|(&leaf, path)| {
            let conditions = match path.split_last() {
                Some((_, conditions)) => conditions.to_vec(),
                None => Vec::new(),
            };
            PathRow {
                rank: 0,
                leaf,
                conditions,
                class_counts: leaf_values.get(&leaf).cloned().unwrap_or_default(),
            }
        })
        .collect();

    if let PathOrder::ClassCount(class) = order {
        if let Some(row) = rows.iter().find(|r| class >= r.class_counts.len()) {
            return Err(TreeError::ClassOutOfRange {
                class,
                n_classes: row.class_counts.len(),
            });
        }
        rows.sort_by(|a, b| b.class_counts[class].cmp(&a.class_counts[class]));
    }

    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    Ok(rows)
}
