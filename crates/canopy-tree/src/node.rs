use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TreeError;

/// Identifier of a leaf, rendered as `leaf<k>` with `k >= 1`.
///
/// Orders by `k`, so `leaf2 < leaf10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafId(usize);

impl LeafId {
    /// Create a leaf id from its one-based number.
    pub(crate) fn new(number: usize) -> Self {
        debug_assert!(number >= 1, "leaf numbers start at 1");
        Self(number)
    }

    /// Return the one-based leaf number.
    #[must_use]
    pub fn number(self) -> usize {
        self.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf{}", self.0)
    }
}

impl FromStr for LeafId {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TreeError::InvalidLeafLabel {
            label: s.to_string(),
        };
        let digits = s.strip_prefix("leaf").ok_or_else(invalid)?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let number = digits.parse::<usize>().map_err(|_| invalid())?;
        Ok(Self(number))
    }
}

impl Serialize for LeafId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LeafId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display statistics shared by leaves and internal nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStats {
    /// Leaf id for leaves, split condition (`"<feature> ≤ <threshold>"`) otherwise.
    pub label: String,
    /// Total number of training samples, the sum of `class_counts`.
    pub samples: u64,
    /// Per-class sample counts aggregated over the subtree.
    pub class_counts: Vec<u64>,
    /// Palette color of the majority class.
    pub color: String,
    /// Impurity rounded to three decimals.
    pub impurity: f64,
}

/// A node of a reconstructed decision tree.
///
/// Internal nodes own both children; `left` is the `≤` branch and
/// `right` the `>` branch.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// A terminal node.
    Leaf {
        /// Unique leaf identifier, equal to `stats.label`.
        id: LeafId,
        /// Display statistics.
        stats: NodeStats,
    },
    /// A split node.
    Internal {
        /// Display statistics.
        stats: NodeStats,
        /// Subtree for samples satisfying the split condition.
        left: Box<TreeNode>,
        /// Subtree for samples failing the split condition.
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Return the display statistics of this node.
    #[must_use]
    pub fn stats(&self) -> &NodeStats {
        match self {
            TreeNode::Leaf { stats, .. } | TreeNode::Internal { stats, .. } => stats,
        }
    }

    /// Return the node label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.stats().label
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Return the `(left, right)` children of an internal node.
    #[must_use]
    pub fn children(&self) -> Option<(&TreeNode, &TreeNode)> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Internal { left, right, .. } => Some((left, right)),
        }
    }

    /// Count the leaves in this subtree.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    /// Count the internal nodes in this subtree.
    #[must_use]
    pub fn n_internal(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.n_internal() + right.n_internal(),
        }
    }

    /// Return the depth of this subtree (a single leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

// --- JSON shape: {label, samples, n_obs, color, impurity, children?} ---

#[derive(Serialize)]
struct NodeRepr<'a> {
    label: &'a str,
    samples: u64,
    n_obs: &'a [u64],
    color: &'a str,
    impurity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<[&'a TreeNode; 2]>,
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stats = self.stats();
        NodeRepr {
            label: &stats.label,
            samples: stats.samples,
            n_obs: &stats.class_counts,
            color: &stats.color,
            impurity: stats.impurity,
            children: self.children().map(|(left, right)| [left, right]),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RawNode {
    label: String,
    samples: u64,
    n_obs: Vec<u64>,
    color: String,
    impurity: f64,
    #[serde(default)]
    children: Option<Vec<TreeNode>>,
}

impl TryFrom<RawNode> for TreeNode {
    type Error = TreeError;

    /// A node without children (absent or empty) is read as a leaf, so its
    /// label must be a leaf id.
    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let stats = NodeStats {
            label: raw.label,
            samples: raw.samples,
            class_counts: raw.n_obs,
            color: raw.color,
            impurity: raw.impurity,
        };
        let children = raw.children.unwrap_or_default();
        match <[TreeNode; 2]>::try_from(children) {
            Ok([left, right]) => Ok(TreeNode::Internal {
                stats,
                left: Box::new(left),
                right: Box::new(right),
            }),
            Err(children) if children.is_empty() => {
                let id = stats.label.parse()?;
                Ok(TreeNode::Leaf { id, stats })
            }
            Err(children) => Err(TreeError::InvalidChildCount {
                label: stats.label,
                got: children.len(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        TreeNode::try_from(raw).map_err(serde::de::Error::custom)
    }
}
