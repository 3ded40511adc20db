//! The combined export document and its display options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TreeError;
use crate::importance::FeatureImportance;
use crate::node::TreeNode;
use crate::paths::DecisionPaths;
use crate::reconstruct::LeafValues;

/// How the front-end draws nodes. Stored verbatim, never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Pie charts on every node.
    AllPie,
    /// Pie charts on leaves only.
    #[default]
    LeafPie,
    /// No charts.
    NoPie,
    /// Bar charts on every node.
    AllBar,
    /// Bar charts on leaves only.
    LeafBar,
}

impl NodeType {
    const EXPECTED: &'static str = "all-pie, leaf-pie, no-pie, all-bar, leaf-bar";

    /// Return the wire name of this node type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::AllPie => "all-pie",
            NodeType::LeafPie => "leaf-pie",
            NodeType::NoPie => "no-pie",
            NodeType::AllBar => "all-bar",
            NodeType::LeafBar => "leaf-bar",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-pie" => Ok(NodeType::AllPie),
            "leaf-pie" => Ok(NodeType::LeafPie),
            "no-pie" => Ok(NodeType::NoPie),
            "all-bar" => Ok(NodeType::AllBar),
            "leaf-bar" => Ok(NodeType::LeafBar),
            other => Err(TreeError::UnknownOption {
                option: "node type",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Which classes the front-end sums into link widths.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClassShow {
    /// Sum every class.
    #[default]
    All,
    /// Only the named class.
    Class(String),
}

impl From<String> for ClassShow {
    fn from(s: String) -> Self {
        if s == "all" { ClassShow::All } else { ClassShow::Class(s) }
    }
}

impl From<ClassShow> for String {
    fn from(show: ClassShow) -> Self {
        match show {
            ClassShow::All => "all".to_string(),
            ClassShow::Class(label) => label,
        }
    }
}

impl fmt::Display for ClassShow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassShow::All => f.write_str("all"),
            ClassShow::Class(label) => f.write_str(label),
        }
    }
}

/// Options consumed by the tree/sankey front-end (`opts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    /// Class labels in model order.
    pub class_labels: Vec<String>,
    /// Key holding a node's children.
    pub children_name: String,
    /// Key holding a node's id.
    pub id: String,
    /// Labels longer than this are truncated by the front-end.
    pub max_label_length: usize,
    /// Key holding a node's display name.
    pub name: String,
    /// Fixed node height, or `None` to let the front-end decide.
    pub node_height: Option<f64>,
    /// Tooltip toggle, `"show"` to enable.
    pub tooltip: String,
    /// Key holding a node's size.
    pub value: String,
    /// Node rendering mode.
    pub node_type: NodeType,
    /// Class selection for link widths.
    pub class_show: ClassShow,
    /// One color per class.
    pub colors: Vec<String>,
}

/// Everything the front-end needs to draw one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeExport {
    /// Nested tree.
    pub data: TreeNode,
    /// Display options.
    pub opts: DisplayOptions,
    /// Feature importances in model order.
    pub importances: Vec<FeatureImportance>,
    /// Root-to-leaf conditions per leaf.
    pub decision_paths: DecisionPaths,
    /// Class counts per leaf.
    pub leaf_values: LeafValues,
}

impl TreeExport {
    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.leaf_values.len()
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.opts.class_labels.len()
    }

    /// Return the zero-based index of a class label.
    #[must_use]
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.opts.class_labels.iter().position(|c| c == label)
    }
}
