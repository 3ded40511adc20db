//! Decision-tree export: rebuild, label, and describe trained trees.
//!
//! Turns the flat pre-order arrays a tree learner stores (feature index,
//! threshold, class counts, impurity) into a nested, labeled tree with
//! per-leaf decision paths, class counts, and feature importances, ready to
//! be serialized for a collapsible-tree or sankey front-end.

mod config;
mod encoding;
mod error;
mod export;
mod importance;
mod node;
mod palette;
mod paths;
mod reconstruct;

pub use config::ExportConfig;
pub use encoding::{FlatTree, LEAF_SENTINEL};
pub use error::TreeError;
pub use export::{ClassShow, DisplayOptions, NodeType, TreeExport};
pub use importance::{FeatureImportance, nonzero, pair_importances};
pub use node::{LeafId, NodeStats, TreeNode};
pub use palette::{ColorScheme, DEFAULT_PALETTE, majority_class};
pub use paths::{
    DecisionPaths, PathOrder, PathRow, decision_paths, max_path_len, negate, rank_paths,
};
pub use reconstruct::{LeafValues, Reconstruction, reconstruct, round_to, split_label};
