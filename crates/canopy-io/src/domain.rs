//! Domain types for canopy-io.

use std::path::Path;

use canopy_tree::FlatTree;
use serde::Deserialize;

use crate::IoError;

/// A validated output file name.
///
/// Must be non-empty, must not be `.` or `..`, and must not contain path
/// separators. The directory is chosen separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName(String);

impl OutputName {
    /// Parse and validate an output file name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidFileName`] if the name is empty, is `.` or
    /// `..`, or contains `/` or `\`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(IoError::InvalidFileName { name });
        }
        Ok(Self(name))
    }

    /// Return the file name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return `<stem>_<index>.<ext>` (or `<name>_<index>` without extension).
    ///
    /// Used to name one file per tree of a forest.
    #[must_use]
    pub fn indexed(&self, index: usize) -> OutputName {
        let path = Path::new(&self.0);
        let stem = path
            .file_stem()
            .map_or(self.0.as_str(), |s| s.to_str().unwrap_or(self.0.as_str()));
        let name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}_{index}.{ext}"),
            None => format!("{stem}_{index}"),
        };
        OutputName(name)
    }
}

impl std::fmt::Display for OutputName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level shape of a written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentLayout {
    /// `data`, `opts`, `importances`, `decision_paths`, `leaf_values` at top level.
    #[default]
    Flat,
    /// htmlwidgets envelope: `{evals, jsHooks, x: {data, opts}, ...}`.
    Widget,
}

/// One tree of a model dump.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeDump {
    /// The flat pre-order encoding.
    #[serde(flatten)]
    pub encoding: FlatTree,
    /// Per-tree importances, overriding the model-level list.
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// A trained model as exported by its training environment.
///
/// Produced by [`ModelReader`](crate::ModelReader) or
/// [`NodeTableReader`](crate::NodeTableReader).
#[derive(Debug, Clone)]
pub struct ModelDump {
    feature_names: Vec<String>,
    class_labels: Vec<String>,
    feature_importances: Vec<f64>,
    trees: Vec<TreeDump>,
}

impl ModelDump {
    /// Create a new model dump holding at least one tree.
    pub(crate) fn new(
        feature_names: Vec<String>,
        class_labels: Vec<String>,
        feature_importances: Vec<f64>,
        trees: Vec<TreeDump>,
    ) -> Self {
        debug_assert!(!trees.is_empty(), "model dump must hold a tree");
        Self {
            feature_names,
            class_labels,
            feature_importances,
            trees,
        }
    }

    /// Return the feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the class labels in model order.
    #[must_use]
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    /// Return the trees.
    #[must_use]
    pub fn trees(&self) -> &[TreeDump] {
        &self.trees
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the importances for tree `index`: its own list if present,
    /// otherwise the model-level list.
    #[must_use]
    pub fn importances(&self, index: usize) -> &[f64] {
        self.trees
            .get(index)
            .and_then(|t| t.feature_importances.as_deref())
            .unwrap_or(&self.feature_importances)
    }
}
