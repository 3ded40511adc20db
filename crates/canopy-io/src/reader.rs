//! JSON readers for model dumps and previously written export documents.

use std::path::{Path, PathBuf};

use canopy_tree::{
    DecisionPaths, DisplayOptions, FeatureImportance, LeafValues, TreeExport, TreeNode,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{DocumentLayout, ModelDump, TreeDump};

/// Reads a model dump from a JSON file.
///
/// Expected shape:
///
/// ```json
/// {
///   "feature_names": ["petal length", "petal width"],
///   "class_labels": ["setosa", "versicolor"],
///   "feature_importances": [0.7, 0.3],
///   "tree": {"feature": [0, -2, -2], "threshold": [2.45, -2, -2],
///            "value": [[[50, 50]], [[50, 0]], [[0, 50]]], "impurity": [0.5, 0, 0]}
/// }
/// ```
///
/// A forest uses `"trees": [...]` instead of `"tree"`; each tree may carry
/// its own `feature_importances`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::JsonParse`] | File is not a model dump |
/// | [`IoError::InvalidModel`] | Neither or both of `tree` / `trees` present |
pub struct ModelReader {
    path: PathBuf,
}

#[derive(Deserialize)]
struct RawDump {
    feature_names: Vec<String>,
    class_labels: Vec<String>,
    #[serde(default)]
    feature_importances: Vec<f64>,
    #[serde(default)]
    tree: Option<TreeDump>,
    #[serde(default)]
    trees: Vec<TreeDump>,
}

impl ModelReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the model dump.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<ModelDump, IoError> {
        let raw: RawDump = read_json(&self.path)?;

        let trees = match (raw.tree, raw.trees.is_empty()) {
            (Some(tree), true) => vec![tree],
            (None, false) => raw.trees,
            (Some(_), false) => {
                return Err(IoError::InvalidModel {
                    path: self.path.clone(),
                    reason: "both `tree` and `trees` are present".to_string(),
                });
            }
            (None, true) => {
                return Err(IoError::InvalidModel {
                    path: self.path.clone(),
                    reason: "no `tree` or non-empty `trees`".to_string(),
                });
            }
        };

        info!(
            n_trees = trees.len(),
            n_features = raw.feature_names.len(),
            n_classes = raw.class_labels.len(),
            "model dump loaded"
        );

        Ok(ModelDump::new(
            raw.feature_names,
            raw.class_labels,
            raw.feature_importances,
            trees,
        ))
    }
}

/// Reads an export document written by [`ExportWriter`](crate::ExportWriter).
///
/// Accepts both layouts; a top-level `x` object marks the widget envelope.
/// Nesting depth is unbounded, so any tree the writer emits reads back.
pub struct DocumentReader {
    path: PathBuf,
}

#[derive(Deserialize)]
struct WidgetPayload {
    data: TreeNode,
    opts: DisplayOptions,
}

// Either layout; `evals` and `jsHooks` are ignored.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    x: Option<WidgetPayload>,
    #[serde(default)]
    data: Option<TreeNode>,
    #[serde(default)]
    opts: Option<DisplayOptions>,
    importances: Vec<FeatureImportance>,
    decision_paths: DecisionPaths,
    leaf_values: LeafValues,
}

impl DocumentReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the document and report which layout it used.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::JsonParse`] | File is not an export document, or a node is malformed |
    /// | [`IoError::InvalidDocument`] | Neither or both layouts' `data`/`opts` are present |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<(TreeExport, DocumentLayout), IoError> {
        let raw: RawDocument = read_json_unbounded(&self.path)?;

        let (data, opts, layout) = match (raw.x, raw.data, raw.opts) {
            (Some(x), None, None) => (x.data, x.opts, DocumentLayout::Widget),
            (None, Some(data), Some(opts)) => (data, opts, DocumentLayout::Flat),
            (Some(_), _, _) => {
                return Err(IoError::InvalidDocument {
                    path: self.path.clone(),
                    reason: "`x` envelope alongside top-level `data`/`opts`".to_string(),
                });
            }
            (None, _, _) => {
                return Err(IoError::InvalidDocument {
                    path: self.path.clone(),
                    reason: "missing `data`/`opts` (or a widget `x` envelope)".to_string(),
                });
            }
        };

        let export = TreeExport {
            data,
            opts,
            importances: raw.importances,
            decision_paths: raw.decision_paths,
            leaf_values: raw.leaf_values,
        };
        debug!(?layout, depth = export.data.depth(), "document loaded");
        Ok((export, layout))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| IoError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

// One tree level is two JSON levels (node object, `children` array).
fn read_json_unbounded<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    let json_err = |source| IoError::JsonParse {
        path: path.to_path_buf(),
        source,
    };

    let mut de = serde_json::Deserializer::from_str(&content);
    de.disable_recursion_limit();
    let value = T::deserialize(&mut de).map_err(json_err)?;
    de.end().map_err(json_err)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    const STUMP: &str = r#"{"feature": [0, -2, -2], "threshold": [0.5, -2, -2],
        "value": [[[4, 6]], [[4, 0]], [[0, 6]]], "impurity": [0.48, 0, 0]}"#;

    #[test]
    fn read_single_tree() {
        let json = format!(
            r#"{{"feature_names": ["x"], "class_labels": ["no", "yes"],
                "feature_importances": [1.0], "tree": {STUMP}}}"#
        );
        let f = write_json(&json);
        let dump = ModelReader::new(f.path()).read().unwrap();
        assert_eq!(dump.n_trees(), 1);
        assert_eq!(dump.feature_names(), &["x"]);
        assert_eq!(dump.class_labels(), &["no", "yes"]);
        assert_eq!(dump.trees()[0].encoding.n_nodes(), 3);
        assert_eq!(dump.importances(0), &[1.0]);
    }

    #[test]
    fn read_forest_with_per_tree_importances() {
        let json = format!(
            r#"{{"feature_names": ["x"], "class_labels": ["no", "yes"],
                "trees": [{STUMP}, {{"feature": [-2], "threshold": [-2], "value": [[[3, 3]]],
                "impurity": [0.5], "feature_importances": [0.0]}}]}}"#
        );
        let f = write_json(&json);
        let dump = ModelReader::new(f.path()).read().unwrap();
        assert_eq!(dump.n_trees(), 2);
        assert!(dump.importances(0).is_empty());
        assert_eq!(dump.importances(1), &[0.0]);
    }

    #[test]
    fn missing_tree_rejected() {
        let f = write_json(r#"{"feature_names": ["x"], "class_labels": ["a"]}"#);
        let err = ModelReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidModel { .. }));
    }

    #[test]
    fn both_tree_and_trees_rejected() {
        let json = format!(
            r#"{{"feature_names": ["x"], "class_labels": ["no", "yes"],
                "tree": {STUMP}, "trees": [{STUMP}]}}"#
        );
        let f = write_json(&json);
        let err = ModelReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidModel { .. }));
    }

    #[test]
    fn malformed_json_rejected() {
        let f = write_json("{not json");
        let err = ModelReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::JsonParse { .. }));
    }

    #[test]
    fn missing_file_rejected() {
        let err = ModelReader::new(Path::new("/nonexistent/model.json"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn document_without_tree_rejected() {
        let f = write_json(r#"{"importances": [], "decision_paths": {}, "leaf_values": {}}"#);
        let err = DocumentReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidDocument { .. }));
    }

    #[test]
    fn document_with_single_child_rejected() {
        let json = r##"{"data": {"label": "x ≤ 0.5", "samples": 1, "n_obs": [1], "color": "#000",
            "impurity": 0.0, "children": [{"label": "leaf1", "samples": 1, "n_obs": [1],
            "color": "#000", "impurity": 0.0}]},
            "opts": {}, "importances": [], "decision_paths": {}, "leaf_values": {}}"##;
        let f = write_json(json);
        let err = DocumentReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::JsonParse { .. }));
    }
}
