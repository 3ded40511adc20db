//! JSON document writer for tree exports.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_tree::{
    DecisionPaths, DisplayOptions, FeatureImportance, LeafValues, TreeExport, TreeNode,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{DocumentLayout, OutputName};

/// Writes export documents to JSON files.
///
/// Creates the output directory on construction if it does not exist.
pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the path a document named `name` would be written to.
    #[must_use]
    pub fn path_for(&self, name: &OutputName) -> PathBuf {
        self.output_dir.join(name.as_str())
    }

    /// Write `export` to `{output_dir}/{name}` and return the written path.
    ///
    /// An existing file of the same name is replaced.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | Document cannot be rendered as JSON |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip(self, export), fields(name = %name))]
    pub fn write(
        &self,
        export: &TreeExport,
        name: &OutputName,
        layout: DocumentLayout,
    ) -> Result<PathBuf, IoError> {
        let path = self.path_for(name);

        let rendered = match layout {
            DocumentLayout::Flat => serde_json::to_string_pretty(export),
            DocumentLayout::Widget => serde_json::to_string_pretty(&WidgetArtifact {
                evals: [],
                js_hooks: [],
                x: WidgetPayload {
                    data: &export.data,
                    opts: &export.opts,
                },
                importances: &export.importances,
                decision_paths: &export.decision_paths,
                leaf_values: &export.leaf_values,
            }),
        };
        let json = rendered.map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;

        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(
            path = %path.display(),
            ?layout,
            n_leaves = export.n_leaves(),
            "export document written"
        );
        Ok(path)
    }
}

// --- Shadow structs for the widget envelope ---

#[derive(Serialize)]
struct WidgetArtifact<'a> {
    evals: [(); 0],
    #[serde(rename = "jsHooks")]
    js_hooks: [(); 0],
    x: WidgetPayload<'a>,
    importances: &'a [FeatureImportance],
    decision_paths: &'a DecisionPaths,
    leaf_values: &'a LeafValues,
}

#[derive(Serialize)]
struct WidgetPayload<'a> {
    data: &'a TreeNode,
    opts: &'a DisplayOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_tree::{ExportConfig, FlatTree};
    use tempfile::TempDir;

    fn stump_export() -> TreeExport {
        let tree = FlatTree::new(
            vec![0, -2, -2],
            vec![0.5, -2.0, -2.0],
            vec![vec![vec![4.0, 6.0]], vec![vec![4.0, 0.0]], vec![vec![0.0, 6.0]]],
            vec![0.48, 0.0, 0.0],
        )
        .unwrap();
        ExportConfig::new(vec!["x".into()], vec!["no".into(), "yes".into()])
            .export(&tree, &[1.0])
            .unwrap()
    }

    fn read_value(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_flat_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path()).unwrap();
        let name = OutputName::new("d3tree_data.json".into()).unwrap();

        let path = writer.write(&stump_export(), &name, DocumentLayout::Flat).unwrap();
        assert_eq!(path, dir.path().join("d3tree_data.json"));

        let content = read_value(&path);
        assert_eq!(content["data"]["label"], "x \u{2264} 0.5");
        assert_eq!(content["data"]["children"].as_array().unwrap().len(), 2);
        assert_eq!(content["opts"]["childrenName"], "children");
        assert_eq!(content["importances"][0]["attribute"], "x");
        assert_eq!(content["decision_paths"]["leaf2"][0], "x > 0.5");
        assert_eq!(content["leaf_values"]["leaf1"][0], 4);
        assert!(content.get("x").is_none());
    }

    #[test]
    fn write_widget_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path()).unwrap();
        let name = OutputName::new("widget.json".into()).unwrap();

        let path = writer.write(&stump_export(), &name, DocumentLayout::Widget).unwrap();
        let content = read_value(&path);

        assert_eq!(content["evals"], serde_json::json!([]));
        assert_eq!(content["jsHooks"], serde_json::json!([]));
        assert_eq!(content["x"]["data"]["samples"], 10);
        assert_eq!(content["x"]["opts"]["name"], "label");
        assert!(content["importances"].is_array());
        assert!(content["decision_paths"].is_object());
        assert!(content["leaf_values"].is_object());
        assert!(content.get("data").is_none());
    }

    #[test]
    fn write_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let writer = ExportWriter::new(&nested).unwrap();
        let name = OutputName::new("out.json".into()).unwrap();
        writer.write(&stump_export(), &name, DocumentLayout::Flat).unwrap();
        assert!(nested.join("out.json").exists());
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("out.json");
        fs::write(&existing, "stale").unwrap();

        let writer = ExportWriter::new(dir.path()).unwrap();
        let name = OutputName::new("out.json".into()).unwrap();
        writer.write(&stump_export(), &name, DocumentLayout::Flat).unwrap();

        assert!(read_value(&existing)["data"].is_object());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let result = ExportWriter::new(&blocker.join("sub"));
        assert!(matches!(result, Err(IoError::OutputDirCreate { .. })));
    }
}
