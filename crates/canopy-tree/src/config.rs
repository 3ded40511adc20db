//! Configuration builder for exporting a tree.

use tracing::{instrument, warn};

use crate::TreeError;
use crate::encoding::FlatTree;
use crate::export::{ClassShow, DisplayOptions, NodeType, TreeExport};
use crate::importance::pair_importances;
use crate::palette::ColorScheme;
use crate::paths::decision_paths;
use crate::reconstruct::{Reconstruction, reconstruct};

/// Configuration for exporting a decision tree.
///
/// Construct via [`ExportConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter          | Default    |
/// |--------------------|------------|
/// | `node_type`        | `LeafPie`  |
/// | `class_show`       | `All`      |
/// | `colors`           | `Default`  |
/// | `tooltip`          | `"show"`   |
/// | `max_label_length` | 15         |
/// | `node_height`      | `None`     |
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub(crate) feature_names: Vec<String>,
    pub(crate) class_labels: Vec<String>,
    pub(crate) node_type: NodeType,
    pub(crate) class_show: ClassShow,
    pub(crate) colors: ColorScheme,
    pub(crate) tooltip: String,
    pub(crate) max_label_length: usize,
    pub(crate) node_height: Option<f64>,
}

impl ExportConfig {
    /// Create a new config for a model with the given feature and class names.
    #[must_use]
    pub fn new(feature_names: Vec<String>, class_labels: Vec<String>) -> Self {
        Self {
            feature_names,
            class_labels,
            node_type: NodeType::default(),
            class_show: ClassShow::default(),
            colors: ColorScheme::default(),
            tooltip: "show".to_string(),
            max_label_length: 15,
            node_height: None,
        }
    }

    // --- Setters ---

    /// Set the node rendering mode.
    #[must_use]
    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    /// Set which classes are summed into link widths.
    #[must_use]
    pub fn with_class_show(mut self, class_show: ClassShow) -> Self {
        self.class_show = class_show;
        self
    }

    /// Set the color scheme.
    #[must_use]
    pub fn with_colors(mut self, colors: ColorScheme) -> Self {
        self.colors = colors;
        self
    }

    /// Set the tooltip toggle.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Set the label truncation length used by the front-end.
    #[must_use]
    pub fn with_max_label_length(mut self, max_label_length: usize) -> Self {
        self.max_label_length = max_label_length;
        self
    }

    /// Set a fixed node height. `None` lets the front-end decide.
    #[must_use]
    pub fn with_node_height(mut self, node_height: Option<f64>) -> Self {
        self.node_height = node_height;
        self
    }

    // --- Getters ---

    /// Return the feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the class labels.
    #[must_use]
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    /// Return the node rendering mode.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Return the class selection.
    #[must_use]
    pub fn class_show(&self) -> &ClassShow {
        &self.class_show
    }

    /// Return the color scheme.
    #[must_use]
    pub fn colors(&self) -> &ColorScheme {
        &self.colors
    }

    /// Return the tooltip toggle.
    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Return the label truncation length.
    #[must_use]
    pub fn max_label_length(&self) -> usize {
        self.max_label_length
    }

    /// Return the fixed node height, if any.
    #[must_use]
    pub fn node_height(&self) -> Option<f64> {
        self.node_height
    }

    /// Build the export document for one tree.
    ///
    /// Colors and importances are checked before the tree is touched, so a
    /// failure never yields a partial document.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::ColorCountMismatch`] | the color scheme does not cover the classes |
    /// | [`TreeError::ImportanceCountMismatch`] | `importances` and feature names differ in length |
    /// | any [`reconstruct`] error | the encoding is invalid |
    #[instrument(skip_all, fields(n_nodes = tree.n_nodes(), n_classes = self.class_labels.len()))]
    pub fn export(&self, tree: &FlatTree, importances: &[f64]) -> Result<TreeExport, TreeError> {
        let colors = self.colors.resolve(self.class_labels.len())?;
        let importances = pair_importances(&self.feature_names, importances)?;

        if let ClassShow::Class(label) = &self.class_show {
            if !self.class_labels.contains(label) {
                warn!(class_show = %label, "class_show names no known class; stored as given");
            }
        }

        let Reconstruction { root, leaf_values } = reconstruct(tree, &self.feature_names, &colors)?;
        let decision_paths = decision_paths(&root);

        Ok(TreeExport {
            data: root,
            opts: self.display_options(colors),
            importances,
            decision_paths,
            leaf_values,
        })
    }

    fn display_options(&self, colors: Vec<String>) -> DisplayOptions {
        DisplayOptions {
            class_labels: self.class_labels.clone(),
            children_name: "children".to_string(),
            id: "id".to_string(),
            max_label_length: self.max_label_length,
            name: "label".to_string(),
            node_height: self.node_height,
            tooltip: self.tooltip.clone(),
            value: "samples".to_string(),
            node_type: self.node_type,
            class_show: self.class_show.clone(),
            colors,
        }
    }
}
