/// Errors from tree reconstruction and export.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the palette size does not match the number of classes.
    ///
    /// Raised both for the default palette (more classes than it has
    /// entries) and for an explicit color list of the wrong length.
    #[error("{n_colors} color(s) defined for {n_classes} classes")]
    ColorCountMismatch {
        /// Number of colors available.
        n_colors: usize,
        /// Number of classes that need a color.
        n_classes: usize,
    },

    /// Returned when the encoding has zero nodes.
    #[error("flat tree encoding has zero nodes")]
    EmptyEncoding,

    /// Returned when the co-indexed sequences of an encoding differ in length.
    #[error("encoding field `{field}` has {got} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending sequence.
        field: &'static str,
        /// Length of the `feature` sequence.
        expected: usize,
        /// Length of the offending sequence.
        got: usize,
    },

    /// Returned when the leaf/split markers do not describe a single binary tree.
    #[error("malformed tree encoding: {reason}")]
    MalformedEncoding {
        /// Human-readable description of the imbalance.
        reason: String,
    },

    /// Returned when a split references a feature outside the feature-name list.
    #[error("node {position} splits on feature {feature}, but only {n_features} feature names were given")]
    FeatureOutOfRange {
        /// Zero-based pre-order position of the node.
        position: usize,
        /// The feature index found in the encoding.
        feature: i64,
        /// Number of feature names supplied.
        n_features: usize,
    },

    /// Returned when a node carries no class counts.
    #[error("node {position} has an empty value entry")]
    EmptyValue {
        /// Zero-based pre-order position of the node.
        position: usize,
    },

    /// Returned when a node's class-count vector does not match the class count.
    #[error("node {position} has {got} class counts, expected {expected}")]
    ClassCountMismatch {
        /// Zero-based pre-order position of the node.
        position: usize,
        /// Number of classes (and colors).
        expected: usize,
        /// Length of the node's class-count vector.
        got: usize,
    },

    /// Returned when importance scores and feature names differ in length.
    #[error("{got} importance scores for {expected} features")]
    ImportanceCountMismatch {
        /// Number of feature names.
        expected: usize,
        /// Number of importance scores.
        got: usize,
    },

    /// Returned when a ranking asks for a class that does not exist.
    #[error("class index {class} out of range for {n_classes} classes")]
    ClassOutOfRange {
        /// Requested class index.
        class: usize,
        /// Number of classes in the leaf values.
        n_classes: usize,
    },

    /// Returned when a leaf label is not of the form `leaf<k>`.
    #[error("invalid leaf label \"{label}\": expected leaf<k> with k >= 1")]
    InvalidLeafLabel {
        /// The offending label.
        label: String,
    },

    /// Returned when a tree document node has neither zero nor two children.
    #[error("node \"{label}\" has {got} children, expected 0 or 2")]
    InvalidChildCount {
        /// Label of the offending node.
        label: String,
        /// Number of children found.
        got: usize,
    },

    /// Returned when a display option string is not recognised.
    #[error("unknown {option} \"{value}\" (expected one of: {expected})")]
    UnknownOption {
        /// Name of the option being parsed.
        option: &'static str,
        /// The rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}
