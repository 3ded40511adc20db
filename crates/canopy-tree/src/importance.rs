//! Feature importance pairing.

use serde::{Deserialize, Serialize};

use crate::TreeError;

/// A feature name with the importance score the model assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub attribute: String,
    /// Importance score as supplied by the model.
    pub importance: f64,
}

/// Pair feature names with their importance scores.
///
/// Order is preserved; nothing is normalized or sorted.
///
/// # Errors
///
/// Returns [`TreeError::ImportanceCountMismatch`] if the two slices differ
/// in length.
pub fn pair_importances(
    names: &[String],
    scores: &[f64],
) -> Result<Vec<FeatureImportance>, TreeError> {
    if names.len() != scores.len() {
        return Err(TreeError::ImportanceCountMismatch {
            expected: names.len(),
            got: scores.len(),
        });
    }

    Ok(names
        .iter()
        .zip(scores.iter())
        .map(|(name, &importance)| FeatureImportance {
            attribute: name.clone(),
            importance,
        })
        .collect())
}

/// Entries with a strictly positive importance, in their original order.
#[must_use]
pub fn nonzero(importances: &[FeatureImportance]) -> Vec<&FeatureImportance> {
    importances.iter().filter(|f| f.importance > 0.0).collect()
}
