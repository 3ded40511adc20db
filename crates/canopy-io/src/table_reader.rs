//! CSV readers for node tables and feature tables.

use std::path::{Path, PathBuf};

use canopy_tree::FlatTree;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ModelDump, TreeDump};

/// Column names every node table starts with.
const NODE_COLUMNS: [&str; 3] = ["feature", "threshold", "impurity"];

/// Column names of a feature table.
const FEATURE_COLUMNS: [&str; 2] = ["attribute", "importance"];

/// A tree read from a node table.
#[derive(Debug, Clone)]
pub struct NodeTable {
    /// The flat pre-order encoding.
    pub encoding: FlatTree,
    /// Class labels, taken from the class-count column headers.
    pub class_labels: Vec<String>,
}

/// Feature names and importances read from a feature table.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// Feature names in model order.
    pub names: Vec<String>,
    /// Importance per feature.
    pub importances: Vec<f64>,
}

impl ModelDump {
    /// Combine a node table and a feature table into a single-tree model.
    #[must_use]
    pub fn from_tables(nodes: NodeTable, features: FeatureTable) -> Self {
        ModelDump::new(
            features.names,
            nodes.class_labels,
            features.importances,
            vec![TreeDump {
                encoding: nodes.encoding,
                feature_importances: None,
            }],
        )
    }
}

/// Reads a tree from a CSV node table.
///
/// Expected CSV format:
/// - Header `feature,threshold,impurity,<class 1>,...,<class k>`
/// - One row per node in pre-order; `feature` is `-2` for leaves
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header doesn't start with `feature,threshold,impurity` |
/// | [`IoError::NoClassColumns`] | No class-count columns after the fixed ones |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidFeatureIndex`] | `feature` is not an integer |
/// | [`IoError::NonFiniteValue`] | Numeric cell is NaN, Inf, or unparseable |
pub struct NodeTableReader {
    path: PathBuf,
}

impl NodeTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`NodeTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<NodeTable, IoError> {
        let mut rdr = open_csv(&self.path)?;

        let header = rdr.headers().map_err(|e| csv_error(&self.path, e))?.clone();
        check_columns(&self.path, &header, &NODE_COLUMNS)?;
        if header.len() <= NODE_COLUMNS.len() {
            return Err(IoError::NoClassColumns {
                path: self.path.clone(),
            });
        }
        let class_labels: Vec<String> = header
            .iter()
            .skip(NODE_COLUMNS.len())
            .map(String::from)
            .collect();
        let expected_cols = header.len();
        debug!(n_classes = class_labels.len(), "read node table header");

        let mut feature = Vec::new();
        let mut threshold = Vec::new();
        let mut impurity = Vec::new();
        let mut value = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let raw = record.get(0).unwrap_or("").trim();
            let f: i64 = raw.parse().map_err(|_| IoError::InvalidFeatureIndex {
                path: self.path.clone(),
                row_index,
                raw: raw.to_string(),
            })?;
            feature.push(f);

            let cell = |col_index: usize| parse_finite(&self.path, &record, row_index, col_index);
            threshold.push(cell(1)?);
            impurity.push(cell(2)?);
            let counts = (NODE_COLUMNS.len()..expected_cols)
                .map(cell)
                .collect::<Result<Vec<f64>, IoError>>()?;
            value.push(vec![counts]);
        }

        if feature.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let encoding = FlatTree::new(feature, threshold, value, impurity).map_err(|e| {
            IoError::InvalidEncoding {
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!(
            n_nodes = encoding.n_nodes(),
            n_leaves = encoding.n_leaves(),
            "node table loaded"
        );

        Ok(NodeTable {
            encoding,
            class_labels,
        })
    }
}

/// Reads feature names and importances from a CSV feature table.
///
/// Expected CSV format: header `attribute,importance`, one row per feature
/// in model order.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header isn't `attribute,importance` |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has a column count other than 2 |
/// | [`IoError::NonFiniteValue`] | Importance is NaN, Inf, or unparseable |
pub struct FeatureTableReader {
    path: PathBuf,
}

impl FeatureTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`FeatureTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<FeatureTable, IoError> {
        let mut rdr = open_csv(&self.path)?;

        let header = rdr.headers().map_err(|e| csv_error(&self.path, e))?.clone();
        check_columns(&self.path, &header, &FEATURE_COLUMNS)?;

        let mut names = Vec::new();
        let mut importances = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            if record.len() != FEATURE_COLUMNS.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: FEATURE_COLUMNS.len(),
                    got: record.len(),
                });
            }
            names.push(record.get(0).unwrap_or("").to_string());
            importances.push(parse_finite(&self.path, &record, row_index, 1)?);
        }

        if names.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_features = names.len(), "feature table loaded");
        Ok(FeatureTable { names, importances })
    }
}

// flexible(true) lets rows with a wrong column count reach our own
// InconsistentRowLength check instead of failing as a CsvParse error.
fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

fn check_columns(
    path: &Path,
    header: &csv::StringRecord,
    expected: &[&'static str],
) -> Result<(), IoError> {
    for (i, &column) in expected.iter().enumerate() {
        if header.get(i).map(str::trim) != Some(column) {
            return Err(IoError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    Ok(())
}

fn parse_finite(
    path: &Path,
    record: &csv::StringRecord,
    row_index: usize,
    col_index: usize,
) -> Result<f64, IoError> {
    let raw = record.get(col_index).unwrap_or("").trim();
    let non_finite = || IoError::NonFiniteValue {
        path: path.to_path_buf(),
        row_index,
        col_index,
        raw: raw.to_string(),
    };
    let value: f64 = raw.parse().map_err(|_| non_finite())?;
    if !value.is_finite() {
        return Err(non_finite());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    const STUMP: &str = "feature,threshold,impurity,no,yes\n0,0.5,0.48,4,6\n-2,-2,0.0,4,0\n-2,-2,0.0,0,6\n";

    #[test]
    fn read_valid_node_table() {
        let f = write_csv(STUMP);
        let table = NodeTableReader::new(f.path()).read().unwrap();
        assert_eq!(table.class_labels, vec!["no", "yes"]);
        assert_eq!(table.encoding.n_nodes(), 3);
        assert_eq!(table.encoding.n_leaves(), 2);
        assert_eq!(table.encoding.value[2], vec![vec![0.0, 6.0]]);
        assert!((table.encoding.threshold[0] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn node_table_requires_fixed_columns() {
        let f = write_csv("feat,threshold,impurity,a\n-2,0,0,1\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { column: "feature", .. }));
    }

    #[test]
    fn node_table_requires_class_columns() {
        let f = write_csv("feature,threshold,impurity\n-2,0,0\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::NoClassColumns { .. }));
    }

    #[test]
    fn node_table_empty_dataset() {
        let f = write_csv("feature,threshold,impurity,a\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn node_table_inconsistent_row() {
        let f = write_csv("feature,threshold,impurity,a,b\n0,0.5,0.5,1,1\n-2,-2,0\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InconsistentRowLength { row_index: 1, .. }));
    }

    #[test]
    fn node_table_bad_feature_index() {
        let f = write_csv("feature,threshold,impurity,a\n1.5,0,0,1\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidFeatureIndex { .. }));
    }

    #[test]
    fn node_table_non_finite_count() {
        let f = write_csv("feature,threshold,impurity,a\n-2,0,0,NaN\n");
        let err = NodeTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::NonFiniteValue { col_index: 3, .. }));
    }

    #[test]
    fn read_valid_feature_table() {
        let f = write_csv("attribute,importance\npetal,0.7\nsepal,0.3\n");
        let table = FeatureTableReader::new(f.path()).read().unwrap();
        assert_eq!(table.names, vec!["petal", "sepal"]);
        assert_eq!(table.importances, vec![0.7, 0.3]);
    }

    #[test]
    fn feature_table_wrong_header() {
        let f = write_csv("name,score\npetal,0.7\n");
        let err = FeatureTableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { column: "attribute", .. }));
    }

    #[test]
    fn tables_combine_into_model() {
        let nodes = NodeTableReader::new(write_csv(STUMP).path()).read().unwrap();
        let features = FeatureTableReader::new(write_csv("attribute,importance\nx,1.0\n").path())
            .read()
            .unwrap();
        let dump = ModelDump::from_tables(nodes, features);
        assert_eq!(dump.n_trees(), 1);
        assert_eq!(dump.feature_names(), &["x"]);
        assert_eq!(dump.class_labels(), &["no", "yes"]);
        assert_eq!(dump.importances(0), &[1.0]);
    }
}
