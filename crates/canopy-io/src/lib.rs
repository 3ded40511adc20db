//! File I/O, validation, and serialization for canopy exports.

mod domain;
mod error;
mod reader;
mod table_reader;
mod writer;

pub use domain::{DocumentLayout, ModelDump, OutputName, TreeDump};
pub use error::IoError;
pub use reader::{DocumentReader, ModelReader};
pub use table_reader::{FeatureTable, FeatureTableReader, NodeTable, NodeTableReader};
pub use writer::ExportWriter;
