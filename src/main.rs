use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use canopy_io::{
    DocumentLayout, DocumentReader, ExportWriter, FeatureTableReader, ModelDump, ModelReader,
    NodeTableReader, OutputName,
};
use canopy_tree::{
    ClassShow, ColorScheme, ExportConfig, NodeType, PathOrder, PathRow, decision_paths,
    max_path_len, rank_paths,
};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Export trained decision trees for collapsible-tree and sankey visualization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel export (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Reconstruct a tree (or every tree of a forest) and write export documents
    Export {
        /// Path to a JSON model dump
        #[arg(long, required_unless_present = "nodes", conflicts_with_all = ["nodes", "features"])]
        model: Option<PathBuf>,

        /// Path to a CSV node table (feature,threshold,impurity,<class>...)
        #[arg(long, requires = "features")]
        nodes: Option<PathBuf>,

        /// Path to a CSV feature table (attribute,importance)
        #[arg(long, requires = "nodes")]
        features: Option<PathBuf>,

        /// Output directory for export documents
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,

        /// Output file name; forests append _<index> to the stem
        #[arg(long, default_value = "d3tree_data.json")]
        filename: String,

        /// Node rendering: "all-pie", "leaf-pie", "no-pie", "all-bar", or "leaf-bar"
        #[arg(long, default_value = "leaf-pie")]
        node_type: String,

        /// Class highlighted by the front-end, or "all"
        #[arg(long, default_value = "all")]
        class_show: String,

        /// Class colors: "default" or a comma-separated list, one per class
        #[arg(long, default_value = "default")]
        colors: String,

        /// Tooltip mode passed through to the front-end
        #[arg(long, default_value = "show")]
        tooltip: String,

        /// Maximum node label length before the front-end truncates it
        #[arg(long, default_value_t = 15)]
        max_label_length: usize,

        /// Fixed vertical spacing between nodes (front-end default if not set)
        #[arg(long)]
        node_height: Option<f64>,

        /// Document layout: "flat" or "widget"
        #[arg(long, default_value = "flat")]
        layout: String,
    },

    /// Print the ranked decision paths of an exported document
    Paths {
        /// Path to an export document (either layout)
        #[arg(long)]
        document: PathBuf,

        /// Row order: "leaf" or a class label (descending count of that class)
        #[arg(long, default_value = "leaf")]
        sort_by: String,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExportOutput {
    n_trees: usize,
    n_features: usize,
    n_classes: usize,
    layout: &'static str,
    documents: Vec<DocumentOutput>,
}

#[derive(Serialize)]
struct DocumentOutput {
    tree: usize,
    path: PathBuf,
    n_leaves: usize,
    n_internal: usize,
    depth: usize,
    max_path_len: usize,
}

#[derive(Serialize)]
struct PathsOutput {
    document: PathBuf,
    n_classes: usize,
    n_leaves: usize,
    max_path_len: usize,
    rows: Vec<PathRow>,
}

fn parse_layout(s: &str) -> Result<DocumentLayout> {
    match s {
        "flat" => Ok(DocumentLayout::Flat),
        "widget" => Ok(DocumentLayout::Widget),
        other => anyhow::bail!("unknown layout: {other} (expected flat or widget)"),
    }
}

fn layout_name(layout: DocumentLayout) -> &'static str {
    match layout {
        DocumentLayout::Flat => "flat",
        DocumentLayout::Widget => "widget",
    }
}

fn parse_sort_by(s: &str, class_labels: &[String]) -> Result<PathOrder> {
    if s == "leaf" {
        return Ok(PathOrder::LeafNumber);
    }
    match class_labels.iter().position(|c| c == s) {
        Some(class) => Ok(PathOrder::ClassCount(class)),
        None => anyhow::bail!(
            "unknown sort key: {s} (expected leaf or one of: {})",
            class_labels.join(", ")
        ),
    }
}

fn load_model(
    model: Option<&Path>,
    nodes: Option<&Path>,
    features: Option<&Path>,
) -> Result<ModelDump> {
    match (model, nodes, features) {
        (Some(model), _, _) => ModelReader::new(model)
            .read()
            .with_context(|| format!("failed to read model dump {}", model.display())),
        (None, Some(nodes), Some(features)) => {
            let nodes = NodeTableReader::new(nodes)
                .read()
                .context("failed to read node table")?;
            let features = FeatureTableReader::new(features)
                .read()
                .context("failed to read feature table")?;
            Ok(ModelDump::from_tables(nodes, features))
        }
        _ => anyhow::bail!("either --model or both --nodes and --features are required"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Export {
            model,
            nodes,
            features,
            output_dir,
            filename,
            node_type,
            class_show,
            colors,
            tooltip,
            max_label_length,
            node_height,
            layout,
        } => {
            let node_type: NodeType = node_type.parse().context("invalid --node-type")?;
            let colors: ColorScheme = colors.parse().context("invalid --colors")?;
            let layout = parse_layout(&layout)?;
            let filename = OutputName::new(filename).context("invalid --filename")?;

            let dump = load_model(model.as_deref(), nodes.as_deref(), features.as_deref())?;
            info!(
                n_trees = dump.n_trees(),
                n_features = dump.feature_names().len(),
                n_classes = dump.class_labels().len(),
                "model loaded"
            );

            let config =
                ExportConfig::new(dump.feature_names().to_vec(), dump.class_labels().to_vec())
                    .with_node_type(node_type)
                    .with_class_show(ClassShow::from(class_show))
                    .with_colors(colors)
                    .with_tooltip(tooltip)
                    .with_max_label_length(max_label_length)
                    .with_node_height(node_height);

            let writer =
                ExportWriter::new(&output_dir).context("failed to prepare output directory")?;
            let forest = dump.n_trees() > 1;

            let documents = dump
                .trees()
                .par_iter()
                .enumerate()
                .map(|(i, tree)| -> Result<DocumentOutput> {
                    let export = config
                        .export(&tree.encoding, dump.importances(i))
                        .with_context(|| format!("failed to export tree {i}"))?;
                    let name = if forest {
                        filename.indexed(i)
                    } else {
                        filename.clone()
                    };
                    let path = writer
                        .write(&export, &name, layout)
                        .with_context(|| format!("failed to write tree {i}"))?;
                    debug!(tree = i, path = %path.display(), "tree exported");
                    Ok(DocumentOutput {
                        tree: i,
                        path,
                        n_leaves: export.data.n_leaves(),
                        n_internal: export.data.n_internal(),
                        depth: export.data.depth(),
                        max_path_len: max_path_len(&export.decision_paths),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            info!(n_documents = documents.len(), "export complete");

            let output = ExportOutput {
                n_trees: dump.n_trees(),
                n_features: dump.feature_names().len(),
                n_classes: dump.class_labels().len(),
                layout: layout_name(layout),
                documents,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Paths { document, sort_by } => {
            let (export, layout) = DocumentReader::new(&document)
                .read()
                .with_context(|| format!("failed to read document {}", document.display()))?;
            debug!(layout = layout_name(layout), "document loaded");

            let order = parse_sort_by(&sort_by, &export.opts.class_labels)?;
            let paths = decision_paths(&export.data);
            let rows = rank_paths(&paths, &export.leaf_values, order)
                .context("failed to rank decision paths")?;

            info!(n_rows = rows.len(), "decision paths ranked");

            let output = PathsOutput {
                n_classes: export.n_classes(),
                document,
                n_leaves: rows.len(),
                max_path_len: max_path_len(&paths),
                rows,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
