//! Criterion benchmarks for canopy-tree: reconstruction and path derivation.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use canopy_tree::{ColorScheme, ExportConfig, FlatTree, LEAF_SENTINEL, decision_paths, reconstruct};

/// Grow a complete binary tree of the given depth in pre-order layout.
fn make_tree(depth: usize, n_features: usize, n_classes: usize, seed: u64) -> FlatTree {
    fn grow(
        rng: &mut ChaCha8Rng,
        depth: usize,
        n_features: usize,
        n_classes: usize,
        arrays: &mut (Vec<i64>, Vec<f64>, Vec<Vec<Vec<f64>>>, Vec<f64>),
    ) -> Vec<f64> {
        let idx = arrays.0.len();
        arrays.0.push(LEAF_SENTINEL);
        arrays.1.push(-2.0);
        arrays.2.push(Vec::new());
        arrays.3.push(rng.r#gen::<f64>() * 0.5);
        let counts: Vec<f64> = if depth == 0 {
            (0..n_classes).map(|_| rng.gen_range(0..50) as f64).collect()
        } else {
            arrays.0[idx] = rng.gen_range(0..n_features) as i64;
            arrays.1[idx] = rng.r#gen::<f64>() * 100.0;
            let left = grow(rng, depth - 1, n_features, n_classes, arrays);
            let right = grow(rng, depth - 1, n_features, n_classes, arrays);
            left.iter().zip(&right).map(|(a, b)| a + b).collect()
        };
        arrays.2[idx] = vec![counts.clone()];
        counts
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut arrays = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    grow(&mut rng, depth, n_features, n_classes, &mut arrays);
    FlatTree::new(arrays.0, arrays.1, arrays.2, arrays.3).unwrap()
}

fn names(n: usize, prefix: &str) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn bench_reconstruct(c: &mut Criterion) {
    let tree = make_tree(14, 20, 5, 42);
    let features = names(20, "f");
    let colors = ColorScheme::Default.resolve(5).unwrap();

    c.bench_function("reconstruct_depth14_5class", |b| {
        b.iter(|| reconstruct(&tree, &features, &colors).unwrap());
    });
}

fn bench_decision_paths(c: &mut Criterion) {
    let tree = make_tree(14, 20, 5, 42);
    let colors = ColorScheme::Default.resolve(5).unwrap();
    let out = reconstruct(&tree, &names(20, "f"), &colors).unwrap();

    c.bench_function("decision_paths_depth14", |b| {
        b.iter(|| decision_paths(&out.root));
    });
}

fn bench_export(c: &mut Criterion) {
    let tree = make_tree(12, 20, 3, 7);
    let config = ExportConfig::new(names(20, "f"), names(3, "class"));
    let importances = vec![0.05; 20];

    c.bench_function("export_depth12_3class", |b| {
        b.iter(|| config.export(&tree, &importances).unwrap());
    });
}

criterion_group!(benches, bench_reconstruct, bench_decision_paths, bench_export);
criterion_main!(benches);
