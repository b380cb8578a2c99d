use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Forêt aléatoire de classification binaire (impureté de Gini, bootstrap,
/// sous-ensemble aléatoire de features à chaque nœud).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees: usize,
    max_depth: usize,
    trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize) -> Self {
        Self { n_trees, max_depth, trees: Vec::new() }
    }

    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[f64], seed: u64) {
        self.trees.clear();
        if features.is_empty() {
            return;
        }

        let n_features = features[0].len();
        let features_per_split = ((n_features as f64).sqrt().ceil() as usize).max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let n_samples = features.len();

        for _ in 0..self.n_trees {
            // Bootstrap sampling
            let indices: Vec<usize> = (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect();
            let boot_features: Vec<&Vec<f64>> = indices.iter().map(|&i| &features[i]).collect();
            let boot_labels: Vec<f64> = indices.iter().map(|&i| labels[i]).collect();

            let tree = build_tree(&boot_features, &boot_labels, self.max_depth, features_per_split, &mut rng);
            self.trees.push(tree);
        }
    }

    /// Probabilité de la classe positive, moyenne des feuilles. 0 sans entraînement.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|tree| predict_tree(tree, features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf { value: f64 },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

fn mean(labels: &[f64]) -> f64 {
    labels.iter().sum::<f64>() / labels.len().max(1) as f64
}

fn build_tree(
    features: &[&Vec<f64>],
    labels: &[f64],
    max_depth: usize,
    features_per_split: usize,
    rng: &mut StdRng,
) -> TreeNode {
    if max_depth == 0 || labels.len() < 4 {
        return TreeNode::Leaf { value: mean(labels) };
    }

    let first = labels[0];
    if labels.iter().all(|&l| (l - first).abs() < 1e-10) {
        return TreeNode::Leaf { value: first };
    }

    let n_features = features[0].len();
    let mut feature_indices: Vec<usize> = (0..n_features).collect();
    feature_indices.shuffle(rng);
    feature_indices.truncate(features_per_split);

    let mut best_gini = f64::MAX;
    let mut best_feature = 0;
    let mut best_threshold = 0.0;

    for &feat_idx in &feature_indices {
        let mut values: Vec<f64> = features.iter().map(|f| f[feat_idx]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        if values.len() < 2 {
            continue;
        }

        // Seuils échantillonnés entre valeurs consécutives
        let step = (values.len() / 10).max(1);
        for i in (0..values.len() - 1).step_by(step) {
            let threshold = (values[i] + values[i + 1]) / 2.0;
            let gini = split_gini(features, labels, feat_idx, threshold);

            if gini < best_gini {
                best_gini = gini;
                best_feature = feat_idx;
                best_threshold = threshold;
            }
        }
    }

    if best_gini >= gini_impurity(labels) {
        return TreeNode::Leaf { value: mean(labels) };
    }

    let mut left_features = Vec::new();
    let mut left_labels = Vec::new();
    let mut right_features = Vec::new();
    let mut right_labels = Vec::new();

    for (i, feat) in features.iter().enumerate() {
        if feat[best_feature] <= best_threshold {
            left_features.push(*feat);
            left_labels.push(labels[i]);
        } else {
            right_features.push(*feat);
            right_labels.push(labels[i]);
        }
    }

    if left_features.is_empty() || right_features.is_empty() {
        return TreeNode::Leaf { value: mean(labels) };
    }

    TreeNode::Split {
        feature_idx: best_feature,
        threshold: best_threshold,
        left: Box::new(build_tree(&left_features, &left_labels, max_depth - 1, features_per_split, rng)),
        right: Box::new(build_tree(&right_features, &right_labels, max_depth - 1, features_per_split, rng)),
    }
}

fn gini_impurity(labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let p = mean(labels);
    2.0 * p * (1.0 - p)
}

fn split_gini(features: &[&Vec<f64>], labels: &[f64], feature_idx: usize, threshold: f64) -> f64 {
    let (mut n_left, mut sum_left) = (0.0, 0.0);
    let (mut n_right, mut sum_right) = (0.0, 0.0);

    for (i, feat) in features.iter().enumerate() {
        if feat[feature_idx] <= threshold {
            n_left += 1.0;
            sum_left += labels[i];
        } else {
            n_right += 1.0;
            sum_right += labels[i];
        }
    }

    if n_left == 0.0 || n_right == 0.0 {
        return f64::MAX;
    }

    let gini = |n: f64, s: f64| {
        let p = s / n;
        2.0 * p * (1.0 - p)
    };
    let n = n_left + n_right;
    (n_left / n) * gini(n_left, sum_left) + (n_right / n) * gini(n_right, sum_right)
}

fn predict_tree(node: &TreeNode, features: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split { feature_idx, threshold, left, right } => {
            if features[*feature_idx] <= *threshold {
                predict_tree(left, features)
            } else {
                predict_tree(right, features)
            }
        }
    }
}
