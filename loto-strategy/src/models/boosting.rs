use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Nombre maximal de seuils candidats par feature.
const MAX_BINS: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Poids des exemples positifs (classes déséquilibrées : 5 sortis pour 34 non sortis).
    pub scale_pos_weight: f64,
    /// Régularisation L2 des poids de feuille.
    pub lambda: f64,
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
            scale_pos_weight: 6.0,
            lambda: 1.0,
            min_child_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum RegNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RegNode>,
        right: Box<RegNode>,
    },
}

impl RegNode {
    fn eval(&self, row: &[f64]) -> f64 {
        match self {
            RegNode::Leaf { weight } => *weight,
            RegNode::Split { feature, threshold, left, right } => {
                if row[*feature] <= *threshold {
                    left.eval(row)
                } else {
                    right.eval(row)
                }
            }
        }
    }
}

/// Classifieur binaire par gradient boosting (perte logistique, feuilles de Newton).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    params: BoostingParams,
    feature_count: usize,
    trees: Vec<RegNode>,
    gain_sum: Vec<f64>,
    split_count: Vec<usize>,
}

/// Features discrétisées : `bins[f][i]` est l'indice du seuil de la ligne i.
struct Binned {
    edges: Vec<Vec<f64>>,
    bins: Vec<Vec<u16>>,
}

impl Binned {
    fn new(x: &[Vec<f64>], feature_count: usize) -> Self {
        let mut edges = Vec::with_capacity(feature_count);
        let mut bins = Vec::with_capacity(feature_count);

        for f in 0..feature_count {
            let mut values: Vec<f64> = x.iter().map(|row| row[f]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            let feature_edges: Vec<f64> = if values.len() <= MAX_BINS {
                values
            } else {
                let mut quantiles: Vec<f64> = (0..MAX_BINS)
                    .map(|k| values[(k + 1) * values.len() / MAX_BINS - 1])
                    .collect();
                quantiles.dedup();
                quantiles
            };

            let last = feature_edges.len().saturating_sub(1);
            let column = x
                .iter()
                .map(|row| feature_edges.partition_point(|&e| e < row[f]).min(last) as u16)
                .collect();

            edges.push(feature_edges);
            bins.push(column);
        }

        Self { edges, bins }
    }
}

struct SplitCandidate {
    gain: f64,
    feature: usize,
    bin: usize,
}

impl GradientBoosting {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &BoostingParams) -> Result<Self> {
        Self::fit_with_progress(x, y, params, |_| {})
    }

    /// `on_tree` est appelé après chaque arbre avec le nombre d'arbres construits.
    pub fn fit_with_progress<F: FnMut(usize)>(
        x: &[Vec<f64>],
        y: &[f64],
        params: &BoostingParams,
        mut on_tree: F,
    ) -> Result<Self> {
        if x.is_empty() {
            bail!("Aucune ligne d'entraînement");
        }
        if x.len() != y.len() {
            bail!("{} lignes pour {} labels", x.len(), y.len());
        }
        let feature_count = x[0].len();
        if x.iter().any(|row| row.len() != feature_count) {
            bail!("Lignes de largeurs différentes");
        }

        let mut model = Self {
            params: params.clone(),
            feature_count,
            trees: Vec::with_capacity(params.n_estimators),
            gain_sum: vec![0.0; feature_count],
            split_count: vec![0; feature_count],
        };

        let data = Binned::new(x, feature_count);
        let mut margins = vec![0.0; x.len()];
        let mut grad = vec![0.0; x.len()];
        let mut hess = vec![0.0; x.len()];

        for round in 0..params.n_estimators {
            for i in 0..x.len() {
                let p = sigmoid(margins[i]);
                let w = if y[i] > 0.5 { params.scale_pos_weight } else { 1.0 };
                grad[i] = w * (p - y[i]);
                hess[i] = (w * p * (1.0 - p)).max(1e-16);
            }

            let rows: Vec<usize> = (0..x.len()).collect();
            let tree = model.grow(&data, &grad, &hess, rows, 0);
            for (i, row) in x.iter().enumerate() {
                margins[i] += tree.eval(row);
            }
            model.trees.push(tree);
            on_tree(round + 1);
        }

        debug!(
            "boosting : {} arbres, {} lignes, {} features",
            model.trees.len(),
            x.len(),
            feature_count
        );
        Ok(model)
    }

    fn leaf_weight(&self, g: f64, h: f64) -> f64 {
        -g / (h + self.params.lambda) * self.params.learning_rate
    }

    fn grow(&mut self, data: &Binned, grad: &[f64], hess: &[f64], rows: Vec<usize>, depth: usize) -> RegNode {
        let g: f64 = rows.iter().map(|&i| grad[i]).sum();
        let h: f64 = rows.iter().map(|&i| hess[i]).sum();

        if depth >= self.params.max_depth || rows.len() < 2 {
            return RegNode::Leaf { weight: self.leaf_weight(g, h) };
        }

        let lambda = self.params.lambda;
        let score = |g: f64, h: f64| g * g / (h + lambda);
        let parent = score(g, h);
        let mut best: Option<SplitCandidate> = None;

        for f in 0..self.feature_count {
            let n_bins = data.edges[f].len();
            if n_bins < 2 {
                continue;
            }
            let mut hist_g = vec![0.0; n_bins];
            let mut hist_h = vec![0.0; n_bins];
            for &i in &rows {
                let b = data.bins[f][i] as usize;
                hist_g[b] += grad[i];
                hist_h[b] += hess[i];
            }

            let (mut gl, mut hl) = (0.0, 0.0);
            for b in 0..n_bins - 1 {
                gl += hist_g[b];
                hl += hist_h[b];
                let (gr, hr) = (g - gl, h - hl);
                if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                    continue;
                }
                let gain = score(gl, hl) + score(gr, hr) - parent;
                if gain > 1e-12 && best.as_ref().map_or(true, |s| gain > s.gain) {
                    best = Some(SplitCandidate { gain, feature: f, bin: b });
                }
            }
        }

        let Some(split) = best else {
            return RegNode::Leaf { weight: self.leaf_weight(g, h) };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| data.bins[split.feature][i] as usize <= split.bin);

        self.gain_sum[split.feature] += split.gain;
        self.split_count[split.feature] += 1;

        RegNode::Split {
            feature: split.feature,
            threshold: data.edges[split.feature][split.bin],
            left: Box::new(self.grow(data, grad, hess, left, depth + 1)),
            right: Box::new(self.grow(data, grad, hess, right, depth + 1)),
        }
    }

    pub fn predict_margin(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|tree| tree.eval(row)).sum()
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.predict_margin(row))
    }

    /// Gain moyen des splits de chaque feature, 0 pour une feature jamais utilisée.
    pub fn gain_importance(&self) -> Vec<f64> {
        self.gain_sum
            .iter()
            .zip(&self.split_count)
            .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
            .collect()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
