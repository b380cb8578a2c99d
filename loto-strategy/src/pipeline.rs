use anyhow::{bail, Result};
use log::info;

use loto_db::models::Draw;

use crate::config::StrategyConfig;
use crate::features::{build_feature_table, upcoming_features, FeatureRow};
use crate::fusion::{score_rows, StrategyResult};
use crate::models::boosting::GradientBoosting;

pub fn training_set(table: &[FeatureRow]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = table.iter().map(|r| r.features.clone()).collect();
    let y = table.iter().map(|r| r.label).collect();
    (x, y)
}

/// Entraîne le classifieur sur la table construite depuis l'historique (draws[0] = le plus récent).
pub fn train_model<F: FnMut(usize)>(draws: &[Draw], config: &StrategyConfig, on_tree: F) -> Result<GradientBoosting> {
    let table = build_feature_table(draws, config.feature_rows);
    if table.is_empty() {
        bail!("Au moins deux tirages sont nécessaires pour entraîner le modèle");
    }
    let (x, y) = training_set(&table);
    info!("entraînement sur {} lignes", table.len());
    GradientBoosting::fit_with_progress(&x, &y, &config.boosting, on_tree)
}

/// Sélections pour le prochain tirage.
pub fn run_strategy(draws: &[Draw], model: &GradientBoosting, config: &StrategyConfig) -> StrategyResult {
    let rows = upcoming_features(draws);
    let scored = score_rows(&rows, model, &config.condition, &config.fusion);
    StrategyResult::build(scored, config.top_n)
}
