use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use loto_combo::ScoreMap;

use crate::features::{idx, FeatureRow, FEATURE_NAMES};
use crate::models::boosting::GradientBoosting;

/// Pondération manuelle du score Top-N.
pub const MANUAL_WEIGHTS: &[(usize, f64)] = &[
    (idx::IS_HOT_TAIL, 1.2),
    (idx::IS_RECENT_HOT, 1.0),
    (idx::MOMENTUM, 0.8),
    (idx::DRAW_STREAK, 0.6),
    (idx::FREQ_20, 0.5),
    (idx::TAIL_FREQ_10, 0.3),
    (idx::COOLDOWN, -0.2),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionThresholds {
    pub momentum_at_least: f64,
    pub cooldown_below: f64,
    pub score_at_least: f64,
}

impl Default for ConditionThresholds {
    fn default() -> Self {
        Self {
            momentum_at_least: -1.0,
            cooldown_below: 15.0,
            score_at_least: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub auto: f64,
    pub prob: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { auto: 0.5, prob: 0.5 }
    }
}

pub fn manual_score(row: &FeatureRow) -> f64 {
    MANUAL_WEIGHTS.iter().map(|&(i, w)| w * row.get(i)).sum()
}

/// Numéro à unité chaude, sans chute de dynamique, sorti récemment et bien noté.
pub fn passes_condition(row: &FeatureRow, score: f64, thresholds: &ConditionThresholds) -> bool {
    row.get(idx::IS_HOT_TAIL) == 1.0
        && row.get(idx::MOMENTUM) >= thresholds.momentum_at_least
        && row.get(idx::COOLDOWN) < thresholds.cooldown_below
        && score >= thresholds.score_at_least
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredNumber {
    pub number: u8,
    pub score: f64,
    pub condition: bool,
    pub prob: f64,
    pub gain_score: f64,
    pub auto_score: f64,
    pub fusion_score: f64,
}

/// Poids de gain normalisés pour sommer à 1 (tous nuls si le modèle n'a aucun split).
pub fn normalized_gains(gains: &[f64]) -> Vec<f64> {
    let total: f64 = gains.iter().sum();
    if total > 0.0 {
        gains.iter().map(|g| g / total).collect()
    } else {
        vec![0.0; gains.len()]
    }
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

pub fn score_rows(
    rows: &[FeatureRow],
    model: &GradientBoosting,
    thresholds: &ConditionThresholds,
    weights: &FusionWeights,
) -> Vec<ScoredNumber> {
    let gains = model.gain_importance();
    let auto_weights = normalized_gains(&gains);

    rows.iter()
        .map(|row| {
            let score = manual_score(row);
            let prob = model.predict_proba(&row.features);
            let auto_score = dot(&auto_weights, &row.features);
            ScoredNumber {
                number: row.number,
                score,
                condition: passes_condition(row, score, thresholds),
                prob,
                gain_score: dot(&gains, &row.features),
                auto_score,
                fusion_score: weights.auto * auto_score + weights.prob * prob,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Selection {
    TopN,
    Condition,
    Model,
    Gain,
    Fusion,
}

impl Selection {
    pub const ALL: [Selection; 5] = [
        Selection::TopN,
        Selection::Condition,
        Selection::Model,
        Selection::Gain,
        Selection::Fusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Selection::TopN => "Top-N",
            Selection::Condition => "Condition",
            Selection::Model => "Modèle",
            Selection::Gain => "Gain",
            Selection::Fusion => "Fusion",
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Les `n` meilleurs numéros selon `key`, du meilleur au moins bon (à égalité, le plus petit numéro).
pub fn ranked_by<F>(scored: &[ScoredNumber], n: usize, key: F) -> Vec<u8>
where
    F: Fn(&ScoredNumber) -> f64,
{
    let mut sorted: Vec<&ScoredNumber> = scored.iter().collect();
    sorted.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });
    sorted.into_iter().take(n).map(|s| s.number).collect()
}

#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub scored: Vec<ScoredNumber>,
    pub selections: BTreeMap<Selection, BTreeSet<u8>>,
    top_n: usize,
}

impl StrategyResult {
    pub fn build(scored: Vec<ScoredNumber>, top_n: usize) -> Self {
        let mut selections = BTreeMap::new();
        selections.insert(Selection::TopN, ranked_by(&scored, top_n, |s| s.score).into_iter().collect());
        selections.insert(
            Selection::Condition,
            scored.iter().filter(|s| s.condition).map(|s| s.number).collect(),
        );
        selections.insert(Selection::Model, ranked_by(&scored, top_n, |s| s.prob).into_iter().collect());
        selections.insert(Selection::Gain, ranked_by(&scored, top_n, |s| s.gain_score).into_iter().collect());
        selections.insert(Selection::Fusion, ranked_by(&scored, top_n, |s| s.fusion_score).into_iter().collect());
        Self { scored, selections, top_n }
    }

    pub fn selection(&self, selection: Selection) -> &BTreeSet<u8> {
        &self.selections[&selection]
    }

    /// Pour chaque numéro retenu, les stratégies qui l'ont choisi.
    pub fn sources(&self) -> BTreeMap<u8, Vec<Selection>> {
        let mut sources: BTreeMap<u8, Vec<Selection>> = BTreeMap::new();
        for (&selection, numbers) in &self.selections {
            for &n in numbers {
                sources.entry(n).or_default().push(selection);
            }
        }
        sources
    }

    pub fn union_of(&self, selections: &[Selection]) -> BTreeSet<u8> {
        selections
            .iter()
            .flat_map(|s| self.selection(*s).iter().copied())
            .collect()
    }

    pub fn fusion_scores(&self) -> ScoreMap<u8> {
        self.scored.iter().map(|s| (s.number, s.fusion_score)).collect()
    }

    /// Top-N par score de fusion, dans l'ordre décroissant.
    pub fn fusion_ranking(&self) -> Vec<u8> {
        ranked_by(&self.scored, self.top_n, |s| s.fusion_score)
    }

    pub fn scored_number(&self, number: u8) -> Option<&ScoredNumber> {
        self.scored.iter().find(|s| s.number == number)
    }
}

/// Gains par feature triés par ordre décroissant, features inutilisées exclues.
pub fn gain_table(model: &GradientBoosting) -> Vec<(String, f64)> {
    let mut table: Vec<(String, f64)> = FEATURE_NAMES
        .iter()
        .zip(model.gain_importance())
        .filter(|(_, gain)| *gain > 0.0)
        .map(|(name, gain)| (name.to_string(), gain))
        .collect();
    table.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    table
}

pub fn write_gain_csv(table: &[(String, f64)], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    writer.write_record(["feature", "gain"])?;
    for (feature, gain) in table {
        writer.write_record([feature.clone(), format!("{:.6}", gain)])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build_feature_table, upcoming_features};
    use crate::make_test_draws;
    use crate::models::boosting::BoostingParams;

    fn row(features: Vec<f64>) -> FeatureRow {
        FeatureRow { date: "2024-01-01".to_string(), number: 1, features, label: 0.0 }
    }

    fn sample_features() -> Vec<f64> {
        // streak, gap, cooldown, momentum, f10, f20, f30, tail, zone, tail_f10, hot_tail, combo, recent_hot
        vec![1.0, 2.0, 0.0, 1.0, 3.0, 4.0, 5.0, 1.0, 0.0, 6.0, 1.0, 1.0, 1.0]
    }

    #[test]
    fn test_manual_score() {
        let r = row(sample_features());
        // 1.2 + 1.0 + 0.8 + 0.6 + 2.0 + 1.8 - 0
        assert!((manual_score(&r) - 7.4).abs() < 1e-9);
    }

    #[test]
    fn test_condition() {
        let thresholds = ConditionThresholds::default();
        let r = row(sample_features());
        assert!(passes_condition(&r, 7.4, &thresholds));
        assert!(!passes_condition(&r, 1.0, &thresholds));

        let mut cold = sample_features();
        cold[idx::IS_HOT_TAIL] = 0.0;
        assert!(!passes_condition(&row(cold), 7.4, &thresholds));

        let mut stale = sample_features();
        stale[idx::COOLDOWN] = 15.0;
        assert!(!passes_condition(&row(stale), 7.4, &thresholds));

        let mut falling = sample_features();
        falling[idx::MOMENTUM] = -2.0;
        assert!(!passes_condition(&row(falling), 7.4, &thresholds));
    }

    #[test]
    fn test_normalized_gains() {
        assert_eq!(normalized_gains(&[1.0, 3.0]), vec![0.25, 0.75]);
        assert_eq!(normalized_gains(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    fn scored(number: u8, score: f64, fusion: f64) -> ScoredNumber {
        ScoredNumber {
            number,
            score,
            condition: number % 2 == 0,
            prob: fusion,
            gain_score: score,
            auto_score: fusion,
            fusion_score: fusion,
        }
    }

    #[test]
    fn test_ranked_by_ties_smallest_first() {
        let items = vec![scored(3, 1.0, 0.5), scored(1, 1.0, 0.9), scored(2, 2.0, 0.9)];
        assert_eq!(ranked_by(&items, 2, |s| s.score), vec![2, 1]);
        assert_eq!(ranked_by(&items, 3, |s| s.fusion_score), vec![1, 2, 3]);
    }

    #[test]
    fn test_strategy_sources() {
        let items: Vec<ScoredNumber> = (1..=6).map(|n| scored(n, n as f64, 1.0 / n as f64)).collect();
        let result = StrategyResult::build(items, 2);
        assert_eq!(result.selection(Selection::TopN), &BTreeSet::from([5, 6]));
        assert_eq!(result.selection(Selection::Fusion), &BTreeSet::from([1, 2]));
        assert_eq!(result.selection(Selection::Condition), &BTreeSet::from([2, 4, 6]));
        assert_eq!(result.fusion_ranking(), vec![1, 2]);

        let sources = result.sources();
        assert_eq!(sources[&6], vec![Selection::TopN, Selection::Condition, Selection::Gain]);
        assert_eq!(sources[&1], vec![Selection::Model, Selection::Fusion]);
        assert!(!sources.contains_key(&3));

        let union = result.union_of(&[Selection::TopN, Selection::Model]);
        assert_eq!(union, BTreeSet::from([1, 2, 5, 6]));
        assert_eq!(result.fusion_scores()[&2], 0.5);
    }

    #[test]
    fn test_scoring_with_trained_model() {
        let draws = make_test_draws(60);
        let table = build_feature_table(&draws, 40);
        let x: Vec<Vec<f64>> = table.iter().map(|r| r.features.clone()).collect();
        let y: Vec<f64> = table.iter().map(|r| r.label).collect();
        let params = BoostingParams { n_estimators: 10, max_depth: 3, ..BoostingParams::default() };
        let model = GradientBoosting::fit(&x, &y, &params).unwrap();

        let rows = upcoming_features(&draws);
        let scored = score_rows(&rows, &model, &ConditionThresholds::default(), &FusionWeights::default());
        assert_eq!(scored.len(), 39);
        for s in &scored {
            assert!((0.0..=1.0).contains(&s.prob));
            assert!((s.fusion_score - (0.5 * s.auto_score + 0.5 * s.prob)).abs() < 1e-12);
        }

        let result = StrategyResult::build(scored, 10);
        assert_eq!(result.selection(Selection::Fusion).len(), 10);
        assert!(!gain_table(&model).is_empty());
    }
}
