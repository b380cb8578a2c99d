pub mod compute;
pub mod export;

use loto_db::models::Draw;

pub const FEATURE_NAMES: &[&str] = &[
    "draw_streak",
    "last_draw_gap",
    "cooldown",
    "momentum",
    "freq_10",
    "freq_20",
    "freq_30",
    "tail_digit",
    "zone",
    "tail_freq_10",
    "is_hot_tail",
    "streak_cooldown_combo",
    "is_recent_hot",
];

/// Positions dans `FeatureRow::features`.
pub mod idx {
    pub const DRAW_STREAK: usize = 0;
    pub const LAST_DRAW_GAP: usize = 1;
    pub const COOLDOWN: usize = 2;
    pub const MOMENTUM: usize = 3;
    pub const FREQ_10: usize = 4;
    pub const FREQ_20: usize = 5;
    pub const FREQ_30: usize = 6;
    pub const TAIL_DIGIT: usize = 7;
    pub const ZONE: usize = 8;
    pub const TAIL_FREQ_10: usize = 9;
    pub const IS_HOT_TAIL: usize = 10;
    pub const STREAK_COOLDOWN_COMBO: usize = 11;
    pub const IS_RECENT_HOT: usize = 12;
}

/// Libellé de date des lignes construites pour le prochain tirage.
pub const UPCOMING_DATE: &str = "prochain";

#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub date: String,
    pub number: u8,
    pub features: Vec<f64>,
    /// 1.0 si le numéro est sorti au tirage cible.
    pub label: f64,
}

impl FeatureRow {
    pub fn get(&self, index: usize) -> f64 {
        self.features[index]
    }
}

pub fn extract_features_for_draw(draws: &[Draw], target_draw_idx: usize) -> Vec<FeatureRow> {
    compute::extract_features_for_draw(draws, target_draw_idx)
}

/// Table d'entraînement : une ligne par (tirage, numéro), au plus `max_rows` tirages cibles
/// en partant du plus récent. Chaque cible a au moins un tirage d'historique.
pub fn build_feature_table(draws: &[Draw], max_rows: usize) -> Vec<FeatureRow> {
    let targets = draws.len().saturating_sub(1).min(max_rows);
    (0..targets)
        .flat_map(|t| compute::extract_features_for_draw(draws, t))
        .collect()
}

/// Lignes du prochain tirage : tout l'historique est disponible, label à 0.
pub fn upcoming_features(draws: &[Draw]) -> Vec<FeatureRow> {
    compute::upcoming_features(draws)
}

/// Regroupe les lignes par date, dans l'ordre d'apparition.
pub fn group_by_date(rows: &[FeatureRow]) -> Vec<(&str, Vec<&FeatureRow>)> {
    let mut groups: Vec<(&str, Vec<&FeatureRow>)> = Vec::new();
    for row in rows {
        if let Some((date, members)) = groups.last_mut() {
            if *date == row.date.as_str() {
                members.push(row);
                continue;
            }
        }
        groups.push((row.date.as_str(), vec![row]));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_draws;

    #[test]
    fn test_table_size() {
        let draws = make_test_draws(30);
        let table = build_feature_table(&draws, 10);
        assert_eq!(table.len(), 10 * 39);
        for row in &table {
            assert_eq!(row.features.len(), FEATURE_NAMES.len());
        }
    }

    #[test]
    fn test_table_capped_by_history() {
        let draws = make_test_draws(5);
        let table = build_feature_table(&draws, 100);
        assert_eq!(table.len(), 4 * 39);
    }

    #[test]
    fn test_five_labels_per_draw() {
        let draws = make_test_draws(20);
        let table = build_feature_table(&draws, 5);
        for (_, rows) in group_by_date(&table) {
            let drawn: f64 = rows.iter().map(|r| r.label).sum();
            assert_eq!(drawn, 5.0);
            assert_eq!(rows.len(), 39);
        }
    }

    #[test]
    fn test_upcoming_features() {
        let draws = make_test_draws(20);
        let rows = upcoming_features(&draws);
        assert_eq!(rows.len(), 39);
        assert!(rows.iter().all(|r| r.label == 0.0 && r.date == UPCOMING_DATE));
    }

    #[test]
    fn test_empty_draws() {
        assert!(build_feature_table(&[], 10).is_empty());
        assert_eq!(upcoming_features(&[]).len(), 39);
    }
}
