use anyhow::Result;
use log::info;

use loto_combo::{find_best_partition, partition, BestPartition, BettingMode, Fallback, Plan, ScoreMap, Scorer};

use crate::config::StrategyConfig;
use crate::fusion::StrategyResult;

#[derive(Debug, Clone)]
pub struct BettingSimulation {
    /// Numéros du Top-N de fusion, du meilleur au moins bon.
    pub numbers: Vec<u8>,
    pub linked: Plan<u8>,
    pub best_column: BestPartition<u8>,
    pub column: Plan<u8>,
}

/// Plan connecté sur le Top-N de fusion et meilleur plan en colonnes sur la plage configurée.
pub fn simulate_betting(result: &StrategyResult, config: &StrategyConfig) -> Result<BettingSimulation> {
    let scores = result.fusion_scores();
    let numbers = result.fusion_ranking();
    let scorer = Scorer::with_scores(&scores);

    let linked = Plan::linked(&numbers, config.pick_size, config.unit_cost, scorer)?;
    let best_column = find_best_partition(&numbers, scorer, config.group_range(), config.pick_size)?;
    let column = Plan::from_combinations(
        BettingMode::Column,
        best_column.combinations.clone(),
        config.unit_cost,
        scorer,
    )?;

    info!(
        "mise simulée : {} combinaisons connectées, {} en {} colonnes",
        linked.total_combos, column.total_combos, best_column.group_count
    );

    Ok(BettingSimulation { numbers, linked, best_column, column })
}

#[derive(Debug, Clone)]
pub struct CustomColumns {
    pub groups: Vec<Vec<u8>>,
    pub plan: Plan<u8>,
}

/// Colonnes libres sur les numéros saisis, répartis dans l'ordre naturel.
/// Sans scores, une combinaison vaut la moyenne de ses numéros.
pub fn custom_column_plan(
    numbers: &[u8],
    group_count: usize,
    k: usize,
    unit_cost: u64,
    scores: Option<&ScoreMap<u8>>,
) -> Result<CustomColumns> {
    let groups = partition(numbers, group_count)?;
    let scorer = match scores {
        Some(scores) => Scorer::with_scores(scores),
        None => Scorer::without_scores(Fallback::ItemValue),
    };
    let plan = Plan::grouped(&groups, k, unit_cost, scorer)?;
    Ok(CustomColumns { groups, plan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::ScoredNumber;

    fn strategy() -> StrategyResult {
        let scored = (1..=39u8)
            .map(|n| ScoredNumber {
                number: n,
                score: 0.0,
                condition: false,
                prob: 0.0,
                gain_score: 0.0,
                auto_score: 0.0,
                fusion_score: n as f64 / 39.0,
            })
            .collect();
        StrategyResult::build(scored, 10)
    }

    #[test]
    fn test_simulate_betting_defaults() {
        let config = StrategyConfig::default();
        let sim = simulate_betting(&strategy(), &config).unwrap();
        assert_eq!(sim.numbers, vec![39, 38, 37, 36, 35, 34, 33, 32, 31, 30]);
        // C(10,3)
        assert_eq!(sim.linked.total_combos, 120);
        assert_eq!(sim.linked.total_cost, 120 * 50);
        assert!((3..=6).contains(&sim.best_column.group_count));
        assert_eq!(sim.column.total_combos, sim.best_column.combinations.len());
        assert_eq!(sim.column.mode, BettingMode::Column);
        for combo in &sim.column.combinations {
            assert_eq!(combo.len(), 3);
        }
    }

    #[test]
    fn test_unit_cost_overflow_is_reported() {
        let config = StrategyConfig { unit_cost: u64::MAX / 2, ..StrategyConfig::default() };
        let err = simulate_betting(&strategy(), &config).unwrap_err();
        assert!(err.to_string().contains("coût total trop élevé"));
    }

    #[test]
    fn test_custom_columns_natural_order() {
        let custom = custom_column_plan(&[12, 3, 7, 25, 18, 30], 3, 2, 50, None).unwrap();
        assert_eq!(custom.groups, vec![vec![3, 18], vec![7, 25], vec![12, 30]]);
        // 3 paires de colonnes × 2 × 2
        assert_eq!(custom.plan.total_combos, 12);
        assert_eq!(custom.plan.total_cost, 600);
        assert!(custom.plan.aggregate_score > 0.0);
    }

    #[test]
    fn test_custom_columns_too_few_groups() {
        assert!(custom_column_plan(&[1, 2, 3, 4], 2, 3, 50, None).is_err());
    }
}
