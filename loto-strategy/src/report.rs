use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use loto_combo::Plan;
use loto_db::models::Draw;

use crate::betting::BettingSimulation;
use crate::fusion::{Selection, StrategyResult};
use crate::rl::RlOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraw {
    pub date: String,
    pub numbers: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainEntry {
    pub feature: String,
    pub gain: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionEntry {
    pub number: u8,
    pub fusion_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub count: usize,
    pub avg_score: f64,
    pub total_cost: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_count: Option<usize>,
}

impl PlanSummary {
    fn from_plan(plan: &Plan<u8>, group_count: Option<usize>) -> Self {
        Self {
            count: plan.total_combos,
            avg_score: plan.aggregate_score,
            total_cost: plan.total_cost,
            group_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<ReportDraw>,
    pub model_gain_top5: Vec<GainEntry>,
    pub fusion_top10: Vec<FusionEntry>,
    pub strategy_sources: BTreeMap<String, usize>,
    pub linked: PlanSummary,
    pub column: PlanSummary,
    pub rl_top10: Vec<u8>,
    pub rl_reward_last10: Vec<f64>,
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub fn build_report(
    timestamp: String,
    draw: Option<&Draw>,
    gain_table: &[(String, f64)],
    strategy: &StrategyResult,
    betting: &BettingSimulation,
    rl: &RlOutcome,
) -> Report {
    let scores = strategy.fusion_scores();
    let fusion_top10 = strategy
        .fusion_ranking()
        .into_iter()
        .take(10)
        .map(|number| FusionEntry {
            number,
            fusion_score: scores.get(&number).copied().unwrap_or(0.0),
        })
        .collect();

    let strategy_sources = Selection::ALL
        .iter()
        .map(|s| (s.name().to_string(), strategy.selection(*s).len()))
        .collect();

    let skip = rl.reward_history.len().saturating_sub(10);

    Report {
        timestamp,
        draw: draw.map(|d| ReportDraw { date: d.date.clone(), numbers: d.numbers.to_vec() }),
        model_gain_top5: gain_table
            .iter()
            .take(5)
            .map(|(feature, gain)| GainEntry { feature: feature.clone(), gain: *gain })
            .collect(),
        fusion_top10,
        strategy_sources,
        linked: PlanSummary::from_plan(&betting.linked, None),
        column: PlanSummary::from_plan(&betting.column, Some(betting.best_column.group_count)),
        rl_top10: rl.top_numbers.clone(),
        rl_reward_last10: rl.reward_history[skip..].iter().map(|r| round3(*r)).collect(),
    }
}

pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire le rapport {:?}", path))?;
    Ok(())
}
