use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use log::info;
use rayon::prelude::*;
use serde::Serialize;

use loto_db::models::Draw;

use crate::config::StrategyConfig;
use crate::features::{group_by_date, FeatureRow};
use crate::fusion::{score_rows, Selection, StrategyResult};
use crate::models::boosting::GradientBoosting;

#[derive(Debug, Clone, Serialize)]
pub struct HitRateReport {
    pub periods: usize,
    pub total_hits: usize,
    pub average_hits: f64,
    /// nombre de numéros trouvés -> nombre de tirages
    pub distribution: BTreeMap<usize, usize>,
}

/// Combien de numéros de `selected` sortent à chaque tirage.
pub fn hit_rate(draws: &[Draw], selected: &BTreeSet<u8>) -> HitRateReport {
    let mut distribution: BTreeMap<usize, usize> = BTreeMap::new();
    let mut total_hits = 0;
    for draw in draws {
        let hits = draw.numbers.iter().filter(|&&n| selected.contains(&n)).count();
        total_hits += hits;
        *distribution.entry(hits).or_insert(0) += 1;
    }
    HitRateReport {
        periods: draws.len(),
        total_hits,
        average_hits: if draws.is_empty() { 0.0 } else { total_hits as f64 / draws.len() as f64 },
        distribution,
    }
}

/// Nombre de colonnes dont au moins un numéro est sorti.
pub fn groups_touched(draw: &Draw, groups: &[Vec<u8>]) -> usize {
    groups
        .iter()
        .filter(|group| group.iter().any(|&n| draw.contains(n)))
        .count()
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnHitReport {
    pub periods: usize,
    pub k: usize,
    /// Tirages touchant au moins `k` colonnes.
    pub successes: usize,
    pub rate: f64,
    pub distribution: BTreeMap<usize, usize>,
    /// Premiers tirages (chronologiques) touchant exactement `touched` colonnes.
    pub preview: Vec<Draw>,
}

pub fn column_hit_rate(
    chronological: &[Draw],
    groups: &[Vec<u8>],
    k: usize,
    touched: usize,
    preview_limit: usize,
) -> ColumnHitReport {
    let mut distribution: BTreeMap<usize, usize> = BTreeMap::new();
    let mut preview = Vec::new();
    for draw in chronological {
        let hit = groups_touched(draw, groups);
        *distribution.entry(hit).or_insert(0) += 1;
        if hit == touched && preview.len() < preview_limit {
            preview.push(draw.clone());
        }
    }
    let successes: usize = distribution.range(k..).map(|(_, count)| count).sum();
    ColumnHitReport {
        periods: chronological.len(),
        k,
        successes,
        rate: if chronological.is_empty() { 0.0 } else { successes as f64 / chronological.len() as f64 },
        distribution,
        preview,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupHit {
    pub date: String,
    /// Numéros sortis présents dans les colonnes.
    pub hit_numbers: Vec<u8>,
    pub numbers: [u8; 5],
}

/// Derniers tirages (draws[0] = le plus récent) touchant exactement `touched` colonnes.
pub fn latest_group_hits(draws: &[Draw], groups: &[Vec<u8>], touched: usize, limit: usize) -> Vec<GroupHit> {
    let covered: BTreeSet<u8> = groups.iter().flatten().copied().collect();
    draws
        .iter()
        .filter(|draw| groups_touched(draw, groups) == touched)
        .take(limit)
        .map(|draw| GroupHit {
            date: draw.date.clone(),
            hit_numbers: draw.numbers.iter().copied().filter(|n| covered.contains(n)).collect(),
            numbers: draw.numbers,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct IntervalReport {
    /// (indice chronologique, date) des tirages concernés.
    pub hits: Vec<(usize, String)>,
    /// Écarts en tirages entre deux occurrences consécutives.
    pub intervals: Vec<usize>,
    pub mean_interval: Option<f64>,
}

pub fn group_hit_intervals(chronological: &[Draw], groups: &[Vec<u8>], touched: usize) -> IntervalReport {
    let hits: Vec<(usize, String)> = chronological
        .iter()
        .enumerate()
        .filter(|(_, draw)| groups_touched(draw, groups) == touched)
        .map(|(i, draw)| (i, draw.date.clone()))
        .collect();
    let intervals: Vec<usize> = hits.windows(2).map(|w| w[1].0 - w[0].0).collect();
    let mean_interval = if intervals.is_empty() {
        None
    } else {
        Some(intervals.iter().sum::<usize>() as f64 / intervals.len() as f64)
    };
    IntervalReport { hits, intervals, mean_interval }
}

#[derive(Debug, Clone, Serialize)]
pub struct FusionBacktest {
    pub periods: usize,
    pub hit_periods: usize,
    pub hit_rate: f64,
    pub mean_hits: f64,
    /// Écart-type d'échantillon (n - 1), 0 sous deux tirages.
    pub std_hits: f64,
    pub per_date: Vec<(String, usize)>,
}

/// Sélections rejouées pour chaque date de la table ; un modèle unique entraîné sur toute la table.
pub fn fusion_backtest(
    table: &[FeatureRow],
    model: &GradientBoosting,
    config: &StrategyConfig,
) -> Result<FusionBacktest> {
    if table.is_empty() {
        bail!("Table de features vide");
    }

    let selections = [Selection::TopN, Selection::Condition, Selection::Model, Selection::Gain];
    let groups = group_by_date(table);

    let per_date: Vec<(String, usize)> = groups
        .par_iter()
        .map(|(date, rows)| {
            let owned: Vec<FeatureRow> = rows.iter().map(|r| (*r).clone()).collect();
            let scored = score_rows(&owned, model, &config.condition, &config.fusion);
            let result = StrategyResult::build(scored, config.top_n);
            let chosen = result.union_of(&selections);
            let hits = owned
                .iter()
                .filter(|r| r.label == 1.0 && chosen.contains(&r.number))
                .count();
            (date.to_string(), hits)
        })
        .collect();

    let periods = per_date.len();
    let hits: Vec<f64> = per_date.iter().map(|(_, h)| *h as f64).collect();
    let hit_periods = per_date.iter().filter(|(_, h)| *h > 0).count();
    let mean_hits = hits.iter().sum::<f64>() / periods as f64;
    let std_hits = if periods > 1 {
        (hits.iter().map(|h| (h - mean_hits).powi(2)).sum::<f64>() / (periods - 1) as f64).sqrt()
    } else {
        0.0
    };

    info!("backtest fusion : {} tirages, {} avec au moins un numéro", periods, hit_periods);

    Ok(FusionBacktest {
        periods,
        hit_periods,
        hit_rate: hit_periods as f64 / periods as f64,
        mean_hits,
        std_hits,
        per_date,
    })
}
