//! Simulateurs de rentabilité d'une mise progressive : le jour `d`, la mise et le gain
//! sont multipliés par `0.01 · d`. Les montants sont arrondis à l'unité (au pair le plus proche).

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitParams {
    pub unit_cost: f64,
    pub combos: u32,
    pub jackpot: f64,
    pub max_days: u32,
}

impl Default for ProfitParams {
    fn default() -> Self {
        Self {
            unit_cost: 63.1,
            combos: 448,
            jackpot: 57000.0,
            max_days: 1000,
        }
    }
}

pub fn multiplier(day: u32) -> f64 {
    day as f64 * 0.01
}

pub fn daily_cost(params: &ProfitParams, day: u32) -> i64 {
    (params.unit_cost * params.combos as f64 * multiplier(day)).round_ties_even() as i64
}

pub fn reward(params: &ProfitParams, day: u32) -> i64 {
    (params.jackpot * multiplier(day)).round_ties_even() as i64
}

fn cumulative_cost(params: &ProfitParams, days: u32) -> i64 {
    (1..=days).map(|d| daily_cost(params, d)).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOutcome {
    pub day: u32,
    pub cumulative_cost: i64,
    pub reward: i64,
    pub net_profit: i64,
}

/// Bilan si l'on gagne au jour `day` après avoir joué tous les jours précédents.
pub fn profit_on_day(params: &ProfitParams, day: u32) -> DayOutcome {
    let cumulative_cost = cumulative_cost(params, day);
    let reward = reward(params, day);
    DayOutcome { day, cumulative_cost, reward, net_profit: reward - cumulative_cost }
}

pub fn loss_if_no_win(params: &ProfitParams, days: u32) -> i64 {
    cumulative_cost(params, days)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiWinOutcome {
    pub win_days: Vec<u32>,
    pub cumulative_cost: i64,
    pub total_reward: i64,
    pub net_profit: i64,
}

/// Joue jusqu'au dernier jour gagnant. Sans jour gagnant, rien n'est joué.
pub fn multiple_wins(params: &ProfitParams, win_days: &[u32]) -> MultiWinOutcome {
    let last = win_days.iter().copied().max().unwrap_or(0);
    let cumulative_cost = cumulative_cost(params, last);
    let total_reward: i64 = (1..=last)
        .filter(|d| win_days.contains(d))
        .map(|d| reward(params, d))
        .sum();
    MultiWinOutcome {
        win_days: win_days.to_vec(),
        cumulative_cost,
        total_reward,
        net_profit: total_reward - cumulative_cost,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BreakEven {
    Reached {
        day: u32,
        multiplier: f64,
        daily_cost: i64,
        cumulative_cost: i64,
        reward: i64,
        net_profit: i64,
    },
    NotReached {
        cumulative_cost: i64,
    },
}

/// Premier jour où un gain couvre toutes les mises, dans la limite de `max_days`.
pub fn break_even_day(params: &ProfitParams) -> BreakEven {
    let mut cumulative_cost = 0;
    for day in 1..=params.max_days {
        let daily_cost = daily_cost(params, day);
        cumulative_cost += daily_cost;
        let reward = reward(params, day);
        let net_profit = reward - cumulative_cost;
        if net_profit >= 0 {
            return BreakEven::Reached {
                day,
                multiplier: multiplier(day),
                daily_cost,
                cumulative_cost,
                reward,
                net_profit,
            };
        }
    }
    BreakEven::NotReached { cumulative_cost }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub trials: u32,
    pub average_profit: f64,
    pub max_profit: i64,
    pub min_profit: i64,
    pub positive_rate: f64,
}

/// Chaque jour gagne avec la probabilité `win_rate`, indépendamment.
pub fn monte_carlo(
    params: &ProfitParams,
    win_rate: f64,
    days: u32,
    trials: u32,
    seed: u64,
) -> Result<MonteCarloSummary> {
    if trials == 0 {
        bail!("Au moins un essai est nécessaire");
    }
    if !(0.0..=1.0).contains(&win_rate) {
        bail!("Taux de gain hors de [0, 1] : {}", win_rate);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let total_cost = cumulative_cost(params, days);
    let profits: Vec<i64> = (0..trials)
        .map(|_| {
            let total_reward: i64 = (1..=days)
                .filter(|_| rng.random::<f64>() < win_rate)
                .map(|d| reward(params, d))
                .sum();
            total_reward - total_cost
        })
        .collect();

    Ok(MonteCarloSummary {
        trials,
        average_profit: profits.iter().sum::<i64>() as f64 / trials as f64,
        max_profit: profits.iter().copied().max().unwrap_or(0),
        min_profit: profits.iter().copied().min().unwrap_or(0),
        positive_rate: profits.iter().filter(|&&p| p > 0).count() as f64 / trials as f64,
    })
}

/// Bénéfice net d'un gain au jour d, pour d = 1..=days.
pub fn profit_curve(params: &ProfitParams, days: u32) -> Vec<(u32, i64)> {
    let mut cumulative = 0;
    (1..=days)
        .map(|d| {
            cumulative += daily_cost(params, d);
            (d, reward(params, d) - cumulative)
        })
        .collect()
}
