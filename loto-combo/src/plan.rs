use std::hash::Hash;

use crate::combination::{ComboSet, Combination};
use crate::enumerate::{enumerate_grouped, enumerate_linked};
use crate::error::ComboError;
use crate::pricing::price;
use crate::scoring::{ItemValue, Scorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BettingMode {
    Linked,
    Column,
}

impl std::fmt::Display for BettingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BettingMode::Linked => write!(f, "connecté"),
            BettingMode::Column => write!(f, "colonnes"),
        }
    }
}

/// Source des numéros d'un plan de mise.
#[derive(Debug)]
pub enum PlanRequest<'a, T> {
    Linked { pool: &'a [T] },
    Column { groups: &'a [Vec<T>] },
}

impl<T> Clone for PlanRequest<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PlanRequest<'_, T> {}

impl<T> PlanRequest<'_, T> {
    pub fn mode(&self) -> BettingMode {
        match self {
            PlanRequest::Linked { .. } => BettingMode::Linked,
            PlanRequest::Column { .. } => BettingMode::Column,
        }
    }
}

/// Plan de mise chiffré et noté.
#[derive(Debug, Clone)]
pub struct Plan<T> {
    pub mode: BettingMode,
    pub combinations: ComboSet<T>,
    pub total_combos: usize,
    pub total_cost: u64,
    pub aggregate_score: f64,
}

impl<T> Plan<T>
where
    T: Ord + Hash + Clone + ItemValue,
{
    pub fn build(
        request: PlanRequest<'_, T>,
        k: usize,
        unit_cost: u64,
        scorer: Scorer<'_, T>,
    ) -> Result<Self, ComboError> {
        let mode = request.mode();
        let combinations = match request {
            PlanRequest::Linked { pool } => enumerate_linked(pool, k)?,
            PlanRequest::Column { groups } => enumerate_grouped(groups, k)?,
        };
        Self::from_combinations(mode, combinations, unit_cost, scorer)
    }

    pub fn linked(pool: &[T], k: usize, unit_cost: u64, scorer: Scorer<'_, T>) -> Result<Self, ComboError> {
        Self::build(PlanRequest::Linked { pool }, k, unit_cost, scorer)
    }

    pub fn grouped(
        groups: &[Vec<T>],
        k: usize,
        unit_cost: u64,
        scorer: Scorer<'_, T>,
    ) -> Result<Self, ComboError> {
        Self::build(PlanRequest::Column { groups }, k, unit_cost, scorer)
    }

    pub fn from_combinations(
        mode: BettingMode,
        combinations: ComboSet<T>,
        unit_cost: u64,
        scorer: Scorer<'_, T>,
    ) -> Result<Self, ComboError> {
        let pricing = price(&combinations, unit_cost)?;
        let aggregate_score = scorer.average(&combinations);
        Ok(Self {
            mode,
            combinations,
            total_combos: pricing.count,
            total_cost: pricing.total_cost,
            aggregate_score,
        })
    }

    /// Les `n` premières combinaisons dans l'ordre canonique.
    pub fn preview(&self, n: usize) -> impl Iterator<Item = &Combination<T>> {
        self.combinations.iter().take(n)
    }
}
