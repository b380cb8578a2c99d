use crate::combination::ComboSet;
use crate::error::ComboError;

/// Coût d'un ensemble de combinaisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub count: usize,
    pub total_cost: u64,
}

/// `total_cost = count × unit_cost`, en unités monétaires entières.
pub fn price<T>(combinations: &ComboSet<T>, unit_cost: u64) -> Result<Pricing, ComboError> {
    let count = combinations.len();
    let total_cost = u64::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(unit_cost))
        .ok_or(ComboError::CostOverflow { count, unit_cost })?;
    Ok(Pricing { count, total_cost })
}
