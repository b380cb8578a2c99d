use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::fusion::{ConditionThresholds, FusionWeights};
use crate::models::boosting::BoostingParams;
use crate::models::digits::DigitParams;
use crate::rl::RlParams;
use crate::simulation::ProfitParams;

/// Paramètres de l'ensemble de la chaîne, chargés depuis un fichier JSON optionnel.
/// Les champs absents du fichier gardent leur valeur par défaut.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Taille de chaque sélection (Top-N, modèle, gain, fusion).
    pub top_n: usize,
    /// Numéros par combinaison jouée.
    pub pick_size: usize,
    /// Prix d'une combinaison.
    pub unit_cost: u64,
    pub min_groups: usize,
    pub max_groups: usize,
    /// Nombre maximal de tirages cibles dans la table de features.
    pub feature_rows: usize,
    pub condition: ConditionThresholds,
    pub fusion: FusionWeights,
    pub boosting: BoostingParams,
    pub digits: DigitParams,
    pub profit: ProfitParams,
    pub rl: RlParams,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            pick_size: 3,
            unit_cost: 50,
            min_groups: 3,
            max_groups: 6,
            feature_rows: 5000,
            condition: ConditionThresholds::default(),
            fusion: FusionWeights::default(),
            boosting: BoostingParams::default(),
            digits: DigitParams::default(),
            profit: ProfitParams::default(),
            rl: RlParams::default(),
        }
    }
}

impl StrategyConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire la configuration {:?}", path))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Configuration invalide {:?}", path))?;
        info!("configuration chargée depuis {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {:?}", path))?;
        Ok(())
    }

    pub fn group_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_groups..=self.max_groups
    }
}
