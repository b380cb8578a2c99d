pub mod boosting;
pub mod digits;
pub mod forest;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Fichier modèle invalide {:?}", path))?;
    Ok(value)
}

/// Identifiant de semaine `v%Yw%W` utilisé pour nommer les modèles réentraînés.
pub fn week_id(date: chrono::NaiveDate) -> String {
    date.format("v%Yw%W").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_id() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(week_id(date), "v2024w10");
    }
}
