/// Erreurs structurelles du cœur combinatoire.
///
/// Les entrées seulement dégénérées (pool vide, colonnes vides, numéro absent de la
/// carte des scores) ne sont pas des erreurs : elles produisent un résultat vide ou nul.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboError {
    /// Nombre de colonnes nul, ou plage de recherche vide.
    #[error("configuration invalide : {0}")]
    InvalidConfiguration(String),

    /// Taille de sélection nulle ou supérieure au nombre de numéros disponibles.
    #[error("taille de sélection invalide : k={k} pour {available} numéros disponibles")]
    InvalidSelectionSize { k: usize, available: usize },

    /// Mode colonnes avec moins de colonnes que de numéros à tirer.
    #[error("colonnes insuffisantes : {k} numéros demandés pour {groups} colonnes")]
    InsufficientGroups { k: usize, groups: usize },

    /// Coût total non représentable.
    #[error("coût total trop élevé : {count} combinaisons à {unit_cost}")]
    CostOverflow { count: usize, unit_cost: u64 },

    /// Aucun nombre de colonnes n'a produit un score comparable.
    #[error("aucun score exploitable sur la plage de colonnes")]
    UnscorablePartitions,
}
