//! # loto-combo
//!
//! Cœur combinatoire des plans de mise :
//!
//! - [`partition`] répartit un ensemble de numéros en colonnes disjointes (round-robin) ;
//! - [`enumerate_linked`] produit les combinaisons k parmi n d'un pool (« connecté ») ;
//! - [`enumerate_grouped`] produit les combinaisons qui prennent au plus un numéro par
//!   colonne, sur k colonnes distinctes (« colonnes ») ;
//! - [`price`] et [`Scorer`] chiffrent et notent l'ensemble obtenu ;
//! - [`find_best_partition`] cherche le nombre de colonnes au meilleur score moyen.
//!
//! Toutes les fonctions sont pures : pas d'E/S, pas d'état partagé.
//!
//! ```
//! use loto_combo::{partition, enumerate_grouped};
//!
//! let groups = partition(&[1u8, 2, 3, 4, 5, 6], 3).unwrap();
//! assert_eq!(groups, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
//! assert_eq!(enumerate_grouped(&groups, 3).unwrap().len(), 8);
//! ```

mod combination;
mod enumerate;
mod error;
mod partition;
mod plan;
mod pricing;
mod scoring;
mod search;
mod suggest;

pub use combination::{ComboSet, Combination};
pub use enumerate::{enumerate_grouped, enumerate_linked};
pub use error::ComboError;
pub use partition::{partition, partition_by, partition_by_score};
pub use plan::{BettingMode, Plan, PlanRequest};
pub use pricing::{price, Pricing};
pub use scoring::{average_combo_score, Fallback, ItemValue, ScoreMap, Scorer};
pub use search::{find_best_partition, BestPartition};
pub use suggest::suggest_group_count;
