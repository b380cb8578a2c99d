use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use loto_db::models::{Draw, POOL_SIZE};

use super::forest::RandomForest;
use crate::sampler::weighted_sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitKind {
    /// Chiffre des unités (`n % 10`), 10 classes.
    Tail,
    /// Chiffre des dizaines (`n / 10`), 4 classes.
    Head,
}

impl DigitKind {
    pub fn label_count(self) -> usize {
        match self {
            DigitKind::Tail => 10,
            DigitKind::Head => 4,
        }
    }

    pub fn digit(self, number: u8) -> u8 {
        match self {
            DigitKind::Tail => number % 10,
            DigitKind::Head => number / 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DigitKind::Tail => "unités",
            DigitKind::Head => "dizaines",
        }
    }

    /// Nom du fichier modèle sauvegardé.
    pub fn file_name(self) -> &'static str {
        match self {
            DigitKind::Tail => "tail_model.json",
            DigitKind::Head => "head_model.json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitParams {
    /// Nombre de tirages passés aplatis en entrée.
    pub lookback: usize,
    pub threshold: f64,
    pub n_trees: usize,
    pub max_depth: usize,
    /// Numéros retenus parmi les candidats.
    pub pick: usize,
}

impl Default for DigitParams {
    fn default() -> Self {
        Self {
            lookback: 5,
            threshold: 0.5,
            n_trees: 100,
            max_depth: 10,
            pick: 6,
        }
    }
}

/// Une ligne par tirage (ordre chronologique), 1.0 pour chaque chiffre présent.
pub fn digit_matrix(chronological: &[Draw], kind: DigitKind) -> Array2<f64> {
    let mut matrix = Array2::zeros((chronological.len(), kind.label_count()));
    for (i, draw) in chronological.iter().enumerate() {
        for &n in &draw.numbers {
            matrix[[i, kind.digit(n) as usize]] = 1.0;
        }
    }
    matrix
}

/// Entrées : `lookback` lignes consécutives aplaties ; cible : la ligne suivante.
pub fn windowed_dataset(matrix: &Array2<f64>, lookback: usize) -> (Array2<f64>, Array2<f64>) {
    let labels = matrix.ncols();
    let samples = matrix.nrows().saturating_sub(lookback);
    let mut x = Array2::zeros((samples, lookback * labels));
    for i in 0..samples {
        let window = matrix.slice(s![i..i + lookback, ..]);
        x.row_mut(i).assign(&Array1::from_iter(window.iter().copied()));
    }
    let y = matrix.slice(s![lookback.., ..]).to_owned();
    (x, y)
}

/// Une forêt par classe de chiffre.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitModel {
    kind: DigitKind,
    lookback: usize,
    forests: Vec<RandomForest>,
}

impl DigitModel {
    pub fn train(matrix: &Array2<f64>, kind: DigitKind, params: &DigitParams, seed: u64) -> Result<Self> {
        if params.lookback == 0 {
            bail!("lookback doit être supérieur à 0");
        }
        if matrix.nrows() <= params.lookback {
            bail!(
                "Historique trop court pour le modèle des {} : {} tirages pour un lookback de {}",
                kind.name(),
                matrix.nrows(),
                params.lookback
            );
        }

        let (x, y) = windowed_dataset(matrix, params.lookback);
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();

        let forests = (0..kind.label_count())
            .map(|label| {
                let labels = y.column(label).to_vec();
                let mut forest = RandomForest::new(params.n_trees, params.max_depth);
                forest.fit(&rows, &labels, seed.wrapping_add(label as u64));
                forest
            })
            .collect();

        debug!("modèle des {} entraîné sur {} fenêtres", kind.name(), rows.len());
        Ok(Self { kind, lookback: params.lookback, forests })
    }

    pub fn kind(&self) -> DigitKind {
        self.kind
    }

    /// Probabilité de chaque chiffre au tirage suivant la dernière ligne.
    pub fn predict_proba(&self, matrix: &Array2<f64>) -> Result<Vec<f64>> {
        if matrix.nrows() < self.lookback {
            bail!("{} tirages nécessaires, {} disponibles", self.lookback, matrix.nrows());
        }
        let start = matrix.nrows() - self.lookback;
        let latest: Vec<f64> = matrix.slice(s![start.., ..]).iter().copied().collect();
        Ok(self.forests.iter().map(|f| f.predict_proba(&latest)).collect())
    }
}

pub fn labels_above(probabilities: &[f64], threshold: f64) -> Vec<u8> {
    probabilities
        .iter()
        .enumerate()
        .filter(|(_, &p)| p >= threshold)
        .map(|(i, _)| i as u8)
        .collect()
}

/// Numéros dont l'unité et la dizaine sont toutes deux prédites.
pub fn candidates(tails: &[u8], heads: &[u8]) -> Vec<u8> {
    (1..=POOL_SIZE)
        .filter(|&n| tails.contains(&(n % 10)) && heads.contains(&(n / 10)))
        .collect()
}

/// Tirage sans remise pondéré par (fréquence historique + 1), résultat trié.
pub fn weighted_pick(candidates: &[u8], history: &[Draw], pick: usize, rng: &mut StdRng) -> Result<Vec<u8>> {
    let mut pool: Vec<u8> = candidates.to_vec();
    pool.sort();
    pool.dedup();

    let weights: Vec<f64> = pool
        .iter()
        .map(|&n| (history.iter().filter(|d| d.contains(n)).count() + 1) as f64)
        .collect();
    let mut selected = weighted_sample(&pool, &weights, pick, rng)?;
    selected.sort();
    Ok(selected)
}

#[derive(Debug, Clone, Serialize)]
pub struct DigitPrediction {
    pub tail_probabilities: Vec<f64>,
    pub head_probabilities: Vec<f64>,
    pub tails: Vec<u8>,
    pub heads: Vec<u8>,
    pub candidates: Vec<u8>,
    pub numbers: Vec<u8>,
}

/// Entraîne les deux modèles sur l'historique (draws[0] = le plus récent) et choisit les numéros.
pub fn predict_numbers(draws: &[Draw], params: &DigitParams, seed: u64) -> Result<DigitPrediction> {
    let chronological: Vec<Draw> = draws.iter().rev().cloned().collect();

    let tail_matrix = digit_matrix(&chronological, DigitKind::Tail);
    let head_matrix = digit_matrix(&chronological, DigitKind::Head);
    let tail_model = DigitModel::train(&tail_matrix, DigitKind::Tail, params, seed)?;
    let head_model = DigitModel::train(&head_matrix, DigitKind::Head, params, seed)?;

    predict_with_models(draws, &tail_model, &head_model, params, seed)
}

pub fn predict_with_models(
    draws: &[Draw],
    tail_model: &DigitModel,
    head_model: &DigitModel,
    params: &DigitParams,
    seed: u64,
) -> Result<DigitPrediction> {
    let chronological: Vec<Draw> = draws.iter().rev().cloned().collect();
    let tail_probabilities = tail_model.predict_proba(&digit_matrix(&chronological, DigitKind::Tail))?;
    let head_probabilities = head_model.predict_proba(&digit_matrix(&chronological, DigitKind::Head))?;

    let tails = labels_above(&tail_probabilities, params.threshold);
    let heads = labels_above(&head_probabilities, params.threshold);
    let candidates = candidates(&tails, &heads);

    let mut rng = StdRng::seed_from_u64(seed);
    let numbers = weighted_pick(&candidates, draws, params.pick, &mut rng)?;

    Ok(DigitPrediction {
        tail_probabilities,
        head_probabilities,
        tails,
        heads,
        candidates,
        numbers,
    })
}

fn join(values: &[u8]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

/// Ajoute une ligne `date,tails,heads,numbers` au journal des sélections.
pub fn append_selection_log(path: &Path, date: &str, prediction: &DigitPrediction) -> Result<()> {
    let exists = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let mut writer = csv::Writer::from_writer(file);
    if !exists {
        writer.write_record(["date", "tails", "heads", "numbers"])?;
    }
    writer.write_record([
        date.to_string(),
        join(&prediction.tails),
        join(&prediction.heads),
        join(&prediction.numbers),
    ])?;
    writer.flush()?;
    Ok(())
}
