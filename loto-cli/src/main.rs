mod display;
mod import;
mod interactive;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use loto_combo::suggest_group_count;
use loto_db::db::{count_draws, db_path, fetch_last_draws, migrate, open_db, upsert_draw, UpsertOutcome};
use loto_db::models::{parse_numbers_safely, standardize_date, Draw, POOL_SIZE};
use loto_db::rusqlite::Connection;
use loto_strategy::backtest::{column_hit_rate, fusion_backtest, group_hit_intervals, hit_rate, latest_group_hits};
use loto_strategy::betting::{custom_column_plan, simulate_betting};
use loto_strategy::config::StrategyConfig;
use loto_strategy::features::build_feature_table;
use loto_strategy::features::export::write_feature_csv;
use loto_strategy::fusion::{gain_table, write_gain_csv};
use loto_strategy::models::boosting::GradientBoosting;
use loto_strategy::models::digits::{
    append_selection_log, digit_matrix, predict_numbers, predict_with_models, DigitKind, DigitModel,
};
use loto_strategy::models::{load_json, save_json, week_id};
use loto_strategy::performance::{append_performance_log, evaluate_performance};
use loto_strategy::pipeline::{run_strategy, train_model};
use loto_strategy::report::{build_report, save_report};
use loto_strategy::rl::run_rl_simulation;
use loto_strategy::sampler::date_seed;
use loto_strategy::simulation::{
    break_even_day, loss_if_no_win, monte_carlo, multiple_wins, profit_curve, profit_on_day, ProfitParams,
};

use crate::display::*;

/// Nombre de colonnes touchées suivi par l'analyse des colonnes libres.
const TRACKED_TOUCHED: usize = 3;

#[derive(Parser)]
#[command(name = "loto", about = "Stratégies et plans de mise pour le loto 5/39")]
struct Cli {
    /// Chemin de la base SQLite (défaut : ./data/loto.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Fichier de configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV (date, puis les cinq numéros)
        #[arg(short, long, default_value = "data/loto539.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter ou remplacer un tirage
    Add {
        /// Date du tirage (demandée si absente)
        #[arg(short, long)]
        date: Option<String>,

        /// Cinq numéros, ex: "3,8,15,22,39" (demandés si absents)
        #[arg(short, long)]
        numbers: Option<String>,
    },

    /// Ajouter un tirage puis régénérer la table de features
    Update {
        #[arg(short, long)]
        date: String,

        #[arg(short, long)]
        numbers: String,

        #[arg(short, long, default_value = "features.csv")]
        output: PathBuf,
    },

    /// Exporter la table de features en CSV
    Features {
        #[arg(short, long, default_value = "features.csv")]
        output: PathBuf,

        /// Nombre maximal de tirages cibles
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Réentraîner les modèles et les sauvegarder
    Retrain {
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,

        /// Seed pour les forêts des chiffres
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classement par fusion et sélections des stratégies
    Strategy {
        /// Modèle sauvegardé (sinon entraîné à la volée)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Prédire des numéros par les chiffres des unités et des dizaines
    Predict {
        #[arg(long)]
        seed: Option<u64>,

        /// Répertoire contenant tail_model.json et head_model.json
        #[arg(short, long)]
        models_dir: Option<PathBuf>,

        /// Journal CSV des sélections
        #[arg(short, long)]
        log: Option<PathBuf>,
    },

    /// Simuler les mises connectée et en colonnes sur le Top-N
    Simulate {
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Mise en colonnes libre sur des numéros choisis, avec backtest
    Columns {
        /// Numéros choisis, ex: "1 5 12 18 23 30 36"
        numbers: String,

        /// Nombre de colonnes (suggéré si absent)
        #[arg(short, long)]
        groups: Option<usize>,

        /// Numéros par combinaison
        #[arg(short, long, default_value = "3")]
        k: usize,
    },

    /// Simulateurs de rentabilité
    Profit {
        #[command(flatten)]
        params: ProfitArgs,

        #[command(subcommand)]
        action: ProfitCommand,
    },

    /// Apprentissage de préférences sur des tirages simulés
    Rl {
        #[arg(short, long)]
        episodes: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Rejouer les sélections sur l'historique
    Backtest {
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Générer le rapport JSON complet
    Report {
        /// Tirage à ajouter avant le rapport
        #[arg(short, long, requires = "numbers")]
        date: Option<String>,

        #[arg(short, long, requires = "date")]
        numbers: Option<String>,

        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Bilan d'un tirage joué (mise et gain)
    Performance {
        /// Montant misé
        #[arg(short, long)]
        invested: u64,

        /// Montant gagné
        #[arg(short, long)]
        won: u64,

        /// Date du tirage (défaut : aujourd'hui)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        notes: String,

        /// Journal JSON des bilans (une ligne par tirage)
        #[arg(short, long)]
        log: Option<PathBuf>,
    },

    /// Mode interactif
    Interactive,
}

#[derive(Args, Debug, Default)]
struct ProfitArgs {
    /// Coût unitaire d'une combinaison
    #[arg(long)]
    unit_cost: Option<f64>,

    /// Nombre de combinaisons jouées par jour
    #[arg(long)]
    combos: Option<u32>,

    /// Gain de base
    #[arg(long)]
    jackpot: Option<f64>,

    /// Horizon maximal en jours
    #[arg(long)]
    max_days: Option<u32>,
}

impl ProfitArgs {
    fn apply(&self, base: &ProfitParams) -> ProfitParams {
        ProfitParams {
            unit_cost: self.unit_cost.unwrap_or(base.unit_cost),
            combos: self.combos.unwrap_or(base.combos),
            jackpot: self.jackpot.unwrap_or(base.jackpot),
            max_days: self.max_days.unwrap_or(base.max_days),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ProfitCommand {
    /// Bilan d'un gain au jour donné
    Day { day: u32 },
    /// Perte cumulée sans aucun gain
    Loss { days: u32 },
    /// Bilan de plusieurs jours gagnants, ex: "5,12,30"
    Wins { days: String },
    /// Premier jour rentable
    BreakEven,
    /// Simulation Monte-Carlo
    MonteCarlo {
        #[arg(long, default_value = "0.05")]
        win_rate: f64,

        #[arg(long, default_value = "100")]
        days: u32,

        #[arg(long, default_value = "1000")]
        trials: u32,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Courbe du bilan selon le jour du gain
    Curve {
        #[arg(long, default_value = "100")]
        days: u32,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = StrategyConfig::load(cli.config.as_deref())?;
    let path = cli.db.unwrap_or_else(db_path);

    if let Command::DbPath = cli.command {
        println!("{}", path.display());
        return Ok(());
    }
    if let Command::Profit { params, action } = &cli.command {
        return cmd_profit(&params.apply(&config.profit), action);
    }
    if let Command::Performance { invested, won, date, notes, log } = &cli.command {
        return cmd_performance(date.as_deref(), *invested, *won, notes, log.as_deref());
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::List { last } => cmd_list(&conn, last),
        Command::Add { date, numbers } => cmd_add(&conn, date, numbers),
        Command::Update { date, numbers, output } => cmd_update(&conn, &config, &date, &numbers, &output),
        Command::Features { output, rows } => cmd_features(&conn, &config, &output, rows),
        Command::Retrain { models_dir, seed } => cmd_retrain(&conn, &config, &models_dir, seed),
        Command::Strategy { model } => cmd_strategy(&conn, &config, model.as_deref()),
        Command::Predict { seed, models_dir, log } => {
            cmd_predict(&conn, &config, seed, models_dir.as_deref(), log.as_deref())
        }
        Command::Simulate { model } => cmd_simulate(&conn, &config, model.as_deref()),
        Command::Columns { numbers, groups, k } => cmd_columns(&conn, &config, &numbers, groups, k),
        Command::Rl { episodes, seed } => cmd_rl(&config, episodes, seed),
        Command::Backtest { model } => cmd_backtest(&conn, &config, model.as_deref()),
        Command::Report { date, numbers, output, seed } => {
            let draw = match (date, numbers) {
                (Some(date), Some(numbers)) => Some(parse_draw(&date, &numbers)?),
                _ => None,
            };
            cmd_report(&conn, &config, draw, &output, seed)
        }
        Command::Interactive => interactive::run_interactive(&conn, &config),
        Command::DbPath | Command::Profit { .. } | Command::Performance { .. } => Ok(()),
    }
}

/// Historique complet, le plus récent en premier.
fn load_history(conn: &Connection) -> Result<Vec<Draw>> {
    let n = count_draws(conn)?;
    if n == 0 {
        bail!("Base vide. Lancez d'abord : loto import");
    }
    fetch_last_draws(conn, n)
}

fn parse_draw(date: &str, numbers: &str) -> Result<Draw> {
    Draw::new(date, &parse_numbers_safely(numbers))
}

fn train_with_progress(draws: &[Draw], config: &StrategyConfig) -> Result<GradientBoosting> {
    let pb = progress_bar(config.boosting.n_estimators as u64)?;
    pb.set_message("Entraînement du modèle");
    let model = train_model(draws, config, |n| pb.set_position(n as u64))?;
    pb.finish_with_message("Modèle entraîné");
    Ok(model)
}

fn load_or_train(draws: &[Draw], config: &StrategyConfig, model: Option<&Path>) -> Result<GradientBoosting> {
    match model {
        Some(path) => load_json(path),
        None => train_with_progress(draws, config),
    }
}

pub(crate) fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

pub(crate) fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : loto import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn store_draw(conn: &Connection, draw: &Draw) -> Result<()> {
    match upsert_draw(conn, draw)? {
        UpsertOutcome::Inserted => println!("Tirage du {} inséré.", draw.date),
        UpsertOutcome::Replaced => println!("Tirage du {} remplacé.", draw.date),
    }
    Ok(())
}

pub(crate) fn cmd_add(conn: &Connection, date: Option<String>, numbers: Option<String>) -> Result<()> {
    let prompted = date.is_none() || numbers.is_none();
    let date = match date {
        Some(d) => d,
        None => prompt("Date (AAAA-MM-JJ ou JJ/MM/AAAA) : ")?,
    };
    let numbers = match numbers {
        Some(n) => parse_numbers_safely(&n),
        None => prompt_numbers()?,
    };
    let draw = Draw::new(&date, &numbers)?;

    println!("\nTirage à enregistrer :");
    display_draws(std::slice::from_ref(&draw));

    if prompted {
        let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
        if confirm.to_lowercase() != "o" {
            println!("Insertion annulée.");
            return Ok(());
        }
    }
    store_draw(conn, &draw)
}

fn cmd_update(conn: &Connection, config: &StrategyConfig, date: &str, numbers: &str, output: &Path) -> Result<()> {
    let draw = parse_draw(date, numbers)?;
    store_draw(conn, &draw)?;
    cmd_features(conn, config, output, None)
}

fn cmd_features(conn: &Connection, config: &StrategyConfig, output: &Path, rows: Option<usize>) -> Result<()> {
    let draws = load_history(conn)?;
    let table = build_feature_table(&draws, rows.unwrap_or(config.feature_rows));
    if table.is_empty() {
        bail!("Au moins deux tirages sont nécessaires pour construire les features");
    }
    write_feature_csv(&table, output)?;
    println!("{} lignes de features écrites dans {}", table.len(), output.display());
    Ok(())
}

fn cmd_retrain(conn: &Connection, config: &StrategyConfig, models_dir: &Path, seed: Option<u64>) -> Result<()> {
    let draws = load_history(conn)?;
    let model = train_with_progress(&draws, config)?;

    let week = week_id(chrono::Local::now().date_naive());
    let model_path = models_dir.join(format!("model_{}.json", week));
    save_json(&model, &model_path)?;
    let gains = gain_table(&model);
    let gain_path = models_dir.join(format!("gain_{}.csv", week));
    write_gain_csv(&gains, &gain_path)?;
    println!("Modèle sauvegardé : {}", model_path.display());
    println!("Gains sauvegardés : {}", gain_path.display());
    display_gain_table(&gains);

    let seed = seed.unwrap_or_else(date_seed);
    let chronological: Vec<Draw> = draws.iter().rev().cloned().collect();
    for kind in [DigitKind::Tail, DigitKind::Head] {
        let matrix = digit_matrix(&chronological, kind);
        let digit_model = DigitModel::train(&matrix, kind, &config.digits, seed)?;
        let path = models_dir.join(kind.file_name());
        save_json(&digit_model, &path)?;
        println!("Modèle des {} sauvegardé : {}", kind.name(), path.display());
    }
    Ok(())
}

pub(crate) fn cmd_strategy(conn: &Connection, config: &StrategyConfig, model: Option<&Path>) -> Result<()> {
    let draws = load_history(conn)?;
    let model = load_or_train(&draws, config, model)?;
    display_gain_table(&gain_table(&model));
    let result = run_strategy(&draws, &model, config);
    display_strategy(&result);
    Ok(())
}

pub(crate) fn cmd_predict(
    conn: &Connection,
    config: &StrategyConfig,
    seed: Option<u64>,
    models_dir: Option<&Path>,
    log: Option<&Path>,
) -> Result<()> {
    let draws = load_history(conn)?;
    let seed = seed.unwrap_or_else(date_seed);
    let prediction = match models_dir {
        Some(dir) => {
            let tail: DigitModel = load_json(&dir.join(DigitKind::Tail.file_name()))?;
            let head: DigitModel = load_json(&dir.join(DigitKind::Head.file_name()))?;
            if tail.kind() != DigitKind::Tail || head.kind() != DigitKind::Head {
                bail!("Modèles des chiffres inversés dans {}", dir.display());
            }
            predict_with_models(&draws, &tail, &head, &config.digits, seed)?
        }
        None => predict_numbers(&draws, &config.digits, seed)?,
    };
    display_digits(&prediction);

    if let Some(path) = log {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        append_selection_log(path, &date, &prediction)?;
        println!("Sélection ajoutée à {}", path.display());
    }
    Ok(())
}

pub(crate) fn cmd_simulate(conn: &Connection, config: &StrategyConfig, model: Option<&Path>) -> Result<()> {
    let draws = load_history(conn)?;
    let model = load_or_train(&draws, config, model)?;
    let result = run_strategy(&draws, &model, config);
    let sim = simulate_betting(&result, config)?;
    display_betting(&sim);
    Ok(())
}

fn parse_pool(input: &str) -> Result<Vec<u8>> {
    let mut seen = BTreeSet::new();
    let mut numbers = Vec::new();
    for n in parse_numbers_safely(input) {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
        if seen.insert(n) {
            numbers.push(n);
        }
    }
    if numbers.is_empty() {
        bail!("Aucun numéro reconnu dans '{}'", input);
    }
    Ok(numbers)
}

pub(crate) fn cmd_columns(
    conn: &Connection,
    config: &StrategyConfig,
    input: &str,
    groups: Option<usize>,
    k: usize,
) -> Result<()> {
    let numbers = parse_pool(input)?;
    let group_count = match groups {
        Some(g) => g,
        None => {
            let g = suggest_group_count(&numbers, config.min_groups, config.max_groups);
            println!("Nombre de colonnes suggéré : {}", g);
            g
        }
    };

    let custom = custom_column_plan(&numbers, group_count, k, config.unit_cost, None)?;
    display_custom_columns(&custom.groups, &custom.plan);

    let draws = load_history(conn)?;
    let chronological: Vec<Draw> = draws.iter().rev().cloned().collect();
    let selected: BTreeSet<u8> = numbers.iter().copied().collect();
    display_hit_rate(&hit_rate(&draws, &selected));
    display_column_hits(&column_hit_rate(&chronological, &custom.groups, k, TRACKED_TOUCHED, 5));
    display_group_hits(&latest_group_hits(&draws, &custom.groups, TRACKED_TOUCHED, 10));
    display_intervals(&group_hit_intervals(&chronological, &custom.groups, TRACKED_TOUCHED));
    Ok(())
}

fn parse_days(input: &str) -> Result<Vec<u32>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("Jour invalide : '{}'", s)))
        .collect()
}

fn cmd_profit(params: &ProfitParams, action: &ProfitCommand) -> Result<()> {
    match action {
        ProfitCommand::Day { day } => display_day_outcome(&profit_on_day(params, *day)),
        ProfitCommand::Loss { days } => {
            println!("Perte cumulée sans gain sur {} jours : {}", days, loss_if_no_win(params, *days));
        }
        ProfitCommand::Wins { days } => display_multi_wins(&multiple_wins(params, &parse_days(days)?)),
        ProfitCommand::BreakEven => display_break_even(&break_even_day(params), params.max_days),
        ProfitCommand::MonteCarlo { win_rate, days, trials, seed } => {
            let seed = seed.unwrap_or_else(date_seed);
            display_monte_carlo(&monte_carlo(params, *win_rate, *days, *trials, seed)?);
        }
        ProfitCommand::Curve { days } => display_profit_curve(&profit_curve(params, *days)),
    }
    Ok(())
}

pub(crate) fn cmd_performance(
    date: Option<&str>,
    invested: u64,
    won: u64,
    notes: &str,
    log: Option<&Path>,
) -> Result<()> {
    let date = match date {
        Some(d) => standardize_date(d)?,
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    let record = evaluate_performance(&date, invested, won, notes);
    display_performance(&record);
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(path) = log {
        append_performance_log(path, &record)?;
        println!("Bilan ajouté à {}", path.display());
    }
    Ok(())
}

pub(crate) fn cmd_rl(config: &StrategyConfig, episodes: Option<usize>, seed: Option<u64>) -> Result<()> {
    let mut params = config.rl.clone();
    if let Some(e) = episodes {
        params.episodes = e;
    }
    let outcome = run_rl_simulation(&params, seed.unwrap_or_else(date_seed))?;
    display_rl(&outcome);
    Ok(())
}

pub(crate) fn cmd_backtest(conn: &Connection, config: &StrategyConfig, model: Option<&Path>) -> Result<()> {
    let draws = load_history(conn)?;
    let model = load_or_train(&draws, config, model)?;
    let table = build_feature_table(&draws, config.feature_rows);
    let report = fusion_backtest(&table, &model, config)?;
    display_fusion_backtest(&report);
    Ok(())
}

pub(crate) fn cmd_report(
    conn: &Connection,
    config: &StrategyConfig,
    draw: Option<Draw>,
    output: &Path,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(draw) = &draw {
        store_draw(conn, draw)?;
    }
    let draws = load_history(conn)?;
    let model = train_with_progress(&draws, config)?;
    let gains = gain_table(&model);
    let strategy = run_strategy(&draws, &model, config);
    let betting = simulate_betting(&strategy, config)?;
    let rl = run_rl_simulation(&config.rl, seed.unwrap_or_else(date_seed))?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let report = build_report(timestamp, draw.as_ref(), &gains, &strategy, &betting, &rl);
    save_report(&report, output)?;
    display_report(&report);
    println!("\nRapport sauvegardé : {}", output.display());
    Ok(())
}

pub(crate) fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

pub(crate) fn prompt_numbers() -> Result<Vec<u8>> {
    loop {
        let input = prompt("5 numéros (séparés par des espaces ou des virgules, 1-39) : ")?;
        let numbers = parse_numbers_safely(&input);
        match loto_db::models::validate_numbers(&numbers) {
            Ok(()) => return Ok(numbers),
            Err(e) => println!("{}. Réessayez.", e),
        }
    }
}
