use anyhow::{Context, Result};

use loto_db::rusqlite::Connection;
use loto_strategy::config::StrategyConfig;

use crate::prompt;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Add,
    History,
    Strategy,
    Simulate,
    Columns,
    Predict,
    Rl,
    Backtest,
    Performance,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "ajouter" | "add" => Some(InteractiveCommand::Add),
        "2" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "3" | "strategie" | "stratégie" | "strategy" | "strat" => Some(InteractiveCommand::Strategy),
        "4" | "simuler" | "simulate" | "sim" => Some(InteractiveCommand::Simulate),
        "5" | "colonnes" | "columns" | "col" => Some(InteractiveCommand::Columns),
        "6" | "predire" | "prédire" | "predict" | "pred" => Some(InteractiveCommand::Predict),
        "7" | "preferences" | "préférences" | "rl" => Some(InteractiveCommand::Rl),
        "8" | "backtest" | "bt" => Some(InteractiveCommand::Backtest),
        "9" | "bilan" | "performance" | "perf" => Some(InteractiveCommand::Performance),
        "10" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. ajouter     Ajouter un tirage");
    println!("  2. historique  Derniers tirages");
    println!("  3. strategie   Classement par fusion");
    println!("  4. simuler     Mises connectée et en colonnes");
    println!("  5. colonnes    Colonnes libres et backtest");
    println!("  6. predire     Prédiction par chiffres");
    println!("  7. preferences Apprentissage de préférences");
    println!("  8. backtest    Rejouer les sélections");
    println!("  9. bilan       Bilan d'un tirage joué");
    println!("  10. quitter    Quitter");
    println!();
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn prompt_seed() -> Result<Option<u64>> {
    let seed_str = prompt_with_default("Seed (vide = date du jour)", "")?;
    if seed_str.is_empty() {
        Ok(None)
    } else {
        Ok(Some(seed_str.parse().context("Seed invalide")?))
    }
}

fn cmd_history_interactive(conn: &Connection) -> Result<()> {
    let n_str = prompt_with_default("Nombre de tirages", "10")?;
    let n: u32 = n_str.parse().context("Nombre invalide")?;
    super::cmd_list(conn, n)
}

fn cmd_columns_interactive(conn: &Connection, config: &StrategyConfig) -> Result<()> {
    let numbers = prompt("Numéros choisis (1-39) : ")?;
    let groups_str = prompt_with_default("Nombre de colonnes (vide = suggéré)", "")?;
    let groups: Option<usize> = if groups_str.is_empty() {
        None
    } else {
        Some(groups_str.parse().context("Nombre de colonnes invalide")?)
    };
    let k_str = prompt_with_default("Numéros par combinaison", &config.pick_size.to_string())?;
    let k: usize = k_str.parse().context("Nombre invalide")?;
    super::cmd_columns(conn, config, &numbers, groups, k)
}

fn cmd_performance_interactive() -> Result<()> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let date = prompt_with_default("Date du tirage", &today)?;
    let invested: u64 = prompt("Montant misé : ")?.parse().context("Montant invalide")?;
    let won: u64 = prompt("Montant gagné : ")?.parse().context("Montant invalide")?;
    let notes = prompt_with_default("Notes", "")?;
    let log = prompt_with_default("Journal (vide = aucun)", "")?;
    let log = if log.is_empty() { None } else { Some(std::path::PathBuf::from(log)) };
    super::cmd_performance(Some(&date), invested, won, &notes, log.as_deref())
}

fn cmd_rl_interactive(config: &StrategyConfig) -> Result<()> {
    let e_str = prompt_with_default("Épisodes", &config.rl.episodes.to_string())?;
    let episodes: usize = e_str.parse().context("Nombre invalide")?;
    let seed = prompt_seed()?;
    super::cmd_rl(config, Some(episodes), seed)
}

pub fn run_interactive(conn: &Connection, config: &StrategyConfig) -> Result<()> {
    println!("Bienvenue dans le mode interactif de loto !");

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break,
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Add) => super::cmd_add(conn, None, None),
            Some(InteractiveCommand::History) => cmd_history_interactive(conn),
            Some(InteractiveCommand::Strategy) => super::cmd_strategy(conn, config, None),
            Some(InteractiveCommand::Simulate) => super::cmd_simulate(conn, config, None),
            Some(InteractiveCommand::Columns) => cmd_columns_interactive(conn, config),
            Some(InteractiveCommand::Predict) => {
                prompt_seed().and_then(|seed| super::cmd_predict(conn, config, seed, None, None))
            }
            Some(InteractiveCommand::Rl) => cmd_rl_interactive(config),
            Some(InteractiveCommand::Backtest) => super::cmd_backtest(conn, config, None),
            Some(InteractiveCommand::Performance) => cmd_performance_interactive(),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-10) ou un nom de commande.", input);
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_by_number() {
        assert_eq!(parse_command("1"), Some(InteractiveCommand::Add));
        assert_eq!(parse_command("2"), Some(InteractiveCommand::History));
        assert_eq!(parse_command("3"), Some(InteractiveCommand::Strategy));
        assert_eq!(parse_command("4"), Some(InteractiveCommand::Simulate));
        assert_eq!(parse_command("5"), Some(InteractiveCommand::Columns));
        assert_eq!(parse_command("6"), Some(InteractiveCommand::Predict));
        assert_eq!(parse_command("7"), Some(InteractiveCommand::Rl));
        assert_eq!(parse_command("8"), Some(InteractiveCommand::Backtest));
        assert_eq!(parse_command("9"), Some(InteractiveCommand::Performance));
        assert_eq!(parse_command("10"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_name() {
        assert_eq!(parse_command("ajouter"), Some(InteractiveCommand::Add));
        assert_eq!(parse_command("historique"), Some(InteractiveCommand::History));
        assert_eq!(parse_command("stratégie"), Some(InteractiveCommand::Strategy));
        assert_eq!(parse_command("simuler"), Some(InteractiveCommand::Simulate));
        assert_eq!(parse_command("colonnes"), Some(InteractiveCommand::Columns));
        assert_eq!(parse_command("prédire"), Some(InteractiveCommand::Predict));
        assert_eq!(parse_command("preferences"), Some(InteractiveCommand::Rl));
        assert_eq!(parse_command("bilan"), Some(InteractiveCommand::Performance));
        assert_eq!(parse_command("quitter"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_alias() {
        assert_eq!(parse_command("hist"), Some(InteractiveCommand::History));
        assert_eq!(parse_command("strat"), Some(InteractiveCommand::Strategy));
        assert_eq!(parse_command("col"), Some(InteractiveCommand::Columns));
        assert_eq!(parse_command("bt"), Some(InteractiveCommand::Backtest));
        assert_eq!(parse_command("perf"), Some(InteractiveCommand::Performance));
        assert_eq!(parse_command("q"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_case_insensitive() {
        assert_eq!(parse_command("QUIT"), Some(InteractiveCommand::Quit));
        assert_eq!(parse_command("  Colonnes "), Some(InteractiveCommand::Columns));
        assert_eq!(parse_command("RL"), Some(InteractiveCommand::Rl));
    }

    #[test]
    fn test_parse_command_unknown() {
        assert_eq!(parse_command("foo"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("11"), None);
    }
}
