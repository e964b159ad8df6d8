mod config;
mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::Settings;
use crate::display::{
    display_bets, display_closure, display_closure_match, display_draws, display_import_summary,
    display_stats, display_stored_bets,
};
use loteria_core::closure::{analyze_cost, check_closure_size, generate_closure_with_cost, validate_closure_match};
use loteria_core::generators::{
    generate_deterministic_bet_variant, generate_hot_cold_balanced_bet, generate_weighted_bet,
};
use loteria_core::models::is_newest_first;
use loteria_core::stats::{compute_frequencies, compute_stats, frequency_confidence, sum_band};
use loteria_core::{Draw, GenerationResult, LotteryKind};
use loteria_db::db::{
    count_draws, db_path, fetch_bets, fetch_last_draws, migrate, open_db, save_bet, save_closure,
};
use loteria_db::models::BetStrategy;
use loteria_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "loteria", about = "Análise de concursos e geração de apostas das loterias")]
struct Cli {
    /// Modalidade (mega-sena, lotofacil, quina, lotomania, dupla-sena, timemania, dia-de-sorte)
    #[arg(short, long, global = true, default_value = "mega-sena")]
    lottery: LotteryKind,

    /// Arquivo de configuração JSON
    #[arg(long, global = true, default_value = "loteria.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importar concursos de um arquivo CSV (concurso;data;dezenas...)
    Import {
        /// Caminho do arquivo CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Mostrar o caminho do banco de dados
    DbPath,

    /// Listar os últimos concursos
    List {
        /// Quantidade de concursos
        #[arg(short = 'n', long, default_value = "10")]
        last: u32,
    },

    /// Frequências e atrasos das dezenas
    Stats {
        /// Janela de análise (concursos)
        #[arg(short, long)]
        window: Option<u32>,
    },

    /// Sorteio ponderado pela frequência
    Weighted {
        #[arg(short, long)]
        window: Option<u32>,

        /// Quantidade de apostas
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed para reprodutibilidade
        #[arg(long)]
        seed: Option<u64>,

        /// Salvar as apostas
        #[arg(long)]
        save: bool,
    },

    /// Sorteio equilibrado entre dezenas quentes e frias, pares e ímpares
    HotCold {
        #[arg(short, long)]
        window: Option<u32>,

        #[arg(short, long, default_value = "1")]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Probabilidade de usar o grupo quente primeiro
        #[arg(long)]
        hot_bias: Option<f64>,

        /// Tamanho do grupo quente
        #[arg(long)]
        hot_pool: Option<usize>,

        /// Tamanho do grupo frio
        #[arg(long)]
        cold_pool: Option<usize>,

        #[arg(long)]
        save: bool,
    },

    /// Aposta determinística (mesma entrada, mesma aposta)
    Generate {
        /// Índice da variante inicial
        #[arg(short, long, default_value = "0")]
        variant: usize,

        /// Quantidade de variantes consecutivas
        #[arg(short, long, default_value = "1")]
        count: usize,

        #[arg(short, long)]
        window: Option<u32>,

        #[arg(long)]
        save: bool,
    },

    /// Gerar o fechamento completo de um conjunto de dezenas
    Closure {
        /// Dezenas escolhidas
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<u8>,

        /// Acertos desejados
        #[arg(short, long, default_value = "4")]
        target_hits: usize,

        /// Custo por jogo (padrão: preço da modalidade)
        #[arg(long)]
        cost: Option<f64>,

        /// Limite de jogos (padrão: configuração)
        #[arg(long)]
        max_games: Option<u64>,

        /// Listar todos os jogos
        #[arg(long)]
        show: bool,

        #[arg(long)]
        save: bool,
    },

    /// Conferir um fechamento contra um resultado
    CheckClosure {
        /// Dezenas do fechamento
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<u8>,

        /// Dezenas sorteadas (padrão: último concurso salvo)
        #[arg(short, long, num_args = 1..)]
        drawn: Vec<u8>,

        #[arg(short, long, default_value = "4")]
        target_hits: usize,

        #[arg(long)]
        max_games: Option<u64>,
    },

    /// Listar as apostas salvas
    Bets {
        #[arg(short = 'n', long, default_value = "10")]
        last: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;
    let kind = cli.lottery;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, kind, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, kind, last),
        Command::Stats { window } => cmd_stats(&conn, kind, &settings, window),
        Command::Weighted { window, count, seed, save } => {
            cmd_weighted(&conn, kind, &settings, window, count, seed, save)
        }
        Command::HotCold {
            window,
            count,
            seed,
            hot_bias,
            hot_pool,
            cold_pool,
            save,
        } => {
            let mut settings = settings;
            if let Some(bias) = hot_bias {
                if !(0.0..=1.0).contains(&bias) {
                    bail!("--hot-bias deve estar entre 0 e 1");
                }
                settings.hot_bias = bias;
            }
            settings.hot_pool_size = hot_pool.or(settings.hot_pool_size);
            settings.cold_pool_size = cold_pool.or(settings.cold_pool_size);
            cmd_hot_cold(&conn, kind, &settings, window, count, seed, save)
        }
        Command::Generate { variant, count, window, save } => {
            cmd_generate(&conn, kind, &settings, variant, count, window, save)
        }
        Command::Closure {
            numbers,
            target_hits,
            cost,
            max_games,
            show,
            save,
        } => cmd_closure(&conn, kind, &settings, &numbers, target_hits, cost, max_games, show, save),
        Command::CheckClosure {
            numbers,
            drawn,
            target_hits,
            max_games,
        } => cmd_check_closure(&conn, kind, &settings, &numbers, drawn, target_hits, max_games),
        Command::Bets { last } => {
            display_stored_bets(&fetch_bets(&conn, kind, last)?);
            Ok(())
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Loads the analysis window, newest first. `None` when the base is empty.
fn load_history(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    window: Option<u32>,
) -> Result<Option<Vec<Draw>>> {
    let n = count_draws(conn, kind)?;
    if n == 0 {
        println!("Base vazia para {kind}. Rode antes: loteria --lottery {kind} import --file <csv>");
        return Ok(None);
    }
    let effective_window = window.unwrap_or(settings.window).min(n);
    let history = fetch_last_draws(conn, kind, effective_window)?;
    if !is_newest_first(&history) {
        log::warn!("history for {kind} is not ordered newest first");
    }
    log::info!("{} draws of {} loaded", history.len(), kind);
    Ok(Some(history))
}

fn save_all(conn: &Connection, kind: LotteryKind, strategy: BetStrategy, bets: &[GenerationResult]) -> Result<()> {
    for bet in bets {
        let id = save_bet(conn, kind, strategy, bet)?;
        log::debug!("bet {id} saved");
    }
    println!("{} aposta(s) salva(s).", bets.len());
    Ok(())
}

fn cmd_import(conn: &Connection, kind: LotteryKind, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, kind, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, kind: LotteryKind, last: u32) -> Result<()> {
    if count_draws(conn, kind)? == 0 {
        println!("Base vazia para {kind}. Rode antes: loteria --lottery {kind} import --file <csv>");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, kind, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, kind: LotteryKind, settings: &Settings, window: Option<u32>) -> Result<()> {
    let Some(history) = load_history(conn, kind, settings, window)? else {
        return Ok(());
    };
    let rule = settings.rule(kind);
    let stats = compute_stats(&history, &rule);
    let band = sum_band(&history, &rule);
    display_stats(kind, &stats, history.len() as u32, &band);
    Ok(())
}

fn cmd_weighted(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    window: Option<u32>,
    count: usize,
    seed: Option<u64>,
    save: bool,
) -> Result<()> {
    let Some(history) = load_history(conn, kind, settings, window)? else {
        return Ok(());
    };
    let rule = settings.rule(kind);
    let table = compute_frequencies(&history, &rule);
    let mut rng = make_rng(seed);

    let bets: Vec<GenerationResult> = (0..count)
        .map(|_| {
            let numbers = generate_weighted_bet(&table, rule.numbers_per_draw(), &mut rng);
            let confidence = frequency_confidence(&numbers, &table);
            GenerationResult::from_numbers(
                numbers,
                format!("frequency-weighted sampling over {} draws", history.len()),
                confidence,
            )
        })
        .collect();

    display_bets("Apostas ponderadas pela frequência", &bets);
    if save {
        save_all(conn, kind, BetStrategy::Weighted, &bets)?;
    }
    Ok(())
}

fn cmd_hot_cold(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    window: Option<u32>,
    count: usize,
    seed: Option<u64>,
    save: bool,
) -> Result<()> {
    let Some(history) = load_history(conn, kind, settings, window)? else {
        return Ok(());
    };
    let rule = settings.rule(kind);
    let options = settings.hot_cold_options();
    let table = compute_frequencies(&history, &rule);
    let mut rng = make_rng(seed);

    let bets: Vec<GenerationResult> = (0..count)
        .map(|_| {
            let numbers = generate_hot_cold_balanced_bet(&history, &rule, &options, &mut rng);
            let confidence = frequency_confidence(&numbers, &table);
            GenerationResult::from_numbers(
                numbers,
                format!(
                    "hot/cold balanced sampling, hot bias {:.2}, {} draws",
                    options.hot_bias,
                    history.len()
                ),
                confidence,
            )
        })
        .collect();

    display_bets("Apostas quentes/frias equilibradas", &bets);
    if save {
        save_all(conn, kind, BetStrategy::HotCold, &bets)?;
    }
    Ok(())
}

fn cmd_generate(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    variant: usize,
    count: usize,
    window: Option<u32>,
    save: bool,
) -> Result<()> {
    // An empty base still yields the sequential fallback bet.
    let n = count_draws(conn, kind)?;
    let effective_window = window.unwrap_or(settings.window).min(n);
    let history = fetch_last_draws(conn, kind, effective_window)?;
    let rule = settings.rule(kind);

    let bets: Vec<GenerationResult> = (variant..variant + count)
        .map(|v| generate_deterministic_bet_variant(&history, &rule, v))
        .collect();

    display_bets("Apostas determinísticas", &bets);
    if save {
        save_all(conn, kind, BetStrategy::Deterministic, &bets)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_closure(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    numbers: &[u8],
    target_hits: usize,
    cost: Option<f64>,
    max_games: Option<u64>,
    show: bool,
    save: bool,
) -> Result<()> {
    let rule = settings.rule(kind);
    let cap = max_games.unwrap_or(settings.closure_cap) as u128;
    let mut pool = numbers.to_vec();
    pool.sort_unstable();
    pool.dedup();
    check_closure_size(pool.len(), &rule, cap)?;

    let cost_per_game = cost.unwrap_or_else(|| settings.cost_per_game(kind));
    let closure = generate_closure_with_cost(&pool, &rule, target_hits, cost_per_game)?;
    let analysis = analyze_cost(&closure);
    display_closure(&closure, &analysis, show);

    if save {
        let id = save_closure(conn, kind, &pool, &closure)?;
        println!("Fechamento salvo (id {id}).");
    }
    Ok(())
}

fn cmd_check_closure(
    conn: &Connection,
    kind: LotteryKind,
    settings: &Settings,
    numbers: &[u8],
    drawn: Vec<u8>,
    target_hits: usize,
    max_games: Option<u64>,
) -> Result<()> {
    let rule = settings.rule(kind);
    let drawn = if drawn.is_empty() {
        match fetch_last_draws(conn, kind, 1)?.into_iter().next() {
            Some(latest) => {
                println!("Conferindo contra o concurso {}", latest.contest());
                latest.numbers().to_vec()
            }
            None => bail!("Nenhum concurso salvo: informe --drawn"),
        }
    } else {
        drawn
    };
    if let Some(&n) = drawn.iter().find(|&&n| !rule.contains(n)) {
        bail!("Dezena sorteada {} fora de {}-{}", n, rule.min_number(), rule.max_number());
    }

    let cap = max_games.unwrap_or(settings.closure_cap) as u128;
    let mut pool = numbers.to_vec();
    pool.sort_unstable();
    pool.dedup();
    check_closure_size(pool.len(), &rule, cap)?;

    let closure = generate_closure_with_cost(&pool, &rule, target_hits, settings.cost_per_game(kind))?;
    let result = validate_closure_match(&closure.combinations, &drawn, target_hits);
    display_closure_match(&result, &drawn, target_hits);
    Ok(())
}
