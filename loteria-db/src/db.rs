use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use loteria_core::closure::ClosureResult;
use loteria_core::{Draw, GenerationResult, LotteryKind};

use crate::models::{BetStrategy, StoredBet, decode_numbers, encode_numbers};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    lottery   TEXT NOT NULL,
    contest   INTEGER NOT NULL,
    date      TEXT NOT NULL,
    numbers   TEXT NOT NULL,
    PRIMARY KEY (lottery, contest)
);

CREATE TABLE IF NOT EXISTS bets (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    lottery     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    strategy    TEXT NOT NULL,
    numbers     TEXT NOT NULL,
    sum         INTEGER NOT NULL,
    confidence  REAL NOT NULL DEFAULT 0.0,
    reasoning   TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS closures (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    lottery         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    pool            TEXT NOT NULL,
    target_hits     INTEGER NOT NULL,
    total_games     INTEGER NOT NULL,
    estimated_cost  REAL NOT NULL,
    description     TEXT NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("loteria.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Não foi possível criar o diretório {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Não foi possível abrir o banco {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Falha na migração")?;
    Ok(())
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Returns `false` when the contest is already stored.
pub fn insert_draw(conn: &Connection, kind: LotteryKind, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (lottery, contest, date, numbers) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            kind.as_str(),
            draw.contest(),
            draw.date(),
            encode_numbers(draw.numbers()),
        ],
    ).context("Falha na inserção do concurso")?;
    if changed > 0 {
        log::debug!("{} contest {} stored", kind, draw.contest());
    }
    Ok(changed > 0)
}

/// Newest first, which is the order every generator expects.
pub fn fetch_last_draws(conn: &Connection, kind: LotteryKind, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT contest, date, numbers FROM draws
         WHERE lottery = ?1 ORDER BY contest DESC LIMIT ?2"
    )?;
    let rows = stmt.query_map(rusqlite::params![kind.as_str(), limit], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, NaiveDate>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(contest, date, numbers)| -> Result<Draw> {
            let numbers = decode_numbers(&numbers)
                .with_context(|| format!("Concurso {} corrompido", contest))?;
            Ok(Draw::new(contest, date, numbers))
        })
        .collect()
}

pub fn count_draws(conn: &Connection, kind: LotteryKind) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE lottery = ?1",
        [kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn latest_contest(conn: &Connection, kind: LotteryKind) -> Result<Option<u32>> {
    let contest = conn.query_row(
        "SELECT MAX(contest) FROM draws WHERE lottery = ?1",
        [kind.as_str()],
        |row| row.get::<_, Option<u32>>(0),
    ).optional()?;
    Ok(contest.flatten())
}

pub fn save_bet(
    conn: &Connection,
    kind: LotteryKind,
    strategy: BetStrategy,
    result: &GenerationResult,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO bets (lottery, created_at, strategy, numbers, sum, confidence, reasoning)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            kind.as_str(),
            now(),
            strategy.as_str(),
            encode_numbers(&result.numbers),
            result.sum,
            result.confidence,
            result.reasoning,
        ],
    ).context("Falha ao salvar a aposta")?;
    Ok(conn.last_insert_rowid())
}

pub fn fetch_bets(conn: &Connection, kind: LotteryKind, limit: u32) -> Result<Vec<StoredBet>> {
    let mut stmt = conn.prepare(
        "SELECT id, lottery, created_at, strategy, numbers, sum, confidence, reasoning
         FROM bets WHERE lottery = ?1 ORDER BY id DESC LIMIT ?2"
    )?;
    let rows = stmt.query_map(rusqlite::params![kind.as_str(), limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, u32>(5)?,
            row.get::<_, f64>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, lottery, created_at, strategy, numbers, sum, confidence, reasoning)| -> Result<StoredBet> {
            Ok(StoredBet {
                id,
                lottery,
                created_at,
                strategy: strategy.parse()?,
                numbers: decode_numbers(&numbers)?,
                sum,
                confidence,
                reasoning,
            })
        })
        .collect()
}

/// Stores the closure summary. Games are not persisted: they are
/// reproducible from the pool.
pub fn save_closure(
    conn: &Connection,
    kind: LotteryKind,
    pool: &[u8],
    closure: &ClosureResult,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO closures (lottery, created_at, pool, target_hits, total_games, estimated_cost, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            kind.as_str(),
            now(),
            encode_numbers(pool),
            closure.target_hits as i64,
            closure.total_games as i64,
            closure.estimated_cost,
            closure.description,
        ],
    ).context("Falha ao salvar o fechamento")?;
    Ok(conn.last_insert_rowid())
}

pub fn count_closures(conn: &Connection, kind: LotteryKind) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM closures WHERE lottery = ?1",
        [kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}
